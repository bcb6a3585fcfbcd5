//! Error types for declarations and enforcement.

use thiserror::Error;

use crate::action::Action;
use crate::subject::SubjectKey;

/// Error type for the ability engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbilityError {
    /// `authorize` was called for an action the actor may not perform.
    #[error("Access denied: not authorized to {action} {subject}")]
    AccessDenied { action: Action, subject: SubjectKey },

    /// A declaration used a form the engine does not support.
    #[error("Invalid declaration: {reason}")]
    InvalidDeclaration { reason: String },
}

impl AbilityError {
    /// Returns whether this is an authorization outcome rather than API misuse.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AbilityError::AccessDenied { .. })
    }
}

/// Result type for ability operations.
pub type Result<T> = std::result::Result<T, AbilityError>;
