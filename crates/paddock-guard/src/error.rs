//! Guard error types.

use paddock_ability::AbilityError;
use thiserror::Error;

/// Error type for request guarding.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A checked handler finished without authorizing anything.
    #[error(
        "Authorization not performed: '{endpoint}' did not authorize a resource. \
         Call skip_authorization() to bypass this check."
    )]
    AuthorizationNotPerformed { endpoint: String },

    /// An `authorize` call inside the handler was denied.
    #[error(transparent)]
    Denied(#[from] AbilityError),
}

/// Result type for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
