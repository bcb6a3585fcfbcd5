//! Untyped declarations.
//!
//! [`Ability::grant`](crate::Ability::grant) and friends cannot express an
//! unsupported declaration. Hosts that assemble declarations at runtime
//! (from a table, a DSL, a plugin) build a [`Declaration`] instead and hand
//! it to [`Ability::declare`](crate::Ability::declare), which validates it
//! before touching any rule.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::error::{AbilityError, Result};
use crate::rule::Predicate;
use crate::subject::{Subject, SubjectKey};

/// Whether a declaration grants or denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Grant,
    Deny,
}

/// A grant or deny for one (action, subject) pair.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub action: Action,
    pub subject: SubjectKey,
    /// Condition attached to the declaration. Only grants may carry one.
    pub predicate: Option<Predicate>,
    /// Positional arguments beyond action and subject. Always rejected.
    pub args: Vec<Value>,
}

impl Declaration {
    /// Creates an unconditional grant.
    pub fn grant(action: impl Into<Action>, subject: impl Into<SubjectKey>) -> Self {
        Self::new(DeclarationKind::Grant, action.into(), subject.into())
    }

    /// Creates an unconditional deny.
    pub fn deny(action: impl Into<Action>, subject: impl Into<SubjectKey>) -> Self {
        Self::new(DeclarationKind::Deny, action.into(), subject.into())
    }

    fn new(kind: DeclarationKind, action: Action, subject: SubjectKey) -> Self {
        Self {
            kind,
            action,
            subject,
            predicate: None,
            args: Vec::new(),
        }
    }

    /// Attaches a condition evaluated at query time.
    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&Subject<'_>, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Predicate::new(f));
        self
    }

    /// Appends extra positional arguments.
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(args);
        self
    }

    /// Checks that the declaration can be applied.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::InvalidDeclaration`] for a conditional deny
    /// or when extra positional arguments were supplied.
    pub fn validate(&self) -> Result<()> {
        if self.kind == DeclarationKind::Deny && self.predicate.is_some() {
            return Err(AbilityError::InvalidDeclaration {
                reason: "deny does not support granular matching by predicate".to_string(),
            });
        }

        if !self.args.is_empty() {
            return Err(AbilityError::InvalidDeclaration {
                reason: format!(
                    "{} takes an action and a subject, got {} extra argument(s)",
                    self.verb(),
                    self.args.len()
                ),
            });
        }

        Ok(())
    }

    fn verb(&self) -> &'static str {
        match self.kind {
            DeclarationKind::Grant => "grant",
            DeclarationKind::Deny => "deny",
        }
    }
}
