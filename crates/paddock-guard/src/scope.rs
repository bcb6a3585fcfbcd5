//! Per-request authorization state.
//!
//! A [`RequestScope`] is created at the start of a request. It builds the
//! actor's [`Ability`] on first use and keeps it for the rest of the
//! request, and it records whether the handler authorized anything.

use std::cell::{Cell, OnceCell};

use paddock_ability::{Ability, Action, Subject, Value};
use paddock_config::PaddockConfig;
use tracing::debug;

use crate::error::Result;

/// Authorization state for one request.
///
/// Not `Sync`: a scope belongs to the request that created it.
pub struct RequestScope<F>
where
    F: Fn() -> Ability,
{
    /// Builds the actor's ability; called at most once.
    factory: F,

    ability: OnceCell<Ability>,

    /// Set by `authorize` and `skip_authorization`.
    authorized: Cell<bool>,

    audit_enabled: bool,
}

impl<F> RequestScope<F>
where
    F: Fn() -> Ability,
{
    /// Creates a scope whose ability is built lazily by `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            ability: OnceCell::new(),
            authorized: Cell::new(false),
            audit_enabled: true,
        }
    }

    /// Creates a scope with audit logging taken from configuration.
    pub fn from_config(factory: F, config: &PaddockConfig) -> Self {
        Self::new(factory).with_audit(config.audit.enabled)
    }

    /// Sets whether the memoized ability logs its decisions.
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    /// Returns the actor's ability, building it on first call.
    pub fn ability(&self) -> &Ability {
        self.ability.get_or_init(|| {
            debug!("Building ability for request");
            let mut ability = (self.factory)();
            ability.set_audit(self.audit_enabled);
            ability
        })
    }

    /// Returns whether `action` may be performed on `subject`.
    ///
    /// Does not count as performing authorization.
    pub fn can<'a>(&self, action: impl Into<Action>, subject: impl Into<Subject<'a>>) -> bool {
        self.ability().can(action, subject)
    }

    /// Like [`RequestScope::can`], passing `args` to conditional grants.
    pub fn can_with<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
        args: &[Value],
    ) -> bool {
        self.ability().can_with(action, subject, args)
    }

    /// Negation of [`RequestScope::can`].
    pub fn cannot<'a>(&self, action: impl Into<Action>, subject: impl Into<Subject<'a>>) -> bool {
        self.ability().cannot(action, subject)
    }

    /// Negation of [`RequestScope::can_with`].
    pub fn cannot_with<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
        args: &[Value],
    ) -> bool {
        self.ability().cannot_with(action, subject, args)
    }

    /// Marks the request as authorized, then enforces the query.
    ///
    /// The mark is set even when access is denied: an authorization check
    /// was performed either way.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Denied`](crate::GuardError::Denied) when the
    /// ability denies the query.
    pub fn authorize<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
    ) -> Result<()> {
        self.authorize_with(action, subject, &[])
    }

    /// Like [`RequestScope::authorize`], passing `args` to conditional grants.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Denied`](crate::GuardError::Denied) when the
    /// ability denies the query.
    pub fn authorize_with<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
        args: &[Value],
    ) -> Result<()> {
        self.authorized.set(true);
        self.ability().authorize_with(action, subject, args)?;
        Ok(())
    }

    /// Marks the request as authorized without checking anything.
    pub fn skip_authorization(&self) {
        self.authorized.set(true);
    }

    /// Returns whether `authorize` or `skip_authorization` was called.
    pub fn is_authorized(&self) -> bool {
        self.authorized.get()
    }
}
