//! The ability engine.
//!
//! An [`Ability`] holds every rule declared for one actor and answers
//! authorization queries against them.
//!
//! Queries resolve their subject to a rule first:
//! - a tag subject uses the rule at its own key, then the rule at `all`;
//! - an instance subject uses the rule at its type's key only;
//! - with nothing found, the null rule denies.
//!
//! The resolved rule then decides, consulting `manage` before the queried
//! action.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::declaration::{Declaration, DeclarationKind};
use crate::error::{AbilityError, Result};
use crate::rule::{NULL_RULE, Predicate, SubjectRule};
use crate::subject::{Subject, SubjectKey};

static ALL_SUBJECTS: SubjectKey = SubjectKey::all();

/// Rules and bypass flag for one actor.
///
/// Build one per actor, declare its rules through `&mut self`, then query
/// through `&self`. A declared `Ability` is `Send + Sync` and can be shared
/// for concurrent queries.
#[derive(Debug, Clone)]
pub struct Ability {
    /// Rules by subject key.
    rules: HashMap<SubjectKey, SubjectRule>,

    /// Set by [`Ability::allow_anything`]; never cleared.
    allow_anything: bool,

    /// Whether to log declarations and `authorize` outcomes.
    audit_enabled: bool,
}

impl Default for Ability {
    fn default() -> Self {
        Self::new()
    }
}

impl Ability {
    /// Creates an ability with no rules. Every query is denied.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            allow_anything: false,
            audit_enabled: true,
        }
    }

    /// Disables audit logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    /// Sets whether declarations and enforcement outcomes are logged.
    pub fn set_audit(&mut self, enabled: bool) {
        self.audit_enabled = enabled;
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Grants `action` on `subject`.
    ///
    /// Replaces any earlier declaration for the same pair. Granting
    /// [`Action::manage`] grants every action on the subject.
    pub fn grant(
        &mut self,
        action: impl Into<Action>,
        subject: impl Into<SubjectKey>,
    ) -> &mut Self {
        self.add(DeclarationKind::Grant, action.into(), subject.into(), None);
        self
    }

    /// Grants `action` on `subject` when `predicate` holds at query time.
    ///
    /// The predicate receives the queried subject (tag or instance) and the
    /// query's extra arguments. It is evaluated on every query; results are
    /// never cached.
    pub fn grant_if<F>(
        &mut self,
        action: impl Into<Action>,
        subject: impl Into<SubjectKey>,
        predicate: F,
    ) -> &mut Self
    where
        F: Fn(&Subject<'_>, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.add(
            DeclarationKind::Grant,
            action.into(),
            subject.into(),
            Some(Predicate::new(predicate)),
        );
        self
    }

    /// Denies `action` on `subject`, replacing an earlier grant for the
    /// same pair.
    ///
    /// A deny of a specific action does not shadow a `manage` grant on the
    /// same subject; deny `manage` itself for that. Conditional denies are
    /// not supported.
    pub fn deny(&mut self, action: impl Into<Action>, subject: impl Into<SubjectKey>) -> &mut Self {
        self.add(DeclarationKind::Deny, action.into(), subject.into(), None);
        self
    }

    /// Applies an untyped declaration.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::InvalidDeclaration`] when the declaration is a
    /// conditional deny or carries extra arguments. No rule is touched in
    /// that case.
    pub fn declare(&mut self, declaration: Declaration) -> Result<&mut Self> {
        if let Err(e) = declaration.validate() {
            warn!(
                action = %declaration.action,
                subject = %declaration.subject,
                error = %e,
                "Rejected declaration"
            );
            return Err(e);
        }

        let Declaration {
            kind,
            action,
            subject,
            predicate,
            ..
        } = declaration;
        self.add(kind, action, subject, predicate);
        Ok(self)
    }

    /// Authorizes every action on every subject for the rest of this
    /// ability's life, overriding all denies.
    pub fn allow_anything(&mut self) -> &mut Self {
        self.allow_anything = true;
        if self.audit_enabled {
            warn!("Ability set to allow anything; declared rules are bypassed");
        }
        self
    }

    fn add(
        &mut self,
        kind: DeclarationKind,
        action: Action,
        subject: SubjectKey,
        predicate: Option<Predicate>,
    ) {
        if self.audit_enabled {
            debug!(
                kind = ?kind,
                action = %action,
                subject = %subject,
                conditional = predicate.is_some(),
                "Rule declared"
            );
        }

        let rule = self.rules.entry(subject).or_default();
        match kind {
            DeclarationKind::Grant => rule.add_grant(action, predicate),
            DeclarationKind::Deny => rule.add_deny(action, predicate),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns whether `action` may be performed on `subject`.
    pub fn can<'a>(&self, action: impl Into<Action>, subject: impl Into<Subject<'a>>) -> bool {
        self.can_with(action, subject, &[])
    }

    /// Like [`Ability::can`], passing `args` to conditional grants.
    pub fn can_with<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
        args: &[Value],
    ) -> bool {
        if self.allow_anything {
            return true;
        }

        let subject = subject.into();
        self.lookup_rule(&subject)
            .authorized(&action.into(), &subject, args)
    }

    /// Negation of [`Ability::can`].
    pub fn cannot<'a>(&self, action: impl Into<Action>, subject: impl Into<Subject<'a>>) -> bool {
        !self.can(action, subject)
    }

    /// Negation of [`Ability::can_with`].
    pub fn cannot_with<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
        args: &[Value],
    ) -> bool {
        !self.can_with(action, subject, args)
    }

    /// Fails unless `action` may be performed on `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::AccessDenied`] exactly when [`Ability::cannot`]
    /// is true.
    pub fn authorize<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
    ) -> Result<()> {
        self.authorize_with(action, subject, &[])
    }

    /// Like [`Ability::authorize`], passing `args` to conditional grants.
    ///
    /// # Errors
    ///
    /// Returns [`AbilityError::AccessDenied`] when the query is denied.
    pub fn authorize_with<'a>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<Subject<'a>>,
        args: &[Value],
    ) -> Result<()> {
        let action = action.into();
        let subject = subject.into();
        let allowed = self.can_with(&action, subject, args);

        if self.audit_enabled {
            if allowed {
                info!(action = %action, subject = %subject, "Access granted");
            } else {
                warn!(action = %action, subject = %subject, "Access denied");
            }
        }

        if allowed {
            Ok(())
        } else {
            Err(AbilityError::AccessDenied {
                action,
                subject: subject.key(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Returns whether [`Ability::allow_anything`] was called.
    pub fn is_allow_anything(&self) -> bool {
        self.allow_anything
    }

    /// Returns the rule declared at exactly `key`, without fallback.
    pub fn rule_for_key(&self, key: &SubjectKey) -> Option<&SubjectRule> {
        self.rules.get(key)
    }

    /// Iterates over subject keys that have rules, in no particular order.
    pub fn subjects(&self) -> impl Iterator<Item = &SubjectKey> {
        self.rules.keys()
    }

    fn lookup_rule(&self, subject: &Subject<'_>) -> &SubjectRule {
        match subject {
            Subject::Tag(key) => self
                .rules
                .get(*key)
                .or_else(|| self.rules.get(&ALL_SUBJECTS))
                .unwrap_or(&NULL_RULE),
            Subject::Instance { key, .. } => self
                .rules
                .get(&SubjectKey::Type(*key))
                .unwrap_or(&NULL_RULE),
        }
    }
}
