//! Per-subject rules.
//!
//! A [`SubjectRule`] maps each action to at most one [`Decision`]. Declaring
//! the same action twice replaces the earlier decision; nothing is merged.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{Action, MANAGE};
use crate::subject::Subject;

/// Function evaluated at query time for a conditional grant.
///
/// Receives the queried subject and the extra query arguments unchanged.
/// Checking the shape of those arguments is up to the predicate.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Subject<'_>, &[Value]) -> bool + Send + Sync>);

impl Predicate {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Subject<'_>, &[Value]) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invokes the predicate.
    pub fn evaluate(&self, subject: &Subject<'_>, args: &[Value]) -> bool {
        (self.0)(subject, args)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Stored outcome for one (subject, action) pair.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Always authorized.
    Allow,
    /// Never authorized.
    Deny,
    /// Authorized when the predicate returns true.
    Conditional(Predicate),
}

impl Decision {
    /// Evaluates the decision for a query.
    pub fn evaluate(&self, subject: &Subject<'_>, args: &[Value]) -> bool {
        match self {
            Decision::Allow => true,
            Decision::Deny => false,
            Decision::Conditional(predicate) => predicate.evaluate(subject, args),
        }
    }

    /// Returns the discriminant, for logging and introspection.
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::Allow => DecisionKind::Allow,
            Decision::Deny => DecisionKind::Deny,
            Decision::Conditional(_) => DecisionKind::Conditional,
        }
    }
}

/// Discriminant of a [`Decision`] without its predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Allow,
    Deny,
    Conditional,
}

/// Authorization state for one subject key.
#[derive(Debug, Clone, Default)]
pub struct SubjectRule {
    decisions: BTreeMap<Action, Decision>,
}

/// Rule returned when a subject has nothing declared. Denies everything.
pub(crate) static NULL_RULE: SubjectRule = SubjectRule::new();

impl SubjectRule {
    /// Creates an empty rule.
    pub const fn new() -> Self {
        Self {
            decisions: BTreeMap::new(),
        }
    }

    /// Grants `action`, unconditionally or behind `predicate`.
    ///
    /// Replaces any earlier decision for the same action.
    pub fn add_grant(&mut self, action: Action, predicate: Option<Predicate>) {
        let decision = match predicate {
            Some(predicate) => Decision::Conditional(predicate),
            None => Decision::Allow,
        };
        self.decisions.insert(action, decision);
    }

    /// Denies `action`.
    ///
    /// A predicate, if given, is stored as a conditional decision and used
    /// as-is: it is a pass/fail gate, not an inverted one. Replaces any
    /// earlier decision for the same action.
    pub fn add_deny(&mut self, action: Action, predicate: Option<Predicate>) {
        let decision = match predicate {
            Some(predicate) => Decision::Conditional(predicate),
            None => Decision::Deny,
        };
        self.decisions.insert(action, decision);
    }

    /// Returns whether `action` is authorized on `subject`.
    ///
    /// The `manage` decision, when present, answers every action and is
    /// consulted before the action's own decision. Without either, the
    /// action is denied.
    pub fn authorized(&self, action: &Action, subject: &Subject<'_>, args: &[Value]) -> bool {
        self.decisions
            .get(MANAGE)
            .or_else(|| self.decisions.get(action))
            .is_some_and(|decision| decision.evaluate(subject, args))
    }

    /// Returns the decision stored for exactly `action`.
    pub fn decision(&self, action: &Action) -> Option<&Decision> {
        self.decisions.get(action)
    }

    /// Number of actions with a decision.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Returns whether no action has a decision.
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Iterates over declared actions in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, Action, Decision> {
        self.decisions.iter()
    }
}

impl<'a> IntoIterator for &'a SubjectRule {
    type Item = (&'a Action, &'a Decision);
    type IntoIter = btree_map::Iter<'a, Action, Decision>;

    fn into_iter(self) -> Self::IntoIter {
        self.decisions.iter()
    }
}
