//! Action identifiers.
//!
//! An action names the operation an actor intends to perform on a subject
//! (`read`, `update`, `destroy`, ...). The reserved action `manage` stands
//! for every action at once.

use std::borrow::{Borrow, Cow};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the reserved wildcard action.
pub const MANAGE: &str = "manage";

/// Operation attempted on a subject.
///
/// Actions compare by name; `Action::from("read") == Action::new("read")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    /// Creates an action from its name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The wildcard action covering every action on a subject.
    pub const fn manage() -> Self {
        Self(Cow::Borrowed(MANAGE))
    }

    /// Returns whether this is the `manage` wildcard.
    pub fn is_manage(&self) -> bool {
        self.0 == MANAGE
    }

    /// Returns the action name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Lets rule maps be probed with a plain `&str`. Ordering of `Action` is the
// ordering of its name, so the two agree.
impl Borrow<str> for Action {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Action {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&Action> for Action {
    fn from(action: &Action) -> Self {
        action.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manage_is_reserved_name() {
        assert!(Action::manage().is_manage());
        assert!(Action::from("manage").is_manage());
        assert!(Action::from(String::from("manage")).is_manage());
        assert!(!Action::from("read").is_manage());
    }

    #[test]
    fn test_borrowed_and_owned_compare_equal() {
        assert_eq!(Action::from("read"), Action::from("read".to_string()));
        assert_ne!(Action::from("read"), Action::from("update"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::new("destroy").to_string(), "destroy");
        assert_eq!(Action::manage().to_string(), "manage");
    }

    #[test]
    fn test_serde_is_plain_string() {
        let json = serde_json::to_string(&Action::from("publish")).unwrap();
        assert_eq!(json, "\"publish\"");

        let action: Action = serde_json::from_str("\"manage\"").unwrap();
        assert!(action.is_manage());
    }
}
