//! # paddock-ability: per-actor authorization rules
//!
//! Decides whether an actor may perform an action on a subject, from
//! grant/deny declarations made for that actor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Query: can(action, subject, args)           │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Ability                                     │
//! │  ├─ allow_anything? => allowed               │
//! │  ├─ Tag subject: own key, then `all`         │
//! │  ├─ Instance subject: its type's key         │
//! │  └─ nothing found => null rule               │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  SubjectRule                                 │
//! │  ├─ `manage` decision, if declared           │
//! │  ├─ else the action's own decision           │
//! │  └─ else denied                              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Precedence
//!
//! | Declared on a subject                  | `can(destroy)` |
//! |----------------------------------------|----------------|
//! | nothing                                | ✗              |
//! | `grant(destroy)`                       | ✓              |
//! | `grant(destroy)`, then `deny(destroy)` | ✗              |
//! | `grant(manage)`, then `deny(destroy)`  | ✓              |
//! | `grant(manage)`, then `deny(manage)`   | ✗              |
//! | anything, plus `allow_anything()`      | ✓              |
//!
//! ## Examples
//!
//! ```
//! use paddock_ability::{Ability, Subject, SubjectKey};
//!
//! struct Post {
//!     author_id: u64,
//! }
//!
//! let current_user_id = 7;
//! let posts = SubjectKey::of::<Post>();
//!
//! let mut ability = Ability::new();
//! ability
//!     .grant("read", &posts)
//!     .grant_if("update", &posts, move |subject, _args| {
//!         subject
//!             .downcast_ref::<Post>()
//!             .is_some_and(|post| post.author_id == current_user_id)
//!     });
//!
//! let own = Post { author_id: 7 };
//! let other = Post { author_id: 8 };
//!
//! assert!(ability.can("read", &posts));
//! assert!(ability.can("update", Subject::instance(&own)));
//! assert!(ability.cannot("update", Subject::instance(&other)));
//! assert!(ability.authorize("destroy", Subject::instance(&own)).is_err());
//! ```
//!
//! ### Untyped declarations
//!
//! ```
//! use paddock_ability::{Ability, AbilityError, Declaration};
//!
//! let mut ability = Ability::new();
//! let result = ability.declare(Declaration::deny("manage", "reports").when(|_, _| true));
//!
//! assert!(matches!(result, Err(AbilityError::InvalidDeclaration { .. })));
//! ```

pub mod ability;
pub mod action;
pub mod declaration;
pub mod error;
pub mod rule;
pub mod subject;

// Re-export commonly used types
pub use ability::Ability;
pub use action::Action;
pub use declaration::{Declaration, DeclarationKind};
pub use error::{AbilityError, Result};
pub use rule::{Decision, DecisionKind, Predicate, SubjectRule};
pub use subject::{Subject, SubjectKey, TypeKey};

/// Extra query arguments handed to predicates.
pub use serde_json::Value;


// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;
