//! # paddock-guard: request-scoped authorization
//!
//! Connects [`paddock_ability`] to a request/response host without the
//! ability engine knowing about it:
//! - [`RequestScope`] builds the actor's ability once per request and
//!   records whether the handler authorized anything;
//! - [`AuthorizationCheck`] wraps a handler and fails with
//!   [`GuardError::AuthorizationNotPerformed`] when it did not.
//!
//! ## Example
//!
//! ```
//! use paddock_ability::{Ability, SubjectKey};
//! use paddock_guard::{AuthorizationCheck, GuardError, RequestScope};
//!
//! struct Invoice;
//!
//! let check = AuthorizationCheck::new().except(["health"]);
//! let scope = RequestScope::new(|| {
//!     let mut ability = Ability::new();
//!     ability.grant("show", SubjectKey::of::<Invoice>());
//!     ability
//! });
//!
//! let page = check.run("show", &scope, |scope| {
//!     scope.authorize("show", &SubjectKey::of::<Invoice>())?;
//!     Ok::<_, GuardError>("invoice")
//! })?;
//! assert_eq!(page, "invoice");
//!
//! let fresh = RequestScope::new(Ability::new);
//! let forgot = check.run("index", &fresh, |_| Ok::<_, GuardError>(()));
//! assert!(matches!(forgot, Err(GuardError::AuthorizationNotPerformed { .. })));
//! # Ok::<(), GuardError>(())
//! ```

pub mod check;
pub mod error;
pub mod scope;

pub use check::AuthorizationCheck;
pub use error::{GuardError, Result};
pub use scope::RequestScope;
