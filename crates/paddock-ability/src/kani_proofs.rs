//! Kani bounded model checking proofs for rule resolution.
//!
//! - Proof #1: Default deny - an empty ability denies every query
//! - Proof #2: Last write wins - the final declaration for a pair decides
//! - Proof #3: Manage precedence - a `manage` grant outlives specific denies
//! - Proof #4: Bypass - `allow_anything` overrides every deny
//!
//! Run with: `cargo kani --harness verify_*`

use crate::{Ability, Subject, SubjectKey};

struct Target;

const ACTIONS: [&str; 3] = ["manage", "read", "destroy"];

fn any_action() -> &'static str {
    let idx: usize = kani::any();
    kani::assume(idx < ACTIONS.len());
    ACTIONS[idx]
}

//=============================================================================
// Proof #1: Default deny
//=============================================================================

/// Verifies that an ability with no declarations denies everything.
///
/// **Property**: Without any grant, `can` is false for tags and instances.
///
/// **Proof Strategy**:
/// - Pick a symbolic action from the bounded set
/// - Query both the type key and an instance of the type
/// - Verify that both queries are denied
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_default_deny() {
    let ability = Ability::new().without_audit();
    let key = SubjectKey::of::<Target>();
    let action = any_action();

    assert!(!ability.can(action, &key));
    assert!(!ability.can(action, Subject::instance(&Target)));
}

//=============================================================================
// Proof #2: Last write wins
//=============================================================================

/// Verifies that the later of two declarations for a pair decides.
///
/// **Property**: Grant-then-deny denies; deny-then-grant allows.
///
/// **Proof Strategy**:
/// - Choose the declaration order symbolically
/// - Declare both for the same action and subject
/// - Verify that the query matches the last declaration
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_last_write_wins() {
    let key = SubjectKey::of::<Target>();
    let mut ability = Ability::new().without_audit();
    let first_is_grant: bool = kani::any();

    if first_is_grant {
        ability.grant("read", &key).deny("read", &key);
        assert!(!ability.can("read", &key));
    } else {
        ability.deny("read", &key).grant("read", &key);
        assert!(ability.can("read", &key));
    }
}

//=============================================================================
// Proof #3: Manage precedence
//=============================================================================

/// Verifies that a `manage` grant is consulted before specific actions.
///
/// **Property**: After `grant(manage)`, a deny of any other action leaves
/// `destroy` allowed; only `deny(manage)` revokes it.
///
/// **Proof Strategy**:
/// - Grant `manage`, then deny a symbolic action
/// - Verify `destroy` is allowed exactly when the denied action is not `manage`
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_manage_precedence() {
    let key = SubjectKey::of::<Target>();
    let mut ability = Ability::new().without_audit();
    let action = any_action();

    ability.grant("manage", &key).deny(action, &key);

    // Only a deny of `manage` itself revokes the manage grant.
    assert_eq!(ability.can("destroy", &key), action != "manage");
}

//=============================================================================
// Proof #4: Bypass
//=============================================================================

/// Verifies that `allow_anything` overrides declared denies.
///
/// **Property**: Once the bypass is set, every query is allowed regardless
/// of denies declared before or after it.
///
/// **Proof Strategy**:
/// - Choose symbolically whether the bypass precedes the deny
/// - Deny a symbolic action on the subject
/// - Verify that `can` and `authorize` both succeed
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_allow_anything_bypass() {
    let key = SubjectKey::of::<Target>();
    let mut ability = Ability::new().without_audit();
    let action = any_action();
    let bypass_first: bool = kani::any();

    if bypass_first {
        ability.allow_anything().deny(action, &key);
    } else {
        ability.deny(action, &key).allow_anything();
    }

    assert!(ability.can(action, &key));
    assert!(ability.authorize(action, Subject::instance(&Target)).is_ok());
}
