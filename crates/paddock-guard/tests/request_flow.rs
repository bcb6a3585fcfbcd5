//! End-to-end request handling: configuration, per-actor abilities, and the
//! authorization-performed check working together.
//!
//! To run these tests:
//! ```bash
//! cargo test --package paddock-guard --test request_flow
//! ```

use std::fs;

use paddock_ability::{Ability, AbilityError, Subject, SubjectKey};
use paddock_config::{ConfigLoader, PaddockConfig};
use paddock_guard::{AuthorizationCheck, GuardError, RequestScope};
use serde_json::json;
use tempfile::tempdir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Guest,
    Author,
    Admin,
}

#[derive(Debug, Clone, Copy)]
struct User {
    id: u64,
    role: Role,
}

#[derive(Debug)]
struct Post {
    author_id: u64,
    published: bool,
}

/// Declares the rules for one actor, the way a host application would.
fn ability_for(user: User) -> Ability {
    let posts = SubjectKey::of::<Post>();
    let mut ability = Ability::new().without_audit();

    match user.role {
        Role::Admin => {
            ability.allow_anything();
        }
        Role::Author => {
            ability
                .grant("index", "all")
                .grant_if("show", &posts, |subject, _| {
                    subject.downcast_ref::<Post>().is_none_or(|post| post.published)
                })
                .grant_if("update", &posts, move |subject, _| {
                    subject
                        .downcast_ref::<Post>()
                        .is_some_and(|post| post.author_id == user.id)
                })
                .grant_if("publish", &posts, |_, args| {
                    args.first().and_then(|v| v.as_u64()).is_some_and(|words| words >= 100)
                })
                .deny("destroy", &posts);
        }
        Role::Guest => {
            ability.grant("index", "all");
        }
    }

    ability
}

fn show_post(scope: &RequestScope<impl Fn() -> Ability>, post: &Post) -> Result<String, GuardError> {
    scope.authorize("show", Subject::instance(post))?;
    Ok(format!("post by {}", post.author_id))
}

#[test]
fn author_can_edit_own_posts_only() {
    let author = User {
        id: 1,
        role: Role::Author,
    };
    let check = AuthorizationCheck::new();
    let own = Post {
        author_id: 1,
        published: false,
    };
    let foreign = Post {
        author_id: 2,
        published: true,
    };

    let scope = RequestScope::new(|| ability_for(author));
    let result = check.run("update", &scope, |scope| {
        scope.authorize("update", Subject::instance(&own))?;
        Ok::<_, GuardError>(())
    });
    assert!(result.is_ok());

    let scope = RequestScope::new(|| ability_for(author));
    let result = check.run("update", &scope, |scope| {
        scope.authorize("update", Subject::instance(&foreign))?;
        Ok::<_, GuardError>(())
    });
    match result {
        Err(GuardError::Denied(AbilityError::AccessDenied { action, subject })) => {
            assert_eq!(action.as_str(), "update");
            assert_eq!(subject, SubjectKey::of::<Post>());
        }
        other => panic!("Expected AccessDenied, got {other:?}"),
    }
}

#[test]
fn unpublished_posts_are_hidden_but_the_type_is_visible() {
    let author = User {
        id: 5,
        role: Role::Author,
    };
    let scope = RequestScope::new(|| ability_for(author));
    let draft = Post {
        author_id: 9,
        published: false,
    };

    assert!(scope.can("show", &SubjectKey::of::<Post>()));
    assert!(scope.cannot("show", Subject::instance(&draft)));
    assert!(show_post(&scope, &draft).is_err());
}

#[test]
fn publish_predicate_reads_extra_args() {
    let author = User {
        id: 1,
        role: Role::Author,
    };
    let scope = RequestScope::new(|| ability_for(author));
    let posts = SubjectKey::of::<Post>();

    assert!(scope.can_with("publish", &posts, &[json!(250)]));
    assert!(scope.cannot_with("publish", &posts, &[json!(20)]));
    assert!(scope.cannot_with("publish", &posts, &[json!("lots")]));
    assert!(scope.authorize_with("publish", &posts, &[json!(100)]).is_ok());
}

#[test]
fn all_wildcard_covers_symbols_not_instances() {
    let guest = User {
        id: 0,
        role: Role::Guest,
    };
    let scope = RequestScope::new(|| ability_for(guest));
    let post = Post {
        author_id: 1,
        published: true,
    };

    assert!(scope.can("index", &SubjectKey::symbol("dashboard")));
    assert!(scope.can("index", &SubjectKey::of::<Post>()));
    assert!(scope.cannot("index", Subject::instance(&post)));
}

#[test]
fn admin_bypasses_declared_denies() {
    let admin = User {
        id: 99,
        role: Role::Admin,
    };
    let scope = RequestScope::new(|| {
        let mut ability = ability_for(admin);
        ability.deny("destroy", SubjectKey::of::<Post>());
        ability
    });
    let post = Post {
        author_id: 1,
        published: true,
    };

    assert!(scope.authorize("destroy", Subject::instance(&post)).is_ok());
    assert!(scope.ability().is_allow_anything());
}

#[test]
fn handler_without_authorization_is_rejected() {
    let guest = User {
        id: 0,
        role: Role::Guest,
    };
    let check = AuthorizationCheck::new().except(["health"]);

    let scope = RequestScope::new(|| ability_for(guest));
    let result = check.run("index", &scope, |_| Ok::<_, GuardError>("listing"));
    assert!(matches!(
        result,
        Err(GuardError::AuthorizationNotPerformed { ref endpoint }) if endpoint == "index"
    ));

    let scope = RequestScope::new(|| ability_for(guest));
    let result = check.run("health", &scope, |_| Ok::<_, GuardError>("ok"));
    assert_eq!(result.unwrap(), "ok");

    let scope = RequestScope::new(|| ability_for(guest));
    let result = check.run("index", &scope, |scope| {
        scope.skip_authorization();
        Ok::<_, GuardError>("listing")
    });
    assert_eq!(result.unwrap(), "listing");
}

#[derive(Debug)]
enum AppError {
    Guard(GuardError),
    NotFound,
}

impl From<GuardError> for AppError {
    fn from(e: GuardError) -> Self {
        AppError::Guard(e)
    }
}

#[test]
fn host_errors_pass_through_the_check() {
    let guest = User {
        id: 0,
        role: Role::Guest,
    };
    let check = AuthorizationCheck::new();
    let scope = RequestScope::new(|| ability_for(guest));

    let result: Result<(), AppError> = check.run("show", &scope, |_| Err(AppError::NotFound));
    assert!(matches!(result, Err(AppError::NotFound)));

    let result: Result<(), AppError> = check.run("show", &scope, |_| Ok(()));
    assert!(matches!(
        result,
        Err(AppError::Guard(GuardError::AuthorizationNotPerformed { .. }))
    ));
}

#[test]
fn check_and_scope_follow_project_config() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    fs::write(
        temp_dir.path().join("paddock.toml"),
        r#"
[guard]
only = ["create", "update"]

[audit]
enabled = false
"#,
    )
    .expect("Failed to write config");

    let config: PaddockConfig = ConfigLoader::new()
        .with_project_dir(temp_dir.path())
        .with_env_prefix("PADDOCK_FLOW_TEST")
        .without_user_config()
        .load()
        .expect("Failed to load config");

    let check = AuthorizationCheck::from_config(&config.guard);
    assert!(check.applies_to("create"));
    assert!(!check.applies_to("index"));

    let author = User {
        id: 1,
        role: Role::Author,
    };
    let scope = RequestScope::from_config(|| ability_for(author), &config);

    // `index` is outside `only`, so skipping authorization is fine.
    assert!(check.run("index", &scope, |_| Ok::<_, GuardError>(())).is_ok());

    let scope = RequestScope::from_config(|| ability_for(author), &config);
    assert!(check.run("create", &scope, |_| Ok::<_, GuardError>(())).is_err());
}
