//! The "authorization performed" check.
//!
//! [`AuthorizationCheck::run`] wraps a unit of work (typically a request
//! handler). When the work succeeds without having called `authorize` or
//! `skip_authorization` on its [`RequestScope`], the check fails with
//! [`GuardError::AuthorizationNotPerformed`]. The ability engine itself is
//! unaware of the wrapping.

use std::fmt;

use paddock_ability::Ability;
use paddock_config::GuardConfig;
use tracing::error;

use crate::error::{GuardError, Result};
use crate::scope::RequestScope;

type EndpointFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Post-handler check that authorization happened.
pub struct AuthorizationCheck {
    enforce: bool,
    only: Vec<String>,
    except: Vec<String>,
    when: Option<EndpointFilter>,
    unless: Option<EndpointFilter>,
}

impl AuthorizationCheck {
    /// Creates a check applying to every endpoint.
    pub fn new() -> Self {
        Self {
            enforce: true,
            only: Vec::new(),
            except: Vec::new(),
            when: None,
            unless: None,
        }
    }

    /// Creates a check that never fails.
    pub fn disabled() -> Self {
        Self {
            enforce: false,
            ..Self::new()
        }
    }

    /// Creates a check from the `[guard]` configuration section.
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            enforce: config.enforce,
            only: config.only.clone(),
            except: config.except.clone(),
            ..Self::new()
        }
    }

    /// Restricts the check to the given endpoints.
    pub fn only<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only.extend(endpoints.into_iter().map(Into::into));
        self
    }

    /// Exempts the given endpoints.
    pub fn except<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except.extend(endpoints.into_iter().map(Into::into));
        self
    }

    /// Applies the check only when `filter` returns true for the endpoint.
    pub fn when<P>(mut self, filter: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Box::new(filter));
        self
    }

    /// Skips the check when `filter` returns true for the endpoint.
    pub fn unless<P>(mut self, filter: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.unless = Some(Box::new(filter));
        self
    }

    /// Returns whether `endpoint` is subject to the check.
    pub fn applies_to(&self, endpoint: &str) -> bool {
        if !self.enforce {
            return false;
        }
        if !self.only.is_empty() && !self.only.iter().any(|e| e == endpoint) {
            return false;
        }
        if self.except.iter().any(|e| e == endpoint) {
            return false;
        }
        if let Some(when) = &self.when
            && !when(endpoint)
        {
            return false;
        }
        if let Some(unless) = &self.unless
            && unless(endpoint)
        {
            return false;
        }
        true
    }

    /// Fails if `endpoint` is checked and `scope` was never authorized.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::AuthorizationNotPerformed`].
    pub fn verify<F>(&self, endpoint: &str, scope: &RequestScope<F>) -> Result<()>
    where
        F: Fn() -> Ability,
    {
        if scope.is_authorized() || !self.applies_to(endpoint) {
            return Ok(());
        }

        error!(endpoint = %endpoint, "Handler finished without performing authorization");
        Err(GuardError::AuthorizationNotPerformed {
            endpoint: endpoint.to_string(),
        })
    }

    /// Runs `work`, then verifies that it authorized.
    ///
    /// Errors returned by `work` pass through untouched and skip the check.
    ///
    /// # Errors
    ///
    /// Returns the error of `work`, or [`GuardError::AuthorizationNotPerformed`]
    /// converted into `E`.
    pub fn run<F, T, E, W>(
        &self,
        endpoint: &str,
        scope: &RequestScope<F>,
        work: W,
    ) -> std::result::Result<T, E>
    where
        F: Fn() -> Ability,
        W: FnOnce(&RequestScope<F>) -> std::result::Result<T, E>,
        E: From<GuardError>,
    {
        let output = work(scope)?;
        self.verify(endpoint, scope)?;
        Ok(output)
    }
}

impl Default for AuthorizationCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuthorizationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationCheck")
            .field("enforce", &self.enforce)
            .field("only", &self.only)
            .field("except", &self.except)
            .field("when", &self.when.is_some())
            .field("unless", &self.unless.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_ability::SubjectKey;

    fn scope() -> RequestScope<fn() -> Ability> {
        fn build() -> Ability {
            let mut ability = Ability::new().without_audit();
            ability.grant("index", "dashboard");
            ability
        }
        RequestScope::new(build as fn() -> Ability)
    }

    #[test]
    fn test_default_applies_everywhere() {
        let check = AuthorizationCheck::new();
        assert!(check.applies_to("index"));
        assert!(check.applies_to("destroy"));
    }

    #[test]
    fn test_disabled_never_applies() {
        let check = AuthorizationCheck::disabled();
        assert!(!check.applies_to("index"));
        assert!(check.verify("index", &scope()).is_ok());
    }

    #[test]
    fn test_only_and_except() {
        let check = AuthorizationCheck::new()
            .only(["create", "update", "destroy"])
            .except(["destroy"]);

        assert!(check.applies_to("create"));
        assert!(check.applies_to("update"));
        assert!(!check.applies_to("destroy"));
        assert!(!check.applies_to("index"));
    }

    #[test]
    fn test_when_and_unless() {
        let check = AuthorizationCheck::new()
            .when(|endpoint| endpoint.starts_with("admin_"))
            .unless(|endpoint| endpoint.ends_with("_health"));

        assert!(check.applies_to("admin_users"));
        assert!(!check.applies_to("admin_health"));
        assert!(!check.applies_to("users"));
    }

    #[test]
    fn test_from_config() {
        let config = GuardConfig {
            enforce: true,
            only: Vec::new(),
            except: vec!["health".to_string()],
        };
        let check = AuthorizationCheck::from_config(&config);

        assert!(check.applies_to("index"));
        assert!(!check.applies_to("health"));

        let check = AuthorizationCheck::from_config(&GuardConfig {
            enforce: false,
            ..GuardConfig::default()
        });
        assert!(!check.applies_to("index"));
    }

    #[test]
    fn test_run_passes_when_authorized() {
        let check = AuthorizationCheck::new();
        let scope = scope();

        let result: Result<&str> = check.run("index", &scope, |scope| {
            scope.authorize("index", &SubjectKey::symbol("dashboard"))?;
            Ok("rendered")
        });

        assert_eq!(result.unwrap(), "rendered");
    }

    #[test]
    fn test_run_fails_when_not_authorized() {
        let check = AuthorizationCheck::new();
        let scope = scope();

        let result: Result<()> = check.run("index", &scope, |_| Ok(()));

        match result {
            Err(GuardError::AuthorizationNotPerformed { endpoint }) => {
                assert_eq!(endpoint, "index");
            }
            other => panic!("Expected AuthorizationNotPerformed, got {other:?}"),
        }
    }

    #[test]
    fn test_run_passes_work_errors_through() {
        let check = AuthorizationCheck::new();
        let scope = scope();

        let result: Result<()> = check.run("destroy", &scope, |scope| {
            scope.authorize("destroy", &SubjectKey::symbol("dashboard"))?;
            Ok(())
        });

        assert!(matches!(result, Err(GuardError::Denied(_))));
    }

    proptest::proptest! {
        #[test]
        fn prop_except_always_exempts(
            only in proptest::collection::vec("[a-z]{1,6}", 0..5),
            endpoint in "[a-z]{1,6}",
        ) {
            let check = AuthorizationCheck::new()
                .only(only.clone())
                .except([endpoint.clone()]);
            proptest::prop_assert!(!check.applies_to(&endpoint));

            let unfiltered = AuthorizationCheck::new().only(only.clone());
            proptest::prop_assert_eq!(
                unfiltered.applies_to(&endpoint),
                only.is_empty() || only.contains(&endpoint)
            );
        }
    }

    #[test]
    fn test_debug_hides_filters() {
        let check = AuthorizationCheck::new().when(|_| true);
        let rendered = format!("{check:?}");
        assert!(rendered.contains("when: true"));
        assert!(rendered.contains("unless: false"));
    }
}
