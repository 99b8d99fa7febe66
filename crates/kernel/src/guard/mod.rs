//! Access guard for protected views.
//!
//! The guard sits in front of a protected subtree and decides whether it may
//! render. It moves through an explicit state machine:
//!
//! ```text
//! Pending --loading done, anonymous--------------> Denied (sign-in)
//! Pending --loading done, signed in--> Checking --true--> Granted
//!                                               --false/error--> Denied (deny path)
//! ```
//!
//! A decision is recomputed only when its [`GuardInputs`] change, and every
//! transition into `Denied` issues exactly one replace-navigation.

mod config;
mod driver;
mod state;

pub use config::{AuthorizationMode, DEFAULT_DENY_PATH, DEFAULT_SIGN_IN_PATH, GuardConfig};
pub use driver::GuardDriver;
pub use state::{
    CheckTicket, Evaluation, EvaluationOutcome, GuardInputs, GuardState, Render, Step,
};

use tracing::{debug, info, warn};

use crate::models::AuthPhase;
use crate::router::{NavigateOptions, Router};

/// Stateful gate in front of one protected subtree.
#[derive(Debug)]
pub struct AccessGuard<R> {
    config: GuardConfig,
    router: R,
    state: GuardState,
    inputs: Option<GuardInputs>,
    generation: u64,
    torn_down: bool,
}

impl<R: Router> AccessGuard<R> {
    pub fn new(config: GuardConfig, router: R) -> Self {
        Self {
            config,
            router,
            state: GuardState::Pending,
            inputs: None,
            generation: 0,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Feed inputs and run any required evaluation inline.
    pub fn observe(&mut self, inputs: GuardInputs) -> Render {
        match self.begin(inputs) {
            Step::Settled(render) => render,
            Step::Evaluate(evaluation) => {
                let outcome = evaluation.run();
                self.resolve(outcome)
            }
        }
    }

    /// Feed inputs.
    ///
    /// Unchanged inputs leave the state alone and never navigate. When the
    /// identity is resolved and signed in, an [`Evaluation`] is returned and
    /// the guard stays in `Checking` until [`AccessGuard::resolve`] is called
    /// with its outcome.
    pub fn begin(&mut self, inputs: GuardInputs) -> Step {
        if self.torn_down {
            debug!(area = %inputs.predicate.key(), "guard torn down, ignoring inputs");
            return Step::Settled(Render::Placeholder);
        }

        if self.inputs.as_ref() == Some(&inputs) {
            return Step::Settled(self.state.render());
        }

        self.generation += 1;
        self.inputs = Some(inputs.clone());

        match inputs.auth.phase() {
            AuthPhase::Loading => {
                self.state = GuardState::Pending;
                Step::Settled(Render::Placeholder)
            }
            // Bypass skips predicates, never identity resolution.
            _ if self.config.mode.is_bypass() => {
                warn!(
                    area = %inputs.predicate.key(),
                    "authorization bypass active, granting without checks"
                );
                self.state = GuardState::Granted;
                Step::Settled(Render::Children)
            }
            AuthPhase::Anonymous => {
                let target = self.config.sign_in_path.clone();
                info!(area = %inputs.predicate.key(), redirect = %target, "not signed in");
                self.deny(target)
            }
            AuthPhase::Authenticated(identity) => {
                let ticket = CheckTicket {
                    generation: self.generation,
                };
                let evaluation = Evaluation {
                    ticket,
                    predicate: inputs.predicate.clone(),
                    identity: identity.clone(),
                    route_params: inputs.route_params.clone(),
                };
                self.state = GuardState::Checking(ticket);
                Step::Evaluate(evaluation)
            }
        }
    }

    /// Apply a finished evaluation.
    ///
    /// Outcomes for superseded inputs, or arriving after teardown, are
    /// dropped without touching state or the router.
    pub fn resolve(&mut self, outcome: EvaluationOutcome) -> Render {
        if self.torn_down {
            debug!(ticket = ?outcome.ticket, "discarding evaluation after teardown");
            return Render::Placeholder;
        }

        if self.state != GuardState::Checking(outcome.ticket) {
            debug!(ticket = ?outcome.ticket, state = ?self.state, "discarding stale evaluation");
            return self.state.render();
        }

        let Some(inputs) = self.inputs.as_ref() else {
            return Render::Placeholder;
        };
        let area = inputs.predicate.key().to_string();
        let target = inputs
            .deny_path
            .clone()
            .unwrap_or_else(|| self.config.default_deny_path.clone());

        match outcome.result {
            Ok(true) => {
                debug!(area = %area, "access granted");
                self.state = GuardState::Granted;
                Render::Children
            }
            Ok(false) => {
                info!(area = %area, redirect = %target, "access denied");
                self.deny(target).render()
            }
            Err(e) => {
                warn!(area = %area, error = %e, redirect = %target, "permission check failed, denying");
                self.deny(target).render()
            }
        }
    }

    /// Stop reacting. Later inputs and outcomes are ignored.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            debug!(state = ?self.state, "guard torn down");
        }
        self.torn_down = true;
    }

    fn deny(&mut self, redirect: String) -> Step {
        self.router.navigate(&redirect, NavigateOptions::REPLACE);
        self.state = GuardState::Denied { redirect };
        Step::Settled(Render::Placeholder)
    }
}

impl Step {
    /// Render decision if no evaluation is outstanding.
    pub fn render(&self) -> Render {
        match self {
            Step::Settled(render) => *render,
            Step::Evaluate(_) => Render::Placeholder,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;

    use super::*;
    use crate::error::PredicateError;
    use crate::models::{AuthState, Department, Identity, Role};
    use crate::permissions::{PermissionContext, PermissionRegistry, PredicateRef};
    use crate::router::RouteParams;

    #[derive(Default)]
    struct TestRouter {
        calls: RefCell<Vec<(String, NavigateOptions)>>,
    }

    impl Router for TestRouter {
        fn navigate(&self, path: &str, options: NavigateOptions) {
            self.calls.borrow_mut().push((path.to_string(), options));
        }

        fn route_params(&self) -> RouteParams {
            RouteParams::new()
        }
    }

    fn guard() -> AccessGuard<TestRouter> {
        AccessGuard::new(GuardConfig::default(), TestRouter::default())
    }

    fn sales(registry: &PermissionRegistry) -> PredicateRef {
        registry.predicate("sales")
    }

    fn signed_in(role: Role, department: Department) -> AuthState {
        AuthState::authenticated(Identity::new("u1", role).with_department(department))
    }

    #[test]
    fn loading_renders_placeholder_without_navigation() {
        let registry = PermissionRegistry::default();
        let mut guard = guard();
        let render = guard.observe(GuardInputs::new(
            AuthState::loading(),
            RouteParams::new(),
            sales(&registry),
        ));
        assert_eq!(render, Render::Placeholder);
        assert_eq!(guard.state(), &GuardState::Pending);
        assert!(guard.router().calls.borrow().is_empty());
    }

    #[test]
    fn anonymous_redirects_to_sign_in() {
        let registry = PermissionRegistry::default();
        let mut guard = guard();
        guard.observe(GuardInputs::new(
            AuthState::anonymous(),
            RouteParams::new(),
            sales(&registry),
        ));
        assert_eq!(
            guard.state(),
            &GuardState::Denied {
                redirect: DEFAULT_SIGN_IN_PATH.to_string()
            }
        );
        assert_eq!(
            guard.router().calls.borrow().as_slice(),
            &[(DEFAULT_SIGN_IN_PATH.to_string(), NavigateOptions::REPLACE)]
        );
    }

    #[test]
    fn explicit_deny_path_wins() {
        let registry = PermissionRegistry::default();
        let mut guard = guard();
        guard.observe(
            GuardInputs::new(
                signed_in(Role::Manager, Department::Logistics),
                RouteParams::new(),
                sales(&registry),
            )
            .with_deny_path("/dashboard"),
        );
        assert_eq!(
            guard.router().calls.borrow().as_slice(),
            &[("/dashboard".to_string(), NavigateOptions::REPLACE)]
        );
    }

    #[test]
    fn begin_then_resolve() {
        let registry = PermissionRegistry::default();
        let mut guard = guard();
        let step = guard.begin(GuardInputs::new(
            signed_in(Role::Head, Department::Sales),
            RouteParams::new(),
            sales(&registry),
        ));
        let Step::Evaluate(evaluation) = step else {
            panic!("expected an evaluation");
        };
        assert!(matches!(guard.state(), GuardState::Checking(_)));
        assert_eq!(evaluation.area(), "sales");
        assert_eq!(guard.resolve(evaluation.run()), Render::Children);
        assert_eq!(guard.state(), &GuardState::Granted);
    }

    #[test]
    fn failing_predicate_denies() {
        let failing = PredicateRef::new(
            "reports",
            Arc::new(|ctx: &PermissionContext<'_>| -> Result<bool, PredicateError> {
                Err(PredicateError::failed(ctx.area, "report service unavailable"))
            }),
        );
        let mut guard = guard();
        let render = guard.observe(GuardInputs::new(
            signed_in(Role::Manager, Department::Sales),
            RouteParams::new(),
            failing,
        ));
        assert_eq!(render, Render::Placeholder);
        assert_eq!(
            guard.state(),
            &GuardState::Denied {
                redirect: DEFAULT_DENY_PATH.to_string()
            }
        );
    }

    #[test]
    fn superseded_evaluation_is_discarded() {
        let registry = PermissionRegistry::default();
        let mut guard = guard();
        let Step::Evaluate(first) = guard.begin(GuardInputs::new(
            signed_in(Role::Manager, Department::Logistics),
            RouteParams::new(),
            sales(&registry),
        )) else {
            panic!("expected an evaluation");
        };
        let Step::Evaluate(second) = guard.begin(GuardInputs::new(
            signed_in(Role::Manager, Department::Sales),
            RouteParams::new(),
            sales(&registry),
        )) else {
            panic!("expected an evaluation");
        };

        // The logistics check would deny; it must not navigate.
        assert_eq!(guard.resolve(first.run()), Render::Placeholder);
        assert!(guard.router().calls.borrow().is_empty());
        assert_eq!(guard.resolve(second.run()), Render::Children);
    }

    #[cfg(all(feature = "local-dev-bypass", debug_assertions))]
    #[test]
    fn bypass_grants_without_predicate_once_resolved() {
        let denying = PredicateRef::new(
            "sales",
            Arc::new(|_: &PermissionContext<'_>| -> Result<bool, PredicateError> { Ok(false) }),
        );
        let config = GuardConfig {
            mode: AuthorizationMode::BypassForLocalDev,
            ..GuardConfig::default()
        };
        let mut guard = AccessGuard::new(config, TestRouter::default());

        // Loading still renders nothing.
        let render = guard.observe(GuardInputs::new(
            AuthState::loading(),
            RouteParams::new(),
            denying.clone(),
        ));
        assert_eq!(render, Render::Placeholder);
        assert_eq!(guard.state(), &GuardState::Pending);

        let render = guard.observe(GuardInputs::new(
            signed_in(Role::Employee, Department::Logistics),
            RouteParams::new(),
            denying.clone(),
        ));
        assert_eq!(render, Render::Children);

        let render = guard.observe(GuardInputs::new(
            AuthState::anonymous(),
            RouteParams::new(),
            denying,
        ));
        assert_eq!(render, Render::Children);
        assert!(guard.router().calls.borrow().is_empty());
    }
}
