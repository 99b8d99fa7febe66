//! Guard state machine types.

use crate::error::PredicateError;
use crate::models::{AuthState, Identity};
use crate::permissions::PredicateRef;
use crate::router::RouteParams;

/// Identifies one predicate evaluation.
///
/// A ticket is only honoured while the guard is still checking the inputs
/// it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckTicket {
    pub(crate) generation: u64,
}

/// Where the guard stands for its current inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    /// Identity still loading.
    #[default]
    Pending,
    /// Predicate evaluation outstanding.
    Checking(CheckTicket),
    /// Children may render.
    Granted,
    /// A redirect to `redirect` was issued.
    Denied { redirect: String },
}

impl GuardState {
    pub fn render(&self) -> Render {
        match self {
            GuardState::Granted => Render::Children,
            _ => Render::Placeholder,
        }
    }
}

/// What the protected subtree should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Render {
    /// Neutral placeholder; nothing protected is shown.
    #[default]
    Placeholder,
    Children,
}

/// Everything a guard decision depends on.
///
/// The guard re-evaluates only when one of these changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardInputs {
    pub auth: AuthState,
    pub route_params: RouteParams,
    pub predicate: PredicateRef,
    /// Explicit deny target; falls back to the configured default.
    pub deny_path: Option<String>,
}

impl GuardInputs {
    pub fn new(auth: AuthState, route_params: RouteParams, predicate: PredicateRef) -> Self {
        Self {
            auth,
            route_params,
            predicate,
            deny_path: None,
        }
    }

    /// Set an explicit deny target.
    pub fn with_deny_path(mut self, path: impl Into<String>) -> Self {
        self.deny_path = Some(path.into());
        self
    }
}

/// Result of feeding inputs to the guard.
#[derive(Debug)]
pub enum Step {
    /// Decision reached without running a predicate.
    Settled(Render),
    /// A predicate must run; hand the outcome to `AccessGuard::resolve`.
    Evaluate(Evaluation),
}

/// A pending predicate evaluation, detached from the guard.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub(crate) ticket: CheckTicket,
    pub(crate) predicate: PredicateRef,
    pub(crate) identity: Identity,
    pub(crate) route_params: RouteParams,
}

impl Evaluation {
    pub fn area(&self) -> &str {
        self.predicate.key()
    }

    /// Run the predicate.
    pub fn run(self) -> EvaluationOutcome {
        let result = self.predicate.evaluate(&self.identity, &self.route_params);
        EvaluationOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Finished evaluation, ready for `AccessGuard::resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    pub(crate) ticket: CheckTicket,
    pub(crate) result: Result<bool, PredicateError>,
}
