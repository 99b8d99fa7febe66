//! Async driver wiring a guard to the identity source and the router.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{AccessGuard, GuardInputs, Render, Step};
use crate::models::AuthState;
use crate::permissions::PredicateRef;
use crate::router::{RouteParams, Router};

/// Runs an [`AccessGuard`] for as long as its subtree is mounted.
///
/// The driver waits for change notifications from the identity source and
/// the route; it never polls. Cancelling the token tears the guard down, so
/// an evaluation still in flight at that point has no visible effect.
pub struct GuardDriver<R> {
    guard: AccessGuard<R>,
    predicate: PredicateRef,
    deny_path: Option<String>,
}

impl<R: Router> GuardDriver<R> {
    pub fn new(guard: AccessGuard<R>, predicate: PredicateRef) -> Self {
        Self {
            guard,
            predicate,
            deny_path: None,
        }
    }

    /// Set an explicit deny target.
    pub fn with_deny_path(mut self, path: impl Into<String>) -> Self {
        self.deny_path = Some(path.into());
        self
    }

    /// Drive the guard until cancelled or until the identity source closes.
    ///
    /// Each decision is published on `render`. A closed route source only
    /// freezes the route parameters; identity changes are still acted on.
    /// On exit the guard is torn down and `render` falls back to the
    /// placeholder. Returns the guard so callers can inspect its final state.
    pub async fn run(
        mut self,
        mut auth: watch::Receiver<AuthState>,
        mut route: watch::Receiver<RouteParams>,
        render: watch::Sender<Render>,
        cancel: CancellationToken,
    ) -> AccessGuard<R> {
        let mut route_open = true;
        loop {
            let inputs = GuardInputs {
                auth: auth.borrow_and_update().clone(),
                route_params: route.borrow_and_update().clone(),
                predicate: self.predicate.clone(),
                deny_path: self.deny_path.clone(),
            };

            let decision = match self.guard.begin(inputs) {
                Step::Settled(decision) => decision,
                Step::Evaluate(evaluation) => {
                    // Let a pending teardown win over the evaluation.
                    tokio::task::yield_now().await;
                    if cancel.is_cancelled() {
                        debug!(area = %evaluation.area(), "cancelled while checking");
                        break;
                    }
                    let outcome = evaluation.run();
                    self.guard.resolve(outcome)
                }
            };
            publish(&render, decision);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = auth.changed() => {
                    if changed.is_err() {
                        debug!("identity source closed");
                        break;
                    }
                }
                changed = route.changed(), if route_open => {
                    if changed.is_err() {
                        debug!("route source closed, keeping last parameters");
                        route_open = false;
                    }
                }
            }
        }

        self.guard.teardown();
        publish(&render, Render::Placeholder);
        self.guard
    }
}

fn publish(render: &watch::Sender<Render>, decision: Render) {
    render.send_if_modified(|current| {
        let changed = *current != decision;
        *current = decision;
        changed
    });
}
