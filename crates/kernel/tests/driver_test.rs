#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for the async guard driver.
//!
//! The driver reacts to identity and route notifications; these tests drive
//! the identity source by hand and watch the published render decisions.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use backoffice_kernel::guard::DEFAULT_DENY_PATH;
use backoffice_kernel::{
    AccessGuard, Department, GuardConfig, GuardDriver, GuardState, IdentitySource,
    PermissionRegistry, Render, Role, RouteParams,
};
use backoffice_test_utils::{RecordingRouter, member, test_identity};

struct Harness {
    source: IdentitySource,
    route: watch::Sender<RouteParams>,
    render: watch::Receiver<Render>,
    router: RecordingRouter,
    cancel: CancellationToken,
    handle: JoinHandle<AccessGuard<RecordingRouter>>,
}

fn start(area: &str) -> Harness {
    let registry = PermissionRegistry::default();
    let source = IdentitySource::new();
    let (route, route_rx) = watch::channel(RouteParams::new());
    let (render_tx, render) = watch::channel(Render::Placeholder);
    let router = RecordingRouter::new();
    let cancel = CancellationToken::new();

    let guard = AccessGuard::new(GuardConfig::default(), router.clone());
    let driver = GuardDriver::new(guard, registry.predicate(area));
    let handle = tokio::spawn(driver.run(
        source.subscribe(),
        route_rx,
        render_tx,
        cancel.clone(),
    ));

    Harness {
        source,
        route,
        render,
        router,
        cancel,
        handle,
    }
}

/// Give the driver task a chance to process pending notifications.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn wait_for_render(render: &mut watch::Receiver<Render>, expected: Render) {
    tokio::time::timeout(Duration::from_secs(1), render.wait_for(|r| *r == expected))
        .await
        .expect("timed out waiting for render decision")
        .expect("render channel closed");
}

/// Loading shows the placeholder; resolving a sales manager grants.
#[tokio::test]
async fn grants_after_identity_resolves() {
    let mut h = start("sales");
    settle().await;
    assert_eq!(*h.render.borrow(), Render::Placeholder);
    assert_eq!(h.router.call_count(), 0);

    h.source.sign_in(member(Role::Manager, Department::Sales));
    wait_for_render(&mut h.render, Render::Children).await;
    assert_eq!(h.router.call_count(), 0);

    h.cancel.cancel();
    let guard = h.handle.await.unwrap();
    assert_eq!(guard.state(), &GuardState::Granted);
    assert!(guard.is_torn_down());
}

/// A denied identity is redirected once even if notifications repeat.
#[tokio::test]
async fn denial_redirects_once() {
    let h = start("sales");
    let outsider = member(Role::Manager, Department::Logistics);

    h.source.sign_in(outsider.clone());
    settle().await;
    // Same state again: the source suppresses it, the guard would too.
    h.source.sign_in(outsider);
    h.route.send_replace(RouteParams::new());
    settle().await;

    let calls = h.router.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, DEFAULT_DENY_PATH);
    assert!(calls[0].replace);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

/// Signing out after a grant falls back to the sign-in redirect.
#[tokio::test]
async fn sign_out_redirects_to_sign_in() {
    let mut h = start("employees");

    h.source.sign_in(member(Role::Head, Department::Accounting));
    wait_for_render(&mut h.render, Render::Children).await;

    h.source.sign_out();
    wait_for_render(&mut h.render, Render::Placeholder).await;
    settle().await;

    assert_eq!(
        h.router.last().map(|n| n.path),
        Some(GuardConfig::default().sign_in_path)
    );

    h.cancel.cancel();
    h.handle.await.unwrap();
}

/// Route parameter changes re-run the check.
#[tokio::test]
async fn route_change_reevaluates() {
    let mut h = start("profile");

    h.source
        .sign_in(test_identity(Role::Employee).with_id("42").build());
    h.route.send_replace(RouteParams::new().with("id", "42"));
    wait_for_render(&mut h.render, Render::Children).await;

    h.route.send_replace(RouteParams::new().with("id", "7"));
    wait_for_render(&mut h.render, Render::Placeholder).await;
    settle().await;
    assert_eq!(h.router.call_count(), 1);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

/// Nothing is observable after the subtree is torn down.
#[tokio::test]
async fn cancelled_driver_ignores_later_changes() {
    let h = start("sales");
    settle().await;

    h.cancel.cancel();
    let guard = h.handle.await.unwrap();
    assert!(guard.is_torn_down());

    h.source.sign_in(member(Role::Manager, Department::Logistics));
    settle().await;
    assert_eq!(h.router.call_count(), 0);
    assert_eq!(*h.render.borrow(), Render::Placeholder);
}

/// The driver stops when the identity source goes away.
#[tokio::test]
async fn stops_when_source_dropped() {
    let h = start("sales");
    settle().await;

    drop(h.source);
    let guard = tokio::time::timeout(Duration::from_secs(1), h.handle)
        .await
        .expect("driver should stop")
        .unwrap();
    assert_eq!(guard.state(), &GuardState::Pending);
}

/// A closed route source freezes parameters; sign-out is still acted on.
#[tokio::test]
async fn sign_out_after_route_source_closed() {
    let mut h = start("sales");

    h.source.sign_in(member(Role::Manager, Department::Sales));
    wait_for_render(&mut h.render, Render::Children).await;

    drop(h.route);
    settle().await;
    assert!(!h.handle.is_finished());

    h.source.sign_out();
    wait_for_render(&mut h.render, Render::Placeholder).await;
    settle().await;
    assert_eq!(
        h.router.last().map(|n| n.path),
        Some(GuardConfig::default().sign_in_path)
    );

    h.cancel.cancel();
    let guard = h.handle.await.unwrap();
    assert!(guard.is_torn_down());
}

/// Exiting for any reason withdraws a previous grant.
#[tokio::test]
async fn exit_resets_render_to_placeholder() {
    let mut h = start("sales");

    h.source.sign_in(member(Role::Head, Department::Sales));
    wait_for_render(&mut h.render, Render::Children).await;

    drop(h.source);
    let guard = tokio::time::timeout(Duration::from_secs(1), h.handle)
        .await
        .expect("driver should stop")
        .unwrap();
    assert!(guard.is_torn_down());
    assert_eq!(*h.render.borrow(), Render::Placeholder);
}

/// Cancelling while a check is in flight leaves no redirect behind.
#[tokio::test]
async fn cancel_during_check_discards_outcome() {
    let h = start("sales");
    settle().await;

    h.source.sign_in(member(Role::Manager, Department::Logistics));
    // One turn lets the driver pick up the change and start checking.
    tokio::task::yield_now().await;
    h.cancel.cancel();

    let guard = h.handle.await.unwrap();
    assert!(guard.is_torn_down());
    assert_eq!(h.router.call_count(), 0);
    assert_eq!(*h.render.borrow(), Render::Placeholder);
    assert!(!matches!(guard.state(), GuardState::Denied { .. }));
}

/// Cancelling in the same turn as the identity change wins over it.
#[tokio::test]
async fn cancel_with_pending_identity_change() {
    let h = start("sales");
    settle().await;

    h.source.sign_in(member(Role::Manager, Department::Logistics));
    h.cancel.cancel();

    let guard = h.handle.await.unwrap();
    assert!(guard.is_torn_down());
    assert_eq!(h.router.call_count(), 0);
}
