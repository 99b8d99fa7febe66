//! In-memory identity source.
//!
//! Holds the current [`AuthState`] and notifies subscribers on change. The
//! real console resolves identities over the network; that client sits
//! outside this crate and only has to drive the methods below.

use tokio::sync::watch;
use tracing::debug;

use crate::models::{AuthState, Identity};

/// Owner of the authentication state.
#[derive(Debug)]
pub struct IdentitySource {
    tx: watch::Sender<AuthState>,
}

impl IdentitySource {
    /// Start in the loading state.
    pub fn new() -> Self {
        Self::with_state(AuthState::loading())
    }

    pub fn with_state(state: AuthState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    /// Current snapshot.
    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// Mark resolution as in progress.
    pub fn begin_loading(&self) {
        self.publish(AuthState::loading());
    }

    /// Resolution finished with a signed-in identity.
    pub fn sign_in(&self, identity: Identity) {
        debug!(identity = %identity.id, role = %identity.role, "identity resolved");
        self.publish(AuthState::authenticated(identity));
    }

    /// Resolution finished without a signed-in identity.
    pub fn sign_out(&self) {
        debug!("identity cleared");
        self.publish(AuthState::anonymous());
    }

    /// Replace the state. Subscribers are only notified if it changed.
    pub fn publish(&self, state: AuthState) {
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }
}

impl Default for IdentitySource {
    fn default() -> Self {
        Self::new()
    }
}
