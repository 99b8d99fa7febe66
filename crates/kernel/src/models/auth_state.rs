//! Authentication state published by the identity source.

use serde::{Deserialize, Serialize};

use super::Identity;

/// Snapshot of the identity source.
///
/// While `loading` is set the other two fields carry no meaning. Use
/// [`AuthState::phase`] instead of reading the flags directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub loading: bool,
}

/// The part of an [`AuthState`] that may be acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase<'a> {
    Loading,
    Anonymous,
    Authenticated(&'a Identity),
}

impl AuthState {
    /// Identity resolution still in progress.
    pub fn loading() -> Self {
        Self {
            identity: None,
            authenticated: false,
            loading: true,
        }
    }

    /// Resolution finished without a signed-in principal.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Resolution finished with a signed-in principal.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            authenticated: true,
            loading: false,
        }
    }

    /// Project the flags onto the states the guard acts on.
    ///
    /// An authenticated flag without an identity is treated as anonymous.
    pub fn phase(&self) -> AuthPhase<'_> {
        if self.loading {
            return AuthPhase::Loading;
        }
        match (&self.identity, self.authenticated) {
            (Some(identity), true) => AuthPhase::Authenticated(identity),
            _ => AuthPhase::Anonymous,
        }
    }

    /// Identity once resolution has finished, if signed in.
    pub fn resolved_identity(&self) -> Option<&Identity> {
        match self.phase() {
            AuthPhase::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}
