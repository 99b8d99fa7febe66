//! Guard configuration and authorization mode.

use std::fmt;

use crate::error::ConfigError;

/// Default sign-in location for anonymous visitors.
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/sign-in";

/// Default deny target: the visitor's own profile.
pub const DEFAULT_DENY_PATH: &str = "/dashboard/user/profile";

/// Whether the guard enforces predicates.
///
/// The bypass variant only exists in debug builds compiled with the
/// `local-dev-bypass` feature. Release builds cannot construct it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationMode {
    #[default]
    Enforced,
    #[cfg(all(feature = "local-dev-bypass", debug_assertions))]
    BypassForLocalDev,
}

impl AuthorizationMode {
    /// Parse an `AUTHORIZATION_MODE` value.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "enforced" => Ok(AuthorizationMode::Enforced),
            "bypass" | "bypass_for_local_dev" => Self::bypass(),
            other => Err(ConfigError::InvalidEnv {
                var: "AUTHORIZATION_MODE",
                value: other.to_string(),
                reason: "expected 'enforced' or 'bypass'".to_string(),
            }),
        }
    }

    #[cfg(all(feature = "local-dev-bypass", debug_assertions))]
    fn bypass() -> Result<Self, ConfigError> {
        Ok(AuthorizationMode::BypassForLocalDev)
    }

    #[cfg(not(all(feature = "local-dev-bypass", debug_assertions)))]
    fn bypass() -> Result<Self, ConfigError> {
        Err(ConfigError::BypassUnavailable)
    }

    /// Whether predicates are skipped.
    pub fn is_bypass(self) -> bool {
        match self {
            AuthorizationMode::Enforced => false,
            #[cfg(all(feature = "local-dev-bypass", debug_assertions))]
            AuthorizationMode::BypassForLocalDev => true,
        }
    }
}

impl fmt::Display for AuthorizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationMode::Enforced => f.write_str("enforced"),
            #[cfg(all(feature = "local-dev-bypass", debug_assertions))]
            AuthorizationMode::BypassForLocalDev => f.write_str("bypass"),
        }
    }
}

/// Static guard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub mode: AuthorizationMode,
    /// Redirect target for anonymous visitors.
    pub sign_in_path: String,
    /// Redirect target on denial when the guard has no explicit deny path.
    pub default_deny_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: AuthorizationMode::Enforced,
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            default_deny_path: DEFAULT_DENY_PATH.to_string(),
        }
    }
}
