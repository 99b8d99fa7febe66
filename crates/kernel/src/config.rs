//! Configuration loaded from environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::guard::{AuthorizationMode, DEFAULT_DENY_PATH, DEFAULT_SIGN_IN_PATH, GuardConfig};
use crate::models::NavTree;
use crate::navigation;
use crate::permissions::AccessPolicy;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where anonymous visitors are sent (default: /auth/sign-in).
    pub sign_in_path: String,

    /// Where denied visitors are sent (default: /dashboard/user/profile).
    pub deny_redirect_path: String,

    /// Predicate enforcement (default: enforced).
    pub authorization_mode: AuthorizationMode,

    /// Optional YAML access policy. Built-in policy when unset.
    pub access_policy_file: Option<PathBuf>,

    /// Optional YAML navigation tree. Built-in layout when unset.
    pub navigation_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let sign_in_path =
            lookup("SIGN_IN_PATH").unwrap_or_else(|| DEFAULT_SIGN_IN_PATH.to_string());
        validate_path("SIGN_IN_PATH", &sign_in_path)?;

        let deny_redirect_path =
            lookup("DENY_REDIRECT_PATH").unwrap_or_else(|| DEFAULT_DENY_PATH.to_string());
        validate_path("DENY_REDIRECT_PATH", &deny_redirect_path)?;

        let authorization_mode = match lookup("AUTHORIZATION_MODE") {
            Some(value) => AuthorizationMode::parse(&value)?,
            None => AuthorizationMode::Enforced,
        };

        let access_policy_file = lookup("ACCESS_POLICY_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let navigation_file = lookup("NAVIGATION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            sign_in_path,
            deny_redirect_path,
            authorization_mode,
            access_policy_file,
            navigation_file,
        })
    }

    /// Guard settings derived from this configuration.
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            mode: self.authorization_mode,
            sign_in_path: self.sign_in_path.clone(),
            default_deny_path: self.deny_redirect_path.clone(),
        }
    }

    /// Load the access policy from `ACCESS_POLICY_FILE` or use the built-in one.
    pub fn load_policy(&self) -> Result<AccessPolicy, ConfigError> {
        match &self.access_policy_file {
            Some(path) => load_policy_file(path),
            None => Ok(AccessPolicy::default()),
        }
    }

    /// Load the navigation tree from `NAVIGATION_FILE` or use the built-in one.
    pub fn load_navigation(&self) -> Result<NavTree, ConfigError> {
        match &self.navigation_file {
            Some(path) => load_navigation_file(path),
            None => Ok(navigation::default_tree()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            deny_redirect_path: DEFAULT_DENY_PATH.to_string(),
            authorization_mode: AuthorizationMode::Enforced,
            access_policy_file: None,
            navigation_file: None,
        }
    }
}

/// Parse an access policy from YAML text.
pub fn parse_policy(yaml: &str) -> Result<AccessPolicy, ConfigError> {
    serde_yml::from_str(yaml).map_err(|source| ConfigError::Parse {
        what: "access policy".to_string(),
        source,
    })
}

/// Parse a navigation tree from YAML text.
pub fn parse_navigation(yaml: &str) -> Result<NavTree, ConfigError> {
    serde_yml::from_str(yaml).map_err(|source| ConfigError::Parse {
        what: "navigation tree".to_string(),
        source,
    })
}

/// Read and parse an access policy file.
pub fn load_policy_file(path: &Path) -> Result<AccessPolicy, ConfigError> {
    parse_policy(&read(path)?)
}

/// Read and parse a navigation file.
pub fn load_navigation_file(path: &Path) -> Result<NavTree, ConfigError> {
    parse_navigation(&read(path)?)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_path(name: &'static str, value: &str) -> Result<(), ConfigError> {
    // Protocol-relative URLs ("//host") would leave the console.
    if !value.starts_with('/') || value.starts_with("//") {
        return Err(ConfigError::InvalidPath {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.guard_config(), GuardConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("SIGN_IN_PATH", "/login"),
            ("DENY_REDIRECT_PATH", "/dashboard"),
            ("AUTHORIZATION_MODE", "enforced"),
            ("ACCESS_POLICY_FILE", "/etc/backoffice/policy.yml"),
            ("NAVIGATION_FILE", ""),
        ]))
        .unwrap();
        assert_eq!(config.sign_in_path, "/login");
        assert_eq!(config.deny_redirect_path, "/dashboard");
        assert_eq!(
            config.access_policy_file,
            Some(PathBuf::from("/etc/backoffice/policy.yml"))
        );
        assert_eq!(config.navigation_file, None);
    }

    #[test]
    fn rejects_external_redirects() {
        let err = Config::from_lookup(lookup(&[("DENY_REDIRECT_PATH", "https://evil.example")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPath {
                name: "DENY_REDIRECT_PATH",
                ..
            }
        ));
        assert!(Config::from_lookup(lookup(&[("SIGN_IN_PATH", "//evil.example")])).is_err());
    }

    #[test]
    fn missing_policy_file_is_reported() {
        let config = Config {
            access_policy_file: Some(PathBuf::from("/nonexistent/backoffice-policy.yml")),
            ..Config::default()
        };
        assert!(matches!(config.load_policy(), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn invalid_navigation_yaml_is_reported() {
        assert!(matches!(
            parse_navigation("- label: [unterminated"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn builtin_sources_when_unset() {
        let config = Config::default();
        assert_eq!(config.load_policy().unwrap(), AccessPolicy::default());
        assert_eq!(config.load_navigation().unwrap(), navigation::default_tree());
    }
}
