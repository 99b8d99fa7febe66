//! Access control error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure raised while evaluating a permission predicate.
///
/// The guard never propagates this: it is logged and the view is denied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// Predicate could not reach a decision.
    #[error("predicate for area '{area}' failed: {message}")]
    Failed { area: String, message: String },

    /// Predicate panicked.
    #[error("predicate for area '{area}' panicked: {message}")]
    Panicked { area: String, message: String },

    /// A route parameter the predicate depends on is absent.
    #[error("predicate for area '{area}' requires route parameter '{param}'")]
    MissingRouteParam { area: String, param: String },
}

impl PredicateError {
    /// Shorthand for [`PredicateError::Failed`].
    pub fn failed(area: impl Into<String>, message: impl Into<String>) -> Self {
        PredicateError::Failed {
            area: area.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds a value we cannot use.
    #[error("{var}: invalid value '{value}': {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Policy or navigation file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy or navigation file is not valid YAML for its schema.
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_yml::Error,
    },

    /// Redirect target is not an absolute in-app path.
    #[error("{name} must be an absolute path starting with '/', got '{value}'")]
    InvalidPath { name: &'static str, value: String },

    /// Bypass mode requested but not compiled into this build.
    #[error(
        "authorization bypass is not available in this build; it requires a debug build with the `local-dev-bypass` feature"
    )]
    BypassUnavailable,
}
