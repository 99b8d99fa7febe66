//! Router contract consumed by the access guard.
//!
//! The console's router is an external collaborator. The guard only needs
//! to read the current route parameters and to issue replace-navigations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Options for a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigateOptions {
    pub const REPLACE: Self = Self { replace: true };
}

/// Navigation surface the guard redirects through.
pub trait Router {
    /// Navigate to `path`.
    fn navigate(&self, path: &str, options: NavigateOptions);

    /// Parameters of the route currently being rendered.
    fn route_params(&self) -> RouteParams;
}

/// Named parameters extracted from the active route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Match a route pattern against a path, extracting parameters.
    ///
    /// Pattern: "/dashboard/user/:id/edit"
    /// Path: "/dashboard/user/42/edit"
    /// Result: Some({"id": "42"})
    pub fn match_pattern(pattern: &str, path: &str) -> Option<Self> {
        let pattern_parts: Vec<&str> = pattern.split('/').collect();
        let path_parts: Vec<&str> = path.split('/').collect();

        if pattern_parts.len() != path_parts.len() {
            return None;
        }

        let mut params = BTreeMap::new();

        for (pat, actual) in pattern_parts.iter().zip(path_parts.iter()) {
            if let Some(param_name) = pat.strip_prefix(':') {
                if actual.is_empty() {
                    return None;
                }
                params.insert(param_name.to_string(), actual.to_string());
            } else if pat != actual {
                return None;
            }
        }

        Some(Self(params))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn match_pattern_exact() {
        let params = RouteParams::match_pattern("/dashboard/ecommerce", "/dashboard/ecommerce");
        assert!(params.unwrap().is_empty());
    }

    #[test]
    fn match_pattern_with_param() {
        let params = RouteParams::match_pattern("/dashboard/user/:id", "/dashboard/user/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn match_pattern_multiple_params() {
        let params =
            RouteParams::match_pattern("/dashboard/:area/:id/edit", "/dashboard/order/7/edit")
                .unwrap();
        assert_eq!(params.get("area"), Some("order"));
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn match_pattern_no_match() {
        assert!(RouteParams::match_pattern("/dashboard/order", "/dashboard/invoice").is_none());
        assert!(RouteParams::match_pattern("/dashboard/user/:id", "/dashboard/user/1/2").is_none());
        assert!(RouteParams::match_pattern("/dashboard/user/:id", "/dashboard/user/").is_none());
    }
}
