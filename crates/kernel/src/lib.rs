//! Backoffice access control kernel.
//!
//! Role- and department-based access control for the business console:
//! - [`guard::AccessGuard`] gates protected views behind identity
//!   resolution and a permission predicate
//! - [`permissions::PermissionRegistry`] holds the per-area predicates and
//!   department allow-lists
//! - [`navigation::NavigationFilter`] prunes the menu for an identity
//!
//! The `backoffice` binary exposes the same pieces on the command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod models;
pub mod navigation;
pub mod permissions;
pub mod router;

pub use config::Config;
pub use error::{ConfigError, PredicateError};
pub use guard::{
    AccessGuard, AuthorizationMode, GuardConfig, GuardDriver, GuardInputs, GuardState, Render,
};
pub use identity::IdentitySource;
pub use models::{AuthPhase, AuthState, Department, Identity, NavItem, NavSection, NavTree, Role};
pub use navigation::NavigationFilter;
pub use permissions::{AccessPolicy, PermissionRegistry, PredicateRef};
pub use router::{NavigateOptions, RouteParams, Router};
