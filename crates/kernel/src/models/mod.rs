//! Data models shared by the guard, the registry and the navigation filter.

mod auth_state;
mod identity;
mod nav;

pub use auth_state::{AuthPhase, AuthState};
pub use identity::{Department, Identity, Role};
pub use nav::{NavItem, NavSection, NavTree};
