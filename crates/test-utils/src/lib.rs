//! Backoffice test utilities.
//!
//! Helpers for integration testing: identity builders, navigation fixtures
//! and a router that records redirects instead of performing them.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use backoffice_kernel::{
    AuthState, Department, Identity, NavItem, NavSection, NavTree, NavigateOptions, RouteParams,
    Role, Router,
};

/// Start building a test identity with the given role.
pub fn test_identity(role: Role) -> TestIdentity {
    TestIdentity {
        id: Uuid::now_v7().to_string(),
        role,
        department: None,
    }
}

/// A test identity builder.
#[derive(Debug, Clone)]
pub struct TestIdentity {
    pub id: String,
    pub role: Role,
    pub department: Option<Department>,
}

impl TestIdentity {
    /// Set a custom ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the department.
    pub fn in_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    /// Build the identity.
    pub fn build(self) -> Identity {
        let mut identity = Identity::new(self.id, self.role);
        identity.department = self.department;
        identity
    }

    /// Build a signed-in auth state for this identity.
    pub fn signed_in(self) -> AuthState {
        AuthState::authenticated(self.build())
    }
}

/// Shorthand for a signed-in identity with role and department.
pub fn member(role: Role, department: Department) -> Identity {
    test_identity(role).in_department(department).build()
}

/// Navigation tree covering every filter rule.
///
/// Sections, in order:
/// - "overview": ecommerce, banking, analytics
/// - "management": employee list, employee new, product, order, invoice
/// - "logistics": booking, tour
/// - "tools": calendar, file manager, kanban, posts, jobs
pub fn sample_tree() -> NavTree {
    NavTree::new(vec![
        NavSection::new(
            "overview",
            vec![
                NavItem::new("/dashboard/ecommerce", "E-commerce"),
                NavItem::new("/dashboard/banking", "Banking"),
                NavItem::new("/dashboard/analytics", "Analytics"),
            ],
        ),
        NavSection::new(
            "management",
            vec![
                NavItem::new("/dashboard/employee/list", "Employees"),
                NavItem::new("/dashboard/employee/new", "New employee"),
                NavItem::new("/dashboard/product/list", "Products"),
                NavItem::new("/dashboard/order/list", "Orders"),
                NavItem::new("/dashboard/invoice/list", "Invoices"),
            ],
        ),
        NavSection::new(
            "logistics",
            vec![
                NavItem::new("/dashboard/booking", "Booking"),
                NavItem::new("/dashboard/tour/list", "Tours"),
            ],
        ),
        NavSection::new(
            "tools",
            vec![
                NavItem::new("/dashboard/calendar", "Calendar"),
                NavItem::new("/dashboard/file-manager", "File manager"),
                NavItem::new("/dashboard/kanban", "Kanban"),
                NavItem::new("/dashboard/post/list", "Posts"),
                NavItem::new("/dashboard/job/list", "Jobs"),
            ],
        ),
    ])
}

/// A navigation call captured by [`RecordingRouter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub replace: bool,
}

/// Router that records navigation calls.
///
/// Clones share the same log, so a test can keep one handle while the
/// guard owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingRouter {
    inner: Arc<RecordingRouterInner>,
}

#[derive(Debug, Default)]
struct RecordingRouterInner {
    params: Mutex<RouteParams>,
    calls: Mutex<Vec<Navigation>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the route parameters reported by [`Router::route_params`].
    pub fn with_params(self, params: RouteParams) -> Self {
        *self.inner.params.lock() = params;
        self
    }

    /// All navigation calls so far.
    pub fn calls(&self) -> Vec<Navigation> {
        self.inner.calls.lock().clone()
    }

    /// Number of navigation calls so far.
    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().len()
    }

    /// Most recent navigation, if any.
    pub fn last(&self) -> Option<Navigation> {
        self.inner.calls.lock().last().cloned()
    }
}

impl Router for RecordingRouter {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        self.inner.calls.lock().push(Navigation {
            path: path.to_string(),
            replace: options.replace,
        });
    }

    fn route_params(&self) -> RouteParams {
        self.inner.params.lock().clone()
    }
}
