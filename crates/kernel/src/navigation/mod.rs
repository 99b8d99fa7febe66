//! Navigation data and per-identity filtering.
//!
//! The navigation tree is static configuration. It is loaded once (from
//! `NAVIGATION_FILE` or the built-in console layout) and filtered per
//! identity by [`NavigationFilter`].

mod filter;

pub use filter::NavigationFilter;

use crate::models::{NavItem, NavSection, NavTree};

/// Built-in console navigation layout.
pub fn default_tree() -> NavTree {
    NavTree::new(vec![
        NavSection::new(
            "overview",
            vec![
                NavItem::new("/dashboard/app", "App").with_icon("dashboard"),
                NavItem::new("/dashboard/ecommerce", "E-commerce").with_icon("cart"),
                NavItem::new("/dashboard/analytics", "Analytics").with_icon("analytics"),
                NavItem::new("/dashboard/banking", "Banking").with_icon("banking"),
                NavItem::new("/dashboard/booking", "Booking").with_icon("booking"),
            ],
        ),
        NavSection::new(
            "management",
            vec![
                NavItem::new("/dashboard/employee/list", "Employees").with_icon("user"),
                NavItem::new("/dashboard/employee/new", "New employee").with_icon("user"),
                NavItem::new("/dashboard/product/list", "Products").with_icon("product"),
                NavItem::new("/dashboard/order/list", "Orders").with_icon("order"),
                NavItem::new("/dashboard/invoice/list", "Invoices").with_icon("invoice"),
                NavItem::new("/dashboard/course", "Courses").with_icon("course"),
                NavItem::new("/dashboard/tour/list", "Tours").with_icon("tour"),
            ],
        ),
        NavSection::new(
            "tools",
            vec![
                NavItem::new("/dashboard/post/list", "Posts").with_icon("blog"),
                NavItem::new("/dashboard/job/list", "Jobs").with_icon("job"),
                NavItem::new("/dashboard/file-manager", "File manager").with_icon("folder"),
                NavItem::new("/dashboard/calendar", "Calendar").with_icon("calendar"),
                NavItem::new("/dashboard/kanban", "Kanban").with_icon("kanban"),
            ],
        ),
    ])
}
