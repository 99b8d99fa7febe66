//! Per-identity pruning of the navigation tree.

use tracing::debug;

use crate::models::{Identity, NavItem, NavSection, NavTree};
use crate::permissions::{
    AccessPolicy, DepartmentAllowTable, MissingDepartmentPolicy, PermissionRegistry,
};

/// Prunes a [`NavTree`] down to the items an identity may see.
///
/// Item and section order are preserved and sections left without items
/// are dropped. The input tree is never modified.
#[derive(Debug, Clone)]
pub struct NavigationFilter {
    departments: DepartmentAllowTable,
    common_tool_fragments: Vec<String>,
    employee_management_fragment: String,
    missing_department: MissingDepartmentPolicy,
}

impl NavigationFilter {
    /// Build a filter from the policy's navigation settings.
    pub fn from_policy(policy: &AccessPolicy) -> Self {
        Self {
            departments: DepartmentAllowTable::from_policy(policy),
            common_tool_fragments: policy
                .common_tool_fragments
                .iter()
                .filter(|f| !f.is_empty())
                .cloned()
                .collect(),
            employee_management_fragment: policy.employee_management_fragment.clone(),
            missing_department: policy.missing_department,
        }
    }

    /// Build a filter that shares the registry's department table.
    ///
    /// The policy only supplies the navigation settings (common tools,
    /// employee fragment, missing-department behaviour).
    pub fn from_registry(registry: &PermissionRegistry, policy: &AccessPolicy) -> Self {
        Self::from_policy(policy).with_departments(registry.departments().clone())
    }

    /// Use a specific department table.
    pub fn with_departments(mut self, departments: DepartmentAllowTable) -> Self {
        self.departments = departments;
        self
    }

    /// Override the missing-department behaviour.
    pub fn with_missing_department(mut self, policy: MissingDepartmentPolicy) -> Self {
        self.missing_department = policy;
        self
    }

    pub fn missing_department(&self) -> MissingDepartmentPolicy {
        self.missing_department
    }

    /// Filter an optional tree for an optional identity.
    ///
    /// With no tree or no identity the input is returned as is: route
    /// guards already block views for unresolved identities.
    pub fn apply(&self, tree: Option<&NavTree>, identity: Option<&Identity>) -> Option<NavTree> {
        let tree = tree?;
        Some(self.filter(tree, identity))
    }

    /// Filter `tree` for `identity`.
    pub fn filter(&self, tree: &NavTree, identity: Option<&Identity>) -> NavTree {
        let Some(identity) = identity else {
            return tree.clone();
        };

        if identity.role.is_global_bypass() {
            return tree.clone();
        }

        let Some(department) = identity.department.as_ref() else {
            return self.filter_without_department(tree, identity);
        };

        let is_head = identity.role.is_head();
        let filtered = retain_items(tree, |item| {
            self.is_common_tool(item)
                || (is_head && self.is_employee_management(item))
                || self.departments.allows_path(department, &item.path)
        });

        debug!(
            identity = %identity.id,
            role = %identity.role,
            department = %department,
            kept = filtered.items().count(),
            total = tree.items().count(),
            "filtered navigation"
        );
        filtered
    }

    fn filter_without_department(&self, tree: &NavTree, identity: &Identity) -> NavTree {
        debug!(
            identity = %identity.id,
            role = %identity.role,
            policy = ?self.missing_department,
            "identity has no department"
        );
        match self.missing_department {
            MissingDepartmentPolicy::Unfiltered => tree.clone(),
            MissingDepartmentPolicy::CommonToolsOnly => {
                retain_items(tree, |item| self.is_common_tool(item))
            }
            MissingDepartmentPolicy::Hidden => NavTree::default(),
        }
    }

    fn is_common_tool(&self, item: &NavItem) -> bool {
        self.common_tool_fragments
            .iter()
            .any(|fragment| item.path.contains(fragment.as_str()))
    }

    fn is_employee_management(&self, item: &NavItem) -> bool {
        !self.employee_management_fragment.is_empty()
            && item.path.contains(self.employee_management_fragment.as_str())
    }
}

impl Default for NavigationFilter {
    fn default() -> Self {
        Self::from_policy(&AccessPolicy::default())
    }
}

fn retain_items(tree: &NavTree, keep: impl Fn(&NavItem) -> bool) -> NavTree {
    let sections = tree
        .sections
        .iter()
        .filter_map(|section| {
            let items: Vec<NavItem> = section
                .items
                .iter()
                .filter(|item| keep(item))
                .cloned()
                .collect();
            (!items.is_empty()).then(|| NavSection {
                label: section.label.clone(),
                items,
            })
        })
        .collect();
    NavTree::new(sections)
}
