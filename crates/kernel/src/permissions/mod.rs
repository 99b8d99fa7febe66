//! Permission registry: protected areas and department allow-lists.
//!
//! All authorization rules live here instead of at the call sites:
//! - area key -> predicate, used by the access guard
//! - department -> path fragments, used by the navigation filter
//!
//! Lookups are total. Unknown areas resolve to a deny-all predicate and
//! unknown departments to an empty allow-set.

mod departments;
mod policy;
mod predicate;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use departments::DepartmentAllowTable;
pub use policy::{AccessPolicy, AreaDefinition, AreaRule, MissingDepartmentPolicy};
pub use predicate::{
    DenyAll, DepartmentAccess, EmployeeManagement, OwnProfile, PermissionContext,
    PermissionPredicate, PredicateRef,
};

use crate::error::PredicateError;
use crate::models::{Department, Identity};
use crate::router::RouteParams;

/// Registry of protected areas.
pub struct PermissionRegistry {
    areas: BTreeMap<String, PredicateRef>,
    departments: DepartmentAllowTable,
    deny_all: Arc<dyn PermissionPredicate>,
}

impl PermissionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            areas: BTreeMap::new(),
            departments: DepartmentAllowTable::new(),
            deny_all: Arc::new(DenyAll),
        }
    }

    /// Build the registry described by a policy.
    pub fn from_policy(policy: &AccessPolicy) -> Self {
        let mut registry = Self::new();

        for area in &policy.areas {
            let predicate: Arc<dyn PermissionPredicate> = match &area.rule {
                AreaRule::Department { department } => {
                    Arc::new(DepartmentAccess::new(department.clone()))
                }
                AreaRule::EmployeeManagement => Arc::new(EmployeeManagement),
                AreaRule::OwnProfile { param } => Arc::new(OwnProfile::new(param.clone())),
            };
            registry.register(area.key.clone(), predicate);
        }

        registry.departments = DepartmentAllowTable::from_policy(policy);

        debug!(
            areas = registry.areas.len(),
            departments = policy.departments.len(),
            "built permission registry"
        );
        registry
    }

    /// Register (or replace) the predicate for an area.
    pub fn register(&mut self, key: impl Into<String>, predicate: Arc<dyn PermissionPredicate>) {
        let key = key.into();
        let entry = PredicateRef::new(key.as_str(), predicate);
        self.areas.insert(key, entry);
    }

    /// Replace the department allow table.
    pub fn with_departments(mut self, departments: DepartmentAllowTable) -> Self {
        self.departments = departments;
        self
    }

    /// Registered area keys, sorted.
    pub fn areas(&self) -> impl Iterator<Item = &str> {
        self.areas.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.areas.contains_key(key)
    }

    /// Predicate for an area. Unknown keys get the shared deny-all predicate.
    pub fn predicate(&self, key: &str) -> PredicateRef {
        match self.areas.get(key) {
            Some(entry) => entry.clone(),
            None => {
                debug!(area = %key, "unknown protected area, denying");
                PredicateRef::new(key, Arc::clone(&self.deny_all))
            }
        }
    }

    /// Evaluate an area's predicate directly.
    pub fn check(
        &self,
        key: &str,
        identity: &Identity,
        route_params: &RouteParams,
    ) -> Result<bool, PredicateError> {
        self.predicate(key).evaluate(identity, route_params)
    }

    pub fn departments(&self) -> &DepartmentAllowTable {
        &self.departments
    }

    /// Allow-set of a department; empty when the department is unknown.
    pub fn department_tokens(
        &self,
        department: &Department,
    ) -> &std::collections::BTreeSet<String> {
        self.departments.tokens(department)
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::from_policy(&AccessPolicy::default())
    }
}

impl fmt::Debug for PermissionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionRegistry")
            .field("areas", &self.areas.keys().collect::<Vec<_>>())
            .field("departments", &self.departments)
            .finish()
    }
}
