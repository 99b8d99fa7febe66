//! Department allow-lists for navigation filtering.

use std::collections::{BTreeMap, BTreeSet};

use super::AccessPolicy;
use crate::models::Department;

static NO_TOKENS: BTreeSet<String> = BTreeSet::new();

/// Maps each department to the path fragments its members may see.
///
/// Departments missing from the table have an empty allow-set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentAllowTable {
    tokens: BTreeMap<Department, BTreeSet<String>>,
}

impl DepartmentAllowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from a policy's `departments` section.
    pub fn from_policy(policy: &AccessPolicy) -> Self {
        policy
            .departments
            .iter()
            .fold(Self::new(), |table, (department, tokens)| {
                table.allow(department.clone(), tokens.iter().cloned())
            })
    }

    /// Add tokens for a department, merging with any already present.
    pub fn allow<I, S>(mut self, department: Department, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.tokens.entry(department).or_default();
        for token in tokens {
            let token = token.into();
            if !token.is_empty() {
                entry.insert(token);
            }
        }
        self
    }

    /// Allow-set for a department.
    pub fn tokens(&self, department: &Department) -> &BTreeSet<String> {
        self.tokens.get(department).unwrap_or(&NO_TOKENS)
    }

    /// Whether `path` falls inside one of the department's areas.
    pub fn allows_path(&self, department: &Department, path: &str) -> bool {
        self.tokens(department)
            .iter()
            .any(|token| path.contains(token.as_str()))
    }

    /// Departments with an entry, in sorted order.
    pub fn departments(&self) -> impl Iterator<Item = &Department> {
        self.tokens.keys()
    }
}
