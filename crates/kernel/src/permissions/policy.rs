//! Declarative access policy.
//!
//! The policy is plain data: which areas exist and how each is decided,
//! which path fragments each department sees, and the navigation filter
//! knobs. It can be loaded from YAML (`ACCESS_POLICY_FILE`); otherwise
//! [`AccessPolicy::default`] is used.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Department;

/// What the navigation filter does for a non-bypass identity without a
/// department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDepartmentPolicy {
    /// Return the tree unchanged. Route guards still protect every view.
    #[default]
    Unfiltered,
    /// Keep only common tools.
    CommonToolsOnly,
    /// Hide everything.
    Hidden,
}

/// How a protected area decides access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AreaRule {
    /// Members of a department.
    Department { department: Department },
    /// Department heads.
    EmployeeManagement,
    /// The identity named by a route parameter.
    OwnProfile {
        #[serde(default = "default_profile_param")]
        param: String,
    },
}

fn default_profile_param() -> String {
    "id".to_string()
}

/// A protected area and its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDefinition {
    pub key: String,
    #[serde(flatten)]
    pub rule: AreaRule,
}

/// Complete access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub areas: Vec<AreaDefinition>,

    /// Department -> path fragments visible to its members.
    #[serde(default)]
    pub departments: BTreeMap<Department, Vec<String>>,

    /// Path fragments visible to everyone with a department.
    #[serde(default = "default_common_tools")]
    pub common_tool_fragments: Vec<String>,

    /// Path fragment of the employee pages department heads may see.
    #[serde(default = "default_employee_fragment")]
    pub employee_management_fragment: String,

    #[serde(default)]
    pub missing_department: MissingDepartmentPolicy,
}

fn default_common_tools() -> Vec<String> {
    ["/calendar", "/file-manager", "/kanban", "/post", "/job"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_employee_fragment() -> String {
    "/employee".to_string()
}

fn department_area(key: &str, department: Department) -> AreaDefinition {
    AreaDefinition {
        key: key.to_string(),
        rule: AreaRule::Department { department },
    }
}

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for AccessPolicy {
    fn default() -> Self {
        let areas = vec![
            department_area("sales", Department::Sales),
            department_area("accounting", Department::Accounting),
            department_area("logistics", Department::Logistics),
            department_area("manufacture", Department::Manufacture),
            AreaDefinition {
                key: "employees".to_string(),
                rule: AreaRule::EmployeeManagement,
            },
            AreaDefinition {
                key: "profile".to_string(),
                rule: AreaRule::OwnProfile {
                    param: default_profile_param(),
                },
            },
        ];

        let mut departments = BTreeMap::new();
        departments.insert(
            Department::Sales,
            tokens(&["ecommerce", "product", "order", "invoice"]),
        );
        departments.insert(
            Department::Accounting,
            tokens(&["banking", "invoice", "analytics"]),
        );
        departments.insert(Department::Logistics, tokens(&["order", "booking", "tour"]));
        departments.insert(Department::Manufacture, tokens(&["product", "course"]));

        Self {
            areas,
            departments,
            common_tool_fragments: default_common_tools(),
            employee_management_fragment: default_employee_fragment(),
            missing_department: MissingDepartmentPolicy::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn yaml_policy_with_defaults() {
        let yaml = r#"
areas:
  - key: sales
    rule: department
    department: sales
  - key: team
    rule: employee_management
  - key: me
    rule: own_profile
departments:
  sales: [ecommerce, order]
missing_department: hidden
"#;
        let policy: AccessPolicy = serde_yml::from_str(yaml).unwrap();
        assert_eq!(policy.areas.len(), 3);
        assert_eq!(
            policy.areas[0].rule,
            AreaRule::Department {
                department: Department::Sales
            }
        );
        assert_eq!(
            policy.areas[2].rule,
            AreaRule::OwnProfile {
                param: "id".to_string()
            }
        );
        assert_eq!(policy.departments[&Department::Sales], vec!["ecommerce", "order"]);
        assert_eq!(policy.missing_department, MissingDepartmentPolicy::Hidden);
        assert_eq!(policy.employee_management_fragment, "/employee");
        assert!(policy.common_tool_fragments.contains(&"/calendar".to_string()));
    }

    #[test]
    fn default_policy_covers_every_department() {
        let policy = AccessPolicy::default();
        for department in [
            Department::Sales,
            Department::Accounting,
            Department::Logistics,
            Department::Manufacture,
        ] {
            assert!(policy.departments.contains_key(&department));
            assert!(policy.areas.iter().any(|a| a.rule
                == AreaRule::Department {
                    department: department.clone()
                }));
        }
    }
}
