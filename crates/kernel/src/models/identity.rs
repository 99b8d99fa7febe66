//! Identity, role and department models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Console role.
///
/// Known roles parse case-insensitively; anything else is kept verbatim in
/// [`Role::Other`] so new roles can be introduced without a release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Owner,
    Admin,
    Head,
    Manager,
    Employee,
    Other(String),
}

impl Role {
    /// Roles that pass every predicate and see the whole navigation tree.
    pub fn is_global_bypass(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    /// Department head.
    pub fn is_head(&self) -> bool {
        matches!(self, Role::Head)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Head => "head",
            Role::Manager => "manager",
            Role::Employee => "employee",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "owner" => Role::Owner,
            "admin" => Role::Admin,
            "head" => Role::Head,
            "manager" => Role::Manager,
            "employee" => Role::Employee,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business department an identity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Department {
    Sales,
    Accounting,
    Logistics,
    Manufacture,
    Other(String),
}

impl Department {
    pub fn as_str(&self) -> &str {
        match self {
            Department::Sales => "sales",
            Department::Accounting => "accounting",
            Department::Logistics => "logistics",
            Department::Manufacture => "manufacture",
            Department::Other(name) => name,
        }
    }
}

impl From<String> for Department {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "sales" => Department::Sales,
            "accounting" => Department::Accounting,
            "logistics" => Department::Logistics,
            "manufacture" => Department::Manufacture,
            _ => Department::Other(value),
        }
    }
}

impl From<&str> for Department {
    fn from(value: &str) -> Self {
        Department::from(value.to_string())
    }
}

impl From<Department> for String {
    fn from(department: Department) -> Self {
        department.as_str().to_string()
    }
}

impl FromStr for Department {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Department::from(s))
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved principal as handed over by the identity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    /// Create an identity without a department.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            department: None,
            name: None,
        }
    }

    /// Set the department.
    pub fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    /// Whether this identity belongs to `department`.
    pub fn in_department(&self, department: &Department) -> bool {
        self.department.as_ref() == Some(department)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_names_case_insensitively() {
        assert_eq!(Role::from("OWNER"), Role::Owner);
        assert_eq!(Role::from("Head"), Role::Head);
        assert_eq!(Role::from("intern"), Role::Other("intern".to_string()));
    }

    #[test]
    fn department_round_trips_through_json() {
        let json = serde_json::to_string(&Department::Logistics).unwrap();
        assert_eq!(json, "\"logistics\"");
        let back: Department = serde_json::from_str("\"research\"").unwrap();
        assert_eq!(back, Department::Other("research".to_string()));
    }

    #[test]
    fn identity_without_department_deserializes() {
        let identity: Identity = serde_json::from_str(r#"{"id": "u1", "role": "manager"}"#).unwrap();
        assert_eq!(identity.role, Role::Manager);
        assert!(identity.department.is_none());
    }

    #[test]
    fn bypass_roles() {
        assert!(Role::Owner.is_global_bypass());
        assert!(Role::Admin.is_global_bypass());
        assert!(!Role::Head.is_global_bypass());
        assert!(!Role::Other("admin-ish".into()).is_global_bypass());
    }
}
