//! Permission predicates.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::PredicateError;
use crate::models::{Department, Identity};
use crate::router::RouteParams;

/// Input handed to a predicate.
#[derive(Debug, Clone, Copy)]
pub struct PermissionContext<'a> {
    /// Key of the protected area being checked.
    pub area: &'a str,
    pub identity: &'a Identity,
    pub route_params: &'a RouteParams,
}

/// Decides whether an identity may enter a protected area.
///
/// Implementations must be side-effect free.
pub trait PermissionPredicate: Send + Sync {
    fn evaluate(&self, ctx: &PermissionContext<'_>) -> Result<bool, PredicateError>;

    /// One-line summary for `backoffice areas`.
    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

impl<F> PermissionPredicate for F
where
    F: Fn(&PermissionContext<'_>) -> Result<bool, PredicateError> + Send + Sync,
{
    fn evaluate(&self, ctx: &PermissionContext<'_>) -> Result<bool, PredicateError> {
        self(ctx)
    }
}

/// Members of a department, plus owners and admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentAccess {
    pub department: Department,
}

impl DepartmentAccess {
    pub fn new(department: Department) -> Self {
        Self { department }
    }
}

impl PermissionPredicate for DepartmentAccess {
    fn evaluate(&self, ctx: &PermissionContext<'_>) -> Result<bool, PredicateError> {
        let identity = ctx.identity;
        if identity.role.is_global_bypass() {
            return Ok(true);
        }
        // Heads and rank-and-file members both qualify through their department.
        Ok(identity.in_department(&self.department))
    }

    fn describe(&self) -> String {
        format!("members of department '{}'", self.department)
    }
}

/// Department heads of any department, plus owners and admins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeManagement;

impl PermissionPredicate for EmployeeManagement {
    fn evaluate(&self, ctx: &PermissionContext<'_>) -> Result<bool, PredicateError> {
        let role = &ctx.identity.role;
        Ok(role.is_global_bypass() || (role.is_head() && ctx.identity.department.is_some()))
    }

    fn describe(&self) -> String {
        "department heads".to_string()
    }
}

/// The identity named by a route parameter, plus owners and admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnProfile {
    /// Route parameter holding the profile's identity id.
    pub param: String,
}

impl OwnProfile {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl PermissionPredicate for OwnProfile {
    fn evaluate(&self, ctx: &PermissionContext<'_>) -> Result<bool, PredicateError> {
        if ctx.identity.role.is_global_bypass() {
            return Ok(true);
        }
        let Some(target) = ctx.route_params.get(&self.param) else {
            return Err(PredicateError::MissingRouteParam {
                area: ctx.area.to_string(),
                param: self.param.clone(),
            });
        };
        Ok(target == ctx.identity.id)
    }

    fn describe(&self) -> String {
        format!("own profile (route parameter ':{}')", self.param)
    }
}

/// Rejects everyone. Stands in for unknown areas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DenyAll;

impl PermissionPredicate for DenyAll {
    fn evaluate(&self, _ctx: &PermissionContext<'_>) -> Result<bool, PredicateError> {
        Ok(false)
    }

    fn describe(&self) -> String {
        "nobody".to_string()
    }
}

/// A predicate together with the area key it was registered under.
///
/// Two references are equal only when they point at the same predicate
/// instance, so re-registering an area counts as a change for the guard.
#[derive(Clone)]
pub struct PredicateRef {
    key: Arc<str>,
    predicate: Arc<dyn PermissionPredicate>,
}

impl PredicateRef {
    pub fn new(key: impl Into<Arc<str>>, predicate: Arc<dyn PermissionPredicate>) -> Self {
        Self {
            key: key.into(),
            predicate,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn describe(&self) -> String {
        self.predicate.describe()
    }

    /// Run the predicate, converting a panic into [`PredicateError::Panicked`].
    pub fn evaluate(
        &self,
        identity: &Identity,
        route_params: &RouteParams,
    ) -> Result<bool, PredicateError> {
        let ctx = PermissionContext {
            area: &self.key,
            identity,
            route_params,
        };
        match catch_unwind(AssertUnwindSafe(|| self.predicate.evaluate(&ctx))) {
            Ok(result) => result,
            Err(payload) => Err(PredicateError::Panicked {
                area: self.key.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl PartialEq for PredicateRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && std::ptr::addr_eq(Arc::as_ptr(&self.predicate), Arc::as_ptr(&other.predicate))
    }
}

impl Eq for PredicateRef {}

impl fmt::Debug for PredicateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRef")
            .field("key", &self.key)
            .field("predicate", &self.predicate.describe())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
