//! CLI command implementations.
//!
//! These commands load configuration and policy only; nothing is rendered
//! and no identity is fetched. Identities are described on the command line.

use std::cell::RefCell;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::config::Config;
use crate::guard::{AccessGuard, GuardInputs, GuardState};
use crate::models::{AuthState, Department, Identity, Role};
use crate::navigation::NavigationFilter;
use crate::permissions::PermissionRegistry;
use crate::router::{NavigateOptions, RouteParams, Router};

/// Identity described by command-line flags.
#[derive(Debug, Clone, Default)]
pub struct IdentityArgs {
    pub id: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

impl IdentityArgs {
    /// Resolve into an auth state. No role means anonymous.
    pub fn auth_state(&self) -> AuthState {
        match self.identity() {
            Some(identity) => AuthState::authenticated(identity),
            None => AuthState::anonymous(),
        }
    }

    fn identity(&self) -> Option<Identity> {
        let role = Role::from(self.role.as_deref()?);
        let id = self.id.clone().unwrap_or_else(|| "cli".to_string());
        let mut identity = Identity::new(id, role);
        identity.department = self.department.as_deref().map(Department::from);
        Some(identity)
    }
}

/// Router that remembers the redirect instead of performing it.
#[derive(Debug, Default)]
struct CliRouter {
    params: RouteParams,
    redirect: RefCell<Option<(String, NavigateOptions)>>,
}

impl Router for CliRouter {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        debug!(path = %path, replace = options.replace, "redirect requested");
        *self.redirect.borrow_mut() = Some((path.to_string(), options));
    }

    fn route_params(&self) -> RouteParams {
        self.params.clone()
    }
}

/// List protected areas and their rules.
pub fn cmd_areas(config: &Config) -> Result<()> {
    let policy = config.load_policy().context("failed to load access policy")?;
    let registry = PermissionRegistry::from_policy(&policy);

    if registry.is_empty() {
        println!("No protected areas configured.");
        return Ok(());
    }

    println!("{:<16} {}", "AREA", "ALLOWED");
    println!("{}", "-".repeat(60));
    for area in registry.areas() {
        println!("{:<16} {}", area, registry.predicate(area).describe());
    }

    println!();
    println!("{:<16} {}", "DEPARTMENT", "NAVIGATION TOKENS");
    println!("{}", "-".repeat(60));
    for department in registry.departments().departments() {
        let tokens: Vec<&str> = registry
            .department_tokens(department)
            .iter()
            .map(|t| t.as_str())
            .collect();
        println!("{:<16} {}", department, tokens.join(", "));
    }

    Ok(())
}

/// Print the navigation tree filtered for an identity, as JSON.
pub fn cmd_nav(config: &Config, who: &IdentityArgs) -> Result<()> {
    let policy = config.load_policy().context("failed to load access policy")?;
    let tree = config
        .load_navigation()
        .context("failed to load navigation tree")?;
    let registry = PermissionRegistry::from_policy(&policy);
    let filter = NavigationFilter::from_registry(&registry, &policy);

    let auth = who.auth_state();
    let filtered = filter.filter(&tree, auth.resolved_identity());
    let json = serde_json::to_string_pretty(&filtered).context("failed to serialize tree")?;
    println!("{json}");
    Ok(())
}

/// Where the route being checked lives.
#[derive(Debug, Clone, Default)]
pub struct RouteArgs {
    /// Route pattern, e.g. "/dashboard/user/:id".
    pub pattern: Option<String>,
    /// Concrete path matched against the pattern.
    pub path: Option<String>,
}

impl RouteArgs {
    fn params(&self) -> Result<RouteParams> {
        match (&self.pattern, &self.path) {
            (None, None) => Ok(RouteParams::new()),
            (Some(pattern), Some(path)) => RouteParams::match_pattern(pattern, path)
                .with_context(|| format!("path '{path}' does not match route '{pattern}'")),
            _ => bail!("--route and --path must be given together"),
        }
    }
}

/// Outcome of a one-shot guard run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Whether the area has a registered predicate.
    pub registered: bool,
    pub state: GuardState,
    /// Navigation the guard requested, if any.
    pub redirect: Option<(String, NavigateOptions)>,
}

/// Run the guard once for an area.
pub fn run_check(
    config: &Config,
    area: &str,
    who: &IdentityArgs,
    route: &RouteArgs,
    deny_path: Option<&str>,
) -> Result<CheckReport> {
    let policy = config.load_policy().context("failed to load access policy")?;
    let registry = PermissionRegistry::from_policy(&policy);
    let registered = registry.contains(area);
    if !registered {
        warn!(area = %area, "area is not registered; it denies everyone");
    }

    let router = CliRouter {
        params: route.params()?,
        redirect: RefCell::new(None),
    };
    let mut guard = AccessGuard::new(config.guard_config(), router);

    let mut inputs = GuardInputs::new(
        who.auth_state(),
        guard.router().route_params(),
        registry.predicate(area),
    );
    inputs.deny_path = deny_path.map(str::to_string);
    guard.observe(inputs);

    Ok(CheckReport {
        registered,
        state: guard.state().clone(),
        redirect: guard.router().redirect.borrow().clone(),
    })
}

/// Run the guard once for an area and print the decision.
pub fn cmd_check(
    config: &Config,
    area: &str,
    who: &IdentityArgs,
    route: &RouteArgs,
    deny_path: Option<&str>,
) -> Result<()> {
    let report = run_check(config, area, who, route, deny_path)?;

    println!("area:     {area}");
    println!("mode:     {}", config.authorization_mode);
    match &report.state {
        GuardState::Granted => println!("decision: granted"),
        GuardState::Denied { .. } => {
            println!("decision: denied");
            if let Some((path, options)) = &report.redirect {
                let mode = if options.replace { "replace" } else { "push" };
                println!("redirect: {path} ({mode})");
            }
        }
        other => println!("decision: {other:?}"),
    }
    Ok(())
}
