//! Backoffice access control CLI.
//!
//! Inspect the access policy, preview the navigation an identity would see,
//! and dry-run the route guard for a protected area.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use backoffice_kernel::Config;
use backoffice_kernel::cli::{self, IdentityArgs, RouteArgs};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List protected areas and department navigation tokens.
    Areas,

    /// Print the navigation tree visible to an identity, as JSON.
    Nav {
        #[command(flatten)]
        who: Who,

        /// Navigation YAML file (overrides NAVIGATION_FILE).
        #[arg(long)]
        nav: Option<std::path::PathBuf>,
    },

    /// Run the route guard once for a protected area.
    Check {
        /// Protected area key, e.g. "sales".
        #[arg(long)]
        area: String,

        #[command(flatten)]
        who: Who,

        /// Route pattern, e.g. "/dashboard/user/:id".
        #[arg(long, requires = "path")]
        route: Option<String>,

        /// Concrete path matched against --route.
        #[arg(long, requires = "route")]
        path: Option<String>,

        /// Explicit deny redirect for this check.
        #[arg(long)]
        deny_path: Option<String>,
    },
}

/// Identity flags. Omitting --role checks as an anonymous visitor.
#[derive(Args, Debug)]
struct Who {
    /// Identity id.
    #[arg(long)]
    id: Option<String>,

    /// Role: owner, admin, head, manager, employee, ...
    #[arg(long)]
    role: Option<String>,

    /// Department: sales, accounting, logistics, manufacture, ...
    #[arg(long)]
    department: Option<String>,
}

impl From<Who> for IdentityArgs {
    fn from(who: Who) -> Self {
        IdentityArgs {
            id: who.id,
            role: who.role,
            department: who.department,
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Cli::parse();
    let mut config = Config::from_env().context("failed to load configuration")?;
    info!(mode = %config.authorization_mode, "configuration loaded");

    match args.command {
        Command::Areas => cli::cmd_areas(&config),
        Command::Nav { who, nav } => {
            if nav.is_some() {
                config.navigation_file = nav;
            }
            cli::cmd_nav(&config, &who.into())
        }
        Command::Check {
            area,
            who,
            route,
            path,
            deny_path,
        } => {
            let route = RouteArgs {
                pattern: route,
                path,
            };
            cli::cmd_check(&config, &area, &who.into(), &route, deny_path.as_deref())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
