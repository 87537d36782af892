//! Roledit - role editing from the command line
//!
//! Usage:
//!   roledit list                               # List stored roles
//!   roledit show <id>                          # Print one role
//!   roledit modules                            # List the permission taxonomy
//!   roledit duplicate <target> --from <source> # Copy permissions between roles
//!   roledit replay <script.toml>               # Replay a scripted editing session

mod interactive;
mod replay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roledit_core::config::to_toml;
use roledit_core::context::AppContext;
use roledit_core::role::ModuleInfo;
use roledit_core::session::{Notifier, RecordingNotifier, RoleCatalog};
use roledit_core::store::RoleStore;
use roledit_core::types::RoleId;

use crate::interactive::DuplicatePrompt;
use crate::replay::{Replay, StepReport};

#[derive(Parser)]
#[command(name = "roledit")]
#[command(about = "Role editing with dirty-state tracking", long_about = None)]
struct Cli {
    /// Path to roles.toml (overrides settings)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored roles
    #[command(alias = "ls")]
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print one role
    Show {
        /// Role id
        id: String,
        /// Output format (table prints TOML)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List modules, submodules and their permission keys
    Modules {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Copy the permissions of one role into another
    Duplicate {
        /// Role receiving the permissions
        target: String,
        /// Role to copy from
        #[arg(long)]
        from: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Replay a scripted editing session and report each step
    Replay {
        /// Path to the script
        script: PathBuf,
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

/// Prints notifications as they arrive.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roledit=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut ctx = AppContext::with_defaults()?;
    if let Some(path) = cli.store {
        ctx = ctx.with_store_path(path);
    }

    match cli.command {
        Commands::List { format } => run_list(&ctx, format),
        Commands::Show { id, format } => run_show(&ctx, &RoleId::new(id), format),
        Commands::Modules { format } => run_modules(&ctx, format),
        Commands::Duplicate { target, from, yes } => {
            run_duplicate(&ctx, &RoleId::new(target), &RoleId::new(from), yes)
        }
        Commands::Replay { script, format } => run_replay(&ctx, &script, format),
    }
}

fn open_store(ctx: &AppContext) -> Result<RoleStore> {
    let settings = ctx.settings()?;
    let store = ctx.role_store(&settings);
    tracing::debug!(path = %store.path().display(), "using role store");
    Ok(store)
}

fn run_list(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let store = open_store(ctx)?;
    let roles = store.roles()?;

    match format {
        OutputFormat::Table => {
            if roles.is_empty() {
                println!("No roles in {}", store.path().display());
                return Ok(());
            }
            println!("{:<24} {:<24} DESCRIPTION", "ID", "NAME");
            for role in &roles {
                println!(
                    "{:<24} {:<24} {}",
                    role.id.as_str(),
                    role.name,
                    role.description
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&roles)?);
        }
    }
    Ok(())
}

fn run_show(ctx: &AppContext, id: &RoleId, format: OutputFormat) -> Result<()> {
    let store = open_store(ctx)?;
    let role = store
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Role '{}' not found", id))?;

    match format {
        OutputFormat::Table => print!("{}", to_toml(&role)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&role)?),
    }
    Ok(())
}

fn run_modules(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let store = open_store(ctx)?;
    let modules = store.modules()?;

    match format {
        OutputFormat::Table => {
            if modules.is_empty() {
                println!("No modules in {}", store.path().display());
                return Ok(());
            }
            for line in module_lines(&modules) {
                println!("{line}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&modules)?),
    }
    Ok(())
}

/// One header line per module, then one indented line per permission key.
fn module_lines(modules: &[ModuleInfo]) -> Vec<String> {
    let mut lines = Vec::new();
    for module in modules {
        lines.push(format!(
            "{} ({} submodule(s))",
            module.name,
            module.submodules.len()
        ));
        lines.extend(module.permission_keys().into_iter().map(|key| format!("  {key}")));
    }
    lines
}

fn run_duplicate(ctx: &AppContext, target: &RoleId, source: &RoleId, yes: bool) -> Result<()> {
    let store = open_store(ctx)?;
    let merge = store
        .duplicate_request(source)?
        .ok_or_else(|| anyhow::anyhow!("Role '{}' not found", source))?;

    let mut session = ctx.open_session(Some(target), Box::new(ConsoleNotifier))?;
    let request = session.request_duplicate(merge.clone());

    let confirmed = DuplicatePrompt::new(yes).ask(session.draft(), source, &merge, &request)?;
    if !confirmed {
        session.decline();
        println!("Duplicate cancelled.");
        return Ok(());
    }

    session.confirm();
    session
        .submit(&store)
        .with_context(|| format!("Failed to save role '{}'", target))?;
    Ok(())
}

fn run_replay(ctx: &AppContext, script: &std::path::Path, format: OutputFormat) -> Result<()> {
    let script = replay::load_script(script)?;
    let store = open_store(ctx)?;
    let notifier = RecordingNotifier::new();
    let session = ctx.open_session(script.role.as_ref(), Box::new(notifier.clone()))?;

    let mut replay = Replay::new(session, &store, notifier);
    let reports = replay.run(&script.steps)?;

    match format {
        OutputFormat::Table => print_reports(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

fn print_reports(reports: &[StepReport]) {
    for report in reports {
        let dirty = if report.dirty {
            style("dirty").yellow()
        } else {
            style("clean").green()
        };
        println!(
            "{:>3}  {:<12} {:<6} {:?}  {}",
            report.index, report.action, dirty, report.state, report.outcome
        );
        for message in &report.notifications {
            println!("     {} {}", style("↳").dim(), message);
        }
    }
}
