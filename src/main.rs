//! Floww CLI
//!
//! Switch workspaces and launch applications from declarative workflows.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use floww::workflow::{self, RunOptions, Workflow, WorkflowRunner, WorkflowStore};
use floww::workspace::{create_backend, BackendKind};
use floww::{signals, ConfigDir, DesktopNotifier, FileFormat, ProcessLauncher};

#[derive(Parser)]
#[command(name = "floww")]
#[command(author, version, about = "Declarative workspace setup")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration directory (default: $XDG_CONFIG_HOME/floww)
    #[arg(long, global = true, env = "FLOWW_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the config directory
    Init {
        /// Also write an example workflow
        #[arg(long)]
        example: bool,

        /// Format of the example workflow (yaml, json, toml)
        #[arg(long, default_value = "yaml")]
        format: FileFormat,
    },

    /// List available workflows
    List,

    /// Validate a workflow without running it
    Validate {
        /// Workflow name
        name: Option<String>,

        /// Path to a workflow file
        #[arg(long, short, conflicts_with = "name")]
        file: Option<PathBuf>,
    },

    /// Apply a workflow
    Apply {
        /// Workflow name
        name: Option<String>,

        /// Path to a workflow file
        #[arg(long, short, conflicts_with = "name")]
        file: Option<PathBuf>,

        /// Start from the last declared workspace
        #[arg(long, short)]
        append: bool,

        /// Workspace switching backend (auto, ewmh, wmctrl)
        #[arg(long, default_value = "auto")]
        backend: BackendKind,

        /// Skip the completion notification
        #[arg(long)]
        no_notify: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a workflow
    Remove {
        /// Workflow name
        name: String,

        /// Actually delete the files
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let dir = ConfigDir::resolve(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Init { example, format } => {
            dir.init()
                .with_context(|| format!("initializing {}", dir.root().display()))?;
            info!("Initialized {}", dir.root().display());

            if example {
                let store = WorkflowStore::new(dir.workflows_dir());
                match store.write_example(format)? {
                    Some(path) => info!("Created example workflow at {}", path.display()),
                    None => info!("Example workflow already exists"),
                }
            }
        }

        Commands::List => {
            dir.ensure_initialized()?;
            let names = WorkflowStore::new(dir.workflows_dir()).list()?;
            if names.is_empty() {
                println!("No workflows found");
            } else {
                println!("Available workflows:");
                for name in names {
                    println!("  - {}", name);
                }
            }
        }

        Commands::Validate { name, file } => {
            let (label, _workflow) = load_workflow(&dir, name.as_deref(), file.as_deref())?;
            println!("✓ Workflow '{}' is valid", label);
        }

        Commands::Apply {
            name,
            file,
            append,
            backend,
            no_notify,
            json,
        } => {
            dir.ensure_initialized()?;
            let (label, workflow) = load_workflow(&dir, name.as_deref(), file.as_deref())?;
            let mut timing = dir.load_settings().timing_config();
            if no_notify {
                timing.show_notifications = false;
            }

            let token = CancellationToken::new();
            signals::install_interrupt_handler(token.clone())?;

            info!("Applying workflow: {}", label);
            let runner = WorkflowRunner::new(create_backend(backend), Box::new(ProcessLauncher::new()))
                .with_notifier(Box::new(DesktopNotifier::default()))
                .with_cancellation(token);
            let report = runner
                .apply(&workflow, &timing, RunOptions { append })
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\n{}", report.summary());
            }

            let code = report.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::Remove { name, force } => {
            dir.ensure_initialized()?;
            let store = WorkflowStore::new(dir.workflows_dir());

            if !force {
                let path = store.find(&name)?;
                eprintln!(
                    "This would delete {}. Use --force to remove it.",
                    path.display()
                );
                return Ok(());
            }

            for path in store.remove(&name)? {
                println!("Removed {}", path.display());
            }
        }
    }

    Ok(())
}

/// Load a workflow by name or from a file, returning a display label
fn load_workflow(
    dir: &ConfigDir,
    name: Option<&str>,
    file: Option<&Path>,
) -> anyhow::Result<(String, Workflow)> {
    if let Some(path) = file {
        let workflow = workflow::load_file(path)
            .with_context(|| format!("Failed to load workflow '{}'", path.display()))?;
        return Ok((path.display().to_string(), workflow));
    }

    let Some(name) = name else {
        bail!("No workflow given. Pass a workflow name or --file <PATH>.");
    };

    dir.ensure_initialized()?;
    let workflow = WorkflowStore::new(dir.workflows_dir())
        .load(name)
        .with_context(|| format!("Failed to load workflow '{}'", name))?;
    Ok((name.to_string(), workflow))
}
