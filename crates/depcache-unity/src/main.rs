//! depcache CLI - asset dependency queries from the command line.
//!
//! Every command rebuilds the cache from the project tree first; nothing is
//! persisted between runs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Direction, OutputMode, Session};

/// depcache: asset dependency cache for project trees.
#[derive(Parser)]
#[command(name = "depcache")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Settings file (defaults to <root>/depcache.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the cache and print a summary
    Build,

    /// Show what an asset depends on
    Deps {
        /// Content ID or project-relative path
        target: String,

        /// Maximum number of hops (unbounded when omitted)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show what depends on an asset
    Refs {
        /// Content ID or project-relative path
        target: String,

        /// Maximum number of hops (unbounded when omitted)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Check whether one asset depends on another
    DependsOn {
        /// Dependent asset (content ID or path)
        from: String,

        /// Dependency asset (content ID or path)
        to: String,

        /// Maximum number of hops (unbounded when omitted)
        #[arg(short, long, conflicts_with = "direct")]
        depth: Option<usize>,

        /// Only follow a single edge
        #[arg(long)]
        direct: bool,
    },

    /// Print every node with its dependencies and references
    Dump,

    /// Detect circular dependencies
    Cycles,

    /// Write a default settings file to the project root
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = match cli.root {
        Some(r) => r,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let result = run(cli.command, root, cli.config, mode).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Commands,
    root: PathBuf,
    config: Option<PathBuf>,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let open = || Session::open(root.clone(), config.clone(), mode);

    match command {
        Commands::Init { force } => cli::init::run(&root, config.as_deref(), force).await,
        Commands::Build => cli::build::run(&open().await?).await,
        Commands::Deps { target, depth } => {
            cli::tree::run(&open().await?, &target, depth, Direction::Dependencies)
        }
        Commands::Refs { target, depth } => {
            cli::tree::run(&open().await?, &target, depth, Direction::References)
        }
        Commands::DependsOn {
            from,
            to,
            depth,
            direct,
        } => cli::depends_on::run(&open().await?, &from, &to, depth, direct),
        Commands::Dump => cli::dump::run(&open().await?),
        Commands::Cycles => cli::cycles::run(&open().await?),
    }
}
