//! Fleet: keep many git repositories under one root in sync.
//!
//! # Usage
//!
//! ```text
//! fleet init
//! fleet update
//! fleet clone <path>...
//! fleet status [<path>...] [--json] [--jobs N]
//! fleet fetch  [<path>...] [--json] [--jobs N]
//! fleet ff     [<path>...] [--json] [--jobs N]
//! fleet check [--json]
//! fleet version
//! ```

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{
    check::CheckArgs, clone::CloneArgs, init::InitArgs, status::StatusArgs, update::UpdateArgs,
};
use fleet_sync::Mode;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "fleet",
    version,
    about = "Reconcile a workspace of git repositories against its project list",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the project list from the repositories found below the current directory.
    Init(InitArgs),

    /// Clone every declared repository that is missing on disk.
    Update(UpdateArgs),

    /// Clone selected declared repositories.
    Clone(CloneArgs),

    /// Show working-tree and sync state of every repository.
    Status(StatusArgs),

    /// Fetch from origin, then show status.
    Fetch(StatusArgs),

    /// Fast-forward every branch from origin, then show status.
    Ff(StatusArgs),

    /// Classify repositories on disk and in the project list.
    Check(CheckArgs),

    /// Print the version.
    Version,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Init(args) => args.run(),
        Commands::Update(args) => args.run(),
        Commands::Clone(args) => args.run(),
        Commands::Status(args) => args.run(Mode::Status),
        Commands::Fetch(args) => args.run(Mode::Fetch),
        Commands::Ff(args) => args.run(Mode::FastForward),
        Commands::Check(args) => args.run(),
        Commands::Version => {
            println!("fleet {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log to stderr; level from `FLEET_LOG`, `warn` by default.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("FLEET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
