//! `fleet status`, `fleet fetch`, `fleet ff`: per-branch sync visibility.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use fleet_core::types::ProjectPath;
use fleet_sync::{
    pipeline::{self, Scope, WorkspaceStatus},
    BranchReport, Mode, RepositoryReport, SyncState, SystemGit, WorkingTreeState,
};

use super::Workspace;

/// Arguments shared by the status-type commands.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Limit the run to these projects (and projects registered below them).
    pub paths: Vec<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Repositories to reconcile in parallel.
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,
}

impl StatusArgs {
    pub fn run(self, mode: Mode) -> Result<ExitCode> {
        let ws = Workspace::open()?;
        let scope = if self.paths.is_empty() {
            Scope::All
        } else {
            Scope::Only(
                self.paths
                    .iter()
                    .map(|p| ProjectPath::from(p.trim_end_matches('/')))
                    .collect(),
            )
        };
        let paths = scope.select(&ws.registry, &ws.ignore);

        let status = pipeline::run(
            &SystemGit::new(),
            &ws.root,
            &paths,
            mode,
            ws.jobs(self.jobs),
        )
        .context("failed to start worker pool")?;

        if self.json {
            print_json(mode, &status)?;
        } else {
            for report in &status.reports {
                print_report(report);
            }
        }
        Ok(ExitCode::from(status.verdict.exit_code()))
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    mode: Mode,
    up_to_date: bool,
    repositories: &'a [RepositoryReport],
}

fn print_json(mode: Mode, status: &WorkspaceStatus) -> Result<()> {
    let payload = StatusJson {
        mode,
        up_to_date: status.verdict.up_to_date,
        repositories: &status.reports,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Human output
// ---------------------------------------------------------------------------

fn print_report(report: &RepositoryReport) {
    let path = report.path.as_str();
    if !report.exists {
        println!("{}: {}", path.bold(), "Missing repository".red());
        return;
    }
    if report.empty && report.error.is_none() {
        println!("{}: {}", path.bold(), "Empty repository".bright_black());
        return;
    }

    let fetched = match report.fetched {
        Some(true) => format!(" {}", "(fetched updates)".bright_black()),
        _ => String::new(),
    };
    println!("{}:{fetched}", path.bold());
    // A failed fetch still leaves the branches classified.
    if let Some(err) = &report.error {
        println!("    {}", err.to_string().red());
    }

    for branch in &report.branches {
        if let Some(line) = branch_line(branch) {
            println!("{line}");
        }
    }
}

/// One indented line per branch; `None` for branches with nothing to say.
fn branch_line(branch: &BranchReport) -> Option<String> {
    let label = branch_label(branch)?;
    let marker = if branch.is_current { "*" } else { " " };
    let suffix = if branch.fast_forwarded {
        format!(" {}", "(fast-forwarded)".cyan())
    } else {
        String::new()
    };
    Some(format!("  {marker} {}: {label}{suffix}", branch.name))
}

fn branch_label(branch: &BranchReport) -> Option<String> {
    if let Some(err) = &branch.error {
        return Some(err.to_string().red().to_string());
    }
    match (branch.working_tree, branch.sync) {
        (Some(tree), _) if !tree.is_clean() => Some(tree_label(tree)),
        (_, Some(SyncState::InSync)) if branch.is_current => {
            Some(tree_label(WorkingTreeState::Clean))
        }
        (_, Some(sync)) => sync_label(sync),
        (Some(tree), None) => Some(tree_label(tree)),
        (None, None) => None,
    }
}

fn tree_label(state: WorkingTreeState) -> String {
    match state {
        WorkingTreeState::Clean => state.to_string().green().to_string(),
        _ => state.to_string().yellow().to_string(),
    }
}

fn sync_label(state: SyncState) -> Option<String> {
    match state {
        SyncState::InSync => Some(state.to_string().green().to_string()),
        SyncState::OutOfSync => Some(state.to_string().yellow().to_string()),
        SyncState::NoRemote => Some(state.to_string().magenta().to_string()),
        SyncState::Unknown => None,
    }
}
