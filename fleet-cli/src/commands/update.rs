//! `fleet update`: clone every declared repository missing on disk.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use fleet_core::types::ProjectPath;
use fleet_sync::{
    pipeline::Scope,
    update::{update_with, UpdateEntry, UpdateOutcome},
    SystemGit,
};

use super::Workspace;

#[derive(Args, Debug)]
pub struct UpdateArgs {}

impl UpdateArgs {
    pub fn run(self) -> Result<ExitCode> {
        let ws = Workspace::open()?;
        let paths = Scope::All.select(&ws.registry, &ws.ignore);
        clone_missing(&ws, &paths)
    }
}

/// Clone the absent projects among `paths`, printing one line per project.
/// Stops at the first clone failure.
pub(crate) fn clone_missing(ws: &Workspace, paths: &[ProjectPath]) -> Result<ExitCode> {
    if paths.is_empty() {
        println!("No projects registered.");
        return Ok(ExitCode::SUCCESS);
    }

    let entries = update_with(&SystemGit::new(), &ws.root, &ws.registry, paths, print_entry)?;
    let cloned = entries
        .iter()
        .filter(|e| matches!(e.outcome, UpdateOutcome::Cloned { .. }))
        .count();
    if cloned == 0 {
        println!("{} nothing to do", "✓".green());
    } else {
        println!("{} cloned {cloned} of {} projects", "✓".green(), entries.len());
    }
    Ok(ExitCode::SUCCESS)
}

fn print_entry(entry: &UpdateEntry) {
    match &entry.outcome {
        UpdateOutcome::AlreadyPresent => println!("  ·  {}", entry.path),
        UpdateOutcome::Cloned { upstream } => {
            println!("  ✎  {}", entry.path);
            if let Some(Err(err)) = upstream {
                println!("  {}  {}: {err}", "!".yellow(), entry.path);
            }
        }
    }
}
