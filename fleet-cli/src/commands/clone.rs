//! `fleet clone <path>...`: clone selected declared repositories.

use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Args;

use fleet_core::types::ProjectPath;

use super::{update::clone_missing, Workspace};

#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Project paths as written in the project list.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

impl CloneArgs {
    pub fn run(self) -> Result<ExitCode> {
        let ws = Workspace::open()?;
        let paths: Vec<ProjectPath> = self
            .paths
            .iter()
            .map(|p| ProjectPath::from(p.trim_end_matches('/')))
            .collect();

        let unknown: Vec<&str> = paths
            .iter()
            .filter(|p| !ws.registry.contains(p))
            .map(ProjectPath::as_str)
            .collect();
        if !unknown.is_empty() {
            bail!("not in the project list: {}", unknown.join(", "));
        }
        clone_missing(&ws, &paths)
    }
}
