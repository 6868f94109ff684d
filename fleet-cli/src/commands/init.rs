//! `fleet init`: write the project list from the repositories below the current directory.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use fleet_core::{config, registry, types::Project};
use fleet_sync::{
    git::{ORIGIN, UPSTREAM},
    Git, SystemGit,
};

/// Bootstrap a workspace in the current directory.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self) -> Result<ExitCode> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        init_in(&SystemGit::new(), &cwd)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn init_in<G: Git + ?Sized>(git: &G, root: &Path) -> Result<()> {
    let config = config::load(root)
        .with_context(|| format!("failed to load configuration for {}", root.display()))?;
    let project_file = config.project_file_path(root);
    if project_file.exists() {
        bail!("project list already exists at {}", project_file.display());
    }

    let discovered = fleet_detector::discover_repositories(root)
        .with_context(|| format!("failed to scan {}", root.display()))?;
    if discovered.is_empty() {
        bail!("no git repositories found below {}", root.display());
    }

    let mut projects = Vec::with_capacity(discovered.len());
    for path in discovered {
        let remotes = git
            .remotes(&path.to_path(root))
            .with_context(|| format!("failed to read remotes of {path}"))?;
        let url = |name: &str| {
            remotes
                .iter()
                .find(|r| r.name == name)
                .map(|r| r.url.clone())
        };
        let Some(origin_url) = url(ORIGIN) else {
            println!("{} {}: no origin remote, skipped", "!".yellow(), path);
            continue;
        };
        projects.push(Project {
            path,
            origin_url,
            upstream_url: url(UPSTREAM),
        });
    }
    if projects.is_empty() {
        bail!("none of the discovered repositories has an origin remote");
    }

    let registry = registry::init_at(root, &config, projects)
        .with_context(|| format!("failed to write {}", project_file.display()))?;
    println!(
        "{} Registered {} repositories in {}",
        "✓".green(),
        registry.len(),
        config.project_file
    );
    Ok(())
}
