//! `fleet check`: classify every repository on disk or in the project list.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use fleet_core::{Classification, ProjectPath};

use super::Workspace;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CheckRowJson<'a> {
    path: &'a str,
    class: Classification,
}

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "class")]
    class: Classification,
}

impl CheckArgs {
    pub fn run(self) -> Result<ExitCode> {
        let ws = Workspace::open()?;
        let discovered = fleet_detector::discover_repositories(&ws.root)
            .with_context(|| format!("failed to scan {}", ws.root.display()))?;
        let rows = ws
            .registry
            .classify(&discovered, &ws.ignore, |path| path.to_path(&ws.root).exists());

        if self.json {
            print_json(&rows)?;
        } else {
            print_table(&rows);
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_json(rows: &[(ProjectPath, Classification)]) -> Result<()> {
    let payload: Vec<CheckRowJson<'_>> = rows
        .iter()
        .map(|(path, class)| CheckRowJson {
            path: path.as_str(),
            class: *class,
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
    );
    Ok(())
}

fn print_table(rows: &[(ProjectPath, Classification)]) {
    if rows.is_empty() {
        println!("No repositories found.");
        return;
    }

    let count = |wanted: Classification| rows.iter().filter(|(_, c)| *c == wanted).count();
    let summary = format!(
        "{} known | {} missing | {} unknown | {} ignored",
        count(Classification::Known),
        count(Classification::Missing),
        count(Classification::Unknown),
        count(Classification::Ignored),
    );

    let table_rows: Vec<CheckTableRow> = rows
        .iter()
        .map(|(path, class)| CheckTableRow {
            path: path.to_string(),
            class: *class,
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{summary}");
}
