//! Diff command implementation.

use crate::cli::commands::Workspace;
use crate::deploy::{ContentDiff, DiffGenerator};
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Serialize)]
struct DiffOutput<'a> {
    name: &'a str,
    in_sync: bool,
    insertions: usize,
    deletions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<String>,
}

/// Execute the diff command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened, the source is not
/// configured, or a side of a diff cannot be loaded.
pub fn execute(
    source: &str,
    name: Option<&str>,
    context: usize,
    config_path: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let workspace = Workspace::open(config_path, db_path)?;
    let storage = workspace.storage(source)?;
    let generator = DiffGenerator::new(&workspace.store, &storage);

    let diffs = match name {
        Some(name) => BTreeMap::from([(name.to_string(), generator.diff_single(name)?)]),
        None => generator.diff()?,
    };

    if json {
        let output: Vec<DiffOutput> = diffs
            .iter()
            .map(|(name, diff)| DiffOutput {
                name,
                in_sync: diff.is_none(),
                insertions: diff.as_ref().map_or(0, ContentDiff::insertions),
                deletions: diff.as_ref().map_or(0, ContentDiff::deletions),
                diff: diff.as_ref().map(|diff| diff.render(context)),
            })
            .collect();
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let mut changed = 0;
    for (name, diff) in &diffs {
        let Some(diff) = diff else {
            continue;
        };
        changed += 1;
        println!("{}", name.bold());
        print_rendered(&diff.render(context));
        println!();
    }

    if changed == 0 {
        println!("{}", "No differences.".green());
    } else {
        println!(
            "{changed} of {} staged dumps differ from the live store.",
            diffs.len()
        );
    }
    Ok(())
}

fn print_rendered(rendered: &str) {
    for line in rendered.lines() {
        if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}
