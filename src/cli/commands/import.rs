//! Import command implementation.

use crate::cli::commands::{display_path, Workspace};
use crate::deploy::{EntityStats, Importer};
use crate::error::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the import command.
///
/// With no names, every staged dump in the source directory is imported.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened, the source is not
/// configured, or the import fails. A failed import leaves records imported
/// before the failure in place.
pub fn execute(
    source: &str,
    names: &[String],
    config_path: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut workspace = Workspace::open(config_path, db_path)?;
    let storage = workspace.storage(source)?;

    let stats = Importer::new(&mut workspace.store, &storage).import(names)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "source": display_path(storage.base_path()),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if stats.total() == 0 {
        println!("No dumps to import.");
        println!("Dumps not found in: {}", storage.base_path().display());
        return Ok(());
    }

    println!("Import complete");
    println!();
    for (entity_type, entity_stats) in &stats.by_entity_type {
        print_entity_stats(entity_type, entity_stats);
    }
    println!();
    println!(
        "Total: {} created, {} updated",
        stats.created, stats.updated
    );

    if !stats.missing_blobs.is_empty() {
        println!();
        println!("{}", "Missing blob files:".yellow().bold());
        for name in &stats.missing_blobs {
            println!("  {name}");
        }
    }

    Ok(())
}

fn print_entity_stats(name: &str, stats: &EntityStats) {
    if stats.total() > 0 {
        println!(
            "  {}: {} created, {} updated",
            name, stats.created, stats.updated
        );
    }
}
