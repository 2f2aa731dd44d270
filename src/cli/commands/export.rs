//! Export command implementation.
//!
//! Exports every dependency name listed under `exports:` in the settings
//! into the destination directory, so the dumps can be committed alongside
//! the code that expects them.

use crate::cli::commands::{display_path, Workspace};
use crate::deploy::Exporter;
use crate::error::Result;
use std::path::PathBuf;

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened, the destination is
/// not configured, or the export fails.
pub fn execute(
    destination: &str,
    config_path: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let workspace = Workspace::open(config_path, db_path)?;
    let storage = workspace.storage(destination)?;

    let stats =
        Exporter::new(&workspace.store, &storage, &workspace.settings.exports).export()?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "destination": display_path(storage.base_path()),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if stats.is_empty() {
        println!("No records exported.");
        if workspace.settings.exports.is_empty() {
            println!("List dependency names under 'exports:' in cdeploy.yml.");
        }
    } else {
        println!("Export complete");
        println!();
        for (entity_type, count) in &stats.by_entity_type {
            println!("  {entity_type:<20} {count}");
        }
        println!();
        println!("  Total: {} dumps, {} blobs", stats.exported, stats.blobs);
        println!("  Location: {}", storage.base_path().display());
    }

    Ok(())
}
