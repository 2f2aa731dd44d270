//! Status command implementation.

use crate::cli::commands::{display_path, Workspace};
use crate::deploy::{get_sync_status, print_status};
use crate::error::Result;
use std::path::PathBuf;

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened, the source is not
/// configured, or the staged directory cannot be read.
pub fn execute(
    source: &str,
    config_path: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let workspace = Workspace::open(config_path, db_path)?;
    let storage = workspace.storage(source)?;
    let status = get_sync_status(&workspace.store, &storage)?;

    if json {
        let output = serde_json::json!({
            "source": display_path(storage.base_path()),
            "clean": status.is_clean(),
            "status": status,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Source: {}", storage.base_path().display());
        println!();
        print_status(&status);
    }

    Ok(())
}
