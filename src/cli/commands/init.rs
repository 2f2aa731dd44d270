//! Initialize a cdeploy workspace.
//!
//! Writes `cdeploy.yml` (in the current directory unless `--config` names
//! another path), creates the default dump directory and creates the
//! database with its schema applied.

use crate::config::{resolve_db_path, Settings, DEFAULT_DIRECTORY, SETTINGS_FILE};
use crate::error::{Error, Result};
use crate::storage::SqliteStore;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    settings: PathBuf,
    database: PathBuf,
    directory: PathBuf,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`] if the settings file exists and
/// `force` is not set, or an error if a file or the database cannot be
/// created.
pub fn execute(
    config_path: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    force: bool,
    json: bool,
) -> Result<()> {
    let settings_path = match config_path {
        Some(path) => path.clone(),
        None => std::env::current_dir()?.join(SETTINGS_FILE),
    };

    if settings_path.exists() && !force {
        return Err(Error::AlreadyInitialized {
            path: settings_path,
        });
    }

    let base_dir = settings_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let settings = Settings::initial(&base_dir);
    settings.save(&settings_path)?;

    let directory = settings
        .directory(DEFAULT_DIRECTORY)
        .ok_or_else(|| Error::Config(format!("No '{DEFAULT_DIRECTORY}' directory configured")))?;
    fs::create_dir_all(&directory)?;

    let database = resolve_db_path(db_path.map(PathBuf::as_path), &settings);
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    SqliteStore::open(&database)?;

    if json {
        let output = InitOutput {
            settings: settings_path,
            database,
            directory,
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
    } else {
        println!("Initialized cdeploy in {}", base_dir.display());
        println!("  Settings:  {}", settings_path.display());
        println!("  Database:  {}", database.display());
        println!("  Dumps:     {}", directory.display());
        println!();
        println!("Next: load a schema with 'cdeploy schema load <file>' and list exports in cdeploy.yml.");
    }

    Ok(())
}
