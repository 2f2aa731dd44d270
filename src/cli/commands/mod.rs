//! Command implementations.

pub mod completions;
pub mod diff;
pub mod export;
pub mod import;
pub mod init;
pub mod schema;
pub mod status;
pub mod version;

use std::path::{Path, PathBuf};

use crate::config::{resolve_db_path, resolve_settings_path, Settings};
use crate::dump::DumpStorage;
use crate::error::{Error, Result};
use crate::storage::SqliteStore;

/// Settings and live store a command runs against.
pub(crate) struct Workspace {
    pub settings: Settings,
    pub db_path: PathBuf,
    pub store: SqliteStore,
}

impl Workspace {
    /// Resolve settings and open the live store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if no settings file or database
    /// exists.
    pub(crate) fn open(config_path: Option<&PathBuf>, db_path: Option<&PathBuf>) -> Result<Self> {
        let settings_path =
            resolve_settings_path(config_path.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;
        let settings = Settings::load(&settings_path)?;

        let db_path = resolve_db_path(db_path.map(PathBuf::as_path), &settings);
        if !db_path.exists() {
            return Err(Error::NotInitialized);
        }
        let store = SqliteStore::open(&db_path)?;

        Ok(Self {
            settings,
            db_path,
            store,
        })
    }

    /// Dump storage configured under `key`.
    pub(crate) fn storage(&self, key: &str) -> Result<DumpStorage> {
        Ok(DumpStorage::from_settings(key, &self.settings)?)
    }
}

/// Display form of a path for command output.
pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}
