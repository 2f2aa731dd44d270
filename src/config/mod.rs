//! Configuration management.
//!
//! This module provides functions for discovering the settings file,
//! resolving the database path, and loading configuration.
//!
//! # Settings file
//!
//! Settings live in `cdeploy.yml`, usually at the root of the repository the
//! staged dumps are committed to:
//!
//! ```yaml
//! database: content.db
//! directories:
//!   sync: sync
//! exports:
//!   node:article: {}
//!   taxonomy_term:
//!     include_dependencies: false
//! ```
//!
//! Relative paths resolve against the directory holding the settings file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the settings file.
pub const SETTINGS_FILE: &str = "cdeploy.yml";

/// Database file name used when the settings name none.
pub const DEFAULT_DATABASE: &str = "content.db";

/// Key of the default dump directory.
pub const DEFAULT_DIRECTORY: &str = "sync";

/// Options of one export entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Follow content references of exported records.
    #[serde(default = "default_true")]
    pub include_dependencies: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            include_dependencies: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Deploy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Live store database, relative to the settings directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Dump directories by key.
    pub directories: BTreeMap<String, PathBuf>,
    /// Dependency names to export, with per-entry options.
    pub exports: BTreeMap<String, ExportSettings>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Settings {
    /// Settings written by `cdeploy init`.
    #[must_use]
    pub fn initial(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            database: Some(PathBuf::from(DEFAULT_DATABASE)),
            directories: BTreeMap::from([(
                DEFAULT_DIRECTORY.to_string(),
                PathBuf::from(DEFAULT_DIRECTORY),
            )]),
            exports: BTreeMap::new(),
            base_dir: base_dir.into(),
        }
    }

    /// Load settings from a file.
    ///
    /// An empty file yields default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if the file does not exist, and
    /// [`Error::Config`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotInitialized);
            }
            Err(e) => return Err(e.into()),
        };

        let mut settings: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?
        };
        settings.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(settings)
    }

    /// Write settings to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Directory relative paths resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolved path of the dump directory configured under `key`.
    #[must_use]
    pub fn directory(&self, key: &str) -> Option<PathBuf> {
        self.directories.get(key).map(|path| self.resolve(path))
    }

    /// Resolved database path from the settings alone.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => self.resolve(path),
            None => self.base_dir.join(DEFAULT_DATABASE),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Get the global cdeploy directory location (`~/.cdeploy/`).
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cdeploy"))
}

/// Walk up from `start` looking for a settings file.
#[must_use]
pub fn discover_settings_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(SETTINGS_FILE))
        .find(|candidate| candidate.is_file())
}

/// Resolve the settings file path.
///
/// Priority:
/// 1. `explicit_path` (from `--config` or `CDEPLOY_CONFIG`)
/// 2. `cdeploy.yml` in the current directory or any parent
/// 3. `~/.cdeploy/cdeploy.yml`, if it exists
///
/// # Returns
///
/// Returns the path to the settings file, or `None` if none was found.
#[must_use]
pub fn resolve_settings_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| discover_settings_file(&cwd))
    {
        return Some(path);
    }

    global_config_dir()
        .map(|dir| dir.join(SETTINGS_FILE))
        .filter(|path| path.is_file())
}

/// Resolve the database path.
///
/// Priority:
/// 1. `explicit_path` (from `--db` or `CDEPLOY_DB`)
/// 2. `database` in the settings
/// 3. `content.db` beside the settings file
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>, settings: &Settings) -> PathBuf {
    explicit_path.map_or_else(|| settings.database_path(), Path::to_path_buf)
}
