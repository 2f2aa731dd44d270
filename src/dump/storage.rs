//! File-backed dump storage.
//!
//! # Storage Layout
//!
//! ```text
//! {base_path}/
//! ├── node.article.<uuid>.yml        # one dump per dependency name
//! ├── file.file.<uuid>.yml
//! └── file.file.<uuid>.blob.png      # blob copied next to its dump
//! ```
//!
//! File basenames are dependency names with `:` replaced by `.`.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Settings;
use crate::deploy::{DeployError, DeployResult};
use crate::dump::blob::Blob;
use crate::dump::builder::DumpBuilder;
use crate::dump::file::{atomic_write, copy_file, ensure_parent_dir};
use crate::dump::model::Dump;
use crate::dump::name;

/// Extension of dump files.
const DUMP_EXTENSION: &str = ".yml";

/// Infix between the basename and the blob's own extension.
const BLOB_INFIX: &str = ".blob";

/// A directory of dumps keyed by dependency name.
#[derive(Debug, Clone)]
pub struct DumpStorage {
    base_path: PathBuf,
}

impl DumpStorage {
    /// Create a storage rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create the storage configured under `key` in the settings.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::UnknownDirectory`] if no directory is configured
    /// for the key.
    pub fn from_settings(key: &str, settings: &Settings) -> DeployResult<Self> {
        settings
            .directory(key)
            .map(Self::new)
            .ok_or_else(|| DeployError::UnknownDirectory(key.to_string()))
    }

    /// The storage directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// List the dependency names of all dumps in the directory.
    ///
    /// Files that are not valid dump file names are skipped. A missing
    /// directory lists as empty.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::FileSystem`] if the directory cannot be read.
    pub fn list_all(&self) -> DeployResult<BTreeSet<String>> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => {
                return Err(DeployError::file_system(
                    format!("Cannot read the directory {}", self.base_path.display()),
                    e,
                ));
            }
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                DeployError::file_system(
                    format!("Cannot read the directory {}", self.base_path.display()),
                    e,
                )
            })?;
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(dependency_name_from_dump_file)
            {
                names.insert(name);
            }
        }

        Ok(names)
    }

    /// Load the dump for a dependency name.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump file exists but cannot be read or parsed.
    pub fn load(&self, dependency_name: &str) -> DeployResult<Option<Dump>> {
        DumpBuilder::load_file(&self.dump_path(dependency_name))
    }

    /// Load the dumps for whichever of the names exist, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing dump file cannot be read or parsed.
    pub fn load_multiple<I, S>(&self, dependency_names: I) -> DeployResult<Vec<Dump>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dumps = Vec::new();
        for dependency_name in dependency_names {
            match self.load(dependency_name.as_ref())? {
                Some(dump) => dumps.push(dump),
                None => debug!(name = dependency_name.as_ref(), "No dump file"),
            }
        }
        Ok(dumps)
    }

    /// Save a dump and, if it carries a blob, copy the blob's source file.
    ///
    /// A failed blob copy leaves the dump file in place.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::FileSystem`] if the directory cannot be created
    /// or any write or copy fails.
    pub fn save(&self, dump: &Dump) -> DeployResult<()> {
        let path = self.dump_path(dump.dependency_name());
        ensure_parent_dir(&path)?;
        atomic_write(&path, &dump.to_yaml()?)?;

        if let Some(blob) = dump.blob() {
            let blob_path = self.blob_path(dump.dependency_name(), blob);
            copy_file(Path::new(blob.uri()), &blob_path)?;
        }

        Ok(())
    }

    /// Path of the dump file for a dependency name.
    #[must_use]
    pub fn dump_path(&self, dependency_name: &str) -> PathBuf {
        self.base_path
            .join(format!("{}{DUMP_EXTENSION}", name::to_basename(dependency_name)))
    }

    /// Path of the blob file for a dependency name and blob.
    #[must_use]
    pub fn blob_path(&self, dependency_name: &str, blob: &Blob) -> PathBuf {
        self.base_path.join(format!(
            "{}{BLOB_INFIX}{}",
            name::to_basename(dependency_name),
            blob.extension().unwrap_or_default()
        ))
    }
}

/// Dependency name for a dump file name, if it is one.
///
/// Valid dump files are `<type>.<bundle>.<uuid>.yml` with three non-empty,
/// dot-free components.
fn dependency_name_from_dump_file(file_name: &str) -> Option<String> {
    let basename = file_name.strip_suffix(DUMP_EXTENSION)?;
    let components: Vec<&str> = basename.split('.').collect();
    if components.len() == 3 && components.iter().all(|c| !c.is_empty()) {
        Some(name::from_basename(basename))
    } else {
        None
    }
}
