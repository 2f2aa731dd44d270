//! Shared types for export/import/diff runs.
//!
//! This module defines the core error type used by the dump and deploy
//! layers, plus the statistics each run reports back to its caller.

use std::collections::BTreeMap;

use serde::Serialize;

/// Outcome of importing a single dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    /// No live record matched the dump's identity, so one was created.
    Created,
    /// A live record matched and its fields were overwritten.
    Updated,
}

/// Statistics for an export run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportStats {
    /// Number of dumps written.
    pub exported: usize,
    /// Number of blob files copied alongside dumps.
    pub blobs: usize,
    /// Number of records matched more than once and skipped.
    pub skipped: usize,
    /// Dumps written per entity type.
    pub by_entity_type: BTreeMap<String, usize>,
}

impl ExportStats {
    pub(crate) fn record(&mut self, entity_type_id: &str, has_blob: bool) {
        self.exported += 1;
        if has_blob {
            self.blobs += 1;
        }
        *self
            .by_entity_type
            .entry(entity_type_id.to_string())
            .or_default() += 1;
    }

    /// Returns true if nothing was exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exported == 0
    }
}

/// Per-entity-type statistics for import runs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    /// Number of new records created.
    pub created: usize,
    /// Number of existing records updated.
    pub updated: usize,
}

impl EntityStats {
    /// Total records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// Statistics for an import run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    /// Number of records created.
    pub created: usize,
    /// Number of records updated.
    pub updated: usize,
    /// Breakdown per entity type.
    pub by_entity_type: BTreeMap<String, EntityStats>,
    /// Dependency names whose blob file was absent from the source directory.
    pub missing_blobs: Vec<String>,
}

impl ImportStats {
    pub(crate) fn record(&mut self, entity_type_id: &str, outcome: ImportOutcome) {
        let entry = self
            .by_entity_type
            .entry(entity_type_id.to_string())
            .or_default();
        match outcome {
            ImportOutcome::Created => {
                self.created += 1;
                entry.created += 1;
            }
            ImportOutcome::Updated => {
                self.updated += 1;
                entry.updated += 1;
            }
        }
    }

    /// Total number of records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// Summary of a staged directory against the live store.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncStatus {
    /// Number of dumps in the staged directory.
    pub staged: usize,
    /// Staged dumps identical to their live record.
    pub in_sync: Vec<String>,
    /// Staged dumps that differ from their live record.
    pub changed: Vec<String>,
    /// Staged dumps with no live record.
    pub added: Vec<String>,
    /// Live records of a staged type and bundle with no staged dump.
    pub deleted: Vec<String>,
    /// Staged dumps whose blob file is absent.
    pub missing_blobs: Vec<String>,
    /// Staged dumps whose blob file no longer matches the recorded hash.
    pub stale_blobs: Vec<String>,
}

impl SyncStatus {
    /// Number of records an import would create or update.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.changed.len() + self.added.len()
    }

    /// Returns true if every staged dump is in sync and all blobs are healthy.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.pending() == 0
            && self.deleted.is_empty()
            && self.missing_blobs.is_empty()
            && self.stale_blobs.is_empty()
    }
}

/// Errors raised by dumping, storing, restoring and importing content.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// A referenced dependency is neither staged for import nor live.
    #[error("Dependency {0} is missing")]
    MissingDependency(String),

    /// The reference graph loops back onto a dependency still being imported.
    #[error("Dependency cycle detected at {0}")]
    DependencyCycle(String),

    /// Directory creation, file write or blob copy failed.
    #[error("{message}: {source}")]
    FileSystem {
        /// What was being attempted, including the path.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A dump or query refers to a type or field the live schema lacks.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A dump file exists but does not hold a valid dump.
    #[error("Invalid dump {path}: {message}")]
    InvalidDump {
        /// Path or dependency name of the offending dump.
        path: String,
        /// Parse or validation message.
        message: String,
    },

    /// A dependency name is empty or otherwise unusable.
    #[error("Invalid dependency name: {0}")]
    InvalidDependencyName(String),

    /// No storage directory is configured under the given key.
    #[error("No content directory configured for '{0}'")]
    UnknownDirectory(String),

    /// The live store rejected an operation.
    #[error("Store error: {0}")]
    Store(String),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeployError {
    /// Build a [`DeployError::FileSystem`] from a message and I/O error.
    pub(crate) fn file_system(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileSystem {
            message: message.into(),
            source,
        }
    }
}

impl From<rusqlite::Error> for DeployError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

/// Result type for deploy operations.
pub type DeployResult<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_stats() {
        let mut stats = ExportStats::default();
        assert!(stats.is_empty());

        stats.record("node", false);
        stats.record("file", true);
        stats.record("node", false);

        assert_eq!(stats.exported, 3);
        assert_eq!(stats.blobs, 1);
        assert_eq!(stats.by_entity_type.get("node"), Some(&2));
        assert!(!stats.is_empty());
    }

    #[test]
    fn test_import_stats() {
        let mut stats = ImportStats::default();
        stats.record("node", ImportOutcome::Created);
        stats.record("node", ImportOutcome::Updated);
        stats.record("taxonomy_term", ImportOutcome::Created);

        assert_eq!(stats.created, 2);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(
            stats.by_entity_type.get("node"),
            Some(&EntityStats {
                created: 1,
                updated: 1
            })
        );
    }

    #[test]
    fn test_missing_dependency_message_names_dependency() {
        let err = DeployError::MissingDependency("taxonomy_term:tags:UUID-2".into());
        assert_eq!(err.to_string(), "Dependency taxonomy_term:tags:UUID-2 is missing");
    }
}
