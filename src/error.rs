//! Error types for the cdeploy CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::DeployError;

/// Result type alias for cdeploy operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    DirectoryNotConfigured,

    // Schema / validation (exit 4)
    SchemaMismatch,
    InvalidDump,
    InvalidDependencyName,
    InvalidArgument,

    // Dependency (exit 5)
    MissingDependency,
    CycleDetected,

    // Deploy (exit 6)
    DeployError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
    YamlError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DirectoryNotConfigured => "DIRECTORY_NOT_CONFIGURED",
            Self::SchemaMismatch => "SCHEMA_MISMATCH",
            Self::InvalidDump => "INVALID_DUMP",
            Self::InvalidDependencyName => "INVALID_DEPENDENCY_NAME",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::MissingDependency => "MISSING_DEPENDENCY",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::DeployError => "DEPLOY_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::DirectoryNotConfigured => 3,
            Self::SchemaMismatch
            | Self::InvalidDump
            | Self::InvalidDependencyName
            | Self::InvalidArgument => 4,
            Self::MissingDependency | Self::CycleDetected => 5,
            Self::DeployError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    ///
    /// True for malformed arguments and dependency names, and for a busy
    /// database. False for schema, dependency, I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::InvalidDependencyName | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in cdeploy CLI operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `cdeploy init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Deploy(err) => match err {
                DeployError::MissingDependency(_) => ErrorCode::MissingDependency,
                DeployError::DependencyCycle(_) => ErrorCode::CycleDetected,
                DeployError::FileSystem { .. } => ErrorCode::IoError,
                DeployError::SchemaMismatch(_) => ErrorCode::SchemaMismatch,
                DeployError::InvalidDump { .. } => ErrorCode::InvalidDump,
                DeployError::InvalidDependencyName(_) => ErrorCode::InvalidDependencyName,
                DeployError::UnknownDirectory(_) => ErrorCode::DirectoryNotConfigured,
                DeployError::Store(_) => ErrorCode::DeployError,
                DeployError::Yaml(_) => ErrorCode::YamlError,
                DeployError::Json(_) => ErrorCode::JsonError,
            },
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Yaml(_) => ErrorCode::YamlError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `cdeploy init` to create cdeploy.yml and the database".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Settings already exist at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::Deploy(DeployError::MissingDependency(name)) => Some(format!(
                "Stage {name} alongside the dumps that reference it \
                 (`cdeploy export` follows references), or create it in the target first."
            )),

            Self::Deploy(DeployError::DependencyCycle(name)) => Some(format!(
                "Records referencing each other cannot be imported in one pass. \
                 Remove one reference involving {name} before exporting."
            )),

            Self::Deploy(DeployError::SchemaMismatch(_)) => Some(
                "Load the same schema into both stores: cdeploy schema load <file>".to_string(),
            ),

            Self::Deploy(DeployError::InvalidDependencyName(_)) => Some(
                "Dependency names look like <type>, <type>:<bundle> or <type>:<bundle>:<uuid>"
                    .to_string(),
            ),

            Self::Deploy(DeployError::UnknownDirectory(key)) => Some(format!(
                "Add a '{key}' entry under `directories:` in cdeploy.yml"
            )),

            Self::Deploy(DeployError::InvalidDump { .. }) => Some(
                "Re-export the dump, or run `cdeploy diff` to inspect staged content".to_string(),
            ),

            Self::Deploy(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::Other("boom".into()).exit_code(), 1);
        assert_eq!(Error::NotInitialized.exit_code(), 2);
        assert_eq!(
            Error::from(DeployError::UnknownDirectory("sync".into())).exit_code(),
            3
        );
        assert_eq!(
            Error::from(DeployError::SchemaMismatch("node".into())).exit_code(),
            4
        );
        assert_eq!(
            Error::from(DeployError::MissingDependency("node:page:U".into())).exit_code(),
            5
        );
        assert_eq!(
            Error::from(DeployError::DependencyCycle("node:page:U".into())).exit_code(),
            5
        );
        assert_eq!(Error::from(DeployError::Store("bad".into())).exit_code(), 6);
        assert_eq!(Error::Config("bad".into()).exit_code(), 7);
        assert_eq!(
            Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).exit_code(),
            8
        );
    }

    #[test]
    fn test_deploy_error_message_is_transparent() {
        let err = Error::from(DeployError::MissingDependency("taxonomy_term:tags:U".into()));
        assert_eq!(err.to_string(), "Dependency taxonomy_term:tags:U is missing");
    }

    #[test]
    fn test_structured_json() {
        let err = Error::from(DeployError::UnknownDirectory("staging".into()));
        let json = err.to_structured_json();

        assert_eq!(json["error"]["code"], "DIRECTORY_NOT_CONFIGURED");
        assert_eq!(json["error"]["exit_code"], 3);
        assert_eq!(json["error"]["retryable"], false);
        assert!(json["error"]["hint"].as_str().unwrap().contains("staging"));
    }

    #[test]
    fn test_no_hint_for_internal_errors() {
        let json = Error::Other("boom".into()).to_structured_json();
        assert!(json["error"].get("hint").is_none());
    }
}
