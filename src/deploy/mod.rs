//! Export, import and comparison of content between a live store and a
//! directory of staged dumps.
//!
//! # Architecture
//!
//! Deployment moves content between environments through a directory of
//! dumps that can be committed to version control:
//!
//! - [`Exporter`] writes dumps of configured live records, following their
//!   content references
//! - [`Importer`] upserts staged dumps into the live store, importing every
//!   dependency before the dump that references it
//! - [`DiffGenerator`] shows how staged dumps differ from live records
//! - [`get_sync_status`] summarizes a staged directory
//!
//! # Identity
//!
//! Records are matched across environments by dependency name
//! (`<type>:<bundle>:<uuid>`), never by numeric id. Numeric ids are local to
//! a store and are rewritten on import.

mod diff;
mod export;
mod import;
mod status;
mod types;

pub use diff::{
    diff_between_dumps, line_diff, ContentDiff, DiffGenerator, DiffLine, DiffTag, ENTITY_ADDED,
    ENTITY_DELETED,
};
pub use export::{query_dependency, Exporter};
pub use import::{EntityCache, Importer};
pub use status::{get_sync_status, print_status};
pub use types::{
    DeployError, DeployResult, EntityStats, ExportStats, ImportOutcome, ImportStats, SyncStatus,
};
