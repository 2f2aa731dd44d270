//! Sync status reporting.
//!
//! Compares a staged dump directory against the live store and reports
//! which dumps an import would change, plus the health of staged blobs.

use std::collections::BTreeSet;

use colored::Colorize;

use crate::deploy::diff::{DiffGenerator, ENTITY_ADDED};
use crate::deploy::types::{DeployResult, SyncStatus};
use crate::dump::hash::{file_hash, has_changed};
use crate::dump::{Dependency, Dump, DumpStorage};
use crate::storage::ContentStore;

/// Get the sync status of a staged directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed, a dump cannot be
/// read, or the store cannot be queried.
pub fn get_sync_status<S: ContentStore + ?Sized>(
    store: &S,
    storage: &DumpStorage,
) -> DeployResult<SyncStatus> {
    let staged = storage.list_all()?;
    let generator = DiffGenerator::new(store, storage);
    let mut status = SyncStatus {
        staged: staged.len(),
        ..SyncStatus::default()
    };

    for dependency_name in &staged {
        let dump = storage.load(dependency_name)?;
        match generator.diff_staged(dependency_name, dump.as_ref())? {
            None => status.in_sync.push(dependency_name.clone()),
            Some(diff) if diff.active == ENTITY_ADDED => {
                status.added.push(dependency_name.clone());
            }
            Some(_) => status.changed.push(dependency_name.clone()),
        }

        if let Some(blob) = dump.as_ref().and_then(Dump::blob) {
            let blob_path = storage.blob_path(dependency_name, blob);
            if !blob_path.exists() {
                status.missing_blobs.push(dependency_name.clone());
            } else if has_changed(&file_hash(&blob_path)?, Some(blob.hash())) {
                status.stale_blobs.push(dependency_name.clone());
            }
        }
    }

    status.deleted = unstaged_live_records(store, &staged)?;
    Ok(status)
}

/// Live records sharing a type and bundle with some staged dump but not
/// staged themselves.
fn unstaged_live_records<S: ContentStore + ?Sized>(
    store: &S,
    staged: &BTreeSet<String>,
) -> DeployResult<Vec<String>> {
    let groups: BTreeSet<(&str, &str)> = staged
        .iter()
        .map(|name| Dependency::parse(name))
        .filter(|dependency| !dependency.is_config())
        .filter_map(|dependency| Some((dependency.entity_type, dependency.bundle?)))
        .collect();

    let mut deleted = Vec::new();
    for (entity_type_id, bundle) in groups {
        let definition = store.entity_type(entity_type_id)?;
        if definition.is_config() {
            continue;
        }
        let bundle = definition.keys.bundle.as_ref().map(|_| bundle);

        for id in store.query(entity_type_id, bundle, None)? {
            let Some(entity) = store.load(entity_type_id, id)? else {
                continue;
            };
            let dependency_name = entity.dependency_name();
            if !staged.contains(&dependency_name) {
                deleted.push(dependency_name);
            }
        }
    }

    Ok(deleted)
}

/// Print sync status in human-readable format.
pub fn print_status(status: &SyncStatus) {
    println!("{}", "Sync Status".bold().underline());
    println!();
    println!("  Staged dumps: {}", status.staged);
    println!("  In sync:      {}", status.in_sync.len());
    println!();

    if status.staged == 0 {
        println!("{}", "No staged dumps found.".dimmed());
        println!("{}", "Run 'cdeploy export' to stage live content.".dimmed());
        return;
    }

    if status.pending() > 0 {
        println!("{}", "Pending Import:".yellow().bold());
        for name in &status.added {
            println!("  {} {name}", "added  ".green());
        }
        for name in &status.changed {
            println!("  {} {name}", "changed".yellow());
        }
        println!();
        println!("{}", "Run 'cdeploy import' to apply staged changes.".dimmed());
    } else {
        println!("{}", "No pending changes to import.".green());
    }

    if !status.deleted.is_empty() {
        println!();
        println!("{}", "Not Staged:".blue().bold());
        for name in &status.deleted {
            println!("  {name}");
        }
        println!(
            "{}",
            "These live records have no staged dump. Run 'cdeploy export' to stage them.".dimmed()
        );
    }

    if !status.missing_blobs.is_empty() || !status.stale_blobs.is_empty() {
        println!();
        println!("{}", "Blob Problems:".red().bold());
        for name in &status.missing_blobs {
            println!("  {} {name}", "missing".red());
        }
        for name in &status.stale_blobs {
            println!("  {} {name}", "stale  ".red());
        }
    }
}
