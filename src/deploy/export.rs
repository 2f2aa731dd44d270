//! Bulk export of live records into a dump storage.
//!
//! Each configured export entry is a dependency name, possibly coarse:
//!
//! - `node` exports every node
//! - `node:article` exports every article
//! - `node:article:<uuid>` exports one record
//!
//! Content references of exported records are followed and exported too,
//! unless the entry turns that off.

use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::{debug, info};

use crate::config::ExportSettings;
use crate::deploy::types::{DeployError, DeployResult, ExportStats};
use crate::dump::name::{Dependency, CONTENT_KEY};
use crate::dump::{DumpStorage, Dumper};
use crate::storage::ContentStore;

/// IDs of the records a dependency name matches.
///
/// The bundle narrows the match only on types with a bundle key; the uuid
/// only alongside a bundle.
///
/// # Errors
///
/// Returns [`DeployError::SchemaMismatch`] if the entity type is not defined
/// or holds config objects.
pub fn query_dependency<S: ContentStore + ?Sized>(
    store: &S,
    dependency_name: &str,
) -> DeployResult<Vec<i64>> {
    let dependency = Dependency::parse(dependency_name);
    if dependency.entity_type.is_empty() {
        return Err(DeployError::InvalidDependencyName(dependency_name.to_string()));
    }

    let definition = store.entity_type(dependency.entity_type)?;
    if definition.is_config() {
        return Err(DeployError::SchemaMismatch(format!(
            "Entity type {} holds config objects and cannot be exported",
            definition.id
        )));
    }

    let (bundle, uuid) = match dependency.bundle.filter(|bundle| !bundle.is_empty()) {
        Some(bundle) => (
            definition.keys.bundle.as_ref().map(|_| bundle),
            dependency.uuid.filter(|uuid| !uuid.is_empty()),
        ),
        None => (None, None),
    };

    store.query(dependency.entity_type, bundle, uuid)
}

/// Exports configured records from a live store.
pub struct Exporter<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    destination: &'a DumpStorage,
    exports: &'a BTreeMap<String, ExportSettings>,
}

impl<'a, S: ContentStore + ?Sized> Exporter<'a, S> {
    #[must_use]
    pub fn new(
        store: &'a S,
        destination: &'a DumpStorage,
        exports: &'a BTreeMap<String, ExportSettings>,
    ) -> Self {
        Self {
            store,
            destination,
            exports,
        }
    }

    /// Export every configured entry, each record at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if a query, dump or save fails.
    pub fn export(&self) -> DeployResult<ExportStats> {
        info!(
            destination = %self.destination.base_path().display(),
            "Bulk export"
        );

        let dumper = Dumper::new(self.store);
        let mut exported = HashSet::new();
        let mut stats = ExportStats::default();

        for (dependency_name, settings) in self.exports {
            info!(name = %dependency_name, "Export");
            let mut worklist = VecDeque::from([dependency_name.clone()]);

            while let Some(dependency_name) = worklist.pop_front() {
                let entity_type_id = Dependency::parse(&dependency_name).entity_type.to_string();

                for id in query_dependency(self.store, &dependency_name)? {
                    let Some(entity) = self.store.load(&entity_type_id, id)? else {
                        continue;
                    };
                    if exported.contains(&entity.dependency_name()) {
                        stats.skipped += 1;
                        continue;
                    }

                    let dump = dumper.dump(&entity)?;
                    self.destination.save(&dump)?;
                    info!(name = dump.dependency_name(), "Write");

                    exported.insert(dump.dependency_name().to_string());
                    stats.record(dump.entity_type_id(), dump.blob().is_some());

                    if settings.include_dependencies {
                        for dependency in dump.dependencies_for_key(CONTENT_KEY) {
                            if !exported.contains(dependency) {
                                debug!(name = %dependency, "Follow dependency");
                                worklist.push_back(dependency.clone());
                            }
                        }
                    }
                }
            }
        }

        info!(exported = stats.exported, "Complete bulk export");
        Ok(stats)
    }
}
