//! Dump import.
//!
//! An import run replays staged dumps into the live store:
//!
//! 1. Load the requested dumps (all staged dumps when none are named).
//! 2. For each dump, make sure every dependency it references is resolved:
//!    staged dependencies are imported first, others are looked up live.
//! 3. Import each dump not already imported by step 2: copy its blob, restore
//!    its fields, then update the matching live record or create one.
//!
//! Every imported or looked-up record lands in the run's [`EntityCache`],
//! which is also what the [`DumpRestorer`] resolves references against.
//! Each record is saved on its own; a failure leaves earlier records in place.

use std::collections::{HashMap, HashSet};
use std::mem;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::deploy::types::{DeployError, DeployResult, ImportOutcome, ImportStats};
use crate::dump::file::copy_file;
use crate::dump::{Blob, DependencyResolver, Dump, DumpRestorer, DumpStorage};
use crate::model::{Entity, EntityHandle};
use crate::storage::ContentStore;

/// Dependency names resolved during one import run.
#[derive(Debug, Default)]
pub struct EntityCache {
    handles: HashMap<String, EntityHandle>,
}

impl EntityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, dependency_name: &str) -> Option<&EntityHandle> {
        self.handles.get(dependency_name)
    }

    #[must_use]
    pub fn contains(&self, dependency_name: &str) -> bool {
        self.handles.contains_key(dependency_name)
    }

    pub fn insert(&mut self, dependency_name: impl Into<String>, handle: EntityHandle) {
        self.handles.insert(dependency_name.into(), handle);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

impl DependencyResolver for EntityCache {
    fn resolve_entity_dependency(&self, dependency_name: &str) -> DeployResult<EntityHandle> {
        self.get(dependency_name)
            .cloned()
            .ok_or_else(|| DeployError::MissingDependency(dependency_name.to_string()))
    }
}

/// Imports dumps from a dump storage into a live store.
pub struct Importer<'a, S: ContentStore + ?Sized> {
    store: &'a mut S,
    source: &'a DumpStorage,
    /// Loaded dumps not yet imported, by dependency name.
    dumps: HashMap<String, Dump>,
    cache: EntityCache,
    stats: ImportStats,
}

impl<'a, S: ContentStore + ?Sized> Importer<'a, S> {
    /// Create an importer reading from `source`.
    #[must_use]
    pub fn new(store: &'a mut S, source: &'a DumpStorage) -> Self {
        Self {
            store,
            source,
            dumps: HashMap::new(),
            cache: EntityCache::new(),
            stats: ImportStats::default(),
        }
    }

    /// Import the named dumps, or every staged dump if `dependency_names` is
    /// empty. Names without a dump file are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::MissingDependency`] naming the first reference
    /// that is neither staged nor live, [`DeployError::DependencyCycle`] if
    /// staged dumps reference each other in a loop, and any error from
    /// loading, restoring or saving. Records saved before the error stay saved.
    pub fn import<N: AsRef<str>>(&mut self, dependency_names: &[N]) -> DeployResult<ImportStats> {
        self.cache.clear();
        self.dumps.clear();
        self.stats = ImportStats::default();

        let names: Vec<String> = if dependency_names.is_empty() {
            self.source.list_all()?.into_iter().collect()
        } else {
            dependency_names
                .iter()
                .map(|name| name.as_ref().to_string())
                .collect()
        };

        let loaded = self.source.load_multiple(&names)?;
        let order: Vec<String> = loaded
            .iter()
            .map(|dump| dump.dependency_name().to_string())
            .collect();
        self.dumps = loaded
            .into_iter()
            .map(|dump| (dump.dependency_name().to_string(), dump))
            .collect();

        info!(
            count = order.len(),
            source = %self.source.base_path().display(),
            "Importing dumps"
        );

        for name in &order {
            if !self.cache.contains(name) {
                self.ensure_dependencies(name)?;
            }
        }

        for name in &order {
            if !self.cache.contains(name) {
                self.import_single(name)?;
            }
        }

        Ok(mem::take(&mut self.stats))
    }

    /// Resolve everything `root` references, importing staged dumps
    /// dependencies-first.
    ///
    /// The walk keeps an explicit stack. A frame is expanded once (its own
    /// dependencies pushed above it) and imported when popped again; names
    /// still expanding are in `in_progress`, so reaching one again is a cycle.
    fn ensure_dependencies(&mut self, root: &str) -> DeployResult<()> {
        let mut in_progress = HashSet::from([root.to_string()]);
        let mut stack: Vec<(String, bool)> = self
            .dumps
            .get(root)
            .map(|dump| {
                dump.all_dependencies()
                    .rev()
                    .map(|name| (name.clone(), false))
                    .collect()
            })
            .unwrap_or_default();

        while let Some((name, expanded)) = stack.pop() {
            if expanded {
                in_progress.remove(&name);
                if !self.cache.contains(&name) {
                    self.import_single(&name)?;
                }
                continue;
            }

            if self.cache.contains(&name) {
                continue;
            }
            if in_progress.contains(&name) {
                return Err(DeployError::DependencyCycle(name));
            }

            if let Some(dump) = self.dumps.get(&name) {
                let dependencies: Vec<(String, bool)> = dump
                    .all_dependencies()
                    .rev()
                    .filter(|dependency| !self.cache.contains(dependency))
                    .map(|dependency| (dependency.clone(), false))
                    .collect();
                in_progress.insert(name.clone());
                stack.push((name, true));
                stack.extend(dependencies);
            } else {
                let handle = self
                    .store
                    .load_by_dependency_name(&name)?
                    .ok_or_else(|| DeployError::MissingDependency(name.clone()))?;
                debug!(name = %name, "Resolved from live store");
                self.cache.insert(name, handle);
            }
        }

        Ok(())
    }

    /// Import one loaded dump and cache its live handle.
    fn import_single(&mut self, dependency_name: &str) -> DeployResult<()> {
        let dump = self
            .dumps
            .remove(dependency_name)
            .ok_or_else(|| DeployError::MissingDependency(dependency_name.to_string()))?;

        if let Some(blob) = dump.blob() {
            self.copy_blob(dump.dependency_name(), blob)?;
        }

        let fields = DumpRestorer::new(&*self.store, &*self).importable_fields(&dump)?;

        // The dump's identity wins over whatever the live record carried.
        let (mut entity, outcome) = match self.store.load_counterpart(dependency_name)? {
            Some(mut entity) => {
                entity.bundle = dump.bundle().to_string();
                (entity, ImportOutcome::Updated)
            }
            None => (
                Entity::new(dump.entity_type_id(), dump.bundle(), dump.uuid()),
                ImportOutcome::Created,
            ),
        };
        self.store.overwrite(&mut entity, &fields)?;
        self.store.save(&mut entity)?;

        let handle = entity.handle().ok_or_else(|| {
            DeployError::Store(format!("{dependency_name} has no id after saving"))
        })?;
        info!(name = dependency_name, ?outcome, "Imported");
        self.stats.record(dump.entity_type_id(), outcome);
        self.cache.insert(dependency_name, handle);

        Ok(())
    }

    /// Copy a staged blob to its live location.
    ///
    /// A missing staged blob is logged and recorded, not an error.
    fn copy_blob(&mut self, dependency_name: &str, blob: &Blob) -> DeployResult<()> {
        let blob_path = self.source.blob_path(dependency_name, blob);
        if !blob_path.exists() {
            warn!(
                name = dependency_name,
                path = %blob_path.display(),
                "Blob does not exist"
            );
            self.stats.missing_blobs.push(dependency_name.to_string());
            return Ok(());
        }
        copy_file(&blob_path, Path::new(blob.uri()))
    }
}

impl<S: ContentStore + ?Sized> DependencyResolver for Importer<'_, S> {
    fn resolve_entity_dependency(&self, dependency_name: &str) -> DeployResult<EntityHandle> {
        self.cache.resolve_entity_dependency(dependency_name)
    }
}
