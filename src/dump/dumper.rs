//! Serialization of live records into dumps.
//!
//! The dumper walks a record's field definitions in name order and writes
//! each field's value into a [`DumpBuilder`]:
//!
//! - id and revision keys, and store-stamped `created`/`changed` fields, are
//!   left out
//! - the bundle key is written as a plain string
//! - a single item holding only its main property collapses to that value
//! - reference items swap `target_id` for the target's dependency name under
//!   `entity`, and register the target as a dependency of the dump
//! - records of a binary-carrying type get a [`Blob`] for their file

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::deploy::{DeployError, DeployResult};
use crate::dump::blob::Blob;
use crate::dump::builder::DumpBuilder;
use crate::dump::hash::file_hash;
use crate::dump::model::Dump;
use crate::model::{Entity, EntityKeys, FieldDefinition, FieldItems, FieldTypeDefinition};
use crate::storage::ContentStore;

/// Produces dumps from live records.
pub struct Dumper<'a, S: ContentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ContentStore + ?Sized> Dumper<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Dump a live record.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SchemaMismatch`] if the record's type, a field
    /// type or a reference target type is not defined, and
    /// [`DeployError::FileSystem`] if a blob's file cannot be hashed.
    pub fn dump(&self, entity: &Entity) -> DeployResult<Dump> {
        let definition = self.store.entity_type(&entity.entity_type_id)?;
        let field_definitions = self
            .store
            .field_definitions(&entity.entity_type_id, &entity.bundle)?;

        let mut builder = DumpBuilder::new();
        builder
            .entity_type_id(entity.entity_type_id.as_str())
            .bundle(entity.bundle.as_str())
            .uuid(entity.uuid.as_str());

        if let Some(bundle_key) = &definition.keys.bundle {
            builder.field(bundle_key.as_str(), Value::from(entity.bundle.as_str()));
        }

        for (field_name, field) in &field_definitions {
            if is_skipped_key(field_name, &definition.keys) {
                continue;
            }
            let field_type = self.store.field_type(&field.field_type)?;
            if field_type.is_timestamp_generated() {
                continue;
            }

            let items = entity.get(field_name, &definition.keys);
            let value = if field_type.reference {
                self.reference_value(field, items, &mut builder)?
            } else {
                simplify(&field_type, items)
            };
            builder.field(field_name.as_str(), value);
        }

        if let Some(uri_field) = &definition.file_uri_field {
            let uri = entity
                .fields
                .get(uri_field)
                .and_then(|items| items.first())
                .and_then(|item| item.get("value"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DeployError::SchemaMismatch(format!(
                        "{} has no file location in {uri_field}",
                        entity.dependency_name()
                    ))
                })?;
            let hash = file_hash(Path::new(uri))?;
            builder.blob(Blob::from_uri(uri, hash));
        }

        let dump = builder.finalize()?;
        debug!(
            name = dump.dependency_name(),
            dependencies = dump.all_dependencies().count(),
            "Dumped"
        );
        Ok(dump)
    }

    /// Replace reference targets by dependency names, registering each target.
    ///
    /// Items whose target cannot be loaded keep their raw `target_id`.
    fn reference_value(
        &self,
        field: &FieldDefinition,
        items: FieldItems,
        builder: &mut DumpBuilder,
    ) -> DeployResult<Value> {
        let target_type = field.target_type.as_deref().ok_or_else(|| {
            DeployError::SchemaMismatch(format!(
                "Reference field {} has no target type",
                field.name
            ))
        })?;

        let mut list = Vec::with_capacity(items.len());
        for mut item in items {
            let target = match item.get("target_id") {
                Some(target_id) => self.store.load_target(target_type, target_id)?,
                None => None,
            };
            if let Some(target) = target {
                let dependency_name = target.dependency_name();
                item.remove("target_id");
                item.insert("entity".to_string(), Value::from(dependency_name.as_str()));
                builder.add_dependency(target.dependency_key(), dependency_name);
            }
            list.push(Value::Object(item));
        }

        Ok(Value::Array(list))
    }
}

/// Keys whose values the store derives itself.
fn is_skipped_key(field_name: &str, keys: &EntityKeys) -> bool {
    field_name == keys.id
        || keys.revision.as_deref() == Some(field_name)
        || keys.bundle.as_deref() == Some(field_name)
}

/// Collapse a single item holding only the main property to that value.
fn simplify(field_type: &FieldTypeDefinition, mut items: FieldItems) -> Value {
    if let (Some(main_property), [item]) = (field_type.main_property(), items.as_slice()) {
        if item.len() == 1 && item.contains_key(main_property) {
            if let Some(value) = items.pop().and_then(|mut item| item.remove(main_property)) {
                return value;
            }
        }
    }
    Value::Array(items.into_iter().map(Value::Object).collect())
}
