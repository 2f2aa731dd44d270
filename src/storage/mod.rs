//! Live content store.
//!
//! The dump and deploy layers talk to the live store only through the
//! [`Schema`] and [`ContentStore`] traits. [`SqliteStore`] is the bundled
//! implementation:
//! - WAL mode for concurrent reads
//! - Field values stored as JSON
//! - Entity types, field definitions and config objects registered from YAML
//!
//! # Submodules
//!
//! - [`definitions`] - Schema files registered by `cdeploy schema load`
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

use std::collections::BTreeMap;

use serde_json::Value;

use crate::deploy::{DeployError, DeployResult};
use crate::dump::name::Dependency;
use crate::dump::FieldValues;
use crate::model::{Entity, EntityHandle, EntityTypeDefinition, FieldDefinition, FieldTypeDefinition};

pub mod definitions;
pub mod schema;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod fixture;

pub use definitions::SchemaFile;
pub use sqlite::SqliteStore;

/// Read access to the live store's type and field metadata.
pub trait Schema {
    /// Definition of an entity type.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SchemaMismatch`] if the type is not defined.
    fn entity_type(&self, entity_type_id: &str) -> DeployResult<EntityTypeDefinition>;

    /// Field definitions of a bundle, base fields included, keyed by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the definitions cannot be read.
    fn field_definitions(
        &self,
        entity_type_id: &str,
        bundle: &str,
    ) -> DeployResult<BTreeMap<String, FieldDefinition>>;

    /// Definition of a field type.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SchemaMismatch`] if the field type is unknown.
    fn field_type(&self, field_type_id: &str) -> DeployResult<FieldTypeDefinition>;
}

/// Record storage and query API of the live store.
///
/// Required methods are the primitive lookups and writes; the provided
/// methods build dependency-name resolution and upserts on top of them.
pub trait ContentStore: Schema {
    /// Load a content record by numeric id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load(&self, entity_type_id: &str, id: i64) -> DeployResult<Option<Entity>>;

    /// Load content records whose `property` field equals `value`.
    ///
    /// Key fields (id, uuid, bundle) match the record's identity; other
    /// fields match when any property of their first item equals `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_by_property(
        &self,
        entity_type_id: &str,
        property: &str,
        value: &str,
    ) -> DeployResult<Vec<Entity>>;

    /// Load a config object by config name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_config(&self, config_name: &str) -> DeployResult<Option<EntityHandle>>;

    /// Load a config object by type and machine name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_config_entity(&self, entity_type_id: &str, id: &str)
    -> DeployResult<Option<EntityHandle>>;

    /// IDs of content records of a type, optionally narrowed by bundle and uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn query(
        &self,
        entity_type_id: &str,
        bundle: Option<&str>,
        uuid: Option<&str>,
    ) -> DeployResult<Vec<i64>>;

    /// Persist a record, assigning an id on first save.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Store`] if the record fails validation or the
    /// write fails.
    fn save(&mut self, entity: &mut Entity) -> DeployResult<()>;

    /// Construct an unsaved record from field values.
    ///
    /// The bundle and uuid come from the type's key fields when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is not defined on the bundle.
    fn create(&self, entity_type_id: &str, fields: &FieldValues) -> DeployResult<Entity> {
        let definition = self.entity_type(entity_type_id)?;
        let bundle = definition
            .keys
            .bundle
            .as_ref()
            .and_then(|key| fields.get(key))
            .and_then(key_scalar)
            .unwrap_or_else(|| definition.default_bundle().to_string());
        let uuid = fields
            .get(&definition.keys.uuid)
            .and_then(key_scalar)
            .unwrap_or_default();

        let mut entity = Entity::new(entity_type_id, bundle, uuid);
        self.overwrite(&mut entity, fields)?;
        Ok(entity)
    }

    /// Set field values on a record, replacing what each field held.
    ///
    /// Values are normalized through their field type; key fields update the
    /// record's identity instead. The id key is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SchemaMismatch`] if a field is not defined on
    /// the record's bundle.
    fn overwrite(&self, entity: &mut Entity, fields: &FieldValues) -> DeployResult<()> {
        let definition = self.entity_type(&entity.entity_type_id)?;
        let keys = &definition.keys;
        let field_definitions = self.field_definitions(&entity.entity_type_id, &entity.bundle)?;

        for (field_name, value) in fields {
            if *field_name == keys.id {
                continue;
            }
            if *field_name == keys.uuid {
                if let Some(uuid) = key_scalar(value) {
                    entity.uuid = uuid;
                }
                continue;
            }
            if keys.bundle.as_ref() == Some(field_name) {
                if let Some(bundle) = key_scalar(value) {
                    entity.bundle = bundle;
                }
                continue;
            }

            let field = field_definitions.get(field_name).ok_or_else(|| {
                DeployError::SchemaMismatch(format!(
                    "Field {field_name} is not defined on {}:{}",
                    entity.entity_type_id, entity.bundle
                ))
            })?;
            let items = self.field_type(&field.field_type)?.normalize(value);
            entity.set(field_name.clone(), items);
        }

        Ok(())
    }

    /// Load a content record by uuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or the store cannot be read.
    fn load_by_uuid(&self, entity_type_id: &str, uuid: &str) -> DeployResult<Option<Entity>> {
        let definition = self.entity_type(entity_type_id)?;
        Ok(self
            .load_by_property(entity_type_id, &definition.keys.uuid, uuid)?
            .into_iter()
            .next())
    }

    /// Load the content record a dependency name points at.
    ///
    /// Config names and records whose bundle differs resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidDependencyName`] if the name lacks a
    /// bundle or uuid.
    fn load_entity_by_dependency_name(&self, dependency_name: &str) -> DeployResult<Option<Entity>> {
        let dependency = Dependency::parse(dependency_name);
        if dependency.is_config() {
            return Ok(None);
        }
        let (Some(bundle), Some(uuid)) = (dependency.bundle, dependency.uuid) else {
            return Err(DeployError::InvalidDependencyName(dependency_name.to_string()));
        };

        Ok(self
            .load_by_uuid(dependency.entity_type, uuid)?
            .filter(|entity| entity.bundle == bundle))
    }

    /// Load the live record a staged dump of `dependency_name` stands for.
    ///
    /// Matches on entity type and uuid only, so a record whose bundle
    /// differs is still the counterpart. Config names resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidDependencyName`] if the name lacks a
    /// uuid.
    fn load_counterpart(&self, dependency_name: &str) -> DeployResult<Option<Entity>> {
        let dependency = Dependency::parse(dependency_name);
        if dependency.is_config() {
            return Ok(None);
        }
        let Some(uuid) = dependency.uuid else {
            return Err(DeployError::InvalidDependencyName(dependency_name.to_string()));
        };
        self.load_by_uuid(dependency.entity_type, uuid)
    }

    /// Resolve a dependency name to a live handle, content or config.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed or the store cannot be read.
    fn load_by_dependency_name(&self, dependency_name: &str) -> DeployResult<Option<EntityHandle>> {
        let dependency = Dependency::parse(dependency_name);
        if let Some(config_name) = dependency.config_name() {
            return self.load_config(config_name);
        }
        Ok(self
            .load_entity_by_dependency_name(dependency_name)?
            .and_then(|entity| entity.handle()))
    }

    /// Resolve the target of a reference item.
    ///
    /// # Errors
    ///
    /// Returns an error if the target type is unknown or the store cannot be
    /// read.
    fn load_target(
        &self,
        target_type: &str,
        target_id: &Value,
    ) -> DeployResult<Option<EntityHandle>> {
        let definition = self.entity_type(target_type)?;
        let Some(target_id) = key_scalar(target_id) else {
            return Ok(None);
        };

        if definition.is_config() {
            return self.load_config_entity(target_type, &target_id);
        }

        let Ok(id) = target_id.parse::<i64>() else {
            return Ok(None);
        };
        Ok(self.load(target_type, id)?.and_then(|entity| entity.handle()))
    }
}

/// Scalar form of a key field value.
///
/// Accepts a string or number, or the first item of a list, or the main
/// property of an item (`target_id`, then `value`).
fn key_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.first().and_then(key_scalar),
        Value::Object(item) => item
            .get("target_id")
            .or_else(|| item.get("value"))
            .and_then(key_scalar),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_scalar() {
        assert_eq!(key_scalar(&json!("article")).as_deref(), Some("article"));
        assert_eq!(key_scalar(&json!(3)).as_deref(), Some("3"));
        assert_eq!(key_scalar(&json!([{"target_id": "page"}])).as_deref(), Some("page"));
        assert_eq!(key_scalar(&json!({"value": "UUID-1"})).as_deref(), Some("UUID-1"));
        assert_eq!(key_scalar(&json!("")), None);
        assert_eq!(key_scalar(&Value::Null), None);
        assert_eq!(key_scalar(&json!([])), None);
    }
}
