//! SQLite storage implementation.
//!
//! This module provides the live content store backend using SQLite.
//! Writes go through [`SqliteStore::mutate`] so every change runs in one
//! IMMEDIATE transaction.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use serde_json::{Map, Value};
use tracing::debug;

use crate::deploy::{DeployError, DeployResult};
use crate::model::{
    Entity, EntityHandle, EntityTypeDefinition, FieldDefinition, FieldItems, FieldTypeDefinition,
};
use crate::storage::schema::apply_schema;
use crate::storage::{ContentStore, Schema};

/// SQLite-based live content store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

/// Columns read by [`map_entity_row`], in order.
const ENTITY_COLUMNS: &str = "entity_type, id, bundle, uuid, fields";

impl SqliteStore {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> DeployResult<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> DeployResult<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> DeployResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation in an IMMEDIATE transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> DeployResult<R>
    where
        F: FnOnce(&Transaction) -> DeployResult<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let result = f(&tx)?;
        tx.commit()?;

        debug!(op, "Committed");
        Ok(result)
    }

    // ======================
    // Schema Registration
    // ======================

    /// Register (or replace) an entity type.
    ///
    /// Content types get base field definitions for their id and uuid keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn register_entity_type(&mut self, definition: &EntityTypeDefinition) -> DeployResult<()> {
        let encoded = serde_json::to_string(definition)?;
        self.mutate("register_entity_type", |tx| {
            tx.execute(
                "INSERT INTO entity_types (id, definition) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET definition = excluded.definition",
                rusqlite::params![definition.id, encoded],
            )?;

            if !definition.is_config() {
                for field in [
                    FieldDefinition::new(&definition.keys.id, "integer"),
                    FieldDefinition::new(&definition.keys.uuid, "uuid"),
                ] {
                    insert_field(tx, &definition.id, "", &field)?;
                }
            }
            Ok(())
        })
    }

    /// Register a field on a bundle, or on every bundle when `bundle` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SchemaMismatch`] if the entity type, field type or
    /// target type is unknown.
    pub fn register_field(
        &mut self,
        entity_type_id: &str,
        bundle: Option<&str>,
        field: &FieldDefinition,
    ) -> DeployResult<()> {
        self.entity_type(entity_type_id)?;
        self.field_type(&field.field_type)?;
        if let Some(target_type) = &field.target_type {
            self.entity_type(target_type)?;
        }

        self.mutate("register_field", |tx| {
            insert_field(tx, entity_type_id, bundle.unwrap_or_default(), field)
        })
    }

    /// Register a custom field type.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn register_field_type(&mut self, definition: &FieldTypeDefinition) -> DeployResult<()> {
        let encoded = serde_json::to_string(definition)?;
        self.mutate("register_field_type", |tx| {
            tx.execute(
                "INSERT INTO field_types (id, definition) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET definition = excluded.definition",
                rusqlite::params![definition.id, encoded],
            )?;
            Ok(())
        })
    }

    /// Register (or replace) a config object.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SchemaMismatch`] if the type is unknown or is not
    /// a config type.
    pub fn register_config(
        &mut self,
        entity_type_id: &str,
        id: &str,
        data: &Value,
    ) -> DeployResult<EntityHandle> {
        let definition = self.entity_type(entity_type_id)?;
        if !definition.is_config() {
            return Err(DeployError::SchemaMismatch(format!(
                "Entity type {entity_type_id} is not a config type"
            )));
        }

        let config_name = definition.config_name(id);
        let encoded = serde_json::to_string(data)?;
        self.mutate("register_config", |tx| {
            tx.execute(
                "INSERT INTO config_objects (name, entity_type, id, data) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET data = excluded.data",
                rusqlite::params![config_name, entity_type_id, id, encoded],
            )?;
            Ok(())
        })?;

        Ok(EntityHandle::config(&definition, id))
    }

    /// All registered entity types, sorted by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn entity_types(&self) -> DeployResult<Vec<EntityTypeDefinition>> {
        let mut stmt = self
            .conn
            .prepare("SELECT definition FROM entity_types ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        rows.map(|encoded| Ok(serde_json::from_str(&encoded?)?))
            .collect()
    }

    /// Number of content records per entity type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn entity_counts(&self) -> DeployResult<BTreeMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT entity_type, COUNT(*) FROM entities GROUP BY entity_type")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (entity_type, count) = row?;
            counts.insert(entity_type, usize::try_from(count).unwrap_or_default());
        }
        Ok(counts)
    }

    fn query_entities(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> DeployResult<Vec<Entity>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_entity_row)?;

        let mut entities = Vec::new();
        for row in rows {
            let (entity, encoded) = row?;
            entities.push(decode_fields(entity, &encoded)?);
        }
        Ok(entities)
    }

    /// Stamp `created` (on first save) and `changed` typed fields.
    fn stamp_timestamps(&self, entity: &mut Entity, now: i64) -> DeployResult<()> {
        let definitions = self.field_definitions(&entity.entity_type_id, &entity.bundle)?;
        for field in definitions.values() {
            let stamp = match field.field_type.as_str() {
                "created" => entity.is_new() || entity.fields.get(&field.name).is_none_or(Vec::is_empty),
                "changed" => true,
                _ => false,
            };
            if stamp {
                let mut item = Map::new();
                item.insert("value".to_string(), Value::from(now));
                entity.set(field.name.clone(), vec![item]);
            }
        }
        Ok(())
    }
}

fn insert_field(
    tx: &Transaction,
    entity_type_id: &str,
    bundle: &str,
    field: &FieldDefinition,
) -> DeployResult<()> {
    tx.execute(
        "INSERT INTO field_definitions (entity_type, bundle, name, field_type, target_type)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(entity_type, bundle, name) DO UPDATE SET
             field_type = excluded.field_type,
             target_type = excluded.target_type",
        rusqlite::params![
            entity_type_id,
            bundle,
            field.name,
            field.field_type,
            field.target_type
        ],
    )?;
    Ok(())
}

/// Map a row selected with [`ENTITY_COLUMNS`]; fields stay encoded.
fn map_entity_row(row: &Row) -> rusqlite::Result<(Entity, String)> {
    let entity = Entity {
        entity_type_id: row.get(0)?,
        id: Some(row.get(1)?),
        bundle: row.get(2)?,
        uuid: row.get(3)?,
        fields: BTreeMap::new(),
    };
    Ok((entity, row.get(4)?))
}

fn decode_fields(mut entity: Entity, encoded: &str) -> DeployResult<Entity> {
    entity.fields = serde_json::from_str::<BTreeMap<String, FieldItems>>(encoded)?;
    Ok(entity)
}

impl Schema for SqliteStore {
    fn entity_type(&self, entity_type_id: &str) -> DeployResult<EntityTypeDefinition> {
        let encoded: Option<String> = self
            .conn
            .query_row(
                "SELECT definition FROM entity_types WHERE id = ?1",
                [entity_type_id],
                |row| row.get(0),
            )
            .optional()?;

        match encoded {
            Some(encoded) => Ok(serde_json::from_str(&encoded)?),
            None => Err(DeployError::SchemaMismatch(format!(
                "Entity type {entity_type_id} is not defined"
            ))),
        }
    }

    fn field_definitions(
        &self,
        entity_type_id: &str,
        bundle: &str,
    ) -> DeployResult<BTreeMap<String, FieldDefinition>> {
        // Base fields ('') sort first, so bundle fields override them.
        let mut stmt = self.conn.prepare(
            "SELECT name, field_type, target_type FROM field_definitions
             WHERE entity_type = ?1 AND (bundle = '' OR bundle = ?2)
             ORDER BY bundle",
        )?;
        let rows = stmt.query_map([entity_type_id, bundle], |row| {
            Ok(FieldDefinition {
                name: row.get(0)?,
                field_type: row.get(1)?,
                target_type: row.get(2)?,
            })
        })?;

        let mut definitions = BTreeMap::new();
        for row in rows {
            let field = row?;
            definitions.insert(field.name.clone(), field);
        }
        Ok(definitions)
    }

    fn field_type(&self, field_type_id: &str) -> DeployResult<FieldTypeDefinition> {
        let encoded: Option<String> = self
            .conn
            .query_row(
                "SELECT definition FROM field_types WHERE id = ?1",
                [field_type_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(encoded) = encoded {
            return Ok(serde_json::from_str(&encoded)?);
        }
        FieldTypeDefinition::builtin(field_type_id).ok_or_else(|| {
            DeployError::SchemaMismatch(format!("Field type {field_type_id} is not defined"))
        })
    }
}

impl ContentStore for SqliteStore {
    fn load(&self, entity_type_id: &str, id: i64) -> DeployResult<Option<Entity>> {
        let sql = format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE entity_type = ?1 AND id = ?2");
        Ok(self
            .query_entities(&sql, rusqlite::params![entity_type_id, id])?
            .into_iter()
            .next())
    }

    fn load_by_property(
        &self,
        entity_type_id: &str,
        property: &str,
        value: &str,
    ) -> DeployResult<Vec<Entity>> {
        let definition = self.entity_type(entity_type_id)?;
        let keys = &definition.keys;

        if property == keys.id {
            let Ok(id) = value.parse::<i64>() else {
                return Ok(Vec::new());
            };
            return Ok(self.load(entity_type_id, id)?.into_iter().collect());
        }

        let column = if property == keys.uuid {
            Some("uuid")
        } else if keys.bundle.as_deref() == Some(property) {
            Some("bundle")
        } else {
            None
        };

        if let Some(column) = column {
            let sql = format!(
                "SELECT {ENTITY_COLUMNS} FROM entities WHERE entity_type = ?1 AND {column} = ?2 ORDER BY id"
            );
            return self.query_entities(&sql, rusqlite::params![entity_type_id, value]);
        }

        let sql = format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE entity_type = ?1 ORDER BY id");
        let entities = self.query_entities(&sql, rusqlite::params![entity_type_id])?;
        Ok(entities
            .into_iter()
            .filter(|entity| {
                entity
                    .fields
                    .get(property)
                    .and_then(|items| items.first())
                    .is_some_and(|item| item.values().any(|v| scalar_eq(v, value)))
            })
            .collect())
    }

    fn load_config(&self, config_name: &str) -> DeployResult<Option<EntityHandle>> {
        let row = self
            .conn
            .query_row(
                "SELECT entity_type, id FROM config_objects WHERE name = ?1",
                [config_name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(entity_type_id, id)| EntityHandle::Config {
            entity_type_id,
            id,
            config_name: config_name.to_string(),
        }))
    }

    fn load_config_entity(
        &self,
        entity_type_id: &str,
        id: &str,
    ) -> DeployResult<Option<EntityHandle>> {
        let config_name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM config_objects WHERE entity_type = ?1 AND id = ?2",
                [entity_type_id, id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(config_name.map(|config_name| EntityHandle::Config {
            entity_type_id: entity_type_id.to_string(),
            id: id.to_string(),
            config_name,
        }))
    }

    fn query(
        &self,
        entity_type_id: &str,
        bundle: Option<&str>,
        uuid: Option<&str>,
    ) -> DeployResult<Vec<i64>> {
        let mut conditions = vec!["entity_type = ?1".to_string()];
        let mut params: Vec<&str> = vec![entity_type_id];

        if let Some(bundle) = bundle {
            params.push(bundle);
            conditions.push(format!("bundle = ?{}", params.len()));
        }
        if let Some(uuid) = uuid {
            params.push(uuid);
            conditions.push(format!("uuid = ?{}", params.len()));
        }

        let sql = format!(
            "SELECT id FROM entities WHERE {} ORDER BY id",
            conditions.join(" AND ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| row.get(0))?;

        Ok(rows.collect::<rusqlite::Result<Vec<i64>>>()?)
    }

    fn save(&mut self, entity: &mut Entity) -> DeployResult<()> {
        let definition = self.entity_type(&entity.entity_type_id)?;
        if definition.is_config() {
            return Err(DeployError::Store(format!(
                "Entity type {} holds config objects, not content records",
                entity.entity_type_id
            )));
        }
        if entity.bundle.is_empty() {
            return Err(DeployError::Store(format!(
                "A {} record cannot be saved without a bundle",
                entity.entity_type_id
            )));
        }
        if entity.uuid.is_empty() {
            if !entity.is_new() {
                return Err(DeployError::Store(format!(
                    "A {} record cannot be saved without a uuid",
                    entity.entity_type_id
                )));
            }
            entity.uuid = uuid::Uuid::new_v4().to_string();
        }

        let now = chrono::Utc::now().timestamp();
        self.stamp_timestamps(entity, now)?;
        let encoded = serde_json::to_string(&entity.fields)?;

        let id = self.mutate("save_entity", |tx| match entity.id {
            Some(id) => {
                let updated = tx.execute(
                    "UPDATE entities SET bundle = ?3, uuid = ?4, fields = ?5, updated_at = ?6
                     WHERE entity_type = ?1 AND id = ?2",
                    rusqlite::params![entity.entity_type_id, id, entity.bundle, entity.uuid, encoded, now],
                )?;
                if updated == 0 {
                    return Err(DeployError::Store(format!(
                        "Record {}:{id} no longer exists",
                        entity.entity_type_id
                    )));
                }
                Ok(id)
            }
            None => {
                let id: i64 = tx.query_row(
                    "SELECT COALESCE(MAX(id), 0) + 1 FROM entities WHERE entity_type = ?1",
                    [&entity.entity_type_id],
                    |row| row.get(0),
                )?;
                tx.execute(
                    "INSERT INTO entities (entity_type, id, bundle, uuid, fields, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                    rusqlite::params![entity.entity_type_id, id, entity.bundle, entity.uuid, encoded, now],
                )?;
                Ok(id)
            }
        })?;

        entity.id = Some(id);
        Ok(())
    }
}

/// Whether a JSON scalar renders as `value`.
fn scalar_eq(candidate: &Value, value: &str) -> bool {
    match candidate {
        Value::String(s) => s == value,
        Value::Number(n) => n.to_string() == value,
        Value::Bool(b) => b.to_string() == value,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::FieldValues;
    use crate::storage::fixture;
    use serde_json::json;

    fn fields(value: Value) -> FieldValues {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_open_memory_has_no_types() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.entity_types().unwrap().is_empty());
        assert!(matches!(
            store.entity_type("node"),
            Err(DeployError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_open_file_persists() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("content.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .register_entity_type(&EntityTypeDefinition::content("node"))
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.entity_types().unwrap().len(), 1);
    }

    #[test]
    fn test_field_definitions_merge_base_and_bundle() {
        let store = fixture::store();
        let article = store.field_definitions("node", "article").unwrap();
        assert!(article.contains_key("id"));
        assert!(article.contains_key("uuid"));
        assert!(article.contains_key("title"));
        assert!(article.contains_key("field_tags"));

        let page = store.field_definitions("node", "page").unwrap();
        assert!(page.contains_key("title"));
        assert!(!page.contains_key("field_tags"));
    }

    #[test]
    fn test_register_field_rejects_unknown_type() {
        let mut store = fixture::store();
        let result = store.register_field("node", None, &FieldDefinition::new("x", "geofield"));
        assert!(matches!(result, Err(DeployError::SchemaMismatch(_))));
    }

    #[test]
    fn test_create_and_save_assigns_id_and_timestamps() {
        let mut store = fixture::store();
        let mut entity = store
            .create(
                "node",
                &fields(json!({"type": "article", "uuid": "UUID-1", "title": "Hello"})),
            )
            .unwrap();
        assert!(entity.is_new());
        assert_eq!(entity.bundle, "article");
        assert_eq!(entity.uuid, "UUID-1");

        store.save(&mut entity).unwrap();
        assert_eq!(entity.id, Some(1));

        let loaded = store.load("node", 1).unwrap().unwrap();
        assert_eq!(loaded.property("title", "value"), Some(&json!("Hello")));
        assert!(loaded.property("created", "value").is_some());
        assert!(loaded.property("changed", "value").is_some());
    }

    #[test]
    fn test_save_generates_uuid() {
        let mut store = fixture::store();
        let mut entity = store.create("node", &fields(json!({"type": "page"}))).unwrap();
        store.save(&mut entity).unwrap();
        assert_eq!(entity.uuid.len(), 36);
    }

    #[test]
    fn test_save_rejects_missing_uuid_on_update() {
        let mut store = fixture::store();
        let mut entity = fixture::article(&mut store, "UUID-1", "Hello");
        entity.uuid.clear();
        assert!(matches!(store.save(&mut entity), Err(DeployError::Store(_))));
    }

    #[test]
    fn test_save_rejects_duplicate_uuid() {
        let mut store = fixture::store();
        fixture::article(&mut store, "UUID-1", "Hello");
        let mut duplicate = store
            .create("node", &fields(json!({"type": "article", "uuid": "UUID-1"})))
            .unwrap();
        assert!(matches!(store.save(&mut duplicate), Err(DeployError::Store(_))));
    }

    #[test]
    fn test_create_rejects_unknown_field() {
        let store = fixture::store();
        let result = store.create(
            "node",
            &fields(json!({"type": "page", "uuid": "U", "field_tags": []})),
        );
        assert!(matches!(result, Err(DeployError::SchemaMismatch(_))));
    }

    #[test]
    fn test_load_by_property() {
        let mut store = fixture::store();
        fixture::article(&mut store, "UUID-1", "Hello");
        fixture::article(&mut store, "UUID-2", "World");

        let by_uuid = store.load_by_property("node", "uuid", "UUID-2").unwrap();
        assert_eq!(by_uuid.len(), 1);
        assert_eq!(by_uuid[0].id, Some(2));

        let by_title = store.load_by_property("node", "title", "Hello").unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].uuid, "UUID-1");

        assert_eq!(store.load_by_property("node", "type", "article").unwrap().len(), 2);
        assert_eq!(store.load_by_property("node", "id", "1").unwrap().len(), 1);
        assert!(store.load_by_property("node", "id", "x").unwrap().is_empty());
    }

    #[test]
    fn test_query_filters() {
        let mut store = fixture::store();
        fixture::article(&mut store, "UUID-1", "Hello");
        fixture::article(&mut store, "UUID-2", "World");
        let mut page = store
            .create("node", &fields(json!({"type": "page", "uuid": "UUID-3"})))
            .unwrap();
        store.save(&mut page).unwrap();

        assert_eq!(store.query("node", None, None).unwrap(), vec![1, 2, 3]);
        assert_eq!(store.query("node", Some("article"), None).unwrap(), vec![1, 2]);
        assert_eq!(
            store.query("node", Some("article"), Some("UUID-2")).unwrap(),
            vec![2]
        );
        assert!(store.query("user", None, None).unwrap().is_empty());
    }

    #[test]
    fn test_dependency_name_lookups() {
        let mut store = fixture::store();
        fixture::article(&mut store, "UUID-1", "Hello");

        let handle = store
            .load_by_dependency_name("node:article:UUID-1")
            .unwrap()
            .unwrap();
        assert_eq!(handle.target_id(), json!(1));

        assert!(store
            .load_by_dependency_name("node:page:UUID-1")
            .unwrap()
            .is_none());
        let counterpart = store.load_counterpart("node:page:UUID-1").unwrap().unwrap();
        assert_eq!(counterpart.bundle, "article");
        assert!(store
            .load_counterpart("config:taxonomy.vocabulary.tags")
            .unwrap()
            .is_none());
        assert!(matches!(
            store.load_by_dependency_name("node:article"),
            Err(DeployError::InvalidDependencyName(_))
        ));

        let config = store
            .load_by_dependency_name("config:taxonomy.vocabulary.tags")
            .unwrap()
            .unwrap();
        assert_eq!(config.target_id(), json!("tags"));
        assert!(store
            .load_by_dependency_name("config:taxonomy.vocabulary.nope")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_target() {
        let mut store = fixture::store();
        let term = fixture::tag(&mut store, "UUID-2", "Rust");

        let handle = store.load_target("taxonomy_term", &json!(term.id)).unwrap().unwrap();
        assert_eq!(handle.dependency_name(), "taxonomy_term:tags:UUID-2");
        assert_eq!(
            store.load_target("taxonomy_term", &json!("1")).unwrap(),
            Some(handle)
        );
        assert!(store.load_target("taxonomy_term", &json!(99)).unwrap().is_none());

        let vocabulary = store
            .load_target("taxonomy_vocabulary", &json!("tags"))
            .unwrap()
            .unwrap();
        assert_eq!(vocabulary.dependency_name(), "config:taxonomy.vocabulary.tags");
    }

    #[test]
    fn test_register_config_requires_config_type() {
        let mut store = fixture::store();
        let result = store.register_config("node", "x", &json!({}));
        assert!(matches!(result, Err(DeployError::SchemaMismatch(_))));
    }

    #[test]
    fn test_entity_counts() {
        let mut store = fixture::store();
        fixture::article(&mut store, "UUID-1", "Hello");
        fixture::tag(&mut store, "UUID-2", "Rust");

        let counts = store.entity_counts().unwrap();
        assert_eq!(counts.get("node"), Some(&1));
        assert_eq!(counts.get("taxonomy_term"), Some(&1));
    }
}
