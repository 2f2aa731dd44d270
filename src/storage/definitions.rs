//! Schema files.
//!
//! A schema file declares the live store's entity types, custom field types,
//! fields and config objects in one YAML document:
//!
//! ```yaml
//! entity_types:
//!   - id: node
//!     keys: { bundle: type }
//!   - id: taxonomy_vocabulary
//!     group: config
//!     config_prefix: taxonomy.vocabulary
//! fields:
//!   - entity_type: node
//!     bundle: article
//!     name: field_tags
//!     field_type: entity_reference
//!     target_type: taxonomy_term
//! config:
//!   - entity_type: taxonomy_vocabulary
//!     id: tags
//!     data: { name: Tags }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::deploy::{DeployError, DeployResult};
use crate::model::{EntityTypeDefinition, FieldDefinition, FieldTypeDefinition};
use crate::storage::SqliteStore;

/// A field declared in a schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    pub entity_type: String,
    /// Bundle the field belongs to; base field when absent.
    #[serde(default)]
    pub bundle: Option<String>,
    #[serde(flatten)]
    pub field: FieldDefinition,
}

/// A config object declared in a schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entity_type: String,
    pub id: String,
    #[serde(default)]
    pub data: Value,
}

/// Parsed schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub entity_types: Vec<EntityTypeDefinition>,
    #[serde(default)]
    pub field_types: Vec<FieldTypeDefinition>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    #[serde(default)]
    pub config: Vec<ConfigEntry>,
}

/// Counts of what a schema file registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaLoadStats {
    pub entity_types: usize,
    pub field_types: usize,
    pub fields: usize,
    pub config: usize,
}

impl SchemaFile {
    /// Read a schema file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> DeployResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DeployError::file_system(format!("Cannot read schema file {}", path.display()), e)
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Register everything in the file with a store.
    ///
    /// Entity types and field types go first so fields and config objects
    /// can refer to them.
    ///
    /// # Errors
    ///
    /// Returns an error on the first entry the store rejects.
    pub fn apply(&self, store: &mut SqliteStore) -> DeployResult<SchemaLoadStats> {
        for definition in &self.entity_types {
            store.register_entity_type(definition)?;
        }
        for definition in &self.field_types {
            store.register_field_type(definition)?;
        }
        for entry in &self.fields {
            store.register_field(&entry.entity_type, entry.bundle.as_deref(), &entry.field)?;
        }
        for entry in &self.config {
            store.register_config(&entry.entity_type, &entry.id, &entry.data)?;
        }

        Ok(SchemaLoadStats {
            entity_types: self.entity_types.len(),
            field_types: self.field_types.len(),
            fields: self.fields.len(),
            config: self.config.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ContentStore, Schema};

    const SCHEMA: &str = r"
entity_types:
  - id: node
    keys: { bundle: type }
  - id: taxonomy_vocabulary
    group: config
    config_prefix: taxonomy.vocabulary
field_types:
  - id: color
    properties: [value]
    main_property: value
fields:
  - entity_type: node
    name: title
    field_type: string
  - entity_type: node
    bundle: article
    name: field_color
    field_type: color
config:
  - entity_type: taxonomy_vocabulary
    id: tags
    data: { name: Tags }
";

    #[test]
    fn test_apply_schema_file() {
        let schema: SchemaFile = serde_yaml::from_str(SCHEMA).unwrap();
        let mut store = SqliteStore::open_memory().unwrap();

        let stats = schema.apply(&mut store).unwrap();
        assert_eq!(
            stats,
            SchemaLoadStats {
                entity_types: 2,
                field_types: 1,
                fields: 2,
                config: 1
            }
        );

        let fields = store.field_definitions("node", "article").unwrap();
        assert_eq!(fields["field_color"].field_type, "color");
        assert!(fields.contains_key("uuid"));
        assert_eq!(store.field_type("color").unwrap().main_property(), Some("value"));
        assert!(store
            .load_config("taxonomy.vocabulary.tags")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_apply_rejects_field_on_unknown_type() {
        let schema: SchemaFile = serde_yaml::from_str(
            "fields:\n  - entity_type: user\n    name: mail\n    field_type: email\n",
        )
        .unwrap();
        let mut store = SqliteStore::open_memory().unwrap();
        assert!(matches!(
            schema.apply(&mut store),
            Err(DeployError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SchemaFile::load(Path::new("/nonexistent/schema.yml"));
        assert!(matches!(result, Err(DeployError::FileSystem { .. })));
    }
}
