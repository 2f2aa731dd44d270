//! Live records and resolved record handles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dump::name;
use crate::model::schema::{EntityKeys, EntityTypeDefinition};

/// One item of a field: property name to value.
pub type FieldItem = Map<String, Value>;

/// All items of a field.
pub type FieldItems = Vec<FieldItem>;

/// A content record in the live store.
///
/// Identity (id, bundle, uuid) is held apart from the other fields;
/// [`Entity::get`] presents it as fields again under the type's key names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type_id: String,
    /// Assigned by the store on first save.
    pub id: Option<i64>,
    pub bundle: String,
    pub uuid: String,
    pub fields: BTreeMap<String, FieldItems>,
}

impl Entity {
    /// Create an unsaved entity.
    #[must_use]
    pub fn new(
        entity_type_id: impl Into<String>,
        bundle: impl Into<String>,
        uuid: impl Into<String>,
    ) -> Self {
        Self {
            entity_type_id: entity_type_id.into(),
            id: None,
            bundle: bundle.into(),
            uuid: uuid.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Whether the entity has never been saved.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Items of a field, with key fields synthesized from the identity.
    #[must_use]
    pub fn get(&self, field_name: &str, keys: &EntityKeys) -> FieldItems {
        let key_value = if field_name == keys.id {
            Some(self.id.map_or(Value::Null, Value::from))
        } else if field_name == keys.uuid {
            Some(Value::from(self.uuid.as_str()))
        } else if keys.bundle.as_deref() == Some(field_name) {
            Some(Value::from(self.bundle.as_str()))
        } else {
            None
        };

        match key_value {
            Some(Value::Null) => Vec::new(),
            Some(value) => {
                let property = if keys.bundle.as_deref() == Some(field_name) {
                    "target_id"
                } else {
                    "value"
                };
                let mut item = Map::new();
                item.insert(property.to_string(), value);
                vec![item]
            }
            None => self.fields.get(field_name).cloned().unwrap_or_default(),
        }
    }

    /// Replace the items of a non-key field.
    pub fn set(&mut self, field_name: impl Into<String>, items: FieldItems) {
        self.fields.insert(field_name.into(), items);
    }

    /// First value of the given property of a field.
    #[must_use]
    pub fn property(&self, field_name: &str, property: &str) -> Option<&Value> {
        self.fields.get(field_name)?.first()?.get(property)
    }

    /// Dependency name of this entity.
    #[must_use]
    pub fn dependency_name(&self) -> String {
        name::format(&self.entity_type_id, &self.bundle, &self.uuid)
    }

    /// Handle for a saved entity.
    #[must_use]
    pub fn handle(&self) -> Option<EntityHandle> {
        self.id.map(|id| EntityHandle::Content {
            entity_type_id: self.entity_type_id.clone(),
            id,
            bundle: self.bundle.clone(),
            uuid: self.uuid.clone(),
        })
    }
}

/// A resolved reference to a live record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityHandle {
    /// A saved content record.
    Content {
        entity_type_id: String,
        id: i64,
        bundle: String,
        uuid: String,
    },
    /// A configuration object.
    Config {
        entity_type_id: String,
        id: String,
        config_name: String,
    },
}

impl EntityHandle {
    /// Create a handle for a config object of the given type.
    #[must_use]
    pub fn config(definition: &EntityTypeDefinition, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::Config {
            entity_type_id: definition.id.clone(),
            config_name: definition.config_name(&id),
            id,
        }
    }

    #[must_use]
    pub fn entity_type_id(&self) -> &str {
        match self {
            Self::Content { entity_type_id, .. } | Self::Config { entity_type_id, .. } => {
                entity_type_id
            }
        }
    }

    /// Dependency name of the referenced record.
    #[must_use]
    pub fn dependency_name(&self) -> String {
        match self {
            Self::Content {
                entity_type_id,
                bundle,
                uuid,
                ..
            } => name::format(entity_type_id, bundle, uuid),
            Self::Config { config_name, .. } => name::format_config(config_name),
        }
    }

    /// Dependency key the reference is registered under.
    #[must_use]
    pub fn dependency_key(&self) -> &'static str {
        match self {
            Self::Content { .. } => name::CONTENT_KEY,
            Self::Config { .. } => name::CONFIG_KEY,
        }
    }

    /// Value stored in a reference item's `target_id`.
    #[must_use]
    pub fn target_id(&self) -> Value {
        match self {
            Self::Content { id, .. } => Value::from(*id),
            Self::Config { id, .. } => Value::from(id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_keys() -> EntityKeys {
        EntityTypeDefinition::content("node")
            .with_bundle_key("type")
            .keys
    }

    #[test]
    fn test_get_synthesizes_keys() {
        let mut entity = Entity::new("node", "article", "UUID-1");
        entity.set("title", vec![json!({"value": "Hello"}).as_object().unwrap().clone()]);
        let keys = node_keys();

        assert!(entity.get("id", &keys).is_empty());
        entity.id = Some(4);
        assert_eq!(entity.get("id", &keys)[0].get("value"), Some(&json!(4)));
        assert_eq!(entity.get("uuid", &keys)[0].get("value"), Some(&json!("UUID-1")));
        assert_eq!(entity.get("type", &keys)[0].get("target_id"), Some(&json!("article")));
        assert_eq!(entity.get("title", &keys).len(), 1);
        assert!(entity.get("body", &keys).is_empty());
    }

    #[test]
    fn test_handle_requires_saved_entity() {
        let mut entity = Entity::new("node", "article", "UUID-1");
        assert!(entity.is_new());
        assert!(entity.handle().is_none());

        entity.id = Some(1);
        let handle = entity.handle().unwrap();
        assert_eq!(handle.dependency_name(), "node:article:UUID-1");
        assert_eq!(handle.dependency_name(), entity.dependency_name());
        assert_eq!(handle.dependency_key(), "content");
        assert_eq!(handle.target_id(), json!(1));
    }

    #[test]
    fn test_config_handle() {
        let vocabulary = EntityTypeDefinition::config("taxonomy_vocabulary", "taxonomy.vocabulary");
        let handle = EntityHandle::config(&vocabulary, "tags");

        assert_eq!(handle.entity_type_id(), "taxonomy_vocabulary");
        assert_eq!(handle.dependency_name(), "config:taxonomy.vocabulary.tags");
        assert_eq!(handle.dependency_key(), "config");
        assert_eq!(handle.target_id(), json!("tags"));
    }
}
