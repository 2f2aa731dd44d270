//! Entity type, field and field type definitions.
//!
//! These describe the live store's schema: which entity types exist, which
//! keys identify their records, which fields each bundle carries and how the
//! values of each field type are shaped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::entity::{FieldItem, FieldItems};

/// Whether an entity type holds content records or configuration objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityGroup {
    #[default]
    Content,
    Config,
}

impl EntityGroup {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Config => "config",
        }
    }
}

/// Names of the fields that carry an entity type's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityKeys {
    /// Numeric (content) or machine-name (config) identifier.
    #[serde(default = "default_id_key")]
    pub id: String,
    #[serde(default = "default_uuid_key")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_id_key() -> String {
    "id".to_string()
}

fn default_uuid_key() -> String {
    "uuid".to_string()
}

impl Default for EntityKeys {
    fn default() -> Self {
        Self {
            id: default_id_key(),
            uuid: default_uuid_key(),
            revision: None,
            bundle: None,
            langcode: None,
            label: None,
        }
    }
}

impl EntityKeys {
    /// Whether `field_name` is one of the keys.
    #[must_use]
    pub fn contains(&self, field_name: &str) -> bool {
        self.id == field_name
            || self.uuid == field_name
            || [&self.revision, &self.bundle, &self.langcode, &self.label]
                .into_iter()
                .flatten()
                .any(|key| key == field_name)
    }
}

/// Definition of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDefinition {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub group: EntityGroup,
    #[serde(default)]
    pub keys: EntityKeys,
    /// Field holding the location of the binary, for file-like types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_uri_field: Option<String>,
    /// Prefix of config names, for config types. Defaults to the type ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_prefix: Option<String>,
}

impl EntityTypeDefinition {
    /// Create a content entity type with default keys.
    #[must_use]
    pub fn content(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            group: EntityGroup::Content,
            keys: EntityKeys::default(),
            file_uri_field: None,
            config_prefix: None,
        }
    }

    /// Create a config entity type with default keys.
    #[must_use]
    pub fn config(id: impl Into<String>, config_prefix: impl Into<String>) -> Self {
        Self {
            group: EntityGroup::Config,
            config_prefix: Some(config_prefix.into()),
            ..Self::content(id)
        }
    }

    /// Set the bundle key.
    #[must_use]
    pub fn with_bundle_key(mut self, key: impl Into<String>) -> Self {
        self.keys.bundle = Some(key.into());
        self
    }

    /// Set the field holding a binary's location.
    #[must_use]
    pub fn with_file_uri_field(mut self, field: impl Into<String>) -> Self {
        self.file_uri_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn is_config(&self) -> bool {
        self.group == EntityGroup::Config
    }

    /// Whether records of this type carry a binary.
    #[must_use]
    pub fn has_blob(&self) -> bool {
        self.file_uri_field.is_some()
    }

    /// Bundle used for records of a type without a bundle key.
    #[must_use]
    pub fn default_bundle(&self) -> &str {
        &self.id
    }

    /// Config name for a config object of this type.
    #[must_use]
    pub fn config_name(&self, id: &str) -> String {
        format!("{}.{id}", self.config_prefix.as_deref().unwrap_or(&self.id))
    }
}

/// Definition of one field on an entity type and bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: String,
    /// Referenced entity type, for reference fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

impl FieldDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            target_type: None,
        }
    }

    /// Create a reference field targeting `target_type`.
    #[must_use]
    pub fn reference(
        name: impl Into<String>,
        field_type: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            target_type: Some(target_type.into()),
            ..Self::new(name, field_type)
        }
    }
}

/// Shape of the items of a field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeDefinition {
    pub id: String,
    /// Property names of one item.
    pub properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_property: Option<String>,
    /// Whether items point at another record through `target_id`.
    #[serde(default)]
    pub reference: bool,
}

/// Built-in field types: `(id, properties, main property, reference)`.
const BUILTIN_FIELD_TYPES: &[(&str, &[&str], Option<&str>, bool)] = &[
    ("string", &["value"], Some("value"), false),
    ("string_long", &["value"], Some("value"), false),
    ("text", &["value", "format"], Some("value"), false),
    ("text_long", &["value", "format"], Some("value"), false),
    (
        "text_with_summary",
        &["value", "summary", "format"],
        Some("value"),
        false,
    ),
    ("integer", &["value"], Some("value"), false),
    ("decimal", &["value"], Some("value"), false),
    ("float", &["value"], Some("value"), false),
    ("boolean", &["value"], Some("value"), false),
    ("email", &["value"], Some("value"), false),
    ("uri", &["value"], Some("value"), false),
    ("uuid", &["value"], Some("value"), false),
    ("language", &["value"], Some("value"), false),
    ("timestamp", &["value"], Some("value"), false),
    ("created", &["value"], Some("value"), false),
    ("changed", &["value"], Some("value"), false),
    ("link", &["uri", "title", "options"], Some("uri"), false),
    ("list_string", &["value"], Some("value"), false),
    ("list_integer", &["value"], Some("value"), false),
    ("entity_reference", &["target_id"], Some("target_id"), true),
    (
        "file",
        &["target_id", "display", "description"],
        Some("target_id"),
        true,
    ),
    (
        "image",
        &["target_id", "alt", "title", "width", "height"],
        Some("target_id"),
        true,
    ),
];

impl FieldTypeDefinition {
    /// Look up a built-in field type.
    #[must_use]
    pub fn builtin(id: &str) -> Option<Self> {
        BUILTIN_FIELD_TYPES
            .iter()
            .find(|(builtin_id, ..)| *builtin_id == id)
            .map(|&(id, properties, main_property, reference)| Self {
                id: id.to_string(),
                properties: properties.iter().map(ToString::to_string).collect(),
                main_property: main_property.map(str::to_string),
                reference,
            })
    }

    /// All built-in field type IDs.
    pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
        BUILTIN_FIELD_TYPES.iter().map(|(id, ..)| *id)
    }

    /// The property a single-valued item collapses to, if any.
    #[must_use]
    pub fn main_property(&self) -> Option<&str> {
        self.main_property.as_deref()
    }

    /// Whether values of this type are stamped by the store on save.
    #[must_use]
    pub fn is_timestamp_generated(&self) -> bool {
        matches!(self.id.as_str(), "created" | "changed")
    }

    /// Normalize a written value to a list of items.
    ///
    /// - `null` becomes an empty list
    /// - a scalar becomes one item holding it under the main property
    /// - an object becomes a one-item list
    /// - a list is normalized item by item
    #[must_use]
    pub fn normalize(&self, value: &Value) -> FieldItems {
        match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| self.normalize_item(item))
                .collect(),
            other => vec![self.normalize_item(other)],
        }
    }

    fn normalize_item(&self, value: &Value) -> FieldItem {
        match value {
            Value::Object(item) => item.clone(),
            scalar => {
                let mut item = Map::new();
                item.insert(
                    self.main_property().unwrap_or("value").to_string(),
                    scalar.clone(),
                );
                item
            }
        }
    }
}
