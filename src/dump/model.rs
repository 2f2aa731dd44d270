//! The dump value type and its YAML document form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::deploy::DeployResult;
use crate::dump::blob::Blob;

/// Serialized field values keyed by field name.
///
/// A `BTreeMap` keeps field names (and, through `serde_json::Map`, nested
/// property names) sorted, so the YAML form is stable across runs.
pub type FieldValues = BTreeMap<String, serde_json::Value>;

/// Dependency names keyed by dependency kind (`content`, `config`).
pub type Dependencies = BTreeMap<String, Vec<String>>;

/// A portable snapshot of one record.
///
/// Dumps are immutable; build them with [`DumpBuilder`](crate::dump::DumpBuilder).
#[derive(Debug, Clone, PartialEq)]
pub struct Dump {
    pub(crate) dependency_name: String,
    pub(crate) entity_type_id: String,
    pub(crate) bundle: String,
    pub(crate) uuid: String,
    pub(crate) fields: FieldValues,
    pub(crate) dependencies: Dependencies,
    pub(crate) blob: Option<Blob>,
}

/// On-disk layout of a dump file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpDocument {
    /// Entity type ID.
    pub entity_type: String,
    /// Bundle.
    pub bundle: String,
    /// UUID.
    pub uuid: String,
    /// Serialized field values.
    #[serde(default)]
    pub fields: FieldValues,
    /// Referenced dependency names by kind.
    #[serde(default)]
    pub dependencies: Dependencies,
    /// Attached binary, for file-like records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<Blob>,
}

impl Dump {
    /// Dependency name of the dumped record.
    #[must_use]
    pub fn dependency_name(&self) -> &str {
        &self.dependency_name
    }

    /// Entity type ID.
    #[must_use]
    pub fn entity_type_id(&self) -> &str {
        &self.entity_type_id
    }

    /// Bundle.
    #[must_use]
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// UUID.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Serialized field values.
    #[must_use]
    pub fn fields(&self) -> &FieldValues {
        &self.fields
    }

    /// All dependencies by kind.
    #[must_use]
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Attached blob, if any.
    #[must_use]
    pub fn blob(&self) -> Option<&Blob> {
        self.blob.as_ref()
    }

    /// Dependency kinds present on this dump.
    pub fn dependency_keys(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Dependency names registered under `key`.
    #[must_use]
    pub fn dependencies_for_key(&self, key: &str) -> &[String] {
        self.dependencies.get(key).map_or(&[], Vec::as_slice)
    }

    /// Every dependency name, across all kinds.
    pub fn all_dependencies(&self) -> impl DoubleEndedIterator<Item = &String> {
        self.dependencies.values().flatten()
    }

    /// Convert to the serializable document form.
    #[must_use]
    pub fn to_document(&self) -> DumpDocument {
        DumpDocument {
            entity_type: self.entity_type_id.clone(),
            bundle: self.bundle.clone(),
            uuid: self.uuid.clone(),
            fields: self.fields.clone(),
            dependencies: self.dependencies.clone(),
            blob: self.blob.clone(),
        }
    }

    /// Canonical text form used for storage and diffing.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml(&self) -> DeployResult<String> {
        Ok(serde_yaml::to_string(&self.to_document())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::DumpBuilder;
    use serde_json::json;

    fn sample() -> Dump {
        let mut builder = DumpBuilder::new();
        builder
            .entity_type_id("node")
            .bundle("article")
            .uuid("UUID-1")
            .field("title", json!("Hello"))
            .field("body", json!([{"value": "Text", "format": "basic_html"}]))
            .add_dependency("content", "taxonomy_term:tags:UUID-2");
        builder.finalize().unwrap()
    }

    #[test]
    fn test_yaml_has_expected_keys() {
        let yaml = sample().to_yaml().unwrap();
        assert!(yaml.starts_with("entity_type: node\n"));
        assert!(yaml.contains("bundle: article"));
        assert!(yaml.contains("uuid: UUID-1"));
        assert!(yaml.contains("title: Hello"));
        assert!(yaml.contains("taxonomy_term:tags:UUID-2"));
        assert!(!yaml.contains("blob"));
    }

    #[test]
    fn test_fields_are_sorted() {
        let yaml = sample().to_yaml().unwrap();
        let body = yaml.find("body:").unwrap();
        let title = yaml.find("title:").unwrap();
        assert!(body < title);
    }

    #[test]
    fn test_dependency_accessors() {
        let dump = sample();
        assert_eq!(dump.dependency_keys().collect::<Vec<_>>(), vec!["content"]);
        assert_eq!(
            dump.dependencies_for_key("content"),
            &["taxonomy_term:tags:UUID-2".to_string()]
        );
        assert!(dump.dependencies_for_key("config").is_empty());
        assert_eq!(dump.all_dependencies().count(), 1);
    }
}
