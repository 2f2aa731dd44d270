//! Stepwise construction of dumps.
//!
//! [`DumpBuilder`] accumulates identity, fields, blob and dependencies one
//! setter at a time. [`DumpBuilder::finalize`] derives the dependency name and
//! the dependency map once and hands back an immutable [`Dump`].
//!
//! The builder also re-hydrates dumps from their YAML text or from a parsed
//! [`DumpDocument`].

use std::fs;
use std::io;
use std::path::Path;

use crate::deploy::{DeployError, DeployResult};
use crate::dump::blob::Blob;
use crate::dump::model::{Dependencies, Dump, DumpDocument, FieldValues};
use crate::dump::name;

/// Accumulator for a [`Dump`].
#[derive(Debug, Default, Clone)]
pub struct DumpBuilder {
    entity_type_id: Option<String>,
    bundle: Option<String>,
    uuid: Option<String>,
    fields: FieldValues,
    blob: Option<Blob>,
    /// Dependencies registered while dumping, in first-seen order.
    discovered: Dependencies,
    /// Derived (or loaded) values, fixed by the first `finalize`.
    dependency_name: Option<String>,
    dependencies: Option<Dependencies>,
}

impl DumpBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entity type ID.
    pub fn entity_type_id(&mut self, entity_type_id: impl Into<String>) -> &mut Self {
        self.entity_type_id = Some(entity_type_id.into());
        self
    }

    /// Set the bundle.
    pub fn bundle(&mut self, bundle: impl Into<String>) -> &mut Self {
        self.bundle = Some(bundle.into());
        self
    }

    /// Set the UUID.
    pub fn uuid(&mut self, uuid: impl Into<String>) -> &mut Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Replace all field values.
    pub fn fields(&mut self, fields: FieldValues) -> &mut Self {
        self.fields = fields;
        self
    }

    /// Set a single field value.
    pub fn field(&mut self, name: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Attach a blob.
    pub fn blob(&mut self, blob: Blob) -> &mut Self {
        self.blob = Some(blob);
        self
    }

    /// Register a referenced dependency under `key` (`content` or `config`).
    ///
    /// Names are kept unique per key, in the order first registered.
    pub fn add_dependency(&mut self, key: &str, dependency_name: impl Into<String>) -> &mut Self {
        let dependency_name = dependency_name.into();
        let names = self.discovered.entry(key.to_string()).or_default();
        if !names.contains(&dependency_name) {
            names.push(dependency_name);
        }
        self
    }

    /// Set the dependency map as-is, bypassing derivation.
    fn set_dependencies(&mut self, dependencies: Dependencies) -> &mut Self {
        self.dependencies = Some(dependencies);
        self
    }

    /// Finalize derived fields and return the dump.
    ///
    /// The dependency name and dependency map are derived on the first call
    /// only; later calls return an equal dump.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidDump`] if the entity type, bundle or
    /// uuid has not been set.
    pub fn finalize(&mut self) -> DeployResult<Dump> {
        let entity_type_id = required(self.entity_type_id.as_ref(), "entity_type")?;
        let bundle = required(self.bundle.as_ref(), "bundle")?;
        let uuid = required(self.uuid.as_ref(), "uuid")?;

        let dependency_name = self
            .dependency_name
            .get_or_insert_with(|| name::format(&entity_type_id, &bundle, &uuid))
            .clone();
        let discovered = &self.discovered;
        let dependencies = self
            .dependencies
            .get_or_insert_with(|| discovered.clone())
            .clone();

        Ok(Dump {
            dependency_name,
            entity_type_id,
            bundle,
            uuid,
            fields: self.fields.clone(),
            dependencies,
            blob: self.blob.clone(),
        })
    }

    /// Load a dump from a YAML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid dump.
    pub fn load_file(path: &Path) -> DeployResult<Option<Dump>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DeployError::file_system(
                    format!("Cannot read dump file {}", path.display()),
                    e,
                ));
            }
        };

        Self::load_yaml(&content)
            .map(Some)
            .map_err(|e| DeployError::InvalidDump {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    /// Load a dump from YAML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid dump document.
    pub fn load_yaml(content: &str) -> DeployResult<Dump> {
        let document: DumpDocument = serde_yaml::from_str(content)?;
        Self::load(document)
    }

    /// Load a dump from its document form.
    ///
    /// # Errors
    ///
    /// Returns an error if identity components are empty.
    pub fn load(document: DumpDocument) -> DeployResult<Dump> {
        let mut builder = Self::new();
        builder
            .entity_type_id(document.entity_type)
            .bundle(document.bundle)
            .uuid(document.uuid)
            .fields(document.fields)
            .set_dependencies(document.dependencies);

        if let Some(blob) = document.blob {
            builder.blob(blob);
        }

        builder.finalize()
    }
}

fn required(value: Option<&String>, key: &str) -> DeployResult<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(DeployError::InvalidDump {
            path: String::from("<builder>"),
            message: format!("missing '{key}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn article_builder() -> DumpBuilder {
        let mut builder = DumpBuilder::new();
        builder
            .entity_type_id("node")
            .bundle("article")
            .uuid("UUID-1")
            .field("title", json!("Hello"));
        builder
    }

    #[test]
    fn test_finalize_derives_dependency_name() {
        let dump = article_builder().finalize().unwrap();
        assert_eq!(dump.dependency_name(), "node:article:UUID-1");
        assert!(dump.dependencies().is_empty());
        assert!(dump.blob().is_none());
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut builder = article_builder();
        builder.add_dependency("content", "user:user:UUID-9");

        let first = builder.finalize().unwrap();
        // Derived values are fixed by the first call.
        builder.add_dependency("content", "user:user:UUID-10");
        let second = builder.finalize().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.dependencies_for_key("content").len(), 1);
    }

    #[test]
    fn test_add_dependency_keeps_unique_order() {
        let mut builder = article_builder();
        builder
            .add_dependency("content", "b:b:2")
            .add_dependency("content", "a:a:1")
            .add_dependency("content", "b:b:2")
            .add_dependency("config", "config:taxonomy.vocabulary.tags");

        let dump = builder.finalize().unwrap();
        assert_eq!(
            dump.dependencies_for_key("content"),
            &["b:b:2".to_string(), "a:a:1".to_string()]
        );
        assert_eq!(dump.dependencies_for_key("config").len(), 1);
    }

    #[test]
    fn test_finalize_requires_identity() {
        let mut builder = DumpBuilder::new();
        builder.entity_type_id("node").bundle("article");
        assert!(matches!(
            builder.finalize(),
            Err(DeployError::InvalidDump { .. })
        ));
    }

    #[test]
    fn test_load_yaml_roundtrip() {
        let mut builder = article_builder();
        builder
            .field("field_tags", json!([{"entity": "taxonomy_term:tags:UUID-2"}]))
            .add_dependency("content", "taxonomy_term:tags:UUID-2")
            .blob(Blob::from_uri("files/a.png", "deadbeef"));
        let original = builder.finalize().unwrap();
        let yaml = original.to_yaml().unwrap();

        let loaded = DumpBuilder::load_yaml(&yaml).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.to_yaml().unwrap(), yaml);
    }

    #[test]
    fn test_load_file_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("node.article.nope.yml");
        assert!(DumpBuilder::load_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("node.article.bad.yml");
        fs::write(&path, "entity_type: [unterminated").unwrap();

        let result = DumpBuilder::load_file(&path);
        assert!(matches!(result, Err(DeployError::InvalidDump { .. })));
    }
}
