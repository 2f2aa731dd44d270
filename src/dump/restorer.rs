//! Conversion of dumped field values back into importable values.

use serde_json::Value;

use crate::deploy::{DeployError, DeployResult};
use crate::dump::model::{Dump, FieldValues};
use crate::model::EntityHandle;
use crate::storage::Schema;

/// Resolves dependency names to live handles.
///
/// Resolution is a lookup only: it never loads or imports anything.
pub trait DependencyResolver {
    /// Resolve a dependency name.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::MissingDependency`] if the name has not been
    /// resolved.
    fn resolve_entity_dependency(&self, dependency_name: &str) -> DeployResult<EntityHandle>;
}

/// Converts a dump's fields against the live schema.
pub struct DumpRestorer<'a, S: Schema + ?Sized, R: DependencyResolver + ?Sized> {
    schema: &'a S,
    resolver: &'a R,
}

impl<'a, S: Schema + ?Sized, R: DependencyResolver + ?Sized> DumpRestorer<'a, S, R> {
    #[must_use]
    pub fn new(schema: &'a S, resolver: &'a R) -> Self {
        Self { schema, resolver }
    }

    /// Importable values of all of the dump's fields.
    ///
    /// Entity keys pass through unchanged. Reference items have their
    /// `entity` dependency name replaced by the resolved `target_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SchemaMismatch`] if a field is no longer
    /// defined, and [`DeployError::MissingDependency`] if a reference cannot
    /// be resolved.
    pub fn importable_fields(&self, dump: &Dump) -> DeployResult<FieldValues> {
        let definition = self.schema.entity_type(dump.entity_type_id())?;
        let field_definitions = self
            .schema
            .field_definitions(dump.entity_type_id(), dump.bundle())?;

        let mut fields = FieldValues::new();
        for (field_name, value) in dump.fields() {
            if definition.keys.contains(field_name) {
                fields.insert(field_name.clone(), value.clone());
                continue;
            }

            let field = field_definitions.get(field_name).ok_or_else(|| {
                DeployError::SchemaMismatch(format!(
                    "Field {field_name} of {} is not defined",
                    dump.dependency_name()
                ))
            })?;
            let value = if self.schema.field_type(&field.field_type)?.reference {
                self.restore_references(value)?
            } else {
                value.clone()
            };
            fields.insert(field_name.clone(), value);
        }

        Ok(fields)
    }

    fn restore_references(&self, value: &Value) -> DeployResult<Value> {
        let items = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        };

        let mut list = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(mut item) = item else {
                list.push(item);
                continue;
            };
            if let Some(Value::String(dependency_name)) = item.remove("entity") {
                let handle = self.resolver.resolve_entity_dependency(&dependency_name)?;
                item.insert("target_id".to_string(), handle.target_id());
            }
            list.push(Value::Object(item));
        }

        Ok(Value::Array(list))
    }
}
