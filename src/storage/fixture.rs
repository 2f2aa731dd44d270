//! Test fixture: an in-memory store with a small editorial schema.
//!
//! - `node` (bundle key `type`): `title`, `created`, `changed`; articles add
//!   `body`, `field_tags`, `field_image` and `field_vocabulary`
//! - `taxonomy_term` (bundle key `vid`): `name`, `parent`
//! - `taxonomy_vocabulary`: config type, with the `tags` vocabulary
//! - `file`: binary-carrying type with `filename` and `uri`

use std::path::Path;

use serde_json::json;

use crate::model::{Entity, EntityTypeDefinition, FieldDefinition};
use crate::storage::{ContentStore, SqliteStore};

pub(crate) fn store() -> SqliteStore {
    let mut store = SqliteStore::open_memory().unwrap();

    for definition in [
        EntityTypeDefinition::content("node").with_bundle_key("type"),
        EntityTypeDefinition::content("taxonomy_term").with_bundle_key("vid"),
        EntityTypeDefinition::config("taxonomy_vocabulary", "taxonomy.vocabulary"),
        EntityTypeDefinition::content("file").with_file_uri_field("uri"),
    ] {
        store.register_entity_type(&definition).unwrap();
    }

    let fields = [
        ("node", None, FieldDefinition::new("title", "string")),
        ("node", None, FieldDefinition::new("created", "created")),
        ("node", None, FieldDefinition::new("changed", "changed")),
        ("node", Some("article"), FieldDefinition::new("body", "text_with_summary")),
        (
            "node",
            Some("article"),
            FieldDefinition::reference("field_tags", "entity_reference", "taxonomy_term"),
        ),
        (
            "node",
            Some("article"),
            FieldDefinition::reference("field_image", "image", "file"),
        ),
        (
            "node",
            Some("article"),
            FieldDefinition::reference("field_vocabulary", "entity_reference", "taxonomy_vocabulary"),
        ),
        ("taxonomy_term", None, FieldDefinition::new("name", "string")),
        (
            "taxonomy_term",
            None,
            FieldDefinition::reference("parent", "entity_reference", "taxonomy_term"),
        ),
        ("file", None, FieldDefinition::new("filename", "string")),
        ("file", None, FieldDefinition::new("uri", "uri")),
    ];
    for (entity_type_id, bundle, field) in &fields {
        store.register_field(entity_type_id, *bundle, field).unwrap();
    }

    store
        .register_config("taxonomy_vocabulary", "tags", &json!({"name": "Tags"}))
        .unwrap();

    store
}

/// Create and save an entity from JSON field values.
pub(crate) fn save(store: &mut SqliteStore, entity_type_id: &str, fields: serde_json::Value) -> Entity {
    let fields = serde_json::from_value(fields).unwrap();
    let mut entity = store.create(entity_type_id, &fields).unwrap();
    store.save(&mut entity).unwrap();
    entity
}

pub(crate) fn article(store: &mut SqliteStore, uuid: &str, title: &str) -> Entity {
    save(store, "node", json!({"type": "article", "uuid": uuid, "title": title}))
}

pub(crate) fn tag(store: &mut SqliteStore, uuid: &str, name: &str) -> Entity {
    save(store, "taxonomy_term", json!({"vid": "tags", "uuid": uuid, "name": name}))
}

pub(crate) fn file(store: &mut SqliteStore, uuid: &str, path: &Path) -> Entity {
    save(
        store,
        "file",
        json!({
            "uuid": uuid,
            "filename": path.file_name().map(|name| name.to_string_lossy().into_owned()),
            "uri": path.to_string_lossy(),
        }),
    )
}
