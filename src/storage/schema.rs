//! Database schema definitions for the live content store.

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the content database.
///
/// Note: Timestamps are stored as INTEGER (Unix seconds). Field values and
/// type definitions are stored as JSON text.
pub const SCHEMA_SQL: &str = r#"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Schema Registry
-- ====================

-- Entity types: JSON-encoded EntityTypeDefinition
CREATE TABLE IF NOT EXISTS entity_types (
    id TEXT PRIMARY KEY,
    definition TEXT NOT NULL
);

-- Custom field types beyond the built-in registry
CREATE TABLE IF NOT EXISTS field_types (
    id TEXT PRIMARY KEY,
    definition TEXT NOT NULL
);

-- Field definitions: bundle '' holds base fields shared by all bundles
CREATE TABLE IF NOT EXISTS field_definitions (
    entity_type TEXT NOT NULL,
    bundle TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    field_type TEXT NOT NULL,
    target_type TEXT,
    PRIMARY KEY (entity_type, bundle, name),
    FOREIGN KEY (entity_type) REFERENCES entity_types(id) ON DELETE CASCADE
);

-- ====================
-- Content
-- ====================

CREATE TABLE IF NOT EXISTS entities (
    entity_type TEXT NOT NULL,
    id INTEGER NOT NULL,
    bundle TEXT NOT NULL,
    uuid TEXT NOT NULL,
    fields TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (entity_type, id),
    UNIQUE (entity_type, uuid),
    FOREIGN KEY (entity_type) REFERENCES entity_types(id)
);

CREATE INDEX IF NOT EXISTS idx_entities_bundle ON entities(entity_type, bundle);

-- Configuration objects, addressed by config name
CREATE TABLE IF NOT EXISTS config_objects (
    name TEXT PRIMARY KEY,
    entity_type TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT '{}',
    UNIQUE (entity_type, id),
    FOREIGN KEY (entity_type) REFERENCES entity_types(id)
);
"#;

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // Set pragmas before schema creation
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;

    conn.execute_batch(SCHEMA_SQL)?;

    // Record schema version
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp()
        ],
    )?;

    Ok(())
}
