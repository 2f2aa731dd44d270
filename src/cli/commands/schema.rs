//! Schema command implementations.

use crate::cli::commands::{display_path, Workspace};
use crate::cli::SchemaCommands;
use crate::error::Result;
use crate::model::EntityGroup;
use crate::storage::SchemaFile;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct EntityTypeRow {
    id: String,
    group: EntityGroup,
    bundle_key: Option<String>,
    blob: bool,
    records: usize,
}

/// Execute schema commands.
pub fn execute(
    command: &SchemaCommands,
    config_path: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut workspace = Workspace::open(config_path, db_path)?;
    match command {
        SchemaCommands::Load { file } => load(&mut workspace, file, json),
        SchemaCommands::Show => show(&workspace, json),
    }
}

fn load(workspace: &mut Workspace, file: &Path, json: bool) -> Result<()> {
    let stats = SchemaFile::load(file)?.apply(&mut workspace.store)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "file": display_path(file),
            "database": display_path(&workspace.db_path),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Loaded schema from {}", file.display());
        println!();
        println!("  Entity types: {}", stats.entity_types);
        println!("  Field types:  {}", stats.field_types);
        println!("  Fields:       {}", stats.fields);
        println!("  Config:       {}", stats.config);
    }
    Ok(())
}

fn show(workspace: &Workspace, json: bool) -> Result<()> {
    let counts = workspace.store.entity_counts()?;
    let rows: Vec<EntityTypeRow> = workspace
        .store
        .entity_types()?
        .into_iter()
        .map(|definition| EntityTypeRow {
            records: counts.get(&definition.id).copied().unwrap_or_default(),
            blob: definition.has_blob(),
            bundle_key: definition.keys.bundle,
            group: definition.group,
            id: definition.id,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No entity types registered.");
        println!("Run 'cdeploy schema load <file>' to register a schema.");
        return Ok(());
    }

    println!("{:<28} {:<8} {:<12} {:>8}", "ENTITY TYPE", "GROUP", "BUNDLE KEY", "RECORDS");
    for row in &rows {
        let id = if row.blob {
            format!("{} (blob)", row.id)
        } else {
            row.id.clone()
        };
        println!(
            "{:<28} {:<8} {:<12} {:>8}",
            id,
            row.group.as_str(),
            row.bundle_key.as_deref().unwrap_or("-"),
            row.records
        );
    }
    Ok(())
}
