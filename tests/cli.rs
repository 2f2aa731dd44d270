//! CLI smoke tests for cdeploy.
//!
//! These tests drive the binary through a full export, import and status
//! cycle between two isolated workspaces.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use cdeploy::storage::{ContentStore, SqliteStore};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const SCHEMA: &str = r"
entity_types:
  - id: node
    keys: { bundle: type }
  - id: taxonomy_term
    keys: { bundle: vid }
fields:
  - entity_type: node
    name: title
    field_type: string
  - entity_type: node
    bundle: article
    name: field_tags
    field_type: entity_reference
    target_type: taxonomy_term
  - entity_type: taxonomy_term
    name: name
    field_type: string
";

/// Get a Command for the cdeploy binary.
fn cdeploy_cmd() -> Command {
    cargo_bin_cmd!("cdeploy")
}

/// Isolated workspace with its own settings, database and dump directory.
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    /// Run `init` and `schema load` in a fresh directory.
    fn new() -> Self {
        let workspace = Self {
            temp: TempDir::new().unwrap(),
        };
        workspace.cmd().arg("init").assert().success();

        let schema_path = workspace.temp.path().join("schema.yml");
        fs::write(&schema_path, SCHEMA).unwrap();
        workspace
            .cmd()
            .args(["schema", "load"])
            .arg(&schema_path)
            .assert()
            .success();
        workspace
    }

    fn settings_path(&self) -> PathBuf {
        self.temp.path().join("cdeploy.yml")
    }

    fn sync_dir(&self) -> PathBuf {
        self.temp.path().join("sync")
    }

    fn cmd(&self) -> Command {
        let mut cmd = cdeploy_cmd();
        cmd.arg("--config").arg(self.settings_path()).arg("--json");
        cmd.env_remove("CDEPLOY_DB");
        cmd
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.temp.path().join("content.db")).unwrap()
    }

    fn write_settings(&self, content: &str) {
        fs::write(self.settings_path(), content).unwrap();
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

/// Source workspace holding one article tagged with one term, exported.
fn exported_source() -> Workspace {
    let source = Workspace::new();
    {
        let mut store = source.store();
        let fields = serde_json::from_value(json!({"vid": "tags", "uuid": "UUID-2", "name": "Rust"}))
            .unwrap();
        let mut tag = store.create("taxonomy_term", &fields).unwrap();
        store.save(&mut tag).unwrap();

        let fields = serde_json::from_value(json!({
            "type": "article",
            "uuid": "UUID-1",
            "title": "Hello",
            "field_tags": tag.id,
        }))
        .unwrap();
        let mut article = store.create("node", &fields).unwrap();
        store.save(&mut article).unwrap();
    }
    source.write_settings(
        "database: content.db\ndirectories:\n  sync: sync\nexports:\n  node:article: {}\n",
    );

    let output = source.run_json(&["export"]);
    assert_eq!(output["stats"]["exported"], 2);
    source
}

/// Target workspace importing from `dir`.
fn target_reading(dir: &Path) -> Workspace {
    let target = Workspace::new();
    target.write_settings(&format!(
        "database: content.db\ndirectories:\n  sync: {}\n",
        dir.display()
    ));
    target
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
    cdeploy_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_command_reports_json() {
    cdeploy_cmd()
        .args(["version", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// Deploy cycle
// =============================================================================

#[test]
fn export_writes_dump_files() {
    let source = exported_source();

    assert!(source.sync_dir().join("node.article.UUID-1.yml").exists());
    assert!(source.sync_dir().join("taxonomy_term.tags.UUID-2.yml").exists());

    let status = source.run_json(&["status"]);
    assert_eq!(status["clean"], true);
    assert_eq!(status["status"]["staged"], 2);
}

#[test]
fn import_creates_records_in_dependency_order() {
    let source = exported_source();
    let target = target_reading(&source.sync_dir());

    let before = target.run_json(&["status"]);
    assert_eq!(before["status"]["added"].as_array().unwrap().len(), 2);

    let output = target.run_json(&["import"]);
    assert_eq!(output["stats"]["created"], 2);
    assert_eq!(output["stats"]["updated"], 0);

    let store = target.store();
    let tag = store.load_by_uuid("taxonomy_term", "UUID-2").unwrap().unwrap();
    let article = store.load_by_uuid("node", "UUID-1").unwrap().unwrap();
    assert_eq!(
        article.property("field_tags", "target_id"),
        Some(&json!(tag.id.unwrap()))
    );

    let after = target.run_json(&["status"]);
    assert_eq!(after["clean"], true);

    let again = target.run_json(&["import"]);
    assert_eq!(again["stats"]["created"], 0);
    assert_eq!(again["stats"]["updated"], 2);
}

#[test]
fn diff_reports_staged_changes() {
    let source = exported_source();
    let target = target_reading(&source.sync_dir());

    let diffs = target.run_json(&["diff", "--name", "node:article:UUID-1"]);
    assert_eq!(diffs[0]["name"], "node:article:UUID-1");
    assert_eq!(diffs[0]["in_sync"], false);
    assert!(diffs[0]["diff"].as_str().unwrap().contains("-Entity added"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn missing_dependency_exits_with_dependency_code() {
    let source = exported_source();
    fs::remove_file(source.sync_dir().join("taxonomy_term.tags.UUID-2.yml")).unwrap();
    let target = target_reading(&source.sync_dir());

    target
        .cmd()
        .arg("import")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("MISSING_DEPENDENCY"));
}

#[test]
fn uninitialized_workspace_exits_with_database_code() {
    let temp = TempDir::new().unwrap();

    cdeploy_cmd()
        .arg("--config")
        .arg(temp.path().join("cdeploy.yml"))
        .args(["--json", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("NOT_INITIALIZED"));
}

#[test]
fn unknown_directory_exits_with_not_found_code() {
    let workspace = Workspace::new();

    workspace
        .cmd()
        .args(["export", "--destination", "staging"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("DIRECTORY_NOT_CONFIGURED"));
}
