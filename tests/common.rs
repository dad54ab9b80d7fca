#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use shopclock::db::manager::ConnectionManager;
use shopclock::db::registry::Registry;
use shopclock::models::target::{TargetConfig, TargetKey};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn scl() -> Command {
    cargo_bin_cmd!("shopclock")
}

/// Create a unique test DB path inside the system temp dir and remove any
/// existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_shopclock.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Initialize the schema on a primary database via the CLI.
pub fn init_schema(db_path: &str) {
    scl()
        .args(["--db", db_path, "--test", "db", "--init-schema"])
        .assert()
        .success();
}

/// Add an active employee via the CLI.
pub fn add_employee(db_path: &str, name: &str, code: &str) {
    scl()
        .args([
            "--db", db_path, "--test", "employee", "add", name, code, "--rate", "42.5",
        ])
        .assert()
        .success();
}

/// Registry with an active primary and an optional active secondary,
/// designated read-of-record on the primary.
pub fn registry_for(primary_path: &str, secondary_path: Option<&str>) -> Registry {
    let mut primary = TargetConfig::new(TargetKey::Primary);
    primary.host = Some(primary_path.to_string());
    primary.active = true;

    let mut secondary = TargetConfig::new(TargetKey::Secondary);
    if let Some(path) = secondary_path {
        secondary.host = Some(path.to_string());
        secondary.active = true;
    }

    Registry::new(primary, secondary, TargetKey::Primary).expect("valid registry")
}

/// Connection manager rooted in the temp dir (all test paths are absolute
/// anyway).
pub fn manager() -> ConnectionManager {
    ConnectionManager::new(env::temp_dir())
}

/// Count rows of a table directly, bypassing the application.
pub fn count_rows(db_path: &str, table: &str) -> i64 {
    let conn = rusqlite::Connection::open(db_path).expect("open db");
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .expect("count rows")
}

/// Read the stored schema version directly.
pub fn schema_version(db_path: &str) -> i64 {
    let conn = rusqlite::Connection::open(db_path).expect("open db");
    conn.query_row(
        "SELECT schema_version FROM settings ORDER BY id LIMIT 1",
        [],
        |r| r.get(0),
    )
    .unwrap_or(0)
}
