//! Idempotent schema migrations, applied per target.
//!
//! Every step is guarded by an existence check (`sqlite_master` for tables,
//! `PRAGMA table_info` for columns), so the whole routine is safe to run
//! repeatedly and against databases left at any intermediate revision.

use crate::db::log;
use crate::db::manager::ConnectionManager;
use crate::db::queries;
use crate::db::registry::Registry;
use crate::errors::{AppError, AppResult};
use crate::models::settings::StoreSettings;
use crate::models::target::{TargetKey, TargetSelector};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

/// Structural revision this build expects on every target.
pub const CURRENT_VERSION: i64 = 3;

/// Schema state of one target. The single capability flag consulted by every
/// feature that depends on newer columns (shift editing, device tracking).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SchemaState {
    pub version: i64,
    pub ok: bool,
}

impl SchemaState {
    pub fn read(conn: &Connection) -> Self {
        let version = conn
            .query_row(
                "SELECT schema_version FROM settings ORDER BY id LIMIT 1",
                [],
                |row| row.get::<_, i64>(0),
            )
            .unwrap_or(0);
        Self {
            version,
            ok: version == CURRENT_VERSION,
        }
    }
}

/// Per-target outcome of a schema operation.
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    pub target: TargetKey,
    pub ok: bool,
    pub message: String,
}

pub(crate) fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let found: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(found.is_some())
}

pub(crate) fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Revision 1: base tables and indexes.
fn create_base_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            code        TEXT NOT NULL UNIQUE,
            external_id TEXT,
            hourly_rate REAL NOT NULL DEFAULT 0,
            active      INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS time_entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            clock_in    TEXT NOT NULL,
            clock_out   TEXT,
            manual      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS settings (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            currency       TEXT NOT NULL DEFAULT 'ILS',
            pin_hash       TEXT,
            db_host        TEXT,
            db_port        INTEGER,
            db_user        TEXT,
            db_secret      TEXT,
            schema_version INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS audit_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            at        TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_time_entries_employee
            ON time_entries(employee_id, clock_out);
        CREATE INDEX IF NOT EXISTS idx_time_entries_clock_in
            ON time_entries(clock_in);
        "#,
    )
}

/// Revision 2: device fingerprints on clock events, branding columns.
fn upgrade_device_tracking(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut applied = Vec::new();

    let entry_columns = [
        (
            "clock_in_device_id",
            "ALTER TABLE time_entries ADD COLUMN clock_in_device_id TEXT",
        ),
        (
            "clock_out_device_id",
            "ALTER TABLE time_entries ADD COLUMN clock_out_device_id TEXT",
        ),
    ];
    for (column, ddl) in entry_columns {
        if !column_exists(conn, "time_entries", column)? {
            conn.execute(ddl, [])?;
            applied.push(column);
        }
    }

    let settings_columns = [
        ("brand_name", "ALTER TABLE settings ADD COLUMN brand_name TEXT"),
        ("theme_color", "ALTER TABLE settings ADD COLUMN theme_color TEXT"),
        (
            "show_device_ids",
            "ALTER TABLE settings ADD COLUMN show_device_ids INTEGER NOT NULL DEFAULT 1",
        ),
    ];
    for (column, ddl) in settings_columns {
        if !column_exists(conn, "settings", column)? {
            conn.execute(ddl, [])?;
            applied.push(column);
        }
    }

    Ok(applied)
}

/// Revision 3: secondary-target configuration and admin accounts.
fn upgrade_replication_settings(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut applied = Vec::new();

    let settings_columns = [
        (
            "secondary_db_host",
            "ALTER TABLE settings ADD COLUMN secondary_db_host TEXT",
        ),
        (
            "secondary_db_port",
            "ALTER TABLE settings ADD COLUMN secondary_db_port INTEGER",
        ),
        (
            "secondary_db_user",
            "ALTER TABLE settings ADD COLUMN secondary_db_user TEXT",
        ),
        (
            "secondary_db_secret",
            "ALTER TABLE settings ADD COLUMN secondary_db_secret TEXT",
        ),
        (
            "primary_target",
            "ALTER TABLE settings ADD COLUMN primary_target TEXT DEFAULT 'primary'",
        ),
        (
            "primary_active",
            "ALTER TABLE settings ADD COLUMN primary_active INTEGER NOT NULL DEFAULT 1",
        ),
        (
            "secondary_active",
            "ALTER TABLE settings ADD COLUMN secondary_active INTEGER NOT NULL DEFAULT 0",
        ),
    ];
    for (column, ddl) in settings_columns {
        if !column_exists(conn, "settings", column)? {
            conn.execute(ddl, [])?;
            applied.push(column);
        }
    }

    if !table_exists(conn, "admin_accounts")? {
        conn.execute_batch(
            r#"
            CREATE TABLE admin_accounts (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL UNIQUE,
                pin_hash   TEXT NOT NULL,
                active     INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        applied.push("admin_accounts");
    }

    Ok(applied)
}

/// Seed the settings row on a fresh target, or stamp the version after an
/// upgrade of an existing one.
fn seed_or_stamp_settings(conn: &Connection, registry: &Registry) -> rusqlite::Result<()> {
    let rows: i64 = conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
    if rows == 0 {
        let seeded = StoreSettings::bootstrap(
            registry.target(TargetKey::Primary),
            registry.target(TargetKey::Secondary),
            registry.designated(),
            CURRENT_VERSION,
        );
        queries::insert_settings_row(conn, &seeded)?;
    } else {
        conn.execute(
            "UPDATE settings SET schema_version = ?1 WHERE schema_version < ?1",
            [CURRENT_VERSION],
        )?;
    }
    Ok(())
}

/// Bring one target to `CURRENT_VERSION`. Safe to call repeatedly.
pub fn ensure_schema(conn: &Connection, key: TargetKey, registry: &Registry) -> AppResult<()> {
    let schema = |e: rusqlite::Error| AppError::Schema {
        target: key,
        reason: e.to_string(),
    };

    let fresh = !table_exists(conn, "settings").map_err(schema)?;

    create_base_tables(conn).map_err(schema)?;
    let mut applied: Vec<&'static str> = Vec::new();
    applied.extend(upgrade_device_tracking(conn).map_err(schema)?);
    applied.extend(upgrade_replication_settings(conn).map_err(schema)?);
    seed_or_stamp_settings(conn, registry).map_err(schema)?;

    if fresh {
        log::audit(conn, "schema_created", key.as_str(), "base schema created")?;
    }
    for step in applied {
        log::audit(
            conn,
            "migration_applied",
            key.as_str(),
            &format!("added {}", step),
        )?;
    }

    Ok(())
}

/// Run `ensure_schema` for every target addressed by the selector.
///
/// Targets are migrated independently: one target's failure is reported in
/// its own outcome and never blocks the others.
pub fn ensure_schema_selector(
    manager: &ConnectionManager,
    registry: &Registry,
    selector: TargetSelector,
) -> Vec<TargetOutcome> {
    let mut outcomes = Vec::new();
    for target in registry.select(selector) {
        if !target.defined() {
            outcomes.push(TargetOutcome {
                target: target.key,
                ok: true,
                message: "no connection details configured; skipped".to_string(),
            });
            continue;
        }
        let result = manager
            .open(target)
            .and_then(|conn| ensure_schema(&conn, target.key, registry));
        outcomes.push(match result {
            Ok(()) => TargetOutcome {
                target: target.key,
                ok: true,
                message: format!("schema up to date (version {})", CURRENT_VERSION),
            },
            Err(e) => TargetOutcome {
                target: target.key,
                ok: false,
                message: e.to_string(),
            },
        });
    }
    outcomes
}
