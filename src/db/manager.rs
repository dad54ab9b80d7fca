//! Per-target connection factory and connectivity probes.

use crate::db::migrate::{self, CURRENT_VERSION};
use crate::errors::{AppError, AppResult};
use crate::models::target::{TargetConfig, TargetKey};
use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on how long a connection may sit on a locked database.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const REQUIRED_TABLES: [&str; 3] = ["employees", "time_entries", "settings"];

/// Result of a connectivity probe. Never carried as an error: a failed probe
/// is an `ok = false` report.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub target: TargetKey,
    pub ok: bool,
    pub message: String,
    pub schema_version: Option<i64>,
    pub schema_ok: Option<bool>,
}

pub struct ConnectionManager {
    data_dir: PathBuf,
}

impl ConnectionManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Database location for a target. The host field carries the file path
    /// for the embedded engine; relative paths live under the data dir.
    pub fn database_path(&self, target: &TargetConfig) -> AppResult<PathBuf> {
        let host = target
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::Connectivity {
                target: target.key,
                reason: "no connection details configured".to_string(),
            })?;
        let path = Path::new(host);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.data_dir.join(path))
        }
    }

    /// Open a connection to one target. Lock waits are bounded so a busy
    /// database surfaces as a target-local failure instead of a hang.
    pub fn open(&self, target: &TargetConfig) -> AppResult<Connection> {
        let path = self.database_path(target)?;
        let connectivity = |e: rusqlite::Error| AppError::Connectivity {
            target: target.key,
            reason: e.to_string(),
        };
        let conn = Connection::open(&path).map_err(connectivity)?;
        conn.busy_timeout(CONNECT_TIMEOUT).map_err(connectivity)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(connectivity)?;
        Ok(conn)
    }

    /// Schema version stored on a target, if any.
    pub fn probe_schema_version(conn: &Connection) -> Option<i64> {
        conn.query_row(
            "SELECT schema_version FROM settings ORDER BY id LIMIT 1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .ok()
    }

    /// Lightweight connect plus schema probe. Never propagates an error past
    /// this boundary; every failure mode becomes a structured report.
    pub fn test_connection(&self, target: &TargetConfig) -> ConnectionReport {
        let conn = match self.open(target) {
            Ok(conn) => conn,
            Err(e) => {
                return ConnectionReport {
                    target: target.key,
                    ok: false,
                    message: e.to_string(),
                    schema_version: None,
                    schema_ok: None,
                };
            }
        };

        if let Err(e) = conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)) {
            return ConnectionReport {
                target: target.key,
                ok: false,
                message: format!("{}: probe query failed: {}", target.key, e),
                schema_version: None,
                schema_ok: None,
            };
        }

        let mut missing: Vec<&str> = Vec::new();
        for table in REQUIRED_TABLES {
            match migrate::table_exists(&conn, table) {
                Ok(true) => {}
                Ok(false) => missing.push(table),
                Err(e) => {
                    return ConnectionReport {
                        target: target.key,
                        ok: false,
                        message: format!("{}: schema inspection failed: {}", target.key, e),
                        schema_version: None,
                        schema_ok: None,
                    };
                }
            }
        }

        let schema_version = Self::probe_schema_version(&conn).unwrap_or(0);
        let schema_ok = schema_version == CURRENT_VERSION;

        if !missing.is_empty() {
            return ConnectionReport {
                target: target.key,
                ok: false,
                message: format!(
                    "{}: connection succeeded but missing tables: {} (schema version {})",
                    target.key,
                    missing.join(", "),
                    schema_version
                ),
                schema_version: Some(schema_version),
                schema_ok: Some(false),
            };
        }

        let freshness = if schema_ok {
            "up to date"
        } else {
            "upgrade required"
        };
        ConnectionReport {
            target: target.key,
            ok: true,
            message: format!(
                "{}: connection and schema verified (schema version {}, {})",
                target.key, schema_version, freshness
            ),
            schema_version: Some(schema_version),
            schema_ok: Some(schema_ok),
        }
    }
}
