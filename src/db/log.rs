//! Persisted audit trail: admin actions and applied migrations land in the
//! `audit_log` table of every target the enclosing mutation reaches.

use crate::errors::AppResult;
use chrono::Utc;
use rusqlite::{Connection, params};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub at: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

/// Write one audit line.
pub fn audit(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();
    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit_log (at, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    stmt.execute(params![now, operation, target, message])?;
    Ok(())
}

/// Most recent audit lines, newest first.
pub fn list_audit(conn: &Connection, limit: i64) -> AppResult<Vec<AuditRecord>> {
    let mut stmt = conn.prepare_cached(
        "SELECT at, operation, target, message
         FROM audit_log
         ORDER BY id DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map([limit], |row| {
        Ok(AuditRecord {
            at: row.get(0)?,
            operation: row.get(1)?,
            target: row.get(2)?,
            message: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
