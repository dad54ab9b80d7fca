//! Per-employee clock state machine.
//!
//! State is derived from the most recent time entry on the read-of-record
//! target: an open entry means IN, anything else means OUT. Redundant
//! transitions (double clock-in/out) are normal outcomes reported through
//! `ClockStatus`, never errors.

use crate::db::coordinator::{Coordinator, Replicated};
use crate::db::log;
use crate::db::migrate::SchemaState;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::employee::Employee;
use crate::models::time_entry::{OpenShift, TimeEntry};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStatus {
    ClockedIn,
    AlreadyIn,
    ClockedOut,
    NotIn,
}

impl ClockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockStatus::ClockedIn => "clocked_in",
            ClockStatus::AlreadyIn => "already_in",
            ClockStatus::ClockedOut => "clocked_out",
            ClockStatus::NotIn => "not_in",
        }
    }
}

/// Whether an employee is currently on shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftState {
    In,
    Out,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClockOutcome {
    pub status: ClockStatus,
    pub message: String,
    pub entry_id: Option<i64>,
    /// Same device for clock-in and clock-out. Informational only.
    pub device_match: Option<bool>,
}

fn active_employee(conn: &Connection, code: &str) -> AppResult<Employee> {
    queries::employee_by_code(conn, code)?
        .filter(|e| e.active)
        .ok_or_else(|| AppError::UnknownEmployee(code.to_string()))
}

/// Shift editing and manual entries depend on the newer columns, so they are
/// switched off until the target reaches the current schema version.
fn require_current_schema(conn: &Connection) -> AppResult<()> {
    if SchemaState::read(conn).ok {
        Ok(())
    } else {
        Err(AppError::SchemaGate)
    }
}

/// Clock an employee in. Valid only from OUT; an open shift makes this an
/// idempotent no-op reported as `already_in`.
pub fn clock_in(
    co: &Coordinator,
    code: &str,
    device_id: Option<&str>,
) -> AppResult<Replicated<ClockOutcome>> {
    // One timestamp for the whole call so every target stores the same row.
    let now = Utc::now();
    co.execute(|conn| {
        let employee = active_employee(conn, code)?;
        match queries::open_entry(conn, employee.id)? {
            Some(open) => Ok(ClockOutcome {
                status: ClockStatus::AlreadyIn,
                message: format!("{} is already on an open shift", employee.name),
                entry_id: Some(open.id),
                device_match: None,
            }),
            None => {
                let id = queries::insert_open_entry(conn, employee.id, &now, device_id)?;
                Ok(ClockOutcome {
                    status: ClockStatus::ClockedIn,
                    message: format!("{} clocked in", employee.name),
                    entry_id: Some(id),
                    device_match: None,
                })
            }
        }
    })
}

/// Clock an employee out. Valid only from IN; without an open shift this is
/// reported as `not_in`.
pub fn clock_out(
    co: &Coordinator,
    code: &str,
    device_id: Option<&str>,
) -> AppResult<Replicated<ClockOutcome>> {
    let now = Utc::now();
    co.execute(|conn| {
        let employee = active_employee(conn, code)?;
        match queries::open_entry(conn, employee.id)? {
            None => Ok(ClockOutcome {
                status: ClockStatus::NotIn,
                message: format!("{} is not on an open shift", employee.name),
                entry_id: None,
                device_match: None,
            }),
            Some(open) => {
                queries::close_entry(conn, open.id, &now, device_id)?;
                let closed = queries::entry_by_id(conn, open.id)?
                    .ok_or_else(|| AppError::Other("time entry vanished after close".to_string()))?;
                let minutes = closed.duration_minutes().unwrap_or(0).max(0);
                Ok(ClockOutcome {
                    status: ClockStatus::ClockedOut,
                    message: format!("{} clocked out after {} min", employee.name, minutes),
                    entry_id: Some(closed.id),
                    device_match: closed.device_match(),
                })
            }
        }
    })
}

/// Current state of one employee, read from the read-of-record target.
pub fn status(co: &Coordinator, code: &str) -> AppResult<ShiftState> {
    co.read(|conn| {
        let employee = active_employee(conn, code)?;
        Ok(match queries::open_entry(conn, employee.id)? {
            Some(_) => ShiftState::In,
            None => ShiftState::Out,
        })
    })
}

/// All open shifts with elapsed minutes, for the attendance board.
pub fn active_shifts(co: &Coordinator) -> AppResult<Vec<OpenShift>> {
    let now = Utc::now();
    co.read(|conn| queries::list_open_shifts(conn, &now))
}

/// Admin path: insert a fully closed entry.
pub fn add_manual_entry(
    co: &Coordinator,
    admin: &str,
    code: &str,
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
) -> AppResult<Replicated<i64>> {
    if clock_out <= clock_in {
        return Err(AppError::Validation(
            "clock-out must be after clock-in".to_string(),
        ));
    }
    co.execute(|conn| {
        require_current_schema(conn)?;
        let employee = queries::employee_by_code(conn, code)?
            .ok_or_else(|| AppError::UnknownEmployee(code.to_string()))?;
        let id = queries::insert_manual_entry(conn, employee.id, &clock_in, &clock_out)?;
        log::audit(
            conn,
            "manual_entry",
            admin,
            &format!(
                "added shift for {} ({} -> {})",
                employee.code,
                clock_in.to_rfc3339(),
                clock_out.to_rfc3339()
            ),
        )?;
        Ok(id)
    })
}

/// Admin path: edit the timestamps of an existing entry.
pub fn edit_entry(
    co: &Coordinator,
    admin: &str,
    entry_id: i64,
    new_clock_in: Option<DateTime<Utc>>,
    new_clock_out: Option<DateTime<Utc>>,
) -> AppResult<Replicated<TimeEntry>> {
    co.execute(|conn| {
        require_current_schema(conn)?;
        let entry = queries::entry_by_id(conn, entry_id)?
            .ok_or_else(|| AppError::Validation(format!("time entry {} not found", entry_id)))?;

        let clock_in = new_clock_in.unwrap_or(entry.clock_in);
        let clock_out = new_clock_out.or(entry.clock_out);
        if let Some(out) = clock_out
            && out <= clock_in
        {
            return Err(AppError::Validation(
                "clock-out must be after clock-in".to_string(),
            ));
        }

        queries::update_entry_times(conn, entry_id, &clock_in, clock_out.as_ref())?;
        log::audit(
            conn,
            "entry_edited",
            admin,
            &format!("edited time entry {}", entry_id),
        )?;
        queries::entry_by_id(conn, entry_id)?
            .ok_or_else(|| AppError::Other("time entry vanished after update".to_string()))
    })
}

/// Admin path: delete an entry. Rows are never removed implicitly.
pub fn delete_entry(co: &Coordinator, admin: &str, entry_id: i64) -> AppResult<Replicated<usize>> {
    co.execute(|conn| {
        require_current_schema(conn)?;
        let deleted = queries::delete_entry(conn, entry_id)?;
        if deleted == 0 {
            return Err(AppError::Validation(format!(
                "time entry {} not found",
                entry_id
            )));
        }
        log::audit(
            conn,
            "entry_deleted",
            admin,
            &format!("deleted time entry {}", entry_id),
        )?;
        Ok(deleted)
    })
}
