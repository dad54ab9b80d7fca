//! Row mapping and entity SQL for employees, time entries, settings and
//! admin accounts. All functions operate on a single connection; replication
//! across targets is the coordinator's job.

use crate::errors::{AppError, AppResult};
use crate::models::employee::{Employee, EmployeePatch, NewEmployee};
use crate::models::settings::{AdminAccount, StoreSettings};
use crate::models::target::{TargetConfig, TargetKey};
use crate::models::time_entry::{OpenShift, TimeEntry};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(crate) fn ts_to_db(t: &DateTime<Utc>) -> String {
    t.to_rfc3339()
}

pub(crate) fn ts_from_db(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

const EMPLOYEE_COLUMNS: &str = "id, name, code, external_id, hourly_rate, active";

fn map_employee(row: &Row) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        external_id: row.get("external_id")?,
        hourly_rate: row.get("hourly_rate")?,
        active: row.get::<_, i64>("active")? != 0,
    })
}

pub fn employee_by_code(conn: &Connection, code: &str) -> AppResult<Option<Employee>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM employees WHERE code = ?1",
        EMPLOYEE_COLUMNS
    ))?;
    Ok(stmt.query_row([code], map_employee).optional()?)
}

pub fn employee_by_id(conn: &Connection, id: i64) -> AppResult<Option<Employee>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM employees WHERE id = ?1",
        EMPLOYEE_COLUMNS
    ))?;
    Ok(stmt.query_row([id], map_employee).optional()?)
}

pub fn list_employees(conn: &Connection) -> AppResult<Vec<Employee>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM employees ORDER BY name ASC",
        EMPLOYEE_COLUMNS
    ))?;
    let rows = stmt.query_map([], map_employee)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert an employee. A duplicate code surfaces as a validation error, not
/// a database error.
pub fn insert_employee(conn: &Connection, new: &NewEmployee) -> AppResult<Employee> {
    let inserted = conn.execute(
        "INSERT INTO employees (name, code, external_id, hourly_rate, active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.name,
            new.code,
            new.external_id,
            new.hourly_rate,
            new.active as i64,
        ],
    );
    match inserted {
        Ok(_) => {
            let id = conn.last_insert_rowid();
            employee_by_id(conn, id)?
                .ok_or_else(|| AppError::Other("employee vanished after insert".to_string()))
        }
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Validation(format!(
                "employee code '{}' is already in use",
                new.code
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn update_employee(conn: &Connection, id: i64, patch: &EmployeePatch) -> AppResult<Employee> {
    let mut employee = employee_by_id(conn, id)?
        .ok_or_else(|| AppError::Validation(format!("employee {} not found", id)))?;

    if let Some(name) = &patch.name {
        employee.name = name.clone();
    }
    if let Some(code) = &patch.code {
        employee.code = code.clone();
    }
    if let Some(external_id) = &patch.external_id {
        employee.external_id = external_id.clone();
    }
    if let Some(rate) = patch.hourly_rate {
        employee.hourly_rate = rate;
    }
    if let Some(active) = patch.active {
        employee.active = active;
    }

    let updated = conn.execute(
        "UPDATE employees
         SET name = ?1, code = ?2, external_id = ?3, hourly_rate = ?4, active = ?5
         WHERE id = ?6",
        params![
            employee.name,
            employee.code,
            employee.external_id,
            employee.hourly_rate,
            employee.active as i64,
            id,
        ],
    );
    match updated {
        Ok(_) => Ok(employee),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Validation(format!(
                "employee code '{}' is already in use",
                employee.code
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete an employee together with their time entries. Returns the number
/// of deleted employee rows (0 when the id is unknown).
pub fn delete_employee(conn: &Connection, id: i64) -> AppResult<usize> {
    conn.execute("DELETE FROM time_entries WHERE employee_id = ?1", [id])?;
    Ok(conn.execute("DELETE FROM employees WHERE id = ?1", [id])?)
}

// ---------------------------------------------------------------------------
// Time entries
// ---------------------------------------------------------------------------

const ENTRY_COLUMNS: &str =
    "id, employee_id, clock_in, clock_out, clock_in_device_id, clock_out_device_id, manual";

fn map_entry(row: &Row) -> rusqlite::Result<TimeEntry> {
    let clock_in: String = row.get("clock_in")?;
    let clock_out: Option<String> = row.get("clock_out")?;
    Ok(TimeEntry {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        clock_in: ts_from_db(&clock_in)?,
        clock_out: match clock_out {
            Some(s) => Some(ts_from_db(&s)?),
            None => None,
        },
        clock_in_device_id: row.get("clock_in_device_id")?,
        clock_out_device_id: row.get("clock_out_device_id")?,
        manual: row.get::<_, i64>("manual")? != 0,
    })
}

/// The employee's open entry, if any. Most recent first in case historical
/// drift ever left more than one behind.
pub fn open_entry(conn: &Connection, employee_id: i64) -> AppResult<Option<TimeEntry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM time_entries
         WHERE employee_id = ?1 AND clock_out IS NULL
         ORDER BY clock_in DESC
         LIMIT 1",
        ENTRY_COLUMNS
    ))?;
    Ok(stmt.query_row([employee_id], map_entry).optional()?)
}

pub fn entry_by_id(conn: &Connection, id: i64) -> AppResult<Option<TimeEntry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM time_entries WHERE id = ?1",
        ENTRY_COLUMNS
    ))?;
    Ok(stmt.query_row([id], map_entry).optional()?)
}

pub fn insert_open_entry(
    conn: &Connection,
    employee_id: i64,
    clock_in: &DateTime<Utc>,
    device_id: Option<&str>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO time_entries (employee_id, clock_in, clock_in_device_id, manual)
         VALUES (?1, ?2, ?3, 0)",
        params![employee_id, ts_to_db(clock_in), device_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn close_entry(
    conn: &Connection,
    entry_id: i64,
    clock_out: &DateTime<Utc>,
    device_id: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE time_entries
         SET clock_out = ?1, clock_out_device_id = ?2
         WHERE id = ?3",
        params![ts_to_db(clock_out), device_id, entry_id],
    )?;
    Ok(())
}

pub fn insert_manual_entry(
    conn: &Connection,
    employee_id: i64,
    clock_in: &DateTime<Utc>,
    clock_out: &DateTime<Utc>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO time_entries (employee_id, clock_in, clock_out, manual)
         VALUES (?1, ?2, ?3, 1)",
        params![employee_id, ts_to_db(clock_in), ts_to_db(clock_out)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_entry_times(
    conn: &Connection,
    entry_id: i64,
    clock_in: &DateTime<Utc>,
    clock_out: Option<&DateTime<Utc>>,
) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE time_entries
         SET clock_in = ?1, clock_out = ?2, manual = 1
         WHERE id = ?3",
        params![ts_to_db(clock_in), clock_out.map(ts_to_db), entry_id],
    )?)
}

pub fn delete_entry(conn: &Connection, entry_id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM time_entries WHERE id = ?1", [entry_id])?)
}

pub fn count_open_entries(conn: &Connection, employee_id: i64) -> AppResult<i64> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*) FROM time_entries WHERE employee_id = ?1 AND clock_out IS NULL",
    )?;
    Ok(stmt.query_row([employee_id], |row| row.get(0))?)
}

/// Open shifts across all employees, oldest first.
pub fn list_open_shifts(conn: &Connection, now: &DateTime<Utc>) -> AppResult<Vec<OpenShift>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.id, t.employee_id, e.name, t.clock_in
         FROM time_entries t
         JOIN employees e ON e.id = t.employee_id
         WHERE t.clock_out IS NULL
         ORDER BY t.clock_in ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let clock_in: String = row.get(3)?;
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            ts_from_db(&clock_in)?,
        ))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (entry_id, employee_id, employee_name, clock_in) = r?;
        let elapsed_minutes = (*now - clock_in).num_minutes().max(0);
        out.push(OpenShift {
            entry_id,
            employee_id,
            employee_name,
            clock_in,
            elapsed_minutes,
        });
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn map_settings(row: &Row) -> rusqlite::Result<StoreSettings> {
    let primary = TargetConfig {
        key: TargetKey::Primary,
        host: row.get("db_host")?,
        port: row.get::<_, Option<i64>>("db_port")?.map(|p| p as u16),
        user: row.get("db_user")?,
        secret: row.get("db_secret")?,
        active: row.get::<_, i64>("primary_active")? != 0,
    };
    let secondary = TargetConfig {
        key: TargetKey::Secondary,
        host: row.get("secondary_db_host")?,
        port: row
            .get::<_, Option<i64>>("secondary_db_port")?
            .map(|p| p as u16),
        user: row.get("secondary_db_user")?,
        secret: row.get("secondary_db_secret")?,
        active: row.get::<_, i64>("secondary_active")? != 0,
    };
    let designated: Option<String> = row.get("primary_target")?;
    Ok(StoreSettings {
        currency: row.get("currency")?,
        brand_name: row
            .get::<_, Option<String>>("brand_name")?
            .unwrap_or_default(),
        theme_color: row
            .get::<_, Option<String>>("theme_color")?
            .unwrap_or_default(),
        pin_hash: row.get("pin_hash")?,
        show_device_ids: row.get::<_, i64>("show_device_ids")? != 0,
        primary,
        secondary,
        primary_target: designated
            .as_deref()
            .and_then(TargetKey::from_str)
            .unwrap_or(TargetKey::Primary),
        schema_version: row.get("schema_version")?,
    })
}

/// The settings row, when present. Requires the replication columns, so
/// callers gate on the schema version first.
pub fn load_settings(conn: &Connection) -> AppResult<Option<StoreSettings>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM settings ORDER BY id LIMIT 1")?;
    Ok(stmt.query_row([], map_settings).optional()?)
}

pub fn insert_settings_row(conn: &Connection, s: &StoreSettings) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO settings (
            currency, pin_hash, brand_name, theme_color, show_device_ids,
            db_host, db_port, db_user, db_secret, primary_active,
            secondary_db_host, secondary_db_port, secondary_db_user,
            secondary_db_secret, secondary_active, primary_target, schema_version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            s.currency,
            s.pin_hash,
            s.brand_name,
            s.theme_color,
            s.show_device_ids as i64,
            s.primary.host,
            s.primary.port.map(|p| p as i64),
            s.primary.user,
            s.primary.secret,
            s.primary.active as i64,
            s.secondary.host,
            s.secondary.port.map(|p| p as i64),
            s.secondary.user,
            s.secondary.secret,
            s.secondary.active as i64,
            s.primary_target.as_str(),
            s.schema_version,
        ],
    )
}

pub fn update_settings_row(conn: &Connection, s: &StoreSettings) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE settings SET
            currency = ?1, pin_hash = ?2, brand_name = ?3, theme_color = ?4,
            show_device_ids = ?5, db_host = ?6, db_port = ?7, db_user = ?8,
            db_secret = ?9, primary_active = ?10, secondary_db_host = ?11,
            secondary_db_port = ?12, secondary_db_user = ?13,
            secondary_db_secret = ?14, secondary_active = ?15,
            primary_target = ?16, schema_version = ?17
         WHERE id = (SELECT MIN(id) FROM settings)",
        params![
            s.currency,
            s.pin_hash,
            s.brand_name,
            s.theme_color,
            s.show_device_ids as i64,
            s.primary.host,
            s.primary.port.map(|p| p as i64),
            s.primary.user,
            s.primary.secret,
            s.primary.active as i64,
            s.secondary.host,
            s.secondary.port.map(|p| p as i64),
            s.secondary.user,
            s.secondary.secret,
            s.secondary.active as i64,
            s.primary_target.as_str(),
            s.schema_version,
        ],
    )?;
    if changed == 0 {
        insert_settings_row(conn, s)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Admin accounts
// ---------------------------------------------------------------------------

fn map_admin(row: &Row) -> rusqlite::Result<AdminAccount> {
    Ok(AdminAccount {
        id: row.get("id")?,
        name: row.get("name")?,
        pin_hash: row.get("pin_hash")?,
        active: row.get::<_, i64>("active")? != 0,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn upsert_admin(conn: &Connection, name: &str, pin_hash: &str) -> AppResult<AdminAccount> {
    let now = Utc::now().to_rfc3339();
    let changed = conn.execute(
        "UPDATE admin_accounts SET pin_hash = ?2, active = 1, updated_at = ?3 WHERE name = ?1",
        params![name, pin_hash, now],
    )?;
    if changed == 0 {
        conn.execute(
            "INSERT INTO admin_accounts (name, pin_hash, active, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)",
            params![name, pin_hash, now],
        )?;
    }
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, pin_hash, active, created_at, updated_at
         FROM admin_accounts WHERE name = ?1",
    )?;
    stmt.query_row([name], map_admin)
        .optional()?
        .ok_or_else(|| AppError::Other("admin account vanished after upsert".to_string()))
}

pub fn list_admins(conn: &Connection) -> AppResult<Vec<AdminAccount>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, pin_hash, active, created_at, updated_at
         FROM admin_accounts ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([], map_admin)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
