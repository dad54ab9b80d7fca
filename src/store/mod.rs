//! Settings store and entity CRUD routed through the replicated coordinator.
//!
//! The settings row is an entity like any other: it is written through the
//! coordinator and replicated to every active target. A settings write is
//! also the only way target configuration changes, so callers rebuild the
//! registry from the returned row and re-probe schema state afterwards.

use crate::db::coordinator::{Coordinator, Replicated};
use crate::db::log::{self, AuditRecord};
use crate::db::migrate::{CURRENT_VERSION, SchemaState};
use crate::db::queries;
use crate::db::registry::Registry;
use crate::errors::{AppError, AppResult};
use crate::models::employee::{Employee, EmployeePatch, NewEmployee};
use crate::models::settings::{AdminAccount, SettingsPatch, StoreSettings};
use crate::models::target::TargetKey;
use rusqlite::Connection;

/// Settings a target would carry before its first write, derived from the
/// registry in use.
pub fn default_settings(registry: &Registry) -> StoreSettings {
    StoreSettings::bootstrap(
        registry.target(TargetKey::Primary),
        registry.target(TargetKey::Secondary),
        registry.designated(),
        CURRENT_VERSION,
    )
}

fn settings_or_default(conn: &Connection, registry: &Registry) -> AppResult<StoreSettings> {
    if SchemaState::read(conn).version >= CURRENT_VERSION
        && let Some(s) = queries::load_settings(conn)?
    {
        return Ok(s);
    }
    Ok(default_settings(registry))
}

/// Current settings from the read-of-record target, falling back to the
/// bootstrap defaults when no row exists yet.
pub fn load_settings(co: &Coordinator) -> AppResult<StoreSettings> {
    co.read(|conn| settings_or_default(conn, co.registry()))
}

fn apply_patch(s: &mut StoreSettings, patch: &SettingsPatch) {
    fn normalize(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    if let Some(currency) = &patch.currency {
        s.currency = currency.clone();
    }
    if let Some(brand) = &patch.brand_name {
        s.brand_name = brand.clone();
    }
    if let Some(theme) = &patch.theme_color {
        s.theme_color = theme.clone();
    }
    if let Some(pin_hash) = &patch.pin_hash {
        s.pin_hash = Some(pin_hash.clone());
    }
    if let Some(show) = patch.show_device_ids {
        s.show_device_ids = show;
    }

    if let Some(host) = &patch.primary_host {
        s.primary.host = normalize(host);
    }
    if let Some(port) = patch.primary_port {
        s.primary.port = Some(port);
    }
    if let Some(user) = &patch.primary_user {
        s.primary.user = normalize(user);
    }
    if let Some(secret) = &patch.primary_secret {
        s.primary.secret = Some(secret.clone());
    }
    if let Some(active) = patch.primary_active {
        s.primary.active = active;
    }

    if let Some(host) = &patch.secondary_host {
        s.secondary.host = normalize(host);
    }
    if let Some(port) = patch.secondary_port {
        s.secondary.port = Some(port);
    }
    if let Some(user) = &patch.secondary_user {
        s.secondary.user = normalize(user);
    }
    if let Some(secret) = &patch.secondary_secret {
        s.secondary.secret = Some(secret.clone());
    }
    if let Some(active) = patch.secondary_active {
        s.secondary.active = active;
    }

    if let Some(designated) = patch.primary_target {
        s.primary_target = designated;
    }
}

/// Apply a settings patch and replicate the row.
///
/// The resulting target set is validated before the write: an empty active
/// set is rejected, and a read-of-record designation pointing at an unusable
/// target silently moves to the other one (same rule the registry applies).
pub fn update_settings(
    co: &Coordinator,
    admin: &str,
    patch: &SettingsPatch,
) -> AppResult<Replicated<StoreSettings>> {
    co.execute(|conn| {
        require_current_schema(conn)?;
        let mut s = settings_or_default(conn, co.registry())?;
        apply_patch(&mut s, patch);

        if !s.primary.configured() && !s.secondary.configured() {
            return Err(AppError::Config(
                "at least one storage target must be active and defined".to_string(),
            ));
        }
        if !s.target(s.primary_target).configured() {
            s.primary_target = s.primary_target.other();
        }
        s.schema_version = CURRENT_VERSION;

        queries::update_settings_row(conn, &s)?;
        log::audit(conn, "settings_updated", admin, "settings row updated")?;
        Ok(s)
    })
}

fn require_current_schema(conn: &Connection) -> AppResult<()> {
    if SchemaState::read(conn).ok {
        Ok(())
    } else {
        Err(AppError::SchemaGate)
    }
}

// ---------------------------------------------------------------------------
// Employee CRUD
// ---------------------------------------------------------------------------

fn validate_code(code: &str) -> AppResult<()> {
    if code.trim().is_empty() {
        return Err(AppError::Validation(
            "employee code must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_external_id(external_id: Option<&str>) -> AppResult<()> {
    if let Some(id) = external_id
        && (id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(AppError::Validation(format!(
            "external id '{}' must be a numeric string",
            id
        )));
    }
    Ok(())
}

fn validate_rate(rate: f64) -> AppResult<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(AppError::Validation(
            "hourly rate must be zero or positive".to_string(),
        ));
    }
    Ok(())
}

pub fn create_employee(
    co: &Coordinator,
    admin: &str,
    new: &NewEmployee,
) -> AppResult<Replicated<Employee>> {
    validate_code(&new.code)?;
    validate_external_id(new.external_id.as_deref())?;
    validate_rate(new.hourly_rate)?;
    co.execute(|conn| {
        let employee = queries::insert_employee(conn, new)?;
        log::audit(
            conn,
            "employee_created",
            admin,
            &format!("created employee '{}'", employee.code),
        )?;
        Ok(employee)
    })
}

pub fn update_employee(
    co: &Coordinator,
    admin: &str,
    id: i64,
    patch: &EmployeePatch,
) -> AppResult<Replicated<Employee>> {
    if let Some(code) = &patch.code {
        validate_code(code)?;
    }
    if let Some(external_id) = &patch.external_id {
        validate_external_id(external_id.as_deref())?;
    }
    if let Some(rate) = patch.hourly_rate {
        validate_rate(rate)?;
    }
    co.execute(|conn| {
        let employee = queries::update_employee(conn, id, patch)?;
        log::audit(
            conn,
            "employee_updated",
            admin,
            &format!("updated employee '{}'", employee.code),
        )?;
        Ok(employee)
    })
}

/// Remove an employee and their entries. Explicit admin action only.
pub fn delete_employee(co: &Coordinator, admin: &str, id: i64) -> AppResult<Replicated<usize>> {
    co.execute(|conn| {
        let deleted = queries::delete_employee(conn, id)?;
        if deleted == 0 {
            return Err(AppError::Validation(format!("employee {} not found", id)));
        }
        log::audit(
            conn,
            "employee_deleted",
            admin,
            &format!("deleted employee {}", id),
        )?;
        Ok(deleted)
    })
}

pub fn list_employees(co: &Coordinator) -> AppResult<Vec<Employee>> {
    co.read(queries::list_employees)
}

pub fn get_employee(co: &Coordinator, code: &str) -> AppResult<Option<Employee>> {
    co.read(|conn| queries::employee_by_code(conn, code))
}

// ---------------------------------------------------------------------------
// Admin accounts and audit trail
// ---------------------------------------------------------------------------

pub fn upsert_admin(
    co: &Coordinator,
    name: &str,
    pin_hash: &str,
) -> AppResult<Replicated<AdminAccount>> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "admin name must not be empty".to_string(),
        ));
    }
    co.execute(|conn| {
        require_current_schema(conn)?;
        queries::upsert_admin(conn, name, pin_hash)
    })
}

pub fn list_admins(co: &Coordinator) -> AppResult<Vec<AdminAccount>> {
    co.read(queries::list_admins)
}

pub fn audit_trail(co: &Coordinator, limit: i64) -> AppResult<Vec<AuditRecord>> {
    co.read(|conn| log::list_audit(conn, limit))
}
