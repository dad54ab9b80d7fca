//! Employee entity and the payloads used to create/update it.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    /// Unique badge code typed on the kiosk pad.
    pub code: String,
    /// External payroll identifier. Stored as TEXT so leading zeros survive.
    pub external_id: Option<String>,
    pub hourly_rate: f64,
    pub active: bool,
}

/// Payload for creating a new employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub code: String,
    pub external_id: Option<String>,
    pub hourly_rate: f64,
    pub active: bool,
}

/// Partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub external_id: Option<Option<String>>,
    pub hourly_rate: Option<f64>,
    pub active: Option<bool>,
}
