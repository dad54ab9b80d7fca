//! Time entry rows: one row per shift, open until clocked out.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TimeEntry {
    pub id: i64,
    pub employee_id: i64,
    pub clock_in: DateTime<Utc>,
    /// `None` while the shift is open. At most one open row per employee.
    pub clock_out: Option<DateTime<Utc>>,
    pub clock_in_device_id: Option<String>,
    pub clock_out_device_id: Option<String>,
    pub manual: bool,
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    /// Worked minutes for a closed entry, `None` while open.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.clock_out
            .map(|out| (out - self.clock_in).num_minutes())
    }

    /// Whether clock-out happened on the same device as clock-in.
    /// Informational only, it never blocks a transition.
    pub fn device_match(&self) -> Option<bool> {
        match (&self.clock_in_device_id, &self.clock_out_device_id) {
            (Some(a), Some(b)) => Some(a == b),
            _ => None,
        }
    }
}

/// An open shift joined with its employee, for the attendance board.
#[derive(Debug, Clone, Serialize)]
pub struct OpenShift {
    pub entry_id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub clock_in: DateTime<Utc>,
    pub elapsed_minutes: i64,
}
