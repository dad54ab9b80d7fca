//! Unified application error type.
//! All modules (db, clock, store, cli) return AppError to keep the error
//! handling consistent and easy to manage.
//!
//! Redundant clock transitions (double clock-in/out) are deliberately NOT
//! errors: they surface as `clock::ClockStatus` values.

use crate::models::target::TargetKey;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{target}: connection failed: {reason}")]
    Connectivity { target: TargetKey, reason: String },

    #[error("{target}: schema error: {reason}")]
    Schema { target: TargetKey, reason: String },

    #[error("Schema version is stale; run a schema upgrade before editing shifts")]
    SchemaGate,

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No active employee with code '{0}'")]
    UnknownEmployee(String),

    #[error("Invalid timestamp '{0}', expected YYYY-MM-DD HH:MM")]
    InvalidTimestamp(String),

    #[error("Unknown target selector '{0}', expected active|primary|secondary|both")]
    InvalidSelector(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
