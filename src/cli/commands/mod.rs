pub mod admin;
pub mod clock;
pub mod db;
pub mod employee;
pub mod entry;
pub mod init;
pub mod log;
pub mod settings;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::coordinator::{Coordinator, Warning};
use crate::db::manager::ConnectionManager;
use crate::db::migrate::{CURRENT_VERSION, SchemaState};
use crate::db::queries;
use crate::db::registry::Registry;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Everything a handler needs: bootstrap config, the effective registry and
/// the connection manager.
pub struct Context {
    pub config: Config,
    pub registry: Registry,
    pub manager: ConnectionManager,
}

impl Context {
    /// Resolve the effective configuration for this invocation.
    ///
    /// Precedence: bootstrap config file, then the persisted settings row
    /// (once a target carries one at the current schema version), then
    /// command-line host overrides.
    pub fn build(cli: &Cli) -> AppResult<Self> {
        let mut config = Config::load()?;
        if let Some(db) = &cli.db {
            config.primary.host = Some(db.clone());
            config.primary.active = true;
        }
        if let Some(db2) = &cli.db2 {
            config.secondary.host = Some(db2.clone());
        }

        let manager = ConnectionManager::new(config.data_dir.clone());
        let mut registry = Registry::from_config(&config)?;

        if let Some(from_row) = registry_from_settings_row(&manager, &registry) {
            registry = from_row;
        }

        if cli.db.is_some() || cli.db2.is_some() {
            registry.override_hosts(cli.db.as_deref(), cli.db2.as_deref());
        }

        Ok(Self {
            config,
            registry,
            manager,
        })
    }

    pub fn coordinator(&self) -> Coordinator<'_> {
        Coordinator::new(&self.registry, &self.manager)
    }
}

/// Registry rebuilt from the persisted settings row, when the read target
/// carries one at the current schema version.
fn registry_from_settings_row(
    manager: &ConnectionManager,
    registry: &Registry,
) -> Option<Registry> {
    let conn = manager.open(registry.read_target()).ok()?;
    if SchemaState::read(&conn).version < CURRENT_VERSION {
        return None;
    }
    let settings = queries::load_settings(&conn).ok().flatten()?;
    Registry::from_settings(&settings).ok()
}

/// Print replica warnings attached to a replicated result.
pub fn report_warnings(warnings: &[Warning]) {
    for w in warnings {
        warning(format!("{}: {}", w.target, w.message));
    }
}

/// Parse a CLI timestamp. Accepted: `YYYY-MM-DD HH:MM[:SS]`.
pub fn parse_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::InvalidTimestamp(s.to_string()))
}
