//! Replicated write coordinator.
//!
//! Every mutation is applied to the read-of-record target first, inside an
//! IMMEDIATE transaction; a failure there aborts the whole call before any
//! fan-out happens. On success the identical mutation runs against every
//! other active target, where failures degrade to warnings instead of
//! failing the call. Reads are served exclusively from the read-of-record
//! target; drifted replicas are never repaired in the background.

use crate::db::manager::ConnectionManager;
use crate::db::registry::Registry;
use crate::errors::AppResult;
use crate::models::target::TargetKey;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

/// A replica-side failure attached to an otherwise successful result.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub target: TargetKey,
    pub message: String,
}

/// Outcome of a replicated mutation: the read-of-record value plus any
/// replica warnings.
#[derive(Debug, Serialize)]
pub struct Replicated<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

pub struct Coordinator<'a> {
    registry: &'a Registry,
    manager: &'a ConnectionManager,
}

fn apply<T, F>(conn: &mut Connection, mutation: &F) -> AppResult<T>
where
    F: Fn(&Connection) -> AppResult<T>,
{
    // IMMEDIATE takes the write lock up front, serializing the
    // read-modify-write against concurrent kiosk taps.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = mutation(&tx)?;
    tx.commit()?;
    Ok(value)
}

impl<'a> Coordinator<'a> {
    pub fn new(registry: &'a Registry, manager: &'a ConnectionManager) -> Self {
        Self { registry, manager }
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Fan a mutation out to all active targets.
    ///
    /// The closure must be deterministic for a given call (capture timestamps
    /// once at the boundary) so every target applies the identical change.
    pub fn execute<T, F>(&self, mutation: F) -> AppResult<Replicated<T>>
    where
        F: Fn(&Connection) -> AppResult<T>,
    {
        let record = self.registry.read_target();
        let mut conn = self.manager.open(record)?;
        let value = apply(&mut conn, &mutation)?;

        let mut warnings = Vec::new();
        for replica in self.registry.active_targets() {
            if replica.key == record.key {
                continue;
            }
            let outcome = self
                .manager
                .open(replica)
                .and_then(|mut c| apply(&mut c, &mutation));
            if let Err(e) = outcome {
                warnings.push(Warning {
                    target: replica.key,
                    message: e.to_string(),
                });
            }
        }

        Ok(Replicated { value, warnings })
    }

    /// Run a query against the read-of-record target.
    pub fn read<T, F>(&self, query: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = self.manager.open(self.registry.read_target())?;
        query(&conn)
    }
}
