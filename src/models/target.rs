//! Storage target identity and per-target connection settings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one of the two configurable storage targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKey {
    Primary,
    Secondary,
}

impl TargetKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKey::Primary => "primary",
            TargetKey::Secondary => "secondary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Some(TargetKey::Primary),
            "secondary" => Some(TargetKey::Secondary),
            _ => None,
        }
    }

    /// The other target of the pair.
    pub fn other(&self) -> TargetKey {
        match self {
            TargetKey::Primary => TargetKey::Secondary,
            TargetKey::Secondary => TargetKey::Primary,
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for one storage target.
///
/// With the embedded SQLite engine `host` carries the database location
/// (resolved against the data directory when relative). `port`, `user` and
/// `secret` are persisted and replicated with the rest of the configuration
/// row so a networked engine can be slotted in without a schema change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub key: TargetKey,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub secret: Option<String>,
    pub active: bool,
}

impl TargetConfig {
    pub fn new(key: TargetKey) -> Self {
        Self {
            key,
            host: None,
            port: None,
            user: None,
            secret: None,
            active: false,
        }
    }

    /// A target is defined once it has a non-empty host.
    pub fn defined(&self) -> bool {
        self.host
            .as_deref()
            .map(|h| !h.trim().is_empty())
            .unwrap_or(false)
    }

    /// Defined and switched on: eligible for reads and writes.
    pub fn configured(&self) -> bool {
        self.defined() && self.active
    }
}

/// Target selector accepted by schema operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelector {
    Active,
    Primary,
    Secondary,
    Both,
}

impl TargetSelector {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(TargetSelector::Active),
            "primary" => Some(TargetSelector::Primary),
            "secondary" => Some(TargetSelector::Secondary),
            "both" => Some(TargetSelector::Both),
            _ => None,
        }
    }
}
