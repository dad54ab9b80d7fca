//! Target registry: the explicit configuration object holding both storage
//! targets and the read-of-record designation.
//!
//! The registry is rebuilt from the persisted settings row when one exists;
//! the bootstrap config file only covers the first connection.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::settings::StoreSettings;
use crate::models::target::{TargetConfig, TargetKey, TargetSelector};

#[derive(Debug, Clone)]
pub struct Registry {
    primary: TargetConfig,
    secondary: TargetConfig,
    designated: TargetKey,
}

impl Registry {
    /// Build a registry, rejecting configurations with no usable target.
    ///
    /// If the designated read-of-record target is not among the configured
    /// ones, the designation silently moves to the other target. This is a
    /// documented side effect, not an error; `designated()` exposes the
    /// effective choice so callers can surface it.
    pub fn new(
        primary: TargetConfig,
        secondary: TargetConfig,
        designated: TargetKey,
    ) -> AppResult<Self> {
        let mut registry = Self {
            primary,
            secondary,
            designated,
        };
        registry.normalize()?;
        Ok(registry)
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let (primary, secondary) = config.targets();
        Self::new(primary, secondary, config.designated_primary())
    }

    pub fn from_settings(settings: &StoreSettings) -> AppResult<Self> {
        Self::new(
            settings.primary.clone(),
            settings.secondary.clone(),
            settings.primary_target,
        )
    }

    fn normalize(&mut self) -> AppResult<()> {
        if !self.primary.configured() && !self.secondary.configured() {
            return Err(AppError::Config(
                "at least one storage target must be active and defined".to_string(),
            ));
        }
        if !self.target(self.designated).configured() {
            self.designated = self.designated.other();
        }
        Ok(())
    }

    pub fn target(&self, key: TargetKey) -> &TargetConfig {
        match key {
            TargetKey::Primary => &self.primary,
            TargetKey::Secondary => &self.secondary,
        }
    }

    /// Effective read-of-record designation.
    pub fn designated(&self) -> TargetKey {
        self.designated
    }

    /// Currently usable targets, primary first.
    pub fn active_targets(&self) -> Vec<&TargetConfig> {
        [&self.primary, &self.secondary]
            .into_iter()
            .filter(|t| t.configured())
            .collect()
    }

    /// The target all reads are served from.
    pub fn read_target(&self) -> &TargetConfig {
        self.target(self.designated)
    }

    /// Replace the whole configuration. The candidate is validated before
    /// anything is committed, so a rejected call leaves the registry as-is.
    /// Returns true when the read-of-record designation had to be reassigned.
    pub fn set_configuration(
        &mut self,
        primary: TargetConfig,
        secondary: TargetConfig,
        designated: TargetKey,
    ) -> AppResult<bool> {
        let candidate = Self::new(primary, secondary, designated)?;
        let reassigned = candidate.designated != designated;
        *self = candidate;
        Ok(reassigned)
    }

    /// Targets addressed by a schema selector. `Active` narrows to usable
    /// targets; explicit selectors return the named target(s) regardless of
    /// their active flag so an operator can prepare a switched-off target.
    pub fn select(&self, selector: TargetSelector) -> Vec<&TargetConfig> {
        match selector {
            TargetSelector::Active => self.active_targets(),
            TargetSelector::Primary => vec![&self.primary],
            TargetSelector::Secondary => vec![&self.secondary],
            TargetSelector::Both => vec![&self.primary, &self.secondary],
        }
    }

    /// Apply command-line host overrides on top of whatever configuration
    /// source won (ops/test escape hatch).
    pub fn override_hosts(&mut self, primary: Option<&str>, secondary: Option<&str>) {
        if let Some(host) = primary {
            self.primary.host = Some(host.to_string());
            self.primary.active = true;
        }
        if let Some(host) = secondary {
            self.secondary.host = Some(host.to_string());
        }
    }
}
