//! The replicated configuration row and admin accounts.

use crate::models::target::{TargetConfig, TargetKey};
use serde::Serialize;

pub const DEFAULT_CURRENCY: &str = "ILS";
pub const DEFAULT_BRAND: &str = "My Shop";
pub const DEFAULT_THEME: &str = "#1b3aa6";

/// Global store configuration. Exactly one row, replicated to every active
/// target like any other entity.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSettings {
    pub currency: String,
    pub brand_name: String,
    pub theme_color: String,
    /// Opaque PIN hash; verification happens upstream.
    pub pin_hash: Option<String>,
    pub show_device_ids: bool,
    pub primary: TargetConfig,
    pub secondary: TargetConfig,
    /// Which target is the designated read-of-record.
    pub primary_target: TargetKey,
    pub schema_version: i64,
}

impl StoreSettings {
    pub fn target(&self, key: TargetKey) -> &TargetConfig {
        match key {
            TargetKey::Primary => &self.primary,
            TargetKey::Secondary => &self.secondary,
        }
    }

    /// First settings row for a freshly migrated target, seeded from the
    /// bootstrap target configuration.
    pub fn bootstrap(
        primary: &TargetConfig,
        secondary: &TargetConfig,
        primary_target: TargetKey,
        schema_version: i64,
    ) -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            brand_name: DEFAULT_BRAND.to_string(),
            theme_color: DEFAULT_THEME.to_string(),
            pin_hash: None,
            show_device_ids: true,
            primary: primary.clone(),
            secondary: secondary.clone(),
            primary_target,
            schema_version,
        }
    }
}

/// Partial settings update: `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub currency: Option<String>,
    pub brand_name: Option<String>,
    pub theme_color: Option<String>,
    pub pin_hash: Option<String>,
    pub show_device_ids: Option<bool>,
    pub primary_host: Option<String>,
    pub primary_port: Option<u16>,
    pub primary_user: Option<String>,
    pub primary_secret: Option<String>,
    pub primary_active: Option<bool>,
    pub secondary_host: Option<String>,
    pub secondary_port: Option<u16>,
    pub secondary_user: Option<String>,
    pub secondary_secret: Option<String>,
    pub secondary_active: Option<bool>,
    pub primary_target: Option<TargetKey>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminAccount {
    pub id: i64,
    pub name: String,
    pub pin_hash: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}
