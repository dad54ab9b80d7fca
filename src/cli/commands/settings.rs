use crate::cli::commands::{Context, report_warnings};
use crate::cli::parser::{Cli, Commands, SettingsAction};
use crate::db::registry::Registry;
use crate::errors::{AppError, AppResult};
use crate::models::settings::SettingsPatch;
use crate::models::target::{TargetConfig, TargetKey};
use crate::store;
use crate::ui::messages::{error, info, success, warning};

fn describe_target(t: &TargetConfig) -> String {
    let host = t.host.as_deref().unwrap_or("<unset>");
    let port = t
        .port
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user = t.user.as_deref().unwrap_or("-");
    let secret = if t.secret.is_some() { "set" } else { "unset" };
    format!(
        "{:<10} host={} port={} user={} secret={} active={}",
        t.key.to_string(),
        host,
        port,
        user,
        secret,
        t.active
    )
}

pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Settings { action } = &cli.command else {
        return Ok(());
    };
    let ctx = Context::build(cli)?;
    let co = ctx.coordinator();

    match action {
        SettingsAction::Show { json } => {
            let settings = store::load_settings(&co)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("Brand:          {}", settings.brand_name);
                println!("Currency:       {}", settings.currency);
                println!(
                    "PIN:            {}",
                    if settings.pin_hash.is_some() { "set" } else { "unset" }
                );
                println!("Device ids:     {}", settings.show_device_ids);
                println!("Read-of-record: {}", settings.primary_target);
                println!("{}", describe_target(&settings.primary));
                println!("{}", describe_target(&settings.secondary));
                println!(
                    "Schema version: {} ({})",
                    settings.schema_version,
                    if settings.schema_version == crate::db::migrate::CURRENT_VERSION {
                        "up to date"
                    } else {
                        "upgrade required"
                    }
                );
            }
        }
        SettingsAction::Set {
            currency,
            brand_name,
            theme_color,
            pin_hash,
            show_device_ids,
            primary_host,
            primary_port,
            primary_user,
            primary_secret,
            primary_active,
            secondary_host,
            secondary_port,
            secondary_user,
            secondary_secret,
            secondary_active,
            primary_target,
            admin,
        } => {
            let designated = match primary_target.as_deref() {
                None => None,
                Some(s) => Some(
                    TargetKey::from_str(s).ok_or_else(|| AppError::InvalidSelector(s.to_string()))?,
                ),
            };
            let patch = SettingsPatch {
                currency: currency.clone(),
                brand_name: brand_name.clone(),
                theme_color: theme_color.clone(),
                pin_hash: pin_hash.clone(),
                show_device_ids: *show_device_ids,
                primary_host: primary_host.clone(),
                primary_port: *primary_port,
                primary_user: primary_user.clone(),
                primary_secret: primary_secret.clone(),
                primary_active: *primary_active,
                secondary_host: secondary_host.clone(),
                secondary_port: *secondary_port,
                secondary_user: secondary_user.clone(),
                secondary_secret: secondary_secret.clone(),
                secondary_active: *secondary_active,
                primary_target: designated,
            };

            let result = store::update_settings(&co, admin, &patch)?;
            success("Settings updated");
            if let Some(requested) = designated
                && result.value.primary_target != requested
            {
                warning(format!(
                    "Read-of-record reassigned to {} (requested target is not usable)",
                    result.value.primary_target
                ));
            }
            report_warnings(&result.warnings);

            // A target change re-triggers the schema probe against the new
            // effective registry.
            let registry = Registry::from_settings(&result.value)?;
            for target in registry.active_targets() {
                let report = ctx.manager.test_connection(target);
                if report.ok {
                    info(&report.message);
                } else {
                    error(&report.message);
                }
            }
        }
    }

    Ok(())
}
