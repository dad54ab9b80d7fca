use crate::cli::commands::Context;
use crate::cli::parser::{Cli, Commands};
use crate::db::migrate;
use crate::errors::{AppError, AppResult};
use crate::models::target::{TargetKey, TargetSelector};
use crate::ui::messages::{error, success, warning};

pub fn handle(cli: &Cli) -> AppResult<()> {
    if let Commands::Db {
        probe,
        init_schema,
        target,
        json,
    } = &cli.command
    {
        let ctx = Context::build(cli)?;

        if *probe {
            let key = match target.as_deref() {
                None => TargetKey::Primary,
                Some(s) => TargetKey::from_str(s)
                    .ok_or_else(|| AppError::InvalidSelector(s.to_string()))?,
            };
            let report = ctx.manager.test_connection(ctx.registry.target(key));
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.ok {
                success(&report.message);
            } else {
                error(&report.message);
            }
            if !report.ok {
                return Err(AppError::Other(format!(
                    "connectivity probe failed for {}",
                    key
                )));
            }
        }

        if *init_schema {
            let selector = match target.as_deref() {
                None => TargetSelector::Active,
                Some(s) => TargetSelector::from_str(s)
                    .ok_or_else(|| AppError::InvalidSelector(s.to_string()))?,
            };
            let outcomes = migrate::ensure_schema_selector(&ctx.manager, &ctx.registry, selector);
            if *json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                for outcome in &outcomes {
                    if outcome.ok {
                        success(format!("{}: {}", outcome.target, outcome.message));
                    } else {
                        error(format!("{}: {}", outcome.target, outcome.message));
                    }
                }
            }
            if outcomes.iter().any(|o| !o.ok) {
                return Err(AppError::Other(
                    "schema initialization failed for one or more targets".to_string(),
                ));
            }
        }

        if !*probe && !*init_schema {
            warning("Nothing to do: pass --probe or --init-schema");
        }
    }

    Ok(())
}
