use crate::cli::commands::Context;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::migrate;
use crate::errors::AppResult;
use crate::models::target::TargetSelector;
use crate::ui::messages::{error, info, success};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the schema of every active target
pub fn handle(cli: &Cli) -> AppResult<()> {
    Config::init_all(cli.db.as_deref(), cli.test)?;

    info("Initializing shopclock...");
    if !cli.test {
        info(format!("Config file: {}", Config::config_file().display()));
    }

    let ctx = Context::build(cli)?;
    let outcomes =
        migrate::ensure_schema_selector(&ctx.manager, &ctx.registry, TargetSelector::Active);

    let mut ok = true;
    for outcome in &outcomes {
        if outcome.ok {
            success(format!("{}: {}", outcome.target, outcome.message));
        } else {
            error(format!("{}: {}", outcome.target, outcome.message));
            ok = false;
        }
    }

    if ok {
        success("Initialization completed");
        Ok(())
    } else {
        Err(crate::errors::AppError::Other(
            "initialization failed for one or more targets".to_string(),
        ))
    }
}
