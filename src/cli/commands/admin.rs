use crate::cli::commands::{Context, report_warnings};
use crate::cli::parser::{AdminAction, Cli, Commands};
use crate::errors::AppResult;
use crate::store;
use crate::ui::messages::{info, success};

pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Admin { action } = &cli.command else {
        return Ok(());
    };
    let ctx = Context::build(cli)?;
    let co = ctx.coordinator();

    match action {
        AdminAction::Add { name, pin_hash } => {
            let result = store::upsert_admin(&co, name, pin_hash)?;
            success(format!("Admin account '{}' saved", result.value.name));
            report_warnings(&result.warnings);
        }
        AdminAction::List { json } => {
            let admins = store::list_admins(&co)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&admins)?);
            } else if admins.is_empty() {
                info("No admin accounts");
            } else {
                for a in &admins {
                    let state = if a.active { "active" } else { "inactive" };
                    println!("{:>4}  {:<24} {}", a.id, a.name, state);
                }
            }
        }
    }

    Ok(())
}
