use crate::cli::commands::{Context, report_warnings};
use crate::cli::parser::{Cli, Commands, EmployeeAction};
use crate::errors::AppResult;
use crate::models::employee::{EmployeePatch, NewEmployee};
use crate::store;
use crate::ui::messages::{info, success};

pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Employee { action } = &cli.command else {
        return Ok(());
    };
    let ctx = Context::build(cli)?;
    let co = ctx.coordinator();

    match action {
        EmployeeAction::Add {
            name,
            code,
            external_id,
            rate,
            inactive,
            admin,
        } => {
            let new = NewEmployee {
                name: name.clone(),
                code: code.clone(),
                external_id: external_id.clone(),
                hourly_rate: *rate,
                active: !*inactive,
            };
            let result = store::create_employee(&co, admin, &new)?;
            success(format!(
                "Employee '{}' created (id {})",
                result.value.code, result.value.id
            ));
            report_warnings(&result.warnings);
        }
        EmployeeAction::List { json } => {
            let employees = store::list_employees(&co)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&employees)?);
            } else if employees.is_empty() {
                info("No employees");
            } else {
                for e in &employees {
                    let state = if e.active { "active" } else { "inactive" };
                    println!(
                        "{:>4}  {:<24} code={:<10} rate={:<8.2} {}",
                        e.id, e.name, e.code, e.hourly_rate, state
                    );
                }
            }
        }
        EmployeeAction::Set {
            id,
            name,
            code,
            external_id,
            rate,
            active,
            admin,
        } => {
            let patch = EmployeePatch {
                name: name.clone(),
                code: code.clone(),
                external_id: external_id.clone().map(Some),
                hourly_rate: *rate,
                active: *active,
            };
            let result = store::update_employee(&co, admin, *id, &patch)?;
            success(format!("Employee '{}' updated", result.value.code));
            report_warnings(&result.warnings);
        }
        EmployeeAction::Del { id, admin } => {
            let result = store::delete_employee(&co, admin, *id)?;
            success(format!("Employee {} deleted", id));
            report_warnings(&result.warnings);
        }
    }

    Ok(())
}
