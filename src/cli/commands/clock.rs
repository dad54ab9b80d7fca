use crate::cli::commands::{Context, report_warnings};
use crate::cli::parser::{Cli, ClockAction, Commands};
use crate::clock::{self, ClockStatus};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Clock { action } = &cli.command else {
        return Ok(());
    };
    let ctx = Context::build(cli)?;
    let co = ctx.coordinator();

    match action {
        ClockAction::In { code, device, json } => {
            let result = clock::clock_in(&co, code, device.as_deref())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match result.value.status {
                    ClockStatus::ClockedIn => success(&result.value.message),
                    _ => warning(&result.value.message),
                }
                report_warnings(&result.warnings);
            }
        }
        ClockAction::Out { code, device, json } => {
            let result = clock::clock_out(&co, code, device.as_deref())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match result.value.status {
                    ClockStatus::ClockedOut => success(&result.value.message),
                    _ => warning(&result.value.message),
                }
                if let Some(false) = result.value.device_match {
                    info("Clock-out device differs from clock-in device");
                }
                report_warnings(&result.warnings);
            }
        }
        ClockAction::Status { code, json } => {
            let state = clock::status(&co, code)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                match state {
                    clock::ShiftState::In => info(format!("{} is on shift", code)),
                    clock::ShiftState::Out => info(format!("{} is off shift", code)),
                }
            }
        }
        ClockAction::Active { json } => {
            let shifts = clock::active_shifts(&co)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&shifts)?);
            } else if shifts.is_empty() {
                info("No open shifts");
            } else {
                for shift in &shifts {
                    println!(
                        "{:<24} in since {} ({} min)",
                        shift.employee_name,
                        shift.clock_in.format("%Y-%m-%d %H:%M"),
                        shift.elapsed_minutes
                    );
                }
            }
        }
    }

    Ok(())
}
