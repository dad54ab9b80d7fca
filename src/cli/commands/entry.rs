use crate::cli::commands::{Context, parse_timestamp, report_warnings};
use crate::cli::parser::{Cli, Commands, EntryAction};
use crate::clock;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Entry { action } = &cli.command else {
        return Ok(());
    };
    let ctx = Context::build(cli)?;
    let co = ctx.coordinator();

    match action {
        EntryAction::Add {
            code,
            clock_in,
            clock_out,
            admin,
        } => {
            let t_in = parse_timestamp(clock_in)?;
            let t_out = parse_timestamp(clock_out)?;
            let result = clock::add_manual_entry(&co, admin, code, t_in, t_out)?;
            success(format!("Manual entry {} added for '{}'", result.value, code));
            report_warnings(&result.warnings);
        }
        EntryAction::Edit {
            id,
            clock_in,
            clock_out,
            admin,
        } => {
            let t_in = clock_in.as_deref().map(parse_timestamp).transpose()?;
            let t_out = clock_out.as_deref().map(parse_timestamp).transpose()?;
            let result = clock::edit_entry(&co, admin, *id, t_in, t_out)?;
            success(format!("Time entry {} updated", result.value.id));
            report_warnings(&result.warnings);
        }
        EntryAction::Del { id, admin } => {
            let result = clock::delete_entry(&co, admin, *id)?;
            success(format!("Time entry {} deleted", id));
            report_warnings(&result.warnings);
        }
    }

    Ok(())
}
