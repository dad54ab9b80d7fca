use crate::cli::commands::Context;
use crate::cli::parser::{Cli, Commands};
use crate::errors::AppResult;
use crate::store;
use crate::ui::messages::info;

/// Print the audit trail from the read-of-record target.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let Commands::Log { limit } = &cli.command else {
        return Ok(());
    };
    let ctx = Context::build(cli)?;
    let co = ctx.coordinator();

    let records = store::audit_trail(&co, *limit)?;
    if records.is_empty() {
        info("Audit log is empty");
        return Ok(());
    }
    for r in &records {
        println!("{}  {:<18} [{}] {}", r.at, r.operation, r.target, r.message);
    }
    Ok(())
}
