//! shopclock library root.
//! Exposes the CLI parser, the high-level run() function and the internal
//! modules: the target registry and connection manager, the schema migrator,
//! the replicated write coordinator and the clock state machine.

pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod store;
pub mod ui;

use clap::Parser;
use cli::parser::{Cli, Commands};
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Db { .. } => cli::commands::db::handle(cli),
        Commands::Clock { .. } => cli::commands::clock::handle(cli),
        Commands::Employee { .. } => cli::commands::employee::handle(cli),
        Commands::Entry { .. } => cli::commands::entry::handle(cli),
        Commands::Settings { .. } => cli::commands::settings::handle(cli),
        Commands::Admin { .. } => cli::commands::admin::handle(cli),
        Commands::Log { .. } => cli::commands::log::handle(cli),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    dispatch(&cli)
}
