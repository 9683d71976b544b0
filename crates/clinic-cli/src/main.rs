//! Clinic CLI
//!
//! Entry point for the `clinic` binary.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use clinic_cli::commands::{self, Backend};
use clinic_cli::config_handlers::handle_config_command;
use clinic_cli::{Cli, Command, logging};
use clinic_core::ClinicConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Config { action } => handle_config_command(config_path, action)?,
        Command::Serve { memory, no_migrate } => {
            let backend = if memory {
                Backend::Memory
            } else {
                Backend::MySql {
                    migrate: !no_migrate,
                }
            };
            commands::serve(ClinicConfig::load(config_path)?, backend).await?;
        }
        Command::Migrate => commands::migrate(&ClinicConfig::load(config_path)?).await?,
        Command::SeedAdmin => commands::seed_admin(&ClinicConfig::load(config_path)?).await?,
    }
    Ok(())
}
