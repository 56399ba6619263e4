//! coursesync CLI - keep a local copy of LMS course records in sync
//!
//! Import exported listings or pull them from the REST API, then browse the
//! local store from the terminal.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use coursesync_core::config::SyncSettings;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_db_path;
use crate::commands::fetch::run_fetch;
use crate::commands::import::run_import;
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::commands::status::run_status;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursesync=info".parse().expect("Invalid log directive")),
        )
        .init();

    let cli = Cli::parse();
    let settings = SyncSettings::load()?;
    let db_path = resolve_db_path(cli.db_path, &settings)?;
    tracing::debug!(?settings, "Resolved database path {}", db_path.display());

    match cli.command {
        Commands::Import {
            entity,
            file,
            cache_key,
        } => {
            run_import(entity, &file, cache_key, &settings, &db_path).await?;
        }
        Commands::Fetch {
            entity,
            path,
            force,
            ttl,
        } => {
            run_fetch(entity, &path, force, ttl, &settings, &db_path).await?;
        }
        Commands::List {
            entity,
            limit,
            json,
        } => run_list(entity, limit, json, &db_path).await?,
        Commands::Show { entity, id, json } => run_show(entity, &id, json, &db_path).await?,
        Commands::Status => run_status(&settings, &db_path).await?,
    }

    Ok(())
}
