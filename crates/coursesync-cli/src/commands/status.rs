use std::path::Path;

use coursesync_core::config::SyncSettings;
use coursesync_core::services::DatabaseService;

use crate::cli::EntityKind;
use crate::commands::common::{open_database, with_entity};
use crate::error::CliError;

pub async fn run_status(settings: &SyncSettings, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;

    println!("Database: {}", db_path.display());
    println!(
        "API:      {}",
        settings.api_base_url.as_deref().unwrap_or("not configured")
    );
    println!(
        "Token:    {}",
        if settings.access_token.is_some() { "set" } else { "not set" }
    );
    println!("TTL:      {}s", settings.default_ttl_secs);
    println!();

    for (entity, count) in record_counts(&db).await? {
        println!("{:<20} {count}", entity.label());
    }
    Ok(())
}

pub async fn record_counts(db: &DatabaseService) -> Result<Vec<(EntityKind, usize)>, CliError> {
    let mut counts = Vec::with_capacity(EntityKind::ALL.len());
    for entity in EntityKind::ALL {
        let count = with_entity!(entity, M => db.count::<M>().await?);
        counts.push((entity, count));
    }
    Ok(counts)
}
