use std::path::Path;
use std::time::Duration;

use coursesync_core::api::RestPages;
use coursesync_core::config::SyncSettings;
use coursesync_core::services::{RefreshOptions, RefreshOutcome};

use crate::cli::EntityKind;
use crate::commands::common::{open_database, print_report, with_entity};
use crate::error::CliError;

pub async fn run_fetch(
    entity: EntityKind,
    path: &str,
    force: bool,
    ttl_secs: Option<u64>,
    settings: &SyncSettings,
    db_path: &Path,
) -> Result<RefreshOutcome, CliError> {
    let base_url = settings
        .api_base_url
        .as_deref()
        .ok_or(CliError::ApiNotConfigured)?;
    let mut pages = RestPages::new(base_url, settings.access_token.clone(), path)?;
    let db = open_database(db_path)?;

    let ttl = ttl_secs.map_or_else(|| settings.default_ttl(), Duration::from_secs);
    let options = RefreshOptions::cached(fetch_cache_key(entity, path), ttl).forced(force);

    let outcome = with_entity!(entity, M => db.refresh::<M, _>(&mut pages, &options).await?);
    match &outcome {
        RefreshOutcome::Skipped => {
            println!(
                "{} at {} are up to date (use --force to refresh)",
                entity.label(),
                path.trim()
            );
        }
        RefreshOutcome::Synced(report) => print_report(entity.label(), report),
    }

    Ok(outcome)
}

pub fn fetch_cache_key(entity: EntityKind, path: &str) -> String {
    format!("{}:{}", entity.label(), path.trim())
}
