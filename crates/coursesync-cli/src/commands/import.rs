use std::path::Path;

use coursesync_core::api::MemoryPages;
use coursesync_core::config::SyncSettings;
use coursesync_core::services::{RefreshOptions, RefreshOutcome};
use coursesync_core::SyncReport;

use crate::cli::EntityKind;
use crate::commands::common::{open_database, print_report, with_entity};
use crate::error::CliError;

pub async fn run_import(
    entity: EntityKind,
    file: &Path,
    cache_key: Option<String>,
    settings: &SyncSettings,
    db_path: &Path,
) -> Result<SyncReport, CliError> {
    let raw = std::fs::read_to_string(file)?;
    let mut pages = MemoryPages::from_json_str(&raw)?;
    let db = open_database(db_path)?;

    // A file import always applies; the cache key is only stamped.
    let options = RefreshOptions {
        cache_key,
        ttl: settings.default_ttl(),
        force: true,
    };

    let outcome = with_entity!(entity, M => db.refresh::<M, _>(&mut pages, &options).await?);
    let report = match outcome {
        RefreshOutcome::Synced(report) => report,
        RefreshOutcome::Skipped => SyncReport::default(),
    };

    print_report(entity.label(), &report);
    Ok(report)
}
