use std::path::Path;

use crate::cli::EntityKind;
use crate::commands::common::{format_record_fields, open_database, with_entity, RecordView};
use crate::error::CliError;

pub async fn run_show(
    entity: EntityKind,
    id: &str,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let lines = with_entity!(entity, M => show_lines::<M>(entity, id, as_json, db_path).await?);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub async fn show_lines<M: RecordView>(
    entity: EntityKind,
    id: &str,
    as_json: bool,
    db_path: &Path,
) -> Result<Vec<String>, CliError> {
    let id = id.trim();
    let db = open_database(db_path)?;
    let record = db
        .get::<M>(id)
        .await?
        .ok_or_else(|| CliError::RecordNotFound {
            entity: entity.label(),
            id: id.to_string(),
        })?;

    if as_json {
        return Ok(vec![serde_json::to_string_pretty(&record)?]);
    }
    format_record_fields(&record)
}
