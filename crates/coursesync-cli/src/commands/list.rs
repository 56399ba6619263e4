use std::path::Path;

use crate::cli::EntityKind;
use crate::commands::common::{open_database, with_entity, RecordView};
use crate::error::CliError;

pub async fn run_list(
    entity: EntityKind,
    limit: usize,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let lines = with_entity!(entity, M => list_lines::<M>(limit, as_json, db_path).await?);

    if lines.is_empty() && !as_json {
        println!("No {} stored.", entity.label());
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub async fn list_lines<M: RecordView>(
    limit: usize,
    as_json: bool,
    db_path: &Path,
) -> Result<Vec<String>, CliError> {
    let db = open_database(db_path)?;
    let records = db.list::<M>(limit, 0).await?;

    if as_json {
        return Ok(vec![serde_json::to_string_pretty(&records)?]);
    }
    Ok(records.iter().map(RecordView::summary_line).collect())
}
