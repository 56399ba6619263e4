use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use coursesync_core::config::SyncSettings;
use coursesync_core::services::DatabaseService;
use coursesync_core::{
    Assignment, DueDateOverride, Lockable, ModuleItem, Page, SyncReport, SynchronizedModel,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

/// Run `$body` with `$model` aliased to the model type for `$entity`.
macro_rules! with_entity {
    ($entity:expr, $model:ident => $body:expr) => {
        match $entity {
            $crate::cli::EntityKind::Assignments => {
                type $model = coursesync_core::Assignment;
                $body
            }
            $crate::cli::EntityKind::Pages => {
                type $model = coursesync_core::Page;
                $body
            }
            $crate::cli::EntityKind::ModuleItems => {
                type $model = coursesync_core::ModuleItem;
                $body
            }
            $crate::cli::EntityKind::DueDateOverrides => {
                type $model = coursesync_core::DueDateOverride;
                $body
            }
        }
    };
}

pub(crate) use with_entity;

/// A synchronized record the CLI knows how to print.
pub trait RecordView: SynchronizedModel + Serialize {
    fn summary_line(&self) -> String;
}

impl RecordView for Assignment {
    fn summary_line(&self) -> String {
        let name = truncate_chars(&self.name, 40);
        let due = format_timestamp(self.due_at);
        format!(
            "{:<10}  {name:<40}  due {due:<20}{}",
            self.id,
            lock_marker(self)
        )
    }
}

impl RecordView for Page {
    fn summary_line(&self) -> String {
        let title = truncate_chars(&self.title, 40);
        let draft = if self.published { "" } else { "  (draft)" };
        format!(
            "{:<10}  {title:<40}  {}{draft}{}",
            self.id,
            self.url,
            lock_marker(self)
        )
    }
}

impl RecordView for ModuleItem {
    fn summary_line(&self) -> String {
        let position = self
            .position
            .map_or_else(|| "-".to_string(), |position| position.to_string());
        let title = truncate_chars(&self.title, 40);
        format!(
            "{:<10}  {position:>3}  {:<12}  {title}{}",
            self.id,
            self.item_type,
            lock_marker(self)
        )
    }
}

impl RecordView for DueDateOverride {
    fn summary_line(&self) -> String {
        let title = truncate_chars(&self.title, 40);
        let due = format_timestamp(self.due_at);
        let link = match (&self.assignment, &self.assignment_id) {
            (Some(assignment), _) => format!("assignment={assignment}"),
            (None, Some(pending)) => format!("assignment={pending} (not synced)"),
            (None, None) => "no assignment".to_string(),
        };
        let target = self
            .target()
            .map(|target| format!("  for {target}"))
            .unwrap_or_default();
        format!("{:<10}  {title:<40}  due {due:<20}{target}  {link}", self.id)
    }
}

fn lock_marker(record: &impl Lockable) -> &'static str {
    if record.is_locked() {
        "  [locked]"
    } else {
        ""
    }
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map_or_else(
        || "-".to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Render a record as aligned `field value` lines.
pub fn format_record_fields(record: &impl Serialize) -> Result<Vec<String>, CliError> {
    let Value::Object(fields) = serde_json::to_value(record)? else {
        return Ok(Vec::new());
    };

    Ok(fields
        .iter()
        .flat_map(|(key, value)| match value {
            Value::Object(nested) => nested
                .iter()
                .map(|(nested_key, nested_value)| {
                    format_field(&format!("{key}.{nested_key}"), nested_value)
                })
                .collect::<Vec<_>>(),
            other => vec![format_field(key, other)],
        })
        .collect())
}

fn format_field(key: &str, value: &Value) -> String {
    let rendered = match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    format!("{key:<24} {rendered}")
}

pub fn format_report_lines(label: &str, report: &SyncReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{label}: {} created, {} updated, {} failed",
        report.created,
        report.updated,
        report.failures.len()
    )];
    lines.extend(report.failures.iter().map(|failure| {
        let id = failure.id.as_deref().unwrap_or("?");
        format!("  #{} id={id}: {}", failure.index, failure.error)
    }));
    lines
}

pub fn print_report(label: &str, report: &SyncReport) {
    let mut lines = format_report_lines(label, report).into_iter();
    if let Some(summary) = lines.next() {
        println!("{summary}");
    }
    for failure in lines {
        eprintln!("{failure}");
    }
}

pub fn resolve_db_path(
    cli_db_path: Option<PathBuf>,
    settings: &SyncSettings,
) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| settings.db_path.clone()) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("coursesync").join("coursesync.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn open_database(path: &Path) -> Result<DatabaseService, CliError> {
    Ok(DatabaseService::open_path(path)?)
}
