//! Due date override model

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};

use super::Assignment;
use crate::db::{
    text_value, timestamp_from_millis, timestamp_value, Predicate, Record, RecordLookup,
};
use crate::error::{DecodeError, Result};
use crate::payload::Payload;
use crate::sync::SynchronizedModel;

/// A section-, group- or student-specific set of dates for an assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDateOverride {
    pub id: String,
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub unlock_at: Option<DateTime<Utc>>,
    pub lock_at: Option<DateTime<Utc>>,
    /// Parent assignment id as sent by the server
    pub assignment_id: Option<String>,
    /// Local assignment this override is linked to.
    ///
    /// Set only once the parent assignment exists locally; overrides synced
    /// before their assignment pick up the link on a later pass.
    pub assignment: Option<String>,
    pub course_section_id: Option<String>,
    pub group_id: Option<String>,
    /// Students the override applies to, when it targets individuals
    pub student_ids: Option<Vec<String>>,
}

impl DueDateOverride {
    /// Whether the parent assignment link has been resolved.
    pub const fn is_linked(&self) -> bool {
        self.assignment.is_some()
    }

    /// Who the override applies to, for display.
    pub fn target(&self) -> Option<String> {
        if let Some(section) = &self.course_section_id {
            return Some(format!("section {section}"));
        }
        if let Some(group) = &self.group_id {
            return Some(format!("group {group}"));
        }
        self.student_ids.as_ref().map(|ids| match ids.len() {
            1 => "1 student".to_string(),
            count => format!("{count} students"),
        })
    }

    /// Unlink overrides of `assignment_id` whose ids are not in `keep`.
    ///
    /// The raw `assignment_id` is left as the server sent it.
    pub(crate) fn unlink_missing(
        conn: &Connection,
        assignment_id: &str,
        keep: &[String],
    ) -> Result<usize> {
        let mut sql = format!(
            "UPDATE {} SET assignment_ref = NULL WHERE assignment_ref = ?1",
            Self::TABLE
        );
        if !keep.is_empty() {
            let placeholders = (2..keep.len() + 2)
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            sql = format!("{sql} AND id NOT IN ({placeholders})");
        }

        let values = std::iter::once(assignment_id).chain(keep.iter().map(String::as_str));
        Ok(conn.execute(&sql, params_from_iter(values))?)
    }
}

/// Student ids are stored comma-joined.
fn join_ids(ids: Option<&[String]>) -> Value {
    ids.map_or(Value::Null, |ids| Value::Text(ids.join(",")))
}

fn split_ids(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|raw| {
        if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(',').map(str::to_string).collect()
        }
    })
}

impl Record for DueDateOverride {
    const TABLE: &'static str = "due_date_overrides";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "due_at",
        "assignment_id",
        "assignment_ref",
        "unlock_at",
        "lock_at",
        "course_section_id",
        "group_id",
        "student_ids",
    ];

    fn new_with_id(id: String) -> Self {
        Self {
            id,
            title: String::new(),
            due_at: None,
            unlock_at: None,
            lock_at: None,
            assignment_id: None,
            assignment: None,
            course_section_id: None,
            group_id: None,
            student_ids: None,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            due_at: timestamp_from_millis(row.get(2)?),
            assignment_id: row.get(3)?,
            assignment: row.get(4)?,
            unlock_at: timestamp_from_millis(row.get(5)?),
            lock_at: timestamp_from_millis(row.get(6)?),
            course_section_id: row.get(7)?,
            group_id: row.get(8)?,
            student_ids: split_ids(row.get(9)?),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.clone()),
            Value::Text(self.title.clone()),
            timestamp_value(self.due_at),
            text_value(self.assignment_id.as_deref()),
            text_value(self.assignment.as_deref()),
            timestamp_value(self.unlock_at),
            timestamp_value(self.lock_at),
            text_value(self.course_section_id.as_deref()),
            text_value(self.group_id.as_deref()),
            join_ids(self.student_ids.as_deref()),
        ]
    }
}

impl SynchronizedModel for DueDateOverride {
    fn unique_predicate(payload: &Payload) -> std::result::Result<Predicate, DecodeError> {
        Ok(Predicate::id(payload.id("id")?))
    }

    fn apply_fields<S: RecordLookup>(&mut self, payload: &Payload, store: &S) -> Result<()> {
        let id = payload.id("id")?;
        let title = payload.required_str("title")?;
        let due_at = payload.optional_datetime("due_at")?;
        let unlock_at = payload.optional_datetime("unlock_at")?;
        let lock_at = payload.optional_datetime("lock_at")?;
        let assignment_id = payload.optional_id("assignment_id")?;
        let course_section_id = payload.optional_id("course_section_id")?;
        let group_id = payload.optional_id("group_id")?;
        let student_ids = payload.optional_id_list("student_ids")?;

        let assignment = match assignment_id.as_deref() {
            Some(parent_id) => {
                let parent: Option<Assignment> = store.find_one(&Predicate::id(parent_id))?;
                if parent.is_none() {
                    tracing::debug!(
                        "Assignment {parent_id} not synced yet; leaving override {id} unlinked"
                    );
                }
                parent.map(|parent| parent.id)
            }
            None => None,
        };

        *self = Self {
            id,
            title,
            due_at,
            unlock_at,
            lock_at,
            assignment_id,
            assignment,
            course_section_id,
            group_id,
            student_ids,
        };
        Ok(())
    }
}
