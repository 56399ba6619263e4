//! Assignment model

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{
    bool_from_int, bool_value, real_value, text_value, timestamp_from_millis, timestamp_value,
    Predicate, Record, RecordLookup,
};
use crate::error::{DecodeError, Result};
use crate::lock::{LockStatus, Lockable};
use crate::payload::Payload;
use crate::sync::{upsert_record, SynchronizedModel};

use super::DueDateOverride;

/// A course assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Server identifier
    pub id: String,
    /// Owning course
    pub course_id: Option<String>,
    pub name: String,
    /// HTML description
    pub details: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub unlock_at: Option<DateTime<Utc>>,
    pub lock_at: Option<DateTime<Utc>>,
    pub points_possible: Option<f64>,
    pub html_url: Option<String>,
    /// Unpublished only when the server says `published: false`
    pub published: bool,
    pub lock: LockStatus,
}

impl Lockable for Assignment {
    fn lock_status(&self) -> &LockStatus {
        &self.lock
    }

    fn set_lock_status(&mut self, status: LockStatus) {
        self.lock = status;
    }
}

impl Record for Assignment {
    const TABLE: &'static str = "assignments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "course_id",
        "name",
        "details",
        "due_at",
        "unlock_at",
        "lock_at",
        "points_possible",
        "html_url",
        "published",
        "locked_for_user",
        "lock_explanation",
        "can_view",
    ];

    fn new_with_id(id: String) -> Self {
        Self {
            id,
            course_id: None,
            name: String::new(),
            details: None,
            due_at: None,
            unlock_at: None,
            lock_at: None,
            points_possible: None,
            html_url: None,
            published: true,
            lock: LockStatus::default(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            course_id: row.get(1)?,
            name: row.get(2)?,
            details: row.get(3)?,
            due_at: timestamp_from_millis(row.get(4)?),
            unlock_at: timestamp_from_millis(row.get(5)?),
            lock_at: timestamp_from_millis(row.get(6)?),
            points_possible: row.get(7)?,
            html_url: row.get(8)?,
            published: bool_from_int(row.get(9)?),
            lock: LockStatus::from_row(row, 10)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        let mut values = vec![
            Value::Text(self.id.clone()),
            text_value(self.course_id.as_deref()),
            Value::Text(self.name.clone()),
            text_value(self.details.as_deref()),
            timestamp_value(self.due_at),
            timestamp_value(self.unlock_at),
            timestamp_value(self.lock_at),
            real_value(self.points_possible),
            text_value(self.html_url.as_deref()),
            bool_value(self.published),
        ];
        self.lock.push_values(&mut values);
        values
    }
}

impl SynchronizedModel for Assignment {
    fn unique_predicate(payload: &Payload) -> std::result::Result<Predicate, DecodeError> {
        Ok(Predicate::id(payload.id("id")?))
    }

    fn apply_fields<S: RecordLookup>(&mut self, payload: &Payload, _store: &S) -> Result<()> {
        let mut decoded = Self {
            id: payload.id("id")?,
            course_id: payload.optional_id("course_id")?,
            name: payload.required_str("name")?,
            details: payload.optional_str("description")?,
            due_at: payload.optional_datetime("due_at")?,
            unlock_at: payload.optional_datetime("unlock_at")?,
            lock_at: payload.optional_datetime("lock_at")?,
            points_possible: payload.optional_f64("points_possible")?,
            html_url: payload.optional_str("html_url")?,
            published: payload.optional_bool("published")? != Some(false),
            lock: LockStatus::default(),
        };
        decoded.update_lock_status(payload)?;

        *self = decoded;
        Ok(())
    }

    /// Upsert the embedded `overrides` array and link each one here.
    ///
    /// Overrides previously linked to this assignment but missing from the
    /// array are unlinked. Without an `overrides` key the links are kept.
    fn sync_nested(&self, payload: &Payload, conn: &Connection) -> Result<()> {
        let Some(overrides) = payload.optional_objects("overrides")? else {
            return Ok(());
        };

        let mut synced = Vec::with_capacity(overrides.len());
        for nested in overrides {
            let nested = nested.with_default("assignment_id", self.id.as_str());
            upsert_record::<DueDateOverride>(conn, &nested)?;
            synced.push(nested.id("id")?);
        }

        let unlinked = DueDateOverride::unlink_missing(conn, &self.id, &synced)?;
        tracing::debug!(
            assignment = %self.id,
            synced = synced.len(),
            unlinked,
            "Synced nested overrides"
        );
        Ok(())
    }
}
