//! Wiki page model

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::db::{
    bool_from_int, bool_value, text_value, timestamp_from_millis, timestamp_value, Predicate,
    Record, RecordLookup,
};
use crate::error::{DecodeError, Result};
use crate::lock::{LockStatus, Lockable};
use crate::payload::Payload;
use crate::sync::SynchronizedModel;

/// A course wiki page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    /// URL slug, unique within a course
    pub url: String,
    pub title: String,
    pub body: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub lock: LockStatus,
}

/// Pages report their id as `page_id`; older payloads use `id`.
fn page_id(payload: &Payload) -> std::result::Result<String, DecodeError> {
    match payload.optional_id("page_id")? {
        Some(id) => Ok(id),
        None => payload.id("id"),
    }
}

impl Lockable for Page {
    fn lock_status(&self) -> &LockStatus {
        &self.lock
    }

    fn set_lock_status(&mut self, status: LockStatus) {
        self.lock = status;
    }
}

impl Record for Page {
    const TABLE: &'static str = "pages";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "url",
        "title",
        "body",
        "updated_at",
        "published",
        "locked_for_user",
        "lock_explanation",
        "can_view",
    ];

    fn new_with_id(id: String) -> Self {
        Self {
            id,
            url: String::new(),
            title: String::new(),
            body: None,
            updated_at: None,
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
            url: row.get(1)?,
            title: row.get(2)?,
            body: row.get(3)?,
            updated_at: timestamp_from_millis(row.get(4)?),
            published: bool_from_int(row.get(5)?),
            lock: LockStatus::from_row(row, 6)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        let mut values = vec![
            Value::Text(self.id.clone()),
            Value::Text(self.url.clone()),
            Value::Text(self.title.clone()),
            text_value(self.body.as_deref()),
            timestamp_value(self.updated_at),
            bool_value(self.published),
        ];
        self.lock.push_values(&mut values);
        values
    }
}

impl SynchronizedModel for Page {
    fn unique_predicate(payload: &Payload) -> std::result::Result<Predicate, DecodeError> {
        Ok(Predicate::id(page_id(payload)?))
    }

    fn apply_fields<S: RecordLookup>(&mut self, payload: &Payload, _store: &S) -> Result<()> {
        let mut decoded = Self {
            id: page_id(payload)?,
            url: payload.required_str("url")?,
            title: payload.required_str("title")?,
            body: payload.optional_str("body")?,
            updated_at: payload.optional_datetime("updated_at")?,
            published: payload.optional_bool("published")? != Some(false),
            lock: LockStatus::default(),
        };
        decoded.update_lock_status(payload)?;

        *self = decoded;
        Ok(())
    }
}
