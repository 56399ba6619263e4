//! Module item model

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::db::{int_value, text_value, Predicate, Record, RecordLookup};
use crate::error::{DecodeError, Result};
use crate::lock::{LockStatus, Lockable};
use crate::payload::Payload;
use crate::sync::SynchronizedModel;

/// An entry in a course module (a page, assignment, file, link, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleItem {
    pub id: String,
    pub module_id: Option<String>,
    pub title: String,
    /// Server `type`, e.g. `Assignment`, `Page`, `SubHeader`
    pub item_type: String,
    pub position: Option<i64>,
    /// Id of the linked content, when the item points at one
    pub content_id: Option<String>,
    pub html_url: Option<String>,
    pub lock: LockStatus,
}

impl Lockable for ModuleItem {
    fn lock_status(&self) -> &LockStatus {
        &self.lock
    }

    fn set_lock_status(&mut self, status: LockStatus) {
        self.lock = status;
    }
}

impl Record for ModuleItem {
    const TABLE: &'static str = "module_items";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "module_id",
        "title",
        "item_type",
        "position",
        "content_id",
        "html_url",
        "locked_for_user",
        "lock_explanation",
        "can_view",
    ];

    fn new_with_id(id: String) -> Self {
        Self {
            id,
            module_id: None,
            title: String::new(),
            item_type: String::new(),
            position: None,
            content_id: None,
            html_url: None,
            lock: LockStatus::default(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            module_id: row.get(1)?,
            title: row.get(2)?,
            item_type: row.get(3)?,
            position: row.get(4)?,
            content_id: row.get(5)?,
            html_url: row.get(6)?,
            lock: LockStatus::from_row(row, 7)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        let mut values = vec![
            Value::Text(self.id.clone()),
            text_value(self.module_id.as_deref()),
            Value::Text(self.title.clone()),
            Value::Text(self.item_type.clone()),
            int_value(self.position),
            text_value(self.content_id.as_deref()),
            text_value(self.html_url.as_deref()),
        ];
        self.lock.push_values(&mut values);
        values
    }
}

impl SynchronizedModel for ModuleItem {
    fn unique_predicate(payload: &Payload) -> std::result::Result<Predicate, DecodeError> {
        Ok(Predicate::id(payload.id("id")?))
    }

    fn apply_fields<S: RecordLookup>(&mut self, payload: &Payload, _store: &S) -> Result<()> {
        // Lock keys live on the linked content, not on the item itself.
        let content_details = payload
            .optional_object("content_details")?
            .unwrap_or_default();

        let mut decoded = Self {
            id: payload.id("id")?,
            module_id: payload.optional_id("module_id")?,
            title: payload.required_str("title")?,
            item_type: payload.required_str("type")?,
            position: payload.optional_i64("position")?,
            content_id: payload.optional_id("content_id")?,
            html_url: payload.optional_str("html_url")?,
            lock: LockStatus::default(),
        };
        decoded.update_lock_status(&content_details)?;

        *self = decoded;
        Ok(())
    }
}
