//! Mapping between local records and their tables

use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;

use crate::error::Result;

/// An entity persisted in its own table, keyed by a text `id` column.
pub trait Record: Sized {
    /// Table holding records of this type
    const TABLE: &'static str;

    /// Column names in row order; the first column is always `id`.
    const COLUMNS: &'static [&'static str];

    /// A blank record carrying only its identifier, used on first sync.
    fn new_with_id(id: String) -> Self;

    /// Local identifier
    fn id(&self) -> &str;

    /// Build a record from a row selected with [`Record::COLUMNS`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Column values in [`Record::COLUMNS`] order.
    fn to_values(&self) -> Vec<Value>;
}

/// Query condition selecting at most one local record.
///
/// Only ever built over a primary-key column, so the store can hold at most
/// one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    field: &'static str,
    value: String,
}

impl Predicate {
    /// Match the record whose `id` equals `value`.
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            field: "id",
            value: value.into(),
        }
    }

    pub const fn field(&self) -> &'static str {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// SQL condition with the value bound as `?1`.
    pub(crate) fn where_clause(&self) -> String {
        format!("{} = ?1", self.field)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {:?}", self.field, self.value)
    }
}

/// Read access to already-synchronized records, used to resolve references.
pub trait RecordLookup {
    /// Find the record matching `predicate`, if one exists.
    fn find_one<R: Record>(&self, predicate: &Predicate) -> Result<Option<R>>;
}

pub(crate) fn text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

pub(crate) fn bool_value(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

pub(crate) fn int_value(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

pub(crate) fn real_value(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}

/// Timestamps are stored as Unix milliseconds.
pub(crate) fn timestamp_value(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |at| Value::Integer(at.timestamp_millis()))
}

pub(crate) fn timestamp_from_millis(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(DateTime::from_timestamp_millis)
}

pub(crate) fn bool_from_int(value: i64) -> bool {
    value != 0
}
