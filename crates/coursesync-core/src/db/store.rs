//! Generic record store over a SQLite connection

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT/OFFSET

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::record::{Predicate, Record, RecordLookup};
use crate::error::{Error, Result};

/// Record store borrowing a connection.
///
/// Transactions and savepoints deref to [`Connection`], so the same store
/// works inside the sync driver's per-record savepoints.
pub struct RecordStore<'a> {
    conn: &'a Connection,
}

impl<'a> RecordStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn select_sql<R: Record>() -> String {
        format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
    }

    /// All records matching `predicate`.
    pub fn find_matching<R: Record>(&self, predicate: &Predicate) -> Result<Vec<R>> {
        let sql = format!(
            "{} WHERE {}",
            Self::select_sql::<R>(),
            predicate.where_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![predicate.value()], R::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Insert a new record
    pub fn insert<R: Record>(&self, record: &R) -> Result<()> {
        let placeholders = (1..=R::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            R::TABLE,
            R::COLUMNS.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(record.to_values()))?;
        Ok(())
    }

    /// Overwrite every column of an existing record
    pub fn update<R: Record>(&self, record: &R) -> Result<()> {
        let assignments = R::COLUMNS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {assignments} WHERE id = ?1", R::TABLE);

        let rows = self.conn.execute(&sql, params_from_iter(record.to_values()))?;
        if rows == 0 {
            return Err(Error::NotFound(format!("{} {}", R::TABLE, record.id())));
        }
        Ok(())
    }

    /// Number of stored records of this type
    pub fn count<R: Record>(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count = self.conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// List records in insertion order
    pub fn list<R: Record>(&self, limit: usize, offset: usize) -> Result<Vec<R>> {
        let sql = format!(
            "{} ORDER BY rowid ASC LIMIT ?1 OFFSET ?2",
            Self::select_sql::<R>()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![limit as i64, offset as i64], R::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

impl RecordLookup for RecordStore<'_> {
    fn find_one<R: Record>(&self, predicate: &Predicate) -> Result<Option<R>> {
        let sql = format!(
            "{} WHERE {} LIMIT 1",
            Self::select_sql::<R>(),
            predicate.where_clause()
        );
        let record = self
            .conn
            .query_row(&sql, params![predicate.value()], R::from_row)
            .optional()?;
        Ok(record)
    }
}
