//! Applying pages of payloads to the local store

use rusqlite::{Connection, DropBehavior};
use serde::Serialize;

use super::SynchronizedModel;
use crate::db::{Database, RecordLookup, RecordStore};
use crate::error::Result;
use crate::payload::Payload;

/// What an upsert did to the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// A payload that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Position of the payload within its page
    pub index: usize,
    /// Identifier, when the payload had a usable one
    pub id: Option<String>,
    pub error: String,
}

/// Counts for one or more synced pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub failures: Vec<RecordFailure>,
}

impl SyncReport {
    /// Number of payloads written to the store
    pub const fn applied(&self) -> usize {
        self.created + self.updated
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another page's report into this one.
    pub fn merge(&mut self, other: Self) {
        self.created += other.created;
        self.updated += other.updated;
        self.failures.extend(other.failures);
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }
}

/// Find-or-create the local record for `payload` and copy its fields.
///
/// Nothing is written unless `apply_fields` succeeds. Embedded records are
/// synced afterwards through [`SynchronizedModel::sync_nested`]. The caller is
/// responsible for serializing writers and for the enclosing transaction.
pub fn upsert_record<M: SynchronizedModel>(
    conn: &Connection,
    payload: &Payload,
) -> Result<UpsertOutcome> {
    let predicate = M::unique_predicate(payload)?;
    let store = RecordStore::new(conn);

    let (mut record, outcome) = match store.find_one::<M>(&predicate)? {
        Some(existing) => (existing, UpsertOutcome::Updated),
        None => (
            M::new_with_id(predicate.value().to_string()),
            UpsertOutcome::Created,
        ),
    };

    record.apply_fields(payload, &store)?;

    match outcome {
        UpsertOutcome::Created => store.insert(&record)?,
        UpsertOutcome::Updated => store.update(&record)?,
    }
    record.sync_nested(payload, conn)?;

    tracing::debug!(entity = M::TABLE, id = record.id(), ?outcome, "Upserted record");
    Ok(outcome)
}

/// Apply one page of payloads inside a single transaction.
///
/// Each payload runs in its own savepoint: a payload that fails to decode or
/// write is rolled back and reported, and the rest of the page still commits.
pub fn sync_page<M: SynchronizedModel>(
    db: &mut Database,
    payloads: &[Payload],
) -> Result<SyncReport> {
    let mut tx = db.connection_mut().transaction()?;
    let mut report = SyncReport::default();

    for (index, payload) in payloads.iter().enumerate() {
        let mut savepoint = tx.savepoint()?;

        match upsert_record::<M>(&savepoint, payload) {
            Ok(outcome) => {
                savepoint.commit()?;
                report.record(outcome);
            }
            Err(error) => {
                savepoint.set_drop_behavior(DropBehavior::Rollback);
                savepoint.finish()?;

                let id = M::unique_predicate(payload)
                    .ok()
                    .map(|predicate| predicate.value().to_string());
                tracing::warn!(
                    entity = M::TABLE,
                    index,
                    id = id.as_deref().unwrap_or("<none>"),
                    "Skipping record that failed to sync: {error}"
                );
                report.failures.push(RecordFailure {
                    index,
                    id,
                    error: error.to_string(),
                });
            }
        }
    }

    tx.commit()?;
    tracing::info!(
        entity = M::TABLE,
        created = report.created,
        updated = report.updated,
        failed = report.failures.len(),
        "Synced page"
    );
    Ok(report)
}
