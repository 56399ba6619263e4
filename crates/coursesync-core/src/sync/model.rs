//! The synchronized-model contract

use rusqlite::Connection;

use crate::db::{Predicate, Record, RecordLookup};
use crate::error::{DecodeError, Result};
use crate::payload::Payload;

/// A locally persisted entity that can be reconciled with server payloads.
///
/// Sync runs in two steps: [`SynchronizedModel::unique_predicate`] locates
/// the local record for a payload (the caller creates a blank one with
/// [`Record::new_with_id`] when nothing matches), then
/// [`SynchronizedModel::apply_fields`] copies the payload onto it.
///
/// # Preconditions
///
/// Find-or-create is not atomic. Two writers racing on the same new id can
/// both miss and both create. Callers must serialize writes per entity type
/// (the sync driver holds one lock per store) and wrap each record in a
/// transaction that rolls back when `apply_fields` fails.
pub trait SynchronizedModel: Record {
    /// Predicate selecting the one local record this payload describes.
    ///
    /// Fails when the id is missing or is neither a string nor an integer.
    fn unique_predicate(payload: &Payload) -> std::result::Result<Predicate, DecodeError>;

    /// Overwrite this record's fields from `payload`.
    ///
    /// Every mapped field is replaced (last write wins) and applying the same
    /// payload twice gives the same result. References to other entities are
    /// resolved through `store`; a reference whose target has not been synced
    /// yet is left unset. On error the record is left untouched.
    fn apply_fields<S: RecordLookup>(&mut self, payload: &Payload, store: &S) -> Result<()>;

    /// Sync records embedded in `payload` after this record has been written.
    ///
    /// Runs on the same connection and savepoint as the record itself, so an
    /// error here undoes the parent write too. Most models embed nothing.
    fn sync_nested(&self, _payload: &Payload, _conn: &Connection) -> Result<()> {
        Ok(())
    }
}
