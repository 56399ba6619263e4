//! Reconciling server payloads with local records

mod driver;
mod model;

pub use driver::{sync_page, upsert_record, RecordFailure, SyncReport, UpsertOutcome};
pub use model::SynchronizedModel;
