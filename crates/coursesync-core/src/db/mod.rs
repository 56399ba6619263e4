//! Local store for synchronized records

mod connection;
mod migrations;
mod record;
mod store;

pub use connection::Database;
pub use record::{Predicate, Record, RecordLookup};
pub use store::RecordStore;

pub(crate) use record::{
    bool_from_int, bool_value, int_value, real_value, text_value, timestamp_from_millis,
    timestamp_value,
};
