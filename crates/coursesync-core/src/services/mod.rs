//! Shared services built on top of the store and sync driver.

mod database;

pub use database::{DatabaseService, RefreshOptions, RefreshOutcome};
