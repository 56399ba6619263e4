//! coursesync-core - Core library for coursesync
//!
//! This crate holds the payload decoding, synchronized models, local store,
//! and sync driver shared by every coursesync client.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod lock;
pub mod models;
pub mod payload;
pub mod services;
pub mod sync;

pub use error::{DecodeError, Error, Result};
pub use lock::{LockStatus, Lockable};
pub use models::{Assignment, DueDateOverride, ModuleItem, Page};
pub use payload::Payload;
pub use sync::{SyncReport, SynchronizedModel};
