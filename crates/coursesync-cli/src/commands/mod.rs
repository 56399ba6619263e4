pub mod common;
pub mod fetch;
pub mod import;
pub mod list;
pub mod show;
pub mod status;
