use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] coursesync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No {entity} record with id {id}")]
    RecordNotFound { entity: &'static str, id: String },
    #[error(
        "API is not configured. Set COURSESYNC_API_URL (and COURSESYNC_TOKEN) \
         or add api_base_url to settings.json."
    )]
    ApiNotConfigured,
}
