use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "coursesync")]
#[command(about = "Keep a local copy of LMS course records in sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply records from a JSON file
    Import {
        /// Kind of record in the file
        #[arg(value_enum)]
        entity: EntityKind,
        /// JSON object, array of objects, or array of pages
        file: PathBuf,
        /// Mark this cache key as freshly refreshed
        #[arg(long, value_name = "KEY")]
        cache_key: Option<String>,
    },
    /// Pull records from the REST API
    Fetch {
        /// Kind of record the listing returns
        #[arg(value_enum)]
        entity: EntityKind,
        /// Listing path, e.g. /api/v1/courses/1/assignments
        path: String,
        /// Refresh even if the cached listing is still fresh
        #[arg(long)]
        force: bool,
        /// Freshness window in seconds (defaults to settings)
        #[arg(long, value_name = "SECS")]
        ttl: Option<u64>,
    },
    /// List stored records
    List {
        #[arg(value_enum)]
        entity: EntityKind,
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one stored record
    Show {
        #[arg(value_enum)]
        entity: EntityKind,
        /// Server id of the record
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show record counts and configuration
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum EntityKind {
    Assignments,
    Pages,
    ModuleItems,
    DueDateOverrides,
}

impl EntityKind {
    pub const ALL: [Self; 4] = [
        Self::Assignments,
        Self::Pages,
        Self::ModuleItems,
        Self::DueDateOverrides,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Assignments => "assignments",
            Self::Pages => "pages",
            Self::ModuleItems => "module-items",
            Self::DueDateOverrides => "due-date-overrides",
        }
    }
}
