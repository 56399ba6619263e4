//! Shared database service wrapper used by clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::api::PageSource;
use crate::cache::{TtlCache, DEFAULT_TTL};
use crate::db::{Database, Predicate, Record, RecordLookup, RecordStore};
use crate::sync::{self, SyncReport, SynchronizedModel};
use crate::Result;

/// How a refresh consults the TTL cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Cache key to check and stamp; `None` always refreshes
    pub cache_key: Option<String>,
    pub ttl: Duration,
    /// Refresh even when the cache key is still fresh
    pub force: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            cache_key: None,
            ttl: DEFAULT_TTL,
            force: false,
        }
    }
}

impl RefreshOptions {
    pub fn cached(cache_key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache_key: Some(cache_key.into()),
            ttl,
            force: false,
        }
    }

    #[must_use]
    pub const fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Result of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache key was still fresh; nothing was fetched
    Skipped,
    /// Pages were fetched and applied
    Synced(SyncReport),
}

/// Thread-safe service for store and sync operations.
///
/// All writes go through one async mutex, which is what makes find-or-create
/// safe: no two syncs can race on the same id.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let db = Database::open(&db_path)?;
        tracing::debug!("Using local store at {}", db_path.display());
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Apply one page of payloads.
    pub async fn sync_page<M: SynchronizedModel>(
        &self,
        payloads: &[crate::Payload],
    ) -> Result<SyncReport> {
        let mut db = self.db.lock().await;
        sync::sync_page::<M>(&mut db, payloads)
    }

    /// Pull every page from `source` and apply it, honouring the TTL cache.
    ///
    /// The store lock is held per page, not across network fetches. If the
    /// future is dropped between pages, pages already applied stay committed
    /// and the cache key is not stamped.
    pub async fn refresh<M, S>(
        &self,
        source: &mut S,
        options: &RefreshOptions,
    ) -> Result<RefreshOutcome>
    where
        M: SynchronizedModel,
        S: PageSource,
    {
        if let Some(key) = options.cache_key.as_deref() {
            let db = self.db.lock().await;
            let expired =
                TtlCache::new(db.connection()).is_expired(key, options.ttl, Utc::now())?;
            if !expired && !options.force {
                tracing::info!("Skipping refresh of {key}: cache is still fresh");
                return Ok(RefreshOutcome::Skipped);
            }
        }

        let mut report = SyncReport::default();
        let mut pages = 0usize;
        while let Some(page) = source.next_page().await? {
            pages += 1;
            report.merge(self.sync_page::<M>(&page).await?);
        }

        if let Some(key) = options.cache_key.as_deref() {
            let db = self.db.lock().await;
            TtlCache::new(db.connection()).touch(key, Utc::now())?;
        }

        tracing::info!(
            entity = M::TABLE,
            pages,
            created = report.created,
            updated = report.updated,
            failed = report.failures.len(),
            "Refresh finished"
        );
        Ok(RefreshOutcome::Synced(report))
    }

    /// Forget a cache key so the next refresh runs.
    pub async fn expire(&self, cache_key: &str) -> Result<bool> {
        let db = self.db.lock().await;
        TtlCache::new(db.connection()).clear(cache_key)
    }

    pub async fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
        let db = self.db.lock().await;
        RecordStore::new(db.connection()).find_one(&Predicate::id(id))
    }

    pub async fn list<R: Record>(&self, limit: usize, offset: usize) -> Result<Vec<R>> {
        let db = self.db.lock().await;
        RecordStore::new(db.connection()).list(limit, offset)
    }

    pub async fn count<R: Record>(&self) -> Result<usize> {
        let db = self.db.lock().await;
        RecordStore::new(db.connection()).count::<R>()
    }
}
