//! Refresh bookkeeping for cached server resources
//!
//! Each cached request has a key (for example `courses/1/assignments`). A
//! refresh stamps the key with the current time; until the TTL elapses the
//! local store is considered fresh and network refreshes are skipped unless
//! forced.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Default freshness window for a cached resource
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// TTL table access borrowing a connection
pub struct TtlCache<'a> {
    conn: &'a Connection,
}

impl<'a> TtlCache<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// When `key` was last refreshed, if ever
    pub fn last_refresh(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let millis: Option<i64> = self
            .conn
            .query_row(
                "SELECT last_refresh FROM ttl WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(millis.and_then(DateTime::from_timestamp_millis))
    }

    /// Whether `key` needs a refresh at `now`. Unknown keys are expired.
    pub fn is_expired(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<bool> {
        let Some(last_refresh) = self.last_refresh(key)? else {
            return Ok(true);
        };

        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let fresh_until = last_refresh.timestamp_millis().saturating_add(ttl_ms);
        Ok(fresh_until < now.timestamp_millis())
    }

    /// Record a refresh of `key` at `now`
    pub fn touch(&self, key: &str, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO ttl (key, last_refresh) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET last_refresh = excluded.last_refresh",
            params![key, now.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Forget `key`, so the next refresh always runs. Returns whether it existed.
    pub fn clear(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM ttl WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_unknown_key_is_expired() {
        let db = Database::open_in_memory().unwrap();
        let cache = TtlCache::new(db.connection());
        assert!(cache.is_expired("courses/1/assignments", DEFAULT_TTL, at(9, 0)).unwrap());
        assert_eq!(cache.last_refresh("courses/1/assignments").unwrap(), None);
    }

    #[test]
    fn test_touch_then_expire_after_ttl() {
        let db = Database::open_in_memory().unwrap();
        let cache = TtlCache::new(db.connection());
        let key = "courses/1/assignments";

        cache.touch(key, at(9, 0)).unwrap();
        assert_eq!(cache.last_refresh(key).unwrap(), Some(at(9, 0)));
        assert!(!cache.is_expired(key, DEFAULT_TTL, at(10, 59)).unwrap());
        assert!(!cache.is_expired(key, DEFAULT_TTL, at(11, 0)).unwrap());
        assert!(cache.is_expired(key, DEFAULT_TTL, at(11, 1)).unwrap());
    }

    #[test]
    fn test_touch_overwrites_previous_stamp() {
        let db = Database::open_in_memory().unwrap();
        let cache = TtlCache::new(db.connection());

        cache.touch("pages", at(9, 0)).unwrap();
        cache.touch("pages", at(12, 0)).unwrap();
        assert_eq!(cache.last_refresh("pages").unwrap(), Some(at(12, 0)));
    }

    #[test]
    fn test_clear_forgets_key() {
        let db = Database::open_in_memory().unwrap();
        let cache = TtlCache::new(db.connection());

        cache.touch("pages", at(9, 0)).unwrap();
        assert!(cache.clear("pages").unwrap());
        assert!(!cache.clear("pages").unwrap());
        assert!(cache.is_expired("pages", DEFAULT_TTL, at(9, 1)).unwrap());
    }
}
