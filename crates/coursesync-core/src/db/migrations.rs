//! Database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 3;

/// Run all pending migrations
pub fn run(conn: &mut Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }
    if version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration to version 1: entity tables
fn migrate_v1(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS assignments (
            id TEXT PRIMARY KEY,
            course_id TEXT,
            name TEXT NOT NULL,
            details TEXT,
            due_at INTEGER,
            unlock_at INTEGER,
            lock_at INTEGER,
            points_possible REAL,
            html_url TEXT,
            published INTEGER NOT NULL DEFAULT 1,
            locked_for_user INTEGER NOT NULL DEFAULT 0,
            lock_explanation TEXT,
            can_view INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_assignments_course ON assignments(course_id);
        CREATE INDEX IF NOT EXISTS idx_assignments_due ON assignments(due_at);

        CREATE TABLE IF NOT EXISTS pages (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            body TEXT,
            updated_at INTEGER,
            published INTEGER NOT NULL DEFAULT 1,
            locked_for_user INTEGER NOT NULL DEFAULT 0,
            lock_explanation TEXT,
            can_view INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS module_items (
            id TEXT PRIMARY KEY,
            module_id TEXT,
            title TEXT NOT NULL,
            item_type TEXT NOT NULL,
            position INTEGER,
            content_id TEXT,
            html_url TEXT,
            locked_for_user INTEGER NOT NULL DEFAULT 0,
            lock_explanation TEXT,
            can_view INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_module_items_module ON module_items(module_id, position);

        CREATE TABLE IF NOT EXISTS due_date_overrides (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            due_at INTEGER,
            assignment_id TEXT,
            assignment_ref TEXT REFERENCES assignments(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_due_date_overrides_assignment
            ON due_date_overrides(assignment_id);

        INSERT INTO schema_version (version) VALUES (1);",
    )?;

    tx.commit()?;
    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: refresh TTL bookkeeping
fn migrate_v2(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS ttl (
            key TEXT PRIMARY KEY,
            last_refresh INTEGER NOT NULL
        );

        INSERT INTO schema_version (version) VALUES (2);",
    )?;

    tx.commit()?;
    tracing::info!("Migrated database to version 2");
    Ok(())
}

/// Migration to version 3: override dates and targets
fn migrate_v3(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "ALTER TABLE due_date_overrides ADD COLUMN unlock_at INTEGER;
        ALTER TABLE due_date_overrides ADD COLUMN lock_at INTEGER;
        ALTER TABLE due_date_overrides ADD COLUMN course_section_id TEXT;
        ALTER TABLE due_date_overrides ADD COLUMN group_id TEXT;
        ALTER TABLE due_date_overrides ADD COLUMN student_ids TEXT;
        CREATE INDEX IF NOT EXISTS idx_due_date_overrides_ref
            ON due_date_overrides(assignment_ref);

        INSERT INTO schema_version (version) VALUES (3);",
    )?;

    tx.commit()?;
    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
