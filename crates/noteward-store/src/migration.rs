//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL
//! string that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Get current version
    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Apply migrations
    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;
            tracing::debug!(version, "applied schema migration");

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Registered users; email doubles as the authentication principal
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL           -- Unix ms
        );

        -- Notes; visibility is the denormalized exposure cache
        CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            visibility TEXT NOT NULL,             -- PRIVATE | SHARED | PUBLIC
            created_at INTEGER NOT NULL,          -- Unix ms
            updated_at INTEGER NOT NULL           -- Unix ms
        );

        -- Per-user share grants; one share per (note, user) pair
        CREATE TABLE shares (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            note_id INTEGER NOT NULL REFERENCES notes(id),
            shared_with_user_id INTEGER NOT NULL REFERENCES users(id),
            permission TEXT NOT NULL,             -- READ

            UNIQUE(note_id, shared_with_user_id)
        );

        -- Public links; token must be globally unique. More than one live
        -- link per note is allowed.
        CREATE TABLE public_links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            note_id INTEGER NOT NULL REFERENCES notes(id),
            token TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,          -- Unix ms
            expires_at INTEGER                    -- Unix ms, NULL = never
        );

        -- Normalized tag labels
        CREATE TABLE tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL UNIQUE
        );

        CREATE TABLE note_tags (
            note_id INTEGER NOT NULL REFERENCES notes(id),
            tag_id INTEGER NOT NULL REFERENCES tags(id),
            PRIMARY KEY (note_id, tag_id)
        );

        -- Indexes for common queries
        CREATE INDEX idx_notes_owner ON notes(owner_id);
        CREATE INDEX idx_notes_updated ON notes(updated_at);
        CREATE INDEX idx_shares_note ON shares(note_id);
        CREATE INDEX idx_shares_user ON shares(shared_with_user_id);
        CREATE INDEX idx_links_note ON public_links(note_id);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
