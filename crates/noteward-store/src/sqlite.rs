//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for noteward. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking. Compound
//! writes (grant + visibility update, note delete + cascade) run inside a
//! single transaction.

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use noteward_access::visibility;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use noteward_core::{
    LinkId, LinkToken, NewNote, Note, NoteId, NotePatch, Page, PageRequest, Permission,
    PublicLink, Share, ShareId, UserId, UserRecord, Visibility,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertOutcome, NoteQuery, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

/// Whether an execute failed on a UNIQUE (or other) constraint.
fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn parse_column<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

// Row helpers. Tags are loaded separately via load_tags.

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: UserId::new(row.get("id")?),
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let visibility: String = row.get("visibility")?;
    Ok(Note {
        id: NoteId::new(row.get("id")?),
        owner_id: UserId::new(row.get("owner_id")?),
        title: row.get("title")?,
        body: row.get("body")?,
        visibility: parse_column(4, &visibility)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: BTreeSet::new(),
    })
}

fn row_to_share(row: &rusqlite::Row<'_>) -> rusqlite::Result<Share> {
    let permission: String = row.get("permission")?;
    Ok(Share {
        id: ShareId::new(row.get("id")?),
        note_id: NoteId::new(row.get("note_id")?),
        shared_with: UserId::new(row.get("shared_with_user_id")?),
        permission: parse_column(3, &permission)?,
    })
}

fn row_to_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<PublicLink> {
    let token: String = row.get("token")?;
    Ok(PublicLink {
        id: LinkId::new(row.get("id")?),
        note_id: NoteId::new(row.get("note_id")?),
        token: parse_column(2, &token)?,
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
    })
}

const NOTE_COLUMNS: &str = "id, owner_id, title, body, visibility, created_at, updated_at";

fn load_tags(conn: &Connection, note_id: i64) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.label FROM tags t
         JOIN note_tags nt ON nt.tag_id = t.id
         WHERE nt.note_id = ?1",
    )?;
    let tags = stmt
        .query_map(params![note_id], |row| row.get(0))?
        .collect::<rusqlite::Result<BTreeSet<String>>>()?;
    Ok(tags)
}

fn load_note(conn: &Connection, id: NoteId) -> Result<Option<Note>> {
    let note = conn
        .query_row(
            &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
            params![id.as_i64()],
            row_to_note,
        )
        .optional()?;

    match note {
        Some(mut note) => {
            note.tags = load_tags(conn, note.id.as_i64())?;
            Ok(Some(note))
        }
        None => Ok(None),
    }
}

fn current_visibility(conn: &Connection, note_id: NoteId) -> Result<Option<Visibility>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT visibility FROM notes WHERE id = ?1",
            params![note_id.as_i64()],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(Some(parse_column(0, &raw)?)),
        None => Ok(None),
    }
}

/// Replace a note's tag set: lookup-or-create each label, rebuild the joins.
fn set_note_tags(tx: &Transaction<'_>, note_id: i64, tags: &BTreeSet<String>) -> Result<()> {
    tx.execute("DELETE FROM note_tags WHERE note_id = ?1", params![note_id])?;
    for label in tags {
        tx.execute("INSERT OR IGNORE INTO tags (label) VALUES (?1)", params![label])?;
        let tag_id: i64 = tx.query_row(
            "SELECT id FROM tags WHERE label = ?1",
            params![label],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2)",
            params![note_id, tag_id],
        )?;
    }
    Ok(())
}

/// WHERE clause shared by the search count and page queries.
/// Bound as: ?1 owner, ?2 text, ?3 tag, ?4 visibility.
const SEARCH_WHERE: &str = "n.owner_id = ?1
    AND (?2 IS NULL OR LOWER(n.title) LIKE '%' || LOWER(?2) || '%')
    AND (?3 IS NULL OR EXISTS (
        SELECT 1 FROM note_tags nt JOIN tags t ON t.id = nt.tag_id
        WHERE nt.note_id = n.id AND t.label = ?3))
    AND (?4 IS NULL OR n.visibility = ?4)";

#[async_trait]
impl Store for SqliteStore {
    async fn insert_user(&self, email: &str) -> Result<InsertOutcome<UserRecord>> {
        let email = email.to_string();

        self.run(move |conn| {
            let now = now_millis();
            match conn.execute(
                "INSERT INTO users (email, created_at) VALUES (?1, ?2)",
                params![email, now],
            ) {
                Ok(_) => Ok(InsertOutcome::Inserted(UserRecord {
                    id: UserId::new(conn.last_insert_rowid()),
                    email,
                    created_at: now,
                })),
                Err(e) if is_constraint_violation(&e) => Ok(InsertOutcome::Conflict),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let email = email.to_string();

        self.run(move |conn| {
            conn.query_row(
                "SELECT id, email, created_at FROM users WHERE email = ?1",
                params![email],
                row_to_user,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, email, created_at FROM users WHERE id = ?1",
                params![id.as_i64()],
                row_to_user,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let now = now_millis();

            let initial = visibility::on_note_created();
            tx.execute(
                "INSERT INTO notes (owner_id, title, body, visibility, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    note.owner_id.as_i64(),
                    note.title,
                    note.body,
                    initial.as_str(),
                    now,
                    now,
                ],
            )?;
            let id = tx.last_insert_rowid();

            set_note_tags(&tx, id, &note.tags)?;
            tx.commit()?;

            Ok(Note {
                id: NoteId::new(id),
                owner_id: note.owner_id,
                title: note.title,
                body: note.body,
                visibility: initial,
                created_at: now,
                updated_at: now,
                tags: note.tags,
            })
        })
        .await
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        self.run(move |conn| load_note(conn, id)).await
    }

    async fn update_note(&self, id: NoteId, patch: NotePatch) -> Result<Option<Note>> {
        self.run(move |conn| {
            let tx = conn.transaction()?;

            let Some(mut note) = load_note(&tx, id)? else {
                return Ok(None);
            };

            if let Some(title) = patch.title {
                note.title = title;
            }
            if let Some(body) = patch.body {
                note.body = body;
            }
            if let Some(requested) = patch.visibility {
                // Applied verbatim; no reconciliation against grants.
                note.visibility = visibility::on_explicit_update(requested);
            }
            note.updated_at = now_millis();

            tx.execute(
                "UPDATE notes SET title = ?2, body = ?3, visibility = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    id.as_i64(),
                    note.title,
                    note.body,
                    note.visibility.as_str(),
                    note.updated_at,
                ],
            )?;

            if let Some(tags) = patch.tags {
                set_note_tags(&tx, id.as_i64(), &tags)?;
                note.tags = tags;
            }

            tx.commit()?;
            Ok(Some(note))
        })
        .await
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool> {
        self.run(move |conn| {
            let tx = conn.transaction()?;

            // Dependents first; cascade is explicit, not FK-driven.
            tx.execute("DELETE FROM note_tags WHERE note_id = ?1", params![id.as_i64()])?;
            tx.execute("DELETE FROM shares WHERE note_id = ?1", params![id.as_i64()])?;
            tx.execute(
                "DELETE FROM public_links WHERE note_id = ?1",
                params![id.as_i64()],
            )?;
            let deleted = tx.execute("DELETE FROM notes WHERE id = ?1", params![id.as_i64()])?;

            tx.commit()?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn search_notes(
        &self,
        owner: UserId,
        query: &NoteQuery,
        page: PageRequest,
    ) -> Result<Page<Note>> {
        let query = query.clone();

        self.run(move |conn| {
            let visibility = query.visibility.map(|v| v.as_str());

            let total: u64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM notes n WHERE {}", SEARCH_WHERE),
                params![owner.as_i64(), query.text, query.tag, visibility],
                |row| row.get::<_, i64>(0).map(|n| n as u64),
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT n.id, n.owner_id, n.title, n.body, n.visibility,
                        n.created_at, n.updated_at
                 FROM notes n WHERE {}
                 ORDER BY n.updated_at DESC, n.id DESC
                 LIMIT ?5 OFFSET ?6",
                SEARCH_WHERE
            ))?;

            let mut notes = stmt
                .query_map(
                    params![
                        owner.as_i64(),
                        query.text,
                        query.tag,
                        visibility,
                        page.size as i64,
                        page.offset() as i64,
                    ],
                    row_to_note,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            drop(stmt);

            for note in &mut notes {
                note.tags = load_tags(conn, note.id.as_i64())?;
            }

            Ok(Page {
                items: notes,
                page: page.page,
                size: page.size,
                total,
            })
        })
        .await
    }

    async fn insert_share(
        &self,
        note_id: NoteId,
        shared_with: UserId,
        permission: Permission,
    ) -> Result<InsertOutcome<Share>> {
        self.run(move |conn| {
            let tx = conn.transaction()?;

            let inserted = tx.execute(
                "INSERT INTO shares (note_id, shared_with_user_id, permission)
                 VALUES (?1, ?2, ?3)",
                params![note_id.as_i64(), shared_with.as_i64(), permission.as_str()],
            );
            match inserted {
                Ok(_) => {}
                // Dropping the transaction rolls back.
                Err(e) if is_constraint_violation(&e) => return Ok(InsertOutcome::Conflict),
                Err(e) => return Err(e.into()),
            }
            let id = tx.last_insert_rowid();

            // Force SHARED in the same unit of work as the grant.
            if let Some(current) = current_visibility(&tx, note_id)? {
                tx.execute(
                    "UPDATE notes SET visibility = ?2, updated_at = ?3 WHERE id = ?1",
                    params![
                        note_id.as_i64(),
                        visibility::on_share_created(current).as_str(),
                        now_millis(),
                    ],
                )?;
            }

            tx.commit()?;
            Ok(InsertOutcome::Inserted(Share {
                id: ShareId::new(id),
                note_id,
                shared_with,
                permission,
            }))
        })
        .await
    }

    async fn get_share(&self, id: ShareId) -> Result<Option<Share>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, note_id, shared_with_user_id, permission
                 FROM shares WHERE id = ?1",
                params![id.as_i64()],
                row_to_share,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn delete_share(&self, id: ShareId) -> Result<bool> {
        self.run(move |conn| {
            let deleted = conn.execute("DELETE FROM shares WHERE id = ?1", params![id.as_i64()])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list_shares(&self, note_id: NoteId) -> Result<Vec<Share>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, note_id, shared_with_user_id, permission
                 FROM shares WHERE note_id = ?1 ORDER BY id",
            )?;
            let shares = stmt
                .query_map(params![note_id.as_i64()], row_to_share)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(shares)
        })
        .await
    }

    async fn share_exists(&self, note_id: NoteId, user: UserId) -> Result<bool> {
        self.run(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM shares WHERE note_id = ?1 AND shared_with_user_id = ?2)",
                params![note_id.as_i64(), user.as_i64()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn insert_public_link(
        &self,
        note_id: NoteId,
        token: LinkToken,
        expires_at: Option<i64>,
    ) -> Result<InsertOutcome<PublicLink>> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let now = now_millis();

            let inserted = tx.execute(
                "INSERT INTO public_links (note_id, token, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![note_id.as_i64(), token.as_str(), now, expires_at],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => return Ok(InsertOutcome::Conflict),
                Err(e) => return Err(e.into()),
            }
            let id = tx.last_insert_rowid();

            // Force PUBLIC in the same unit of work as the link.
            if let Some(current) = current_visibility(&tx, note_id)? {
                tx.execute(
                    "UPDATE notes SET visibility = ?2, updated_at = ?3 WHERE id = ?1",
                    params![
                        note_id.as_i64(),
                        visibility::on_link_created(current).as_str(),
                        now,
                    ],
                )?;
            }

            tx.commit()?;
            Ok(InsertOutcome::Inserted(PublicLink {
                id: LinkId::new(id),
                note_id,
                token,
                created_at: now,
                expires_at,
            }))
        })
        .await
    }

    async fn get_public_link(&self, id: LinkId) -> Result<Option<PublicLink>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, note_id, token, created_at, expires_at
                 FROM public_links WHERE id = ?1",
                params![id.as_i64()],
                row_to_link,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn find_public_link_by_token(&self, token: &str) -> Result<Option<PublicLink>> {
        let token = token.to_string();

        self.run(move |conn| {
            conn.query_row(
                "SELECT id, note_id, token, created_at, expires_at
                 FROM public_links WHERE token = ?1",
                params![token],
                row_to_link,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn delete_public_link(&self, id: LinkId) -> Result<bool> {
        self.run(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM public_links WHERE id = ?1",
                params![id.as_i64()],
            )?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list_public_links(&self, note_id: NoteId) -> Result<Vec<PublicLink>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, note_id, token, created_at, expires_at
                 FROM public_links WHERE note_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let links = stmt
                .query_map(params![note_id.as_i64()], row_to_link)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(links)
        })
        .await
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
