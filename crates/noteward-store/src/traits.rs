//! Store trait: the abstract interface for noteward persistence.
//!
//! This trait allows the service layer to be storage-agnostic.
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;

use noteward_core::{
    LinkId, LinkToken, NewNote, Note, NoteId, NotePatch, Page, PageRequest, Permission,
    PublicLink, Share, ShareId, UserId, UserRecord, Visibility,
};

use crate::error::Result;

/// Result of an insert that is guarded by a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    /// The row was inserted.
    Inserted(T),
    /// The database's uniqueness constraint rejected the insert
    /// (duplicate email, duplicate share pair, or token collision).
    Conflict,
}

impl<T> InsertOutcome<T> {
    /// Unwrap the inserted value, or map a conflict through `on_conflict`.
    pub fn or_conflict<E>(self, on_conflict: E) -> std::result::Result<T, E> {
        match self {
            InsertOutcome::Inserted(value) => Ok(value),
            InsertOutcome::Conflict => Err(on_conflict),
        }
    }
}

/// Filter for owner-scoped note searches.
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    /// Case-insensitive substring match against the title.
    pub text: Option<String>,
    /// Exact match against a normalized tag label.
    pub tag: Option<String>,
    /// Exact visibility filter.
    pub visibility: Option<Visibility>,
}

/// The Store trait: async interface for noteward persistence.
///
/// # Design Notes
///
/// - **Constraint-backed uniqueness**: duplicate shares, duplicate emails,
///   and token collisions are rejected by database constraints, not by
///   check-then-insert, and surface as [`InsertOutcome::Conflict`].
/// - **Transactional compound writes**: inserting a share or public link
///   also force-sets the note's visibility, inside a single transaction, so
///   no intermediate state (grant without visibility update) is observable.
/// - **Explicit cascade**: deleting a note deletes its shares, links, and
///   tag joins in the same transaction; no reliance on FK cascade.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // User Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a user. `Conflict` when the email is already registered.
    async fn insert_user(&self, email: &str) -> Result<InsertOutcome<UserRecord>>;

    /// Look up a user by principal email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Look up a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Note Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a note with its tags. The note starts `Private`; tags are
    /// attached via lookup-or-create.
    async fn insert_note(&self, note: NewNote) -> Result<Note>;

    /// Get a note by id, with its tags.
    async fn get_note(&self, id: NoteId) -> Result<Option<Note>>;

    /// Apply a partial update and bump `updated_at`. A requested visibility
    /// is stored verbatim. Returns the updated note, or `None` if absent.
    async fn update_note(&self, id: NoteId, patch: NotePatch) -> Result<Option<Note>>;

    /// Delete a note together with its shares, public links, and tag joins,
    /// all in one transaction. Returns whether the note existed.
    async fn delete_note(&self, id: NoteId) -> Result<bool>;

    /// Search the owner's notes, ordered by `updated_at` descending.
    async fn search_notes(
        &self,
        owner: UserId,
        query: &NoteQuery,
        page: PageRequest,
    ) -> Result<Page<Note>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Share Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a share and force the note's visibility to `Shared`, in one
    /// transaction. `Conflict` when a share already exists for the pair.
    async fn insert_share(
        &self,
        note_id: NoteId,
        shared_with: UserId,
        permission: Permission,
    ) -> Result<InsertOutcome<Share>>;

    /// Get a share by id.
    async fn get_share(&self, id: ShareId) -> Result<Option<Share>>;

    /// Delete a share. Does NOT touch the note's visibility. Returns
    /// whether the share existed.
    async fn delete_share(&self, id: ShareId) -> Result<bool>;

    /// List all shares of a note.
    async fn list_shares(&self, note_id: NoteId) -> Result<Vec<Share>>;

    /// Whether a share exists for (note, user).
    async fn share_exists(&self, note_id: NoteId, user: UserId) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Public Link Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a public link and force the note's visibility to `Public`, in
    /// one transaction. `Conflict` on a token collision (retryable: generate
    /// a fresh token and call again).
    async fn insert_public_link(
        &self,
        note_id: NoteId,
        token: LinkToken,
        expires_at: Option<i64>,
    ) -> Result<InsertOutcome<PublicLink>>;

    /// Get a public link by id.
    async fn get_public_link(&self, id: LinkId) -> Result<Option<PublicLink>>;

    /// Look up a public link by token. Expiry is NOT evaluated here; the
    /// caller decides what a lapsed link means.
    async fn find_public_link_by_token(&self, token: &str) -> Result<Option<PublicLink>>;

    /// Delete a public link. Does NOT touch the note's visibility. Returns
    /// whether the link existed.
    async fn delete_public_link(&self, id: LinkId) -> Result<bool>;

    /// List all public links of a note, newest first.
    async fn list_public_links(&self, note_id: NoteId) -> Result<Vec<PublicLink>>;
}
