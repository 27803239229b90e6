//! The Noteward service: unified API for notes, sharing, and public links.
//!
//! Brings together storage, the access decision engine, and the visibility
//! rules into a cohesive interface for building applications. Callers are
//! identified by a principal email, resolved to a [`UserRecord`] before any
//! ownership comparison; authorization never compares raw strings.

use std::sync::Arc;

use noteward_access::{decide_read, ReadAccess};
use noteward_core::{
    normalize_tags, LinkId, LinkToken, NewNote, Note, NoteId, NotePatch, Page, PageRequest,
    Permission, PublicLink, Share, ShareId, UserRecord,
};
use noteward_store::{NoteQuery, Store};

use crate::error::{Error, Result};

/// Configuration for the Noteward service.
#[derive(Debug, Clone)]
pub struct NotewardConfig {
    /// Page size used when a search request asks for zero.
    pub default_page_size: u32,
    /// Upper bound on the page size of a single search request.
    pub max_page_size: u32,
}

impl Default for NotewardConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// The main Noteward service.
///
/// Provides a unified API for:
/// - Registering and resolving users
/// - Creating, updating, searching, and deleting notes
/// - Granting and revoking per-user shares
/// - Minting and resolving public links
pub struct Noteward<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: NotewardConfig,
}

impl<S: Store> Noteward<S> {
    /// Create a new service instance.
    pub fn new(store: S, config: NotewardConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new user by email.
    pub async fn register_user(&self, email: &str) -> Result<UserRecord> {
        let user = self
            .store
            .insert_user(email)
            .await?
            .or_conflict(Error::Conflict("email already registered"))?;

        tracing::debug!(user_id = user.id.as_i64(), "registered user");
        Ok(user)
    }

    /// Resolve a principal email to its user record.
    pub async fn resolve_principal(&self, email: &str) -> Result<UserRecord> {
        self.store
            .find_user_by_email(email)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Note Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a note owned by the principal. New notes start `Private`;
    /// tags are normalized (trimmed, lowercased, deduplicated).
    pub async fn create_note(
        &self,
        principal: &str,
        title: &str,
        body: &str,
        tags: &[&str],
    ) -> Result<Note> {
        let owner = self.resolve_principal(principal).await?;

        let note = self
            .store
            .insert_note(NewNote {
                owner_id: owner.id,
                title: title.to_string(),
                body: body.to_string(),
                tags: normalize_tags(tags.iter()),
            })
            .await?;

        tracing::debug!(note_id = note.id.as_i64(), "created note");
        Ok(note)
    }

    /// Get a note, enforcing read access for the principal.
    ///
    /// A note the principal may not read returns `Forbidden`, not
    /// `NotFound`: on this authenticated path, existence is not hidden.
    pub async fn get_note(&self, note_id: NoteId, principal: &str) -> Result<Note> {
        let requester = self.resolve_principal(principal).await?;
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;

        let has_share = self.store.share_exists(note_id, requester.id).await?;
        match decide_read(&note, requester.id, has_share) {
            ReadAccess::Denied => Err(Error::Forbidden),
            _ => Ok(note),
        }
    }

    /// Apply a partial update to an owned note.
    ///
    /// A visibility in the patch is stored verbatim, with no reconciliation
    /// against existing shares or links. Tags go through the same
    /// normalization as on creation, so the tag filter keeps matching.
    pub async fn update_note(
        &self,
        note_id: NoteId,
        principal: &str,
        mut patch: NotePatch,
    ) -> Result<Note> {
        let requester = self.resolve_principal(principal).await?;
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;
        if note.owner_id != requester.id {
            return Err(Error::Forbidden);
        }

        patch.tags = patch.tags.map(normalize_tags);

        self.store
            .update_note(note_id, patch)
            .await?
            .ok_or(Error::NotFound("note"))
    }

    /// Delete an owned note together with its shares, public links, and tag
    /// joins, in one transaction.
    pub async fn delete_note(&self, note_id: NoteId, principal: &str) -> Result<()> {
        let requester = self.resolve_principal(principal).await?;
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;
        if note.owner_id != requester.id {
            return Err(Error::Forbidden);
        }

        self.store.delete_note(note_id).await?;
        tracing::debug!(note_id = note_id.as_i64(), "deleted note");
        Ok(())
    }

    /// Search the principal's own notes. Results are scoped to the owner
    /// and ordered by most recent update.
    pub async fn search_notes(
        &self,
        principal: &str,
        query: &NoteQuery,
        page: PageRequest,
    ) -> Result<Page<Note>> {
        let requester = self.resolve_principal(principal).await?;

        let size = match page.size {
            0 => self.config.default_page_size,
            s => s.min(self.config.max_page_size),
        };
        let page = PageRequest::new(page.page, size);

        Ok(self.store.search_notes(requester.id, query, page).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Share Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Share a note with another registered user.
    ///
    /// Owner-only. The grant is `Read`, and the note's visibility is forced
    /// to `Shared` in the same transaction as the insert, overwriting
    /// `Public` if set. Precondition order: ownership, then target lookup,
    /// then the duplicate-pair constraint.
    pub async fn create_share(
        &self,
        note_id: NoteId,
        principal: &str,
        target_email: &str,
    ) -> Result<Share> {
        let requester = self.resolve_principal(principal).await?;
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;
        if note.owner_id != requester.id {
            return Err(Error::Forbidden);
        }

        let target = self
            .store
            .find_user_by_email(target_email)
            .await?
            .ok_or(Error::NotFound("target user"))?;

        let share = self
            .store
            .insert_share(note_id, target.id, Permission::Read)
            .await?
            .or_conflict(Error::Conflict("note already shared with this user"))?;

        tracing::debug!(
            note_id = note_id.as_i64(),
            share_id = share.id.as_i64(),
            "created share"
        );
        Ok(share)
    }

    /// Revoke a share. Owner-only; the note's visibility is left untouched,
    /// even when this was the last grant.
    pub async fn delete_share(&self, share_id: ShareId, principal: &str) -> Result<()> {
        let requester = self.resolve_principal(principal).await?;
        let share = self
            .store
            .get_share(share_id)
            .await?
            .ok_or(Error::NotFound("share"))?;
        let note = self
            .store
            .get_note(share.note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;
        if note.owner_id != requester.id {
            return Err(Error::Forbidden);
        }

        self.store.delete_share(share_id).await?;
        tracing::debug!(share_id = share_id.as_i64(), "deleted share");
        Ok(())
    }

    /// List a note's shares. Requires read access to the note.
    pub async fn list_shares(&self, note_id: NoteId, principal: &str) -> Result<Vec<Share>> {
        let requester = self.resolve_principal(principal).await?;
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;

        let has_share = self.store.share_exists(note_id, requester.id).await?;
        if !decide_read(&note, requester.id, has_share).is_allowed() {
            return Err(Error::Forbidden);
        }

        Ok(self.store.list_shares(note_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Public Link Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint a public link for an owned note.
    ///
    /// The token is generated before the insert; the note's visibility is
    /// forced to `Public` in the same transaction, overwriting `Shared` if
    /// set. `expires_at` is Unix milliseconds; `None` never expires. More
    /// than one live link per note is permitted.
    pub async fn create_public_link(
        &self,
        note_id: NoteId,
        principal: &str,
        expires_at: Option<i64>,
    ) -> Result<PublicLink> {
        let requester = self.resolve_principal(principal).await?;
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;
        if note.owner_id != requester.id {
            return Err(Error::Forbidden);
        }

        let token = LinkToken::generate();
        let link = self
            .store
            .insert_public_link(note_id, token, expires_at)
            .await?
            .or_conflict(Error::Conflict("token collision, retry"))?;

        tracing::debug!(
            note_id = note_id.as_i64(),
            link_id = link.id.as_i64(),
            "created public link"
        );
        Ok(link)
    }

    /// Resolve a public token to its note. Anonymous: no principal, no
    /// access check.
    ///
    /// An unknown token is `NotFound`; a known token whose expiry has
    /// strictly passed is `Expired`. A link expiring at instant T is still
    /// valid at exactly T.
    pub async fn resolve_public_token(&self, token: &str) -> Result<Note> {
        let link = self
            .store
            .find_public_link_by_token(token)
            .await?
            .ok_or(Error::NotFound("public link"))?;

        if link.is_expired(now_millis()) {
            return Err(Error::Expired);
        }

        self.store
            .get_note(link.note_id)
            .await?
            .ok_or(Error::NotFound("note"))
    }

    /// Delete a public link. Owner-only; the note's visibility is left
    /// untouched, even when this was the last link.
    pub async fn delete_public_link(&self, link_id: LinkId, principal: &str) -> Result<()> {
        let requester = self.resolve_principal(principal).await?;
        let link = self
            .store
            .get_public_link(link_id)
            .await?
            .ok_or(Error::NotFound("public link"))?;
        let note = self
            .store
            .get_note(link.note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;
        if note.owner_id != requester.id {
            return Err(Error::Forbidden);
        }

        self.store.delete_public_link(link_id).await?;
        tracing::debug!(link_id = link_id.as_i64(), "deleted public link");
        Ok(())
    }

    /// List a note's public links, newest first. Owner-only: tokens are
    /// credentials, so read access alone is not enough.
    pub async fn list_public_links(
        &self,
        note_id: NoteId,
        principal: &str,
    ) -> Result<Vec<PublicLink>> {
        let requester = self.resolve_principal(principal).await?;
        let note = self
            .store
            .get_note(note_id)
            .await?
            .ok_or(Error::NotFound("note"))?;
        if note.owner_id != requester.id {
            return Err(Error::Forbidden);
        }

        Ok(self.store.list_public_links(note_id).await?)
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
