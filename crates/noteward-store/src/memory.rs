//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use noteward_access::visibility;

use noteward_core::{
    LinkId, LinkToken, NewNote, Note, NoteId, NotePatch, Page, PageRequest, Permission,
    PublicLink, Share, ShareId, UserId, UserRecord,
};

use crate::error::Result;
use crate::traits::{InsertOutcome, NoteQuery, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    users: HashMap<UserId, UserRecord>,
    notes: HashMap<NoteId, Note>,
    shares: HashMap<ShareId, Share>,
    links: HashMap<LinkId, PublicLink>,
    next_id: i64,
}

impl MemoryStoreInner {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                users: HashMap::new(),
                notes: HashMap::new(),
                shares: HashMap::new(),
                links: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, email: &str) -> Result<InsertOutcome<UserRecord>> {
        let mut inner = self.inner.write().unwrap();

        if inner.users.values().any(|u| u.email == email) {
            return Ok(InsertOutcome::Conflict);
        }

        let user = UserRecord {
            id: UserId::new(inner.allocate_id()),
            email: email.to_string(),
            created_at: now_millis(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(InsertOutcome::Inserted(user))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        let mut inner = self.inner.write().unwrap();
        let now = now_millis();

        let note = Note {
            id: NoteId::new(inner.allocate_id()),
            owner_id: note.owner_id,
            title: note.title,
            body: note.body,
            visibility: visibility::on_note_created(),
            created_at: now,
            updated_at: now,
            tags: note.tags,
        };
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.notes.get(&id).cloned())
    }

    async fn update_note(&self, id: NoteId, patch: NotePatch) -> Result<Option<Note>> {
        let mut inner = self.inner.write().unwrap();

        let Some(note) = inner.notes.get_mut(&id) else {
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
        if let Some(tags) = patch.tags {
            note.tags = tags;
        }
        note.updated_at = now_millis();

        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();

        if inner.notes.remove(&id).is_none() {
            return Ok(false);
        }
        inner.shares.retain(|_, s| s.note_id != id);
        inner.links.retain(|_, l| l.note_id != id);
        Ok(true)
    }

    async fn search_notes(
        &self,
        owner: UserId,
        query: &NoteQuery,
        page: PageRequest,
    ) -> Result<Page<Note>> {
        let inner = self.inner.read().unwrap();

        let mut matches: Vec<Note> = inner
            .notes
            .values()
            .filter(|n| n.owner_id == owner)
            .filter(|n| match &query.text {
                Some(text) => n.title.to_lowercase().contains(&text.to_lowercase()),
                None => true,
            })
            .filter(|n| match &query.tag {
                Some(tag) => n.tags.contains(tag),
                None => true,
            })
            .filter(|n| match query.visibility {
                Some(v) => n.visibility == v,
                None => true,
            })
            .cloned()
            .collect();

        // Newest activity first, id as the tiebreaker like the SQL backend.
        matches.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.id.as_i64().cmp(&a.id.as_i64()))
        });

        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();

        Ok(Page {
            items,
            page: page.page,
            size: page.size,
            total,
        })
    }

    async fn insert_share(
        &self,
        note_id: NoteId,
        shared_with: UserId,
        permission: Permission,
    ) -> Result<InsertOutcome<Share>> {
        let mut inner = self.inner.write().unwrap();

        if inner
            .shares
            .values()
            .any(|s| s.note_id == note_id && s.shared_with == shared_with)
        {
            return Ok(InsertOutcome::Conflict);
        }

        let share = Share {
            id: ShareId::new(inner.allocate_id()),
            note_id,
            shared_with,
            permission,
        };
        inner.shares.insert(share.id, share.clone());

        // Force SHARED in the same unit of work as the grant.
        if let Some(note) = inner.notes.get_mut(&note_id) {
            note.visibility = visibility::on_share_created(note.visibility);
            note.updated_at = now_millis();
        }

        Ok(InsertOutcome::Inserted(share))
    }

    async fn get_share(&self, id: ShareId) -> Result<Option<Share>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.shares.get(&id).cloned())
    }

    async fn delete_share(&self, id: ShareId) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner.shares.remove(&id).is_some())
    }

    async fn list_shares(&self, note_id: NoteId) -> Result<Vec<Share>> {
        let inner = self.inner.read().unwrap();

        let mut shares: Vec<Share> = inner
            .shares
            .values()
            .filter(|s| s.note_id == note_id)
            .cloned()
            .collect();
        shares.sort_by_key(|s| s.id.as_i64());
        Ok(shares)
    }

    async fn share_exists(&self, note_id: NoteId, user: UserId) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .shares
            .values()
            .any(|s| s.note_id == note_id && s.shared_with == user))
    }

    async fn insert_public_link(
        &self,
        note_id: NoteId,
        token: LinkToken,
        expires_at: Option<i64>,
    ) -> Result<InsertOutcome<PublicLink>> {
        let mut inner = self.inner.write().unwrap();

        if inner.links.values().any(|l| l.token == token) {
            return Ok(InsertOutcome::Conflict);
        }

        let link = PublicLink {
            id: LinkId::new(inner.allocate_id()),
            note_id,
            token,
            created_at: now_millis(),
            expires_at,
        };
        inner.links.insert(link.id, link.clone());

        // Force PUBLIC in the same unit of work as the link.
        if let Some(note) = inner.notes.get_mut(&note_id) {
            note.visibility = visibility::on_link_created(note.visibility);
            note.updated_at = now_millis();
        }

        Ok(InsertOutcome::Inserted(link))
    }

    async fn get_public_link(&self, id: LinkId) -> Result<Option<PublicLink>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.links.get(&id).cloned())
    }

    async fn find_public_link_by_token(&self, token: &str) -> Result<Option<PublicLink>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .links
            .values()
            .find(|l| l.token.as_str() == token)
            .cloned())
    }

    async fn delete_public_link(&self, id: LinkId) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner.links.remove(&id).is_some())
    }

    async fn list_public_links(&self, note_id: NoteId) -> Result<Vec<PublicLink>> {
        let inner = self.inner.read().unwrap();

        let mut links: Vec<PublicLink> = inner
            .links
            .values()
            .filter(|l| l.note_id == note_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.as_i64().cmp(&a.id.as_i64()))
        });
        Ok(links)
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

#[cfg(test)]
mod tests {
    use super::*;
    use noteward_core::Visibility;
    use std::collections::BTreeSet;

    async fn seed_user(store: &MemoryStore, email: &str) -> UserRecord {
        match store.insert_user(email).await.unwrap() {
            InsertOutcome::Inserted(user) => user,
            InsertOutcome::Conflict => panic!("user already exists: {}", email),
        }
    }

    async fn seed_note(store: &MemoryStore, owner: UserId) -> Note {
        store
            .insert_note(NewNote {
                owner_id: owner,
                title: "note".to_string(),
                body: String::new(),
                tags: BTreeSet::new(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@example.com").await;
        let note = seed_note(&store, alice.id).await;

        assert_eq!(note.visibility, Visibility::Private);
        let loaded = store.get_note(note.id).await.unwrap().unwrap();
        assert_eq!(loaded, note);
    }

    #[tokio::test]
    async fn test_memory_store_duplicate_email() {
        let store = MemoryStore::new();
        seed_user(&store, "alice@example.com").await;

        let outcome = store.insert_user("alice@example.com").await.unwrap();
        assert_eq!(outcome, InsertOutcome::Conflict);
    }

    #[tokio::test]
    async fn test_memory_store_share_semantics_match_sqlite() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let note = seed_note(&store, alice.id).await;

        let InsertOutcome::Inserted(share) = store
            .insert_share(note.id, bob.id, Permission::Read)
            .await
            .unwrap()
        else {
            panic!("share should insert");
        };
        assert_eq!(
            store.get_note(note.id).await.unwrap().unwrap().visibility,
            Visibility::Shared
        );

        let dup = store
            .insert_share(note.id, bob.id, Permission::Read)
            .await
            .unwrap();
        assert_eq!(dup, InsertOutcome::Conflict);

        // Revoking the grant leaves visibility alone.
        assert!(store.delete_share(share.id).await.unwrap());
        assert_eq!(
            store.get_note(note.id).await.unwrap().unwrap().visibility,
            Visibility::Shared
        );
    }

    #[tokio::test]
    async fn test_memory_store_link_semantics_match_sqlite() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@example.com").await;
        let note = seed_note(&store, alice.id).await;

        let token = LinkToken::generate();
        let InsertOutcome::Inserted(link) = store
            .insert_public_link(note.id, token.clone(), None)
            .await
            .unwrap()
        else {
            panic!("link should insert");
        };
        assert_eq!(
            store.get_note(note.id).await.unwrap().unwrap().visibility,
            Visibility::Public
        );

        let dup = store.insert_public_link(note.id, token, None).await.unwrap();
        assert_eq!(dup, InsertOutcome::Conflict);

        assert!(store.delete_public_link(link.id).await.unwrap());
        assert_eq!(
            store.get_note(note.id).await.unwrap().unwrap().visibility,
            Visibility::Public
        );
    }

    #[tokio::test]
    async fn test_memory_store_delete_note_cascades() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let note = seed_note(&store, alice.id).await;

        store
            .insert_share(note.id, bob.id, Permission::Read)
            .await
            .unwrap();
        let InsertOutcome::Inserted(link) = store
            .insert_public_link(note.id, LinkToken::generate(), None)
            .await
            .unwrap()
        else {
            panic!("link should insert");
        };

        assert!(store.delete_note(note.id).await.unwrap());
        assert!(store.list_shares(note.id).await.unwrap().is_empty());
        assert!(store.get_public_link(link.id).await.unwrap().is_none());
        assert!(!store.delete_note(note.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_search_ordering() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@example.com").await;

        let first = seed_note(&store, alice.id).await;
        seed_note(&store, alice.id).await;

        // Touch the first note so it sorts ahead of the second.
        store
            .update_note(
                first.id,
                NotePatch {
                    body: Some("edited".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let page = store
            .search_notes(alice.id, &NoteQuery::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items[0].updated_at >= page.items[1].updated_at);
    }
}
