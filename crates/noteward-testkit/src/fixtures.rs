//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use noteward::{Note, Noteward, NotewardConfig, PublicLink, Share, UserRecord};
use noteward_store::MemoryStore;

/// A test fixture wrapping a service over an in-memory store.
pub struct TestFixture {
    pub svc: Noteward<MemoryStore>,
}

impl TestFixture {
    /// Create a new fixture with an empty in-memory store.
    pub fn new() -> Self {
        Self {
            svc: Noteward::new(MemoryStore::new(), NotewardConfig::default()),
        }
    }

    /// Register a user, panicking on duplicates.
    pub async fn user(&self, email: &str) -> UserRecord {
        self.svc
            .register_user(email)
            .await
            .expect("fixture user registration failed")
    }

    /// Create a private note for an already-registered owner.
    pub async fn note(&self, owner: &str, title: &str) -> Note {
        self.svc
            .create_note(owner, title, "fixture body", &[])
            .await
            .expect("fixture note creation failed")
    }

    /// Create a note already shared with `grantee`. Both emails must be
    /// registered. The returned note reflects the forced SHARED visibility.
    pub async fn shared_note(&self, owner: &str, grantee: &str) -> (Note, Share) {
        let note = self.note(owner, "shared fixture").await;
        let share = self
            .svc
            .create_share(note.id, owner, grantee)
            .await
            .expect("fixture share creation failed");
        let note = self
            .svc
            .get_note(note.id, owner)
            .await
            .expect("fixture note reload failed");
        (note, share)
    }

    /// Create a note with a live public link. The returned note reflects
    /// the forced PUBLIC visibility.
    pub async fn public_note(&self, owner: &str, expires_at: Option<i64>) -> (Note, PublicLink) {
        let note = self.note(owner, "public fixture").await;
        let link = self
            .svc
            .create_public_link(note.id, owner, expires_at)
            .await
            .expect("fixture link creation failed");
        let note = self
            .svc
            .get_note(note.id, owner)
            .await
            .expect("fixture note reload failed");
        (note, link)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Distinct test emails for multi-party tests.
pub fn test_emails(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("user{}@example.com", i)).collect()
}
