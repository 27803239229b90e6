//! # Noteward
//!
//! The unified API for noteward - a notes system with per-user sharing and
//! tokenized public links.
//!
//! ## Overview
//!
//! Noteward provides a storage-backed library for:
//!
//! - **Notes**: Owned text records with tags and a visibility indicator
//! - **Shares**: Per-user read grants on a note
//! - **Public links**: Unguessable tokens granting anonymous reads, with
//!   optional expiry
//! - **Access decisions**: owner, then grant, then public visibility
//!
//! ## Key Concepts
//!
//! - **Visibility**: A denormalized exposure indicator. Granting actions
//!   force-set it; revocations never downgrade it, so it can go stale.
//! - **Principal**: The caller's email, resolved to a user id before any
//!   ownership comparison.
//! - **Token**: 32 lowercase hex chars from 128 bits of OS randomness.
//!   Expired tokens are reported distinctly from unknown ones.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use noteward::{Noteward, NotewardConfig};
//! use noteward::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("noteward.db").unwrap();
//!     let svc = Noteward::new(store, NotewardConfig::default());
//!
//!     svc.register_user("alice@example.com").await.unwrap();
//!     let note = svc
//!         .create_note("alice@example.com", "groceries", "milk", &["home"])
//!         .await
//!         .unwrap();
//!
//!     let link = svc
//!         .create_public_link(note.id, "alice@example.com", None)
//!         .await
//!         .unwrap();
//!     let seen = svc.resolve_public_token(link.token.as_str()).await.unwrap();
//!     assert_eq!(seen.id, note.id);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `noteward::core` - Domain primitives (Note, Visibility, LinkToken, ...)
//! - `noteward::store` - Storage abstraction, SQLite and in-memory backends
//! - `noteward::access` - The pure read-access decision engine

pub mod error;
pub mod service;

// Re-export component crates
pub use noteward_access as access;
pub use noteward_core as core;
pub use noteward_store as store;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use service::{Noteward, NotewardConfig};

// Re-export commonly used core types
pub use noteward_core::{
    LinkId, LinkToken, Note, NoteId, NotePatch, Page, PageRequest, Permission, PublicLink, Share,
    ShareId, UserId, UserRecord, Visibility, TOKEN_LEN,
};
