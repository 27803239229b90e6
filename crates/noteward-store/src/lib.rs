//! # Noteward Store
//!
//! Storage abstraction for noteward. Provides a trait-based interface for
//! persisting users, notes, share grants, and public links, with SQLite and
//! in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`Store`] trait,
//! allowing the service layer to be storage-agnostic. The primary
//! implementation is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertOutcome`] - Result of a uniqueness-guarded insert
//! - [`NoteQuery`] - Filter for owner-scoped note searches
//!
//! ## Usage
//!
//! ```rust,no_run
//! use noteward_store::{SqliteStore, Store, InsertOutcome};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("noteward.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     match store.insert_user("alice@example.com").await.unwrap() {
//!         InsertOutcome::Inserted(user) => println!("registered {}", user.email),
//!         InsertOutcome::Conflict => println!("email taken"),
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Constraint-backed uniqueness**: duplicate emails, duplicate share
//!   pairs, and token collisions surface as [`InsertOutcome::Conflict`]
//! - **Transactional compound writes**: a share or link insert force-sets
//!   the note's visibility in the same transaction
//! - **Explicit cascade**: deleting a note removes its shares, links, and
//!   tag joins in one transaction

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertOutcome, NoteQuery, Store};
