//! # Noteward Testkit
//!
//! Testing utilities for noteward.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Helper structs for setting up test scenarios over the
//!   in-memory store
//! - **Generators**: Proptest strategies for domain values (emails, titles,
//!   tags, visibility, tokens, expiries)
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust,no_run
//! use noteward_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     fixture.user("alice@example.com").await;
//!     fixture.user("bob@example.com").await;
//!     let (note, share) = fixture
//!         .shared_note("alice@example.com", "bob@example.com")
//!         .await;
//!     assert_eq!(share.note_id, note.id);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use noteward_testkit::generators::token_string;
//!
//! proptest! {
//!     #[test]
//!     fn tokens_roundtrip(s in token_string()) {
//!         let token: noteward::LinkToken = s.parse().unwrap();
//!         prop_assert_eq!(token.as_str(), s.as_str());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{test_emails, TestFixture};
