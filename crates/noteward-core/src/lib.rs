//! # Noteward Core
//!
//! Domain primitives for noteward: notes, per-user share grants, public
//! link tokens, and the visibility field that caches a note's exposure.
//!
//! ## Key Types
//!
//! - [`Note`] / [`Visibility`] - a text note and its exposure indicator
//! - [`Share`] / [`Permission`] - a grant of access for one user
//! - [`PublicLink`] / [`LinkToken`] - token-addressed public access
//! - [`UserRecord`] - a registered user, resolved from a principal email
//! - [`UserId`], [`NoteId`], [`ShareId`], [`LinkId`] - id newtypes
//!
//! ## Design Notes
//!
//! - **Visibility is a cache**: granting actions force-set it; revocations
//!   never downgrade it. See [`Visibility`].
//! - **Tokens are factory-made**: [`LinkToken::generate`] runs before the
//!   row is persisted, never as a storage-layer hook.

pub mod link;
pub mod note;
pub mod page;
pub mod share;
pub mod token;
pub mod types;
pub mod user;

pub use link::PublicLink;
pub use note::{normalize_tags, NewNote, Note, NotePatch, ParseVisibilityError, Visibility};
pub use page::{Page, PageRequest};
pub use share::{ParsePermissionError, Permission, Share};
pub use token::{LinkToken, ParseTokenError, TOKEN_LEN};
pub use types::{LinkId, NoteId, ShareId, UserId};
pub use user::UserRecord;
