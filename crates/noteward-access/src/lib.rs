//! # Noteward Access
//!
//! The access-control rules of noteward, kept pure and separate from
//! storage so they can be tested as simple predicates.
//!
//! ## Overview
//!
//! Two concerns live here:
//!
//! - **Read decisions** ([`decision`]): given a loaded note, a requesting
//!   user, and whether a share grant exists, decide allow or deny. Evaluated
//!   first-true-wins: owner, then grant, then public visibility.
//! - **Visibility transitions** ([`visibility`]): the rules that move a
//!   note's visibility field when grants are created or revoked. These are
//!   deliberately non-strict - granting actions force-set the field and
//!   revocations never downgrade it, so visibility is a cache that can lag
//!   behind the actual grant sets.
//!
//! Neither module performs I/O; the facade loads state, asks here, and maps
//! a denial to its `Forbidden` error.

pub mod decision;
pub mod visibility;

pub use decision::{can_read, decide_read, ReadAccess};
