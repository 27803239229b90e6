//! Error types for the noteward service.

use noteward_store::StoreError;
use thiserror::Error;

/// Errors that can occur during noteward operations.
///
/// `NotFound` and `Forbidden` are deliberately distinct: an authenticated
/// caller who reaches an existing note they may not read gets `Forbidden`,
/// which confirms the note exists. `Expired` is likewise distinct from
/// `NotFound` so a caller can tell a lapsed link from a deleted one.
#[derive(Debug, Error)]
pub enum Error {
    /// The named entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller is not allowed to perform this operation.
    #[error("operation not permitted")]
    Forbidden,

    /// A uniqueness rule rejected the request.
    #[error("conflict: {0}")]
    Conflict(&'static str),

    /// The public link exists but its expiry has passed.
    #[error("public link expired")]
    Expired,

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for noteward operations.
pub type Result<T> = std::result::Result<T, Error>;
