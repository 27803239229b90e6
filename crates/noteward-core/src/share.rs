//! Share grants: per-user read access to a note.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{NoteId, ShareId, UserId};

/// What a share allows the target user to do.
///
/// Currently only `Read` exists. An enum rather than a bool so that write or
/// admin grants can be added without reshaping stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Read,
}

impl Permission {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "READ",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(Permission::Read),
            other => Err(ParsePermissionError(other.to_string())),
        }
    }
}

/// Error parsing a stored permission string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct ParsePermissionError(pub String);

/// A grant of access to one note for one user.
///
/// At most one share may exist per (note, shared-with-user) pair; the store
/// enforces this with a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: ShareId,
    pub note_id: NoteId,
    pub shared_with: UserId,
    pub permission: Permission,
}
