//! Public links: token-addressed, optionally expiring read access.

use serde::{Deserialize, Serialize};

use crate::token::LinkToken;
use crate::types::{LinkId, NoteId};

/// A public link granting unauthenticated read access to one note.
///
/// Nothing deletes a prior link when a new one is created, so several links
/// may be live for the same note at once; one-link-per-note is an intent,
/// not an enforced invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicLink {
    pub id: LinkId,
    pub note_id: NoteId,
    pub token: LinkToken,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds; `None` means the link never expires.
    pub expires_at: Option<i64>,
}

impl PublicLink {
    /// Whether the link has lapsed at time `now` (Unix ms).
    ///
    /// Expiry uses "now strictly after expiry": the link is still valid at
    /// the expiry instant itself.
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }
}
