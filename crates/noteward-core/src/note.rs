//! The note record and its visibility field.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{NoteId, UserId};

/// How a note is currently exposed.
///
/// This is a denormalized indicator, not a derived value: each granting
/// action force-sets it (share -> `Shared`, public link -> `Public`), and
/// revoking a grant never downgrades it. It can therefore lag behind the
/// actual grant sets. Callers must treat it as the exposure level most
/// recently asserted, not as proof that grants exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Readable by the owner only (plus any shares that still exist).
    Private,
    /// Shared with specific users.
    Shared,
    /// Reachable by anyone holding a link token.
    Public,
}

impl Visibility {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "PRIVATE",
            Visibility::Shared => "SHARED",
            Visibility::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = ParseVisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRIVATE" => Ok(Visibility::Private),
            "SHARED" => Ok(Visibility::Shared),
            "PUBLIC" => Ok(Visibility::Public),
            other => Err(ParseVisibilityError(other.to_string())),
        }
    }
}

/// Error parsing a stored visibility string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown visibility: {0}")]
pub struct ParseVisibilityError(pub String);

/// A text note.
///
/// The owner is set at creation and never transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: UserId,
    pub title: String,
    pub body: String,
    pub visibility: Visibility,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds.
    pub updated_at: i64,
    /// Normalized tag labels, unordered and unique.
    pub tags: BTreeSet<String>,
}

/// Input for creating a note. The store assigns id and timestamps;
/// visibility always starts at `Private`.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: UserId,
    pub title: String,
    pub body: String,
    pub tags: BTreeSet<String>,
}

/// Partial update of a note. `None` fields are left untouched.
///
/// A requested visibility is applied verbatim, without checking that it
/// matches the existing share/link sets.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub visibility: Option<Visibility>,
    pub tags: Option<BTreeSet<String>>,
}

impl NotePatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.visibility.is_none()
            && self.tags.is_none()
    }
}

/// Normalize a set of raw tag labels: trim, lowercase, drop empties.
pub fn normalize_tags<I, S>(labels: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .map(|l| l.as_ref().trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_roundtrip() {
        for v in [Visibility::Private, Visibility::Shared, Visibility::Public] {
            assert_eq!(v.as_str().parse::<Visibility>().unwrap(), v);
        }
    }

    #[test]
    fn test_visibility_parse_rejects_unknown() {
        assert!("public".parse::<Visibility>().is_err());
        assert!("".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(["  Rust ", "rust", "DB", ""]);
        let expected: BTreeSet<String> = ["rust", "db"].iter().map(|s| s.to_string()).collect();
        assert_eq!(tags, expected);
    }

    #[test]
    fn test_note_json_roundtrip() {
        let note = Note {
            id: NoteId::new(7),
            owner_id: UserId::new(1),
            title: "groceries".into(),
            body: "milk".into(),
            visibility: Visibility::Shared,
            created_at: 1_000,
            updated_at: 2_000,
            tags: normalize_tags(["home", "lists"]),
        };
        let json = serde_json::to_string(&note).unwrap();
        let back: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn test_empty_patch() {
        assert!(NotePatch::default().is_empty());
        let patch = NotePatch {
            body: Some("x".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
