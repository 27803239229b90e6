//! The read-access decision engine.
//!
//! A pure predicate over an already-loaded note and share lookup. The store
//! is consulted by the caller beforehand; nothing here performs I/O.

use serde::{Deserialize, Serialize};

use noteward_core::{Note, UserId, Visibility};

/// Why (or whether) a read is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadAccess {
    /// The requester owns the note.
    Owner,
    /// A share grant exists for the requester.
    Grantee,
    /// The note's visibility is `Public`.
    ///
    /// This path is independent of whether any public link currently exists
    /// or has expired; token expiry gates only the token-based lookup.
    PublicVisibility,
    /// No rule matched.
    Denied,
}

impl ReadAccess {
    /// True for any of the allowing variants.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, ReadAccess::Denied)
    }
}

/// Decide read access for `requester`, evaluated first-true-wins:
/// owner, then existing share, then public visibility.
///
/// `has_share` is the result of the store's existence check for a share on
/// `(note.id, requester)`.
pub fn decide_read(note: &Note, requester: UserId, has_share: bool) -> ReadAccess {
    if note.owner_id == requester {
        ReadAccess::Owner
    } else if has_share {
        ReadAccess::Grantee
    } else if note.visibility == Visibility::Public {
        ReadAccess::PublicVisibility
    } else {
        ReadAccess::Denied
    }
}

/// Boolean form of [`decide_read`].
pub fn can_read(note: &Note, requester: UserId, has_share: bool) -> bool {
    decide_read(note, requester, has_share).is_allowed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteward_core::NoteId;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn make_note(owner: i64, visibility: Visibility) -> Note {
        Note {
            id: NoteId::new(1),
            owner_id: UserId::new(owner),
            title: "t".into(),
            body: "b".into(),
            visibility,
            created_at: 0,
            updated_at: 0,
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn test_owner_always_reads() {
        for v in [Visibility::Private, Visibility::Shared, Visibility::Public] {
            let note = make_note(1, v);
            assert_eq!(decide_read(&note, UserId::new(1), false), ReadAccess::Owner);
        }
    }

    #[test]
    fn test_private_denies_strangers() {
        let note = make_note(1, Visibility::Private);
        assert_eq!(decide_read(&note, UserId::new(2), false), ReadAccess::Denied);
    }

    #[test]
    fn test_share_allows_regardless_of_visibility() {
        for v in [Visibility::Private, Visibility::Shared, Visibility::Public] {
            let note = make_note(1, v);
            assert!(can_read(&note, UserId::new(2), true));
        }
    }

    #[test]
    fn test_public_visibility_allows_without_share() {
        let note = make_note(1, Visibility::Public);
        assert_eq!(
            decide_read(&note, UserId::new(2), false),
            ReadAccess::PublicVisibility
        );
    }

    #[test]
    fn test_shared_visibility_without_grant_denies() {
        // Stale SHARED visibility after the last share was deleted: the
        // stranger still has no grant, so the read is denied.
        let note = make_note(1, Visibility::Shared);
        assert!(!can_read(&note, UserId::new(2), false));
    }

    proptest! {
        #[test]
        fn owner_read_never_denied(owner in 1i64..1000, vis in 0usize..3) {
            let visibility = [Visibility::Private, Visibility::Shared, Visibility::Public][vis];
            let note = make_note(owner, visibility);
            prop_assert!(can_read(&note, UserId::new(owner), false));
        }

        #[test]
        fn grantee_read_never_denied(owner in 1i64..1000, other in 1001i64..2000, vis in 0usize..3) {
            let visibility = [Visibility::Private, Visibility::Shared, Visibility::Public][vis];
            let note = make_note(owner, visibility);
            prop_assert!(can_read(&note, UserId::new(other), true));
        }
    }
}
