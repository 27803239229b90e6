//! Strong type definitions for noteward.
//!
//! All identifiers are newtypes to prevent misuse at compile time. Ownership
//! and grant checks compare resolved ids, never raw principal strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl $name {
            /// Create from a raw row id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw row id.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype! {
    /// Stable numeric identity of a user, produced by the identity resolver.
    UserId
}

id_newtype! {
    /// Identity of a note.
    NoteId
}

id_newtype! {
    /// Identity of a share grant.
    ShareId
}

id_newtype! {
    /// Identity of a public link.
    LinkId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", NoteId::new(42)), "42");
        assert_eq!(format!("{:?}", UserId::new(7)), "UserId(7)");
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // Compiles only because each newtype has its own equality.
        assert_eq!(UserId::new(1), UserId::from(1));
        assert_ne!(ShareId::new(1), ShareId::new(2));
    }
}
