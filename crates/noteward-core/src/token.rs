//! Public link tokens.
//!
//! A token is the only credential for unauthenticated note access, so it
//! must be unguessable. Tokens are derived from 128 bits of OS randomness
//! and rendered as 32 lowercase hex characters with no separators. A token
//! is generated exactly once, before the link row is inserted, and never
//! regenerated for an existing link.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Length of a rendered token in characters.
pub const TOKEN_LEN: usize = 32;

/// An opaque, unguessable token identifying one public link.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkToken(String);

impl LinkToken {
    /// Generate a fresh token from 128 bits of cryptographic randomness.
    ///
    /// Collisions are negligible by construction, but the store still keeps
    /// a uniqueness constraint and fails the insert on a collision.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// View the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are credentials; keep logs to a prefix.
        write!(f, "LinkToken({}..)", &self.0[..8.min(self.0.len())])
    }
}

impl FromStr for LinkToken {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TOKEN_LEN {
            return Err(ParseTokenError::BadLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(ParseTokenError::BadCharset);
        }
        Ok(Self(s.to_string()))
    }
}

/// Error parsing a token from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTokenError {
    #[error("token must be {TOKEN_LEN} characters, got {0}")]
    BadLength(usize),

    #[error("token must be lowercase hex")]
    BadCharset,
}
