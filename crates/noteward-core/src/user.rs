//! User records.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A registered user.
///
/// The email doubles as the principal string produced by the authentication
/// layer; everything downstream works with the resolved [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    /// Unix milliseconds.
    pub created_at: i64,
}
