//! Stored records: users and their notes.

use chrono::{DateTime, Utc};

use crate::{NoteId, UserId};

/// A registered account.
///
/// # Invariants
/// - `username` is unique across all users (enforced by storage) and immutable.
/// - `password_hash` is opaque outside the credential hasher and never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A note owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
}
