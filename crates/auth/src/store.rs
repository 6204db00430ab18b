//! User storage port.
//!
//! Implementations live in `notekeeper-infra`. Username uniqueness is the
//! store's responsibility and must surface as [`UserStoreError::Duplicate`].

use async_trait::async_trait;
use thiserror::Error;

use notekeeper_core::{User, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("username already taken")]
    Duplicate,

    #[error("user not found")]
    NotFound,

    #[error("user storage failure: {0}")]
    Backend(String),
}

/// A user about to be persisted (id and creation time are assigned by storage).
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: Vec<u8>,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<UserId, UserStoreError>;

    async fn find_by_username(&self, username: &str) -> Result<User, UserStoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError>;
}
