//! Note storage port.

use async_trait::async_trait;
use thiserror::Error;

use notekeeper_core::{Note, NoteId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoteStoreError {
    #[error("note storage failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub user_id: UserId,
    pub title: String,
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create_note(&self, note: NewNote) -> Result<NoteId, NoteStoreError>;

    /// Notes owned by `user_id`, oldest first.
    async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>, NoteStoreError>;
}
