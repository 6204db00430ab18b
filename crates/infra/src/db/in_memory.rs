use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use notekeeper_auth::{NewUser, UserStore, UserStoreError};
use notekeeper_core::{Note, NoteId, User, UserId};
use notekeeper_notes::{NewNote, NoteStore, NoteStoreError};

#[derive(Debug, Default)]
struct UserRows {
    last_id: i64,
    by_username: HashMap<String, User>,
}

/// In-memory user store.
///
/// Intended for tests/dev. The uniqueness check and insert happen under one
/// write lock, so concurrent sign-ups of the same username yield exactly one
/// user.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<UserRows>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> UserStoreError {
    UserStoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<UserId, UserStoreError> {
        let mut rows = self.inner.write().map_err(|_| poisoned())?;

        if rows.by_username.contains_key(&user.username) {
            return Err(UserStoreError::Duplicate);
        }

        rows.last_id += 1;
        let id = UserId::from_i64(rows.last_id);
        rows.by_username.insert(
            user.username.clone(),
            User {
                id,
                username: user.username,
                password_hash: user.password_hash,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, UserStoreError> {
        let rows = self.inner.read().map_err(|_| poisoned())?;
        rows.by_username
            .get(username)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError> {
        let rows = self.inner.read().map_err(|_| poisoned())?;
        rows.by_username
            .values()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }
}

/// In-memory note store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    inner: RwLock<Vec<Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn create_note(&self, note: NewNote) -> Result<NoteId, NoteStoreError> {
        let mut rows = self
            .inner
            .write()
            .map_err(|_| NoteStoreError::Backend("lock poisoned".to_string()))?;

        let id = NoteId::from_i64(rows.len() as i64 + 1);
        rows.push(Note {
            id,
            user_id: note.user_id,
            title: note.title,
        });

        Ok(id)
    }

    async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>, NoteStoreError> {
        let rows = self
            .inner
            .read()
            .map_err(|_| NoteStoreError::Backend("lock poisoned".to_string()))?;

        Ok(rows.iter().filter(|n| n.user_id == user_id).cloned().collect())
    }
}
