use serde::{Deserialize, Serialize};

use notekeeper_core::{Note, NoteId, UserId};

/// Body of both `/sign-up` and `/sign-in`.
#[derive(Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CreateNoteResponse {
    pub id: NoteId,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: NoteId,
    pub title: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
        }
    }
}
