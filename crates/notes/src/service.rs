use std::sync::Arc;

use thiserror::Error;

use notekeeper_core::{DomainError, Note, NoteId, UserId, require_non_blank};

use crate::spelling::{Misspelling, SpellCheckError, SpellChecker, describe_misspellings};
use crate::store::{NewNote, NoteStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("{0}")]
    Validation(String),

    /// The title was rejected by the spelling collaborator.
    #[error("spelling mistakes: {}", describe_misspellings(.0))]
    Misspelled(Vec<Misspelling>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for NoteError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => NoteError::Validation(msg),
            other => NoteError::Validation(other.to_string()),
        }
    }
}

/// Creates and lists notes for an already-authenticated user.
pub struct NoteService {
    notes: Arc<dyn NoteStore>,
    speller: Arc<dyn SpellChecker>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteStore>, speller: Arc<dyn SpellChecker>) -> Self {
        Self { notes, speller }
    }

    pub async fn create_note(&self, user_id: UserId, title: &str) -> Result<NoteId, NoteError> {
        require_non_blank("title", title)?;

        match self.speller.check(title).await {
            Ok(()) => {}
            Err(SpellCheckError::Misspelled(words)) => return Err(NoteError::Misspelled(words)),
            Err(e) => return Err(NoteError::Internal(e.to_string())),
        }

        let id = self
            .notes
            .create_note(NewNote {
                user_id,
                title: title.to_owned(),
            })
            .await
            .map_err(|e| NoteError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user_id, note_id = %id, "note created");
        Ok(id)
    }

    pub async fn list_notes(&self, user_id: UserId) -> Result<Vec<Note>, NoteError> {
        self.notes
            .list_notes(user_id)
            .await
            .map_err(|e| NoteError::Internal(e.to_string()))
    }
}
