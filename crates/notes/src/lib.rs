//! `notekeeper-notes`: personal notes, gated by a spelling check.

pub mod service;
pub mod spelling;
pub mod store;

pub use service::{NoteError, NoteService};
pub use spelling::{AcceptAll, Misspelling, SpellCheckError, SpellChecker};
pub use store::{NewNote, NoteStore, NoteStoreError};
