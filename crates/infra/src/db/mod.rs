//! Database adapters for the user and note storage ports.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryNoteStore, InMemoryUserStore};
pub use postgres::{PgNoteStore, PgUserStore, connect, ensure_schema};
