//! `notekeeper-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Note, User};
pub use error::{require_non_blank, DomainError, DomainResult};
pub use id::{NoteId, UserId};
