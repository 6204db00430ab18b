//! Spelling collaborator port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One misspelled word, `pos` being its zero-based offset in the checked text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Misspelling {
    pub pos: usize,
    pub word: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpellCheckError {
    #[error("{}", describe_misspellings(.0))]
    Misspelled(Vec<Misspelling>),

    #[error("spell checker unavailable: {0}")]
    Unavailable(String),
}

/// Renders `at 1: wrod; at 12: speling` with one-based positions.
pub fn describe_misspellings(misspellings: &[Misspelling]) -> String {
    misspellings
        .iter()
        .map(|m| format!("at {}: {}", m.pos + 1, m.word))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
pub trait SpellChecker: Send + Sync {
    async fn check(&self, text: &str) -> Result<(), SpellCheckError>;
}

/// Checker that accepts every text (spell checking disabled).
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

#[async_trait]
impl SpellChecker for AcceptAll {
    async fn check(&self, _text: &str) -> Result<(), SpellCheckError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misspelled_message_lists_one_based_positions() {
        let err = SpellCheckError::Misspelled(vec![
            Misspelling {
                pos: 0,
                word: "wrod".into(),
            },
            Misspelling {
                pos: 11,
                word: "speling".into(),
            },
        ]);
        assert_eq!(err.to_string(), "at 1: wrod; at 12: speling");
    }
}
