//! Yandex.Speller `checkText` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use notekeeper_notes::{Misspelling, SpellCheckError, SpellChecker};

/// Public Yandex endpoint.
pub const DEFAULT_URL: &str = "http://speller.yandex.net/services/spellservice.json/checkText";

/// One entry of the service's JSON array. Row/column/suggestion fields are ignored.
#[derive(Debug, Deserialize)]
struct SpellerHit {
    pos: usize,
    word: String,
}

#[derive(Debug, Clone)]
pub struct YandexSpeller {
    client: reqwest::Client,
    url: String,
}

impl YandexSpeller {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SpellCheckError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpellCheckError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn unavailable(err: reqwest::Error) -> SpellCheckError {
    SpellCheckError::Unavailable(err.to_string())
}

#[async_trait]
impl SpellChecker for YandexSpeller {
    async fn check(&self, text: &str) -> Result<(), SpellCheckError> {
        let hits: Vec<SpellerHit> = self
            .client
            .get(&self.url)
            .query(&[("text", text)])
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        if hits.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = hits.len(), "speller reported misspellings");
        Err(SpellCheckError::Misspelled(
            hits.into_iter()
                .map(|h| Misspelling {
                    pos: h.pos,
                    word: h.word,
                })
                .collect(),
        ))
    }
}
