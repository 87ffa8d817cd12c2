use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.dictionaryapi.dev";
pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("dictionary responded with {0}")]
    Status(u16),
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
    #[serde(default)]
    definitions: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
struct Sense {
    definition: Option<String>,
}

pub struct DictionaryClient {
    client: Client,
    base_url: String,
    limit: usize,
    timeout: Duration,
}

impl DictionaryClient {
    pub fn new(base_url: &str, limit: usize, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            timeout,
        }
    }

    /// Looks `word` up and returns its first definitions across all
    /// entries and meanings, in dictionary order.
    pub async fn define(&self, word: &str) -> Result<Vec<String>, DictionaryError> {
        let url = format!(
            "{}/api/v2/entries/en/{}",
            self.base_url,
            urlencoding::encode(word)
        );

        info!("Looking up {:?}", word);

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(DictionaryError::Status(response.status().as_u16()));
        }

        let entries: Vec<Entry> = response.json().await?;
        Ok(flatten(entries, self.limit))
    }
}

fn flatten(entries: Vec<Entry>, limit: usize) -> Vec<String> {
    entries
        .into_iter()
        .flat_map(|entry| entry.meanings)
        .flat_map(|meaning| meaning.definitions)
        .filter_map(|sense| sense.definition)
        .filter(|definition| !definition.is_empty())
        .take(limit)
        .collect()
}
