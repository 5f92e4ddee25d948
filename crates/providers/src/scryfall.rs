//! Scryfall card database client.
//!
//! Endpoints used:
//! - `GET /cards/named?exact=<name>`: full card record
//! - `GET /cards/<id>/rulings`: official rulings
//! - `GET /cards/autocomplete?q=<partial>`: name suggestions

use async_trait::async_trait;
use mastermind_core::card::{Card, CardDataProvider, Ruling};
use mastermind_core::error::CardDataError;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Queries shorter than this return no suggestions without a request.
pub const MIN_AUTOCOMPLETE_CHARS: usize = 3;

pub struct ScryfallClient {
    base_url: String,
    client: reqwest::Client,
}

impl ScryfallClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mastermind/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Client for the public Scryfall API.
    pub fn public() -> Self {
        Self::new("https://api.scryfall.com", Duration::from_secs(5))
    }

    pub fn from_config(config: &mastermind_config::CardDataConfig) -> Self {
        Self::new(&config.base_url, config.timeout())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        not_found: impl FnOnce() -> CardDataError,
    ) -> Result<T, CardDataError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Scryfall request");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| CardDataError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(not_found());
        }
        if status != 200 {
            return Err(CardDataError::Unavailable(format!(
                "{url} returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CardDataError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CardDataProvider for ScryfallClient {
    fn name(&self) -> &str {
        "scryfall"
    }

    async fn card_by_name(&self, name: &str) -> Result<Card, CardDataError> {
        let card: ApiCard = self
            .get_json("/cards/named", &[("exact", name)], || {
                CardDataError::NotFound(name.to_string())
            })
            .await?;
        Ok(card.into_card())
    }

    async fn rulings(&self, card_id: &str) -> Result<Vec<Ruling>, CardDataError> {
        let list: ApiList<ApiRuling> = self
            .get_json(&format!("/cards/{card_id}/rulings"), &[], || {
                CardDataError::NotFound(card_id.to_string())
            })
            .await?;
        Ok(list
            .data
            .into_iter()
            .map(|r| Ruling {
                published_at: r.published_at,
                comment: r.comment,
            })
            .collect())
    }

    async fn autocomplete(&self, partial: &str) -> Result<Vec<String>, CardDataError> {
        if partial.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }
        let list: ApiList<String> = self
            .get_json("/cards/autocomplete", &[("q", partial)], || {
                CardDataError::NotFound(partial.to_string())
            })
            .await?;
        Ok(list.data)
    }
}

// --- Scryfall API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiRuling {
    #[serde(default)]
    published_at: String,
    comment: String,
}

#[derive(Debug, Deserialize)]
struct ApiCard {
    id: String,
    name: String,
    #[serde(default)]
    oracle_text: Option<String>,
    #[serde(default)]
    scryfall_uri: Option<String>,
    #[serde(default)]
    card_faces: Vec<ApiCardFace>,
}

#[derive(Debug, Deserialize)]
struct ApiCardFace {
    #[serde(default)]
    oracle_text: Option<String>,
}

impl ApiCard {
    fn into_card(self) -> Card {
        // Multi-faced cards carry their rules text per face
        let oracle_text = match self.oracle_text {
            Some(text) => text,
            None => self
                .card_faces
                .into_iter()
                .filter_map(|f| f.oracle_text)
                .collect::<Vec<_>>()
                .join("\n//\n"),
        };

        Card {
            id: self.id,
            name: self.name,
            oracle_text,
            canonical_url: self.scryfall_uri.unwrap_or_default(),
        }
    }
}
