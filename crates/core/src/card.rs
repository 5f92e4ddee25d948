//! Card domain types and the card-database abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CardDataError;

/// A card as fetched from the card database. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    /// Rules text as printed in the Oracle reference (may be empty)
    #[serde(default)]
    pub oracle_text: String,
    /// Public page for the card; empty when the database has none
    #[serde(default)]
    pub canonical_url: String,
}

/// An official ruling for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruling {
    /// Publication date as reported by the database (e.g. "2021-04-16")
    pub published_at: String,
    pub comment: String,
}

/// Lookup interface over a card database.
#[async_trait]
pub trait CardDataProvider: Send + Sync {
    /// A human-readable name for this source (e.g., "scryfall").
    fn name(&self) -> &str;

    /// Fetch a card by its exact name.
    async fn card_by_name(&self, name: &str) -> Result<Card, CardDataError>;

    /// Fetch the official rulings for a card id. An empty list is not an error.
    async fn rulings(&self, card_id: &str) -> Result<Vec<Ruling>, CardDataError>;

    /// Card names completing a partial query.
    async fn autocomplete(&self, _partial: &str) -> Result<Vec<String>, CardDataError> {
        Ok(Vec::new())
    }
}
