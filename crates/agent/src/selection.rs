//! The cards a user has attached to the conversation.

use mastermind_core::card::{Card, CardDataProvider};
use mastermind_core::error::CardDataError;
use tracing::debug;

/// Ordered card list, unique by name.
#[derive(Debug, Clone, Default)]
pub struct CardSelection {
    cards: Vec<Card>,
}

impl CardSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a card. Returns false if a card with the same name is already selected.
    pub fn add(&mut self, card: Card) -> bool {
        if self.contains(&card.name) {
            return false;
        }
        debug!(card = %card.name, "Card selected");
        self.cards.push(card);
        true
    }

    /// Look `name` up in the card database and select the result.
    pub async fn add_by_name(
        &mut self,
        source: &dyn CardDataProvider,
        name: &str,
    ) -> Result<bool, CardDataError> {
        if self.contains(name) {
            return Ok(false);
        }
        let card = source.card_by_name(name).await?;
        Ok(self.add(card))
    }

    /// Remove the card at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.iter().any(|c| c.name == name)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn names(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{StaticCardData, card};

    #[test]
    fn add_deduplicates_by_name() {
        let mut selection = CardSelection::new();
        assert!(selection.add(card("1", "Blood Moon", "", "")));
        assert!(!selection.add(card("2", "Blood Moon", "", "")));
        assert!(selection.add(card("3", "Humility", "", "")));
        assert_eq!(selection.names(), vec!["Blood Moon", "Humility"]);
    }

    #[test]
    fn remove_by_index() {
        let mut selection = CardSelection::new();
        selection.add(card("1", "Blood Moon", "", ""));
        selection.add(card("2", "Humility", "", ""));

        assert_eq!(selection.remove(0).unwrap().name, "Blood Moon");
        assert!(selection.remove(5).is_none());
        assert_eq!(selection.len(), 1);

        selection.clear();
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn add_by_name_fetches_from_source() {
        let source = StaticCardData::new().with_card(card("bm", "Blood Moon", "Nonbasic lands are Mountains.", ""));
        let mut selection = CardSelection::new();

        assert!(selection.add_by_name(&source, "Blood Moon").await.unwrap());
        assert!(!selection.add_by_name(&source, "Blood Moon").await.unwrap());
        assert_eq!(selection.cards()[0].oracle_text, "Nonbasic lands are Mountains.");

        let missing = selection.add_by_name(&source, "Black Lotus").await;
        assert!(matches!(missing, Err(CardDataError::NotFound(_))));
    }

    #[tokio::test]
    async fn add_by_name_surfaces_outage() {
        let source = StaticCardData::new().with_card(card("bm", "Blood Moon", "", ""));
        source.set_unavailable(true);
        let mut selection = CardSelection::new();

        let result = selection.add_by_name(&source, "Blood Moon").await;
        assert!(matches!(result, Err(CardDataError::Unavailable(_))));
        assert!(selection.is_empty());
    }
}
