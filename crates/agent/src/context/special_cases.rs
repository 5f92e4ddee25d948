//! Curated override rulings keyed by exact card name.

use std::collections::HashMap;

/// An override ruling that takes precedence over every other source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialCaseEntry {
    pub card_name: String,
    pub override_text: String,
}

/// Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct SpecialCaseRegistry {
    entries: HashMap<String, SpecialCaseEntry>,
}

impl SpecialCaseRegistry {
    pub fn new(entries: impl IntoIterator<Item = SpecialCaseEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.card_name.clone(), e))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry from `(card name, override text)` pairs, e.g. the config table.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(name, text)| SpecialCaseEntry {
            card_name: name.into(),
            override_text: text.into(),
        }))
    }

    /// Exact, case-sensitive match on the card name.
    pub fn lookup(&self, card_name: &str) -> Option<&str> {
        self.entries
            .get(card_name)
            .map(|e| e.override_text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_name_match_only() {
        let registry = SpecialCaseRegistry::from_pairs([(
            "Blood Moon",
            "Nonbasic lands lose all other land types and abilities.",
        )]);

        assert!(registry.lookup("Blood Moon").is_some());
        assert!(registry.lookup("blood moon").is_none());
        assert!(registry.lookup("Blood Moon ").is_none());
        assert!(registry.lookup("Magus of the Moon").is_none());
    }

    #[test]
    fn built_in_table_loads() {
        let registry = SpecialCaseRegistry::from_pairs(mastermind_config::defaults::special_cases());
        assert_eq!(registry.len(), 7);
        assert!(registry.lookup("Humility").is_some());
        assert!(SpecialCaseRegistry::empty().is_empty());
    }
}
