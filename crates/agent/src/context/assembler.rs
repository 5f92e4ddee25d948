//! Context assembly pipeline.
//!
//! Merges the grounding sources for one question into a [`ContextBundle`]
//! and renders it as the instruction document sent ahead of the
//! conversation. Sources in descending priority:
//!
//! 1. **Special Rules**: curated overrides for the selected cards
//! 2. **Card Details**: Oracle text plus official rulings
//! 3. **Rules Context**: matching Comprehensive Rules lines
//!
//! The card link list and the style guide follow. Every section is always
//! present in the rendered document, with an explicit placeholder when it
//! has no content.
//!
//! # Determinism
//!
//! Given the same cache contents, the same question and the same selection
//! produce the same bundle. Output order follows the selection order.

use crate::context::corpus::{DEFAULT_SNIPPET_LIMIT, RuleCorpusIndex};
use crate::context::rulings::RulingsCache;
use crate::context::special_cases::SpecialCaseRegistry;
use futures::future::join_all;
use mastermind_config::GroundingConfig;
use mastermind_core::card::Card;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Source-priority and link-integrity directive, always rendered verbatim.
pub const SOURCE_PRIORITY_DIRECTIVE: &str = "\
Base your answer on the sources below, in this order of priority:
1. Special Rules: these override everything else.
2. Card Details: the card's Oracle text and its official rulings.
3. Rules Context: excerpts from the Comprehensive Rules.
These sources take precedence over anything you remember about the game. \
Use general knowledge only where they are silent.
Link cards only with the exact URLs under [Card Links]. Never invent or guess a URL.";

const NONE: &str = "(none)";
const NO_CARDS: &str = "No cards selected.";
const NO_ORACLE_TEXT: &str = "No text available.";

// ── Types ─────────────────────────────────────────────────────────────────

/// Oracle text and rulings for one selected card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardGrounding {
    pub name: String,
    pub oracle_text: String,
    /// Formatted rulings block, or a degraded-source sentinel
    pub rulings: String,
}

/// A card name with its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLink {
    pub name: String,
    pub url: String,
}

/// Everything retrieved for one question, before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub special_rules: Vec<String>,
    pub card_info: Vec<CardGrounding>,
    pub rule_snippets: Vec<String>,
    pub card_links: Vec<CardLink>,
}

impl ContextBundle {
    /// True when no source contributed anything.
    pub fn is_empty(&self) -> bool {
        self.special_rules.is_empty()
            && self.card_info.is_empty()
            && self.rule_snippets.is_empty()
            && self.card_links.is_empty()
    }
}

/// Persona and answer style appended to every instruction document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleGuide {
    pub persona: String,
    pub guidelines: String,
    pub vocabulary: String,
}

impl StyleGuide {
    pub fn from_config(config: &GroundingConfig) -> Self {
        Self {
            persona: config.persona.clone(),
            guidelines: config.guidelines.clone(),
            vocabulary: config.vocabulary.clone(),
        }
    }
}

impl Default for StyleGuide {
    fn default() -> Self {
        Self::from_config(&GroundingConfig::default())
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Holds shared handles to the grounding sources. Create once, reuse.
pub struct ContextAssembler {
    rulings: Arc<RulingsCache>,
    corpus: Arc<RuleCorpusIndex>,
    special_cases: Arc<SpecialCaseRegistry>,
    style: StyleGuide,
    snippet_limit: usize,
}

impl ContextAssembler {
    pub fn new(
        rulings: Arc<RulingsCache>,
        corpus: Arc<RuleCorpusIndex>,
        special_cases: Arc<SpecialCaseRegistry>,
    ) -> Self {
        Self {
            rulings,
            corpus,
            special_cases,
            style: StyleGuide::default(),
            snippet_limit: DEFAULT_SNIPPET_LIMIT,
        }
    }

    pub fn with_style(mut self, style: StyleGuide) -> Self {
        self.style = style;
        self
    }

    pub fn with_snippet_limit(mut self, limit: usize) -> Self {
        self.snippet_limit = limit;
        self
    }

    pub fn style(&self) -> &StyleGuide {
        &self.style
    }

    /// Gather all grounding for `question` and the selected cards.
    ///
    /// Never fails. A card database outage shows up as sentinel text in
    /// `card_info[i].rulings`; a missing corpus as empty `rule_snippets`.
    /// A card selected twice contributes two entries to each per-card list.
    pub async fn assemble(&self, question: &str, selected_cards: &[Card]) -> ContextBundle {
        // ── 1. Special rules ───────────────────────────────────────────────
        let special_rules: Vec<String> = selected_cards
            .iter()
            .filter_map(|card| {
                self.special_cases
                    .lookup(&card.name)
                    .map(|text| format!("!!! SPECIAL RULE FOR {}:\n{}", card.name, text))
            })
            .collect();

        // ── 2. Card details (rulings fetched concurrently) ─────────────────
        let rulings = join_all(selected_cards.iter().map(|card| self.rulings.get(&card.id))).await;
        let card_info: Vec<CardGrounding> = selected_cards
            .iter()
            .zip(rulings)
            .map(|(card, rulings)| CardGrounding {
                name: card.name.clone(),
                oracle_text: card.oracle_text.clone(),
                rulings,
            })
            .collect();

        // ── 3. Rules context ───────────────────────────────────────────────
        let names: Vec<String> = selected_cards.iter().map(|c| c.name.clone()).collect();
        let rule_snippets = self.corpus.search(question, &names, self.snippet_limit);

        // ── Card links ─────────────────────────────────────────────────────
        let card_links: Vec<CardLink> = selected_cards
            .iter()
            .filter(|card| !card.canonical_url.is_empty())
            .map(|card| CardLink {
                name: card.name.clone(),
                url: card.canonical_url.clone(),
            })
            .collect();

        debug!(
            cards = selected_cards.len(),
            special_rules = special_rules.len(),
            snippets = rule_snippets.len(),
            links = card_links.len(),
            "Assembled context"
        );

        ContextBundle {
            special_rules,
            card_info,
            rule_snippets,
            card_links,
        }
    }

    /// Render the instruction document.
    pub fn render(&self, bundle: &ContextBundle) -> String {
        let sections = [
            format!(
                "You are {}, an expert judge for Magic: The Gathering rules questions.",
                self.style.persona
            ),
            format!("[Source Priority]\n{SOURCE_PRIORITY_DIRECTIVE}"),
            Self::render_special_rules(&bundle.special_rules),
            Self::render_card_details(&bundle.card_info),
            Self::render_rules_context(&bundle.rule_snippets),
            Self::render_card_links(&bundle.card_links),
            format!(
                "[Style Guide]\n{}\n\n{}",
                self.style.guidelines, self.style.vocabulary
            ),
        ];
        sections.join("\n\n")
    }

    // ── Section renderers ──────────────────────────────────────────────────

    fn render_special_rules(rules: &[String]) -> String {
        let body = if rules.is_empty() {
            NONE.to_string()
        } else {
            rules.join("\n\n")
        };
        format!("[1. Special Rules]\n{body}")
    }

    fn render_card_details(cards: &[CardGrounding]) -> String {
        let body = if cards.is_empty() {
            NONE.to_string()
        } else {
            cards
                .iter()
                .map(|c| {
                    let text = if c.oracle_text.is_empty() {
                        NO_ORACLE_TEXT
                    } else {
                        c.oracle_text.as_str()
                    };
                    format!("CARD: {}\nTEXT: {}\nRULINGS:\n{}", c.name, text, c.rulings)
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        };
        format!("[2. Card Details]\n{body}")
    }

    fn render_rules_context(snippets: &[String]) -> String {
        let body = if snippets.is_empty() {
            NONE.to_string()
        } else {
            snippets.join("\n")
        };
        format!("[3. Rules Context]\n{body}")
    }

    fn render_card_links(links: &[CardLink]) -> String {
        if links.is_empty() {
            return format!("[Card Links]\n{NO_CARDS}");
        }
        let list = links
            .iter()
            .map(|l| format!("- {}: {}", l.name, l.url))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "[Card Links]\nMention every card as a Markdown link [Card Name](URL) using exactly these URLs:\n{list}"
        )
    }
}
