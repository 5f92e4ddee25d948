//! Keyword retrieval over the Comprehensive Rules text.
//!
//! The corpus is a plain-text file with one rule per line. Search is a
//! case-insensitive substring match of question terms and card names
//! against every line; there is no ranking beyond corpus order.

use mastermind_core::error::CorpusError;
use std::path::Path;
use tracing::{debug, info, warn};

/// Maximum snippets returned per question unless configured otherwise.
pub const DEFAULT_SNIPPET_LIMIT: usize = 30;

/// Terms of this many characters or fewer are ignored.
const SHORT_TERM_CHARS: usize = 3;

/// One non-empty line of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLine {
    /// Zero-based line number in the source text
    pub ordinal: usize,
    pub text: String,
}

/// Immutable after load; safe to share behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RuleCorpusIndex {
    lines: Vec<RuleLine>,
    lowered: Vec<String>,
}

impl RuleCorpusIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw lines. Lines are trimmed; blank ones are skipped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<RuleLine> = lines
            .into_iter()
            .enumerate()
            .filter_map(|(ordinal, line)| {
                let text = line.as_ref().trim();
                (!text.is_empty()).then(|| RuleLine {
                    ordinal,
                    text: text.to_string(),
                })
            })
            .collect();
        let lowered = lines.iter().map(|l| l.text.to_lowercase()).collect();
        Self { lines, lowered }
    }

    /// Read the corpus file.
    pub fn try_load(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let index = Self::from_lines(content.lines());
        info!(path = %path.display(), lines = index.len(), "Loaded rules corpus");
        Ok(index)
    }

    /// Read the corpus file, falling back to an empty index.
    ///
    /// A missing corpus is not fatal: answers lose the rules section but
    /// everything else keeps working.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Rules corpus unavailable, continuing without it");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[RuleLine] {
        &self.lines
    }

    /// Lines containing any search term, in corpus order, at most `limit`.
    ///
    /// Terms are the whitespace-separated words of `question` with
    /// surrounding punctuation stripped, plus each full card name. Terms of
    /// three characters or fewer are dropped.
    pub fn search(&self, question: &str, card_names: &[String], limit: usize) -> Vec<String> {
        if self.is_empty() || limit == 0 {
            return Vec::new();
        }

        let terms = search_terms(question, card_names);
        if terms.is_empty() {
            return Vec::new();
        }

        let snippets: Vec<String> = self
            .lowered
            .iter()
            .zip(&self.lines)
            .filter(|(lowered, _)| terms.iter().any(|t| lowered.contains(t.as_str())))
            .map(|(_, line)| line.text.clone())
            .take(limit)
            .collect();

        debug!(terms = terms.len(), matches = snippets.len(), "Rules corpus search");
        snippets
    }
}

/// Lowercased, de-duplicated search terms longer than three characters.
pub fn search_terms(question: &str, card_names: &[String]) -> Vec<String> {
    let words = question
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()));
    let names = card_names.iter().map(|n| n.trim());

    let mut terms: Vec<String> = Vec::new();
    for term in words.chain(names) {
        if term.chars().count() <= SHORT_TERM_CHARS {
            continue;
        }
        let term = term.to_lowercase();
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}
