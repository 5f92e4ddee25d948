//! Time-bounded cache of formatted card rulings.
//!
//! Entries are keyed by card id and hold the text block that goes into the
//! instruction document, not the raw rulings. A fetch failure degrades to a
//! sentinel string and is never cached, so the next request retries.

use mastermind_core::card::{CardDataProvider, Ruling};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// How long a fetched rulings block stays fresh.
pub const DEFAULT_RULINGS_TTL: Duration = Duration::from_secs(3600);

/// Cached text for a card that has no official rulings.
pub const NO_RULINGS: &str = "No rulings available.";

/// Prefix of the text returned when the card database cannot be reached.
pub const RULINGS_UNAVAILABLE: &str = "Rulings unavailable";

#[derive(Debug, Clone)]
struct CachedRulings {
    text: String,
    fetched_at: Instant,
}

/// Rulings text per card id, refreshed after `ttl`.
///
/// Safe to share across concurrent requests. Two callers racing on the
/// same cold key may both fetch; the later write wins and both get a valid
/// result.
pub struct RulingsCache {
    source: Arc<dyn CardDataProvider>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedRulings>>,
}

impl RulingsCache {
    pub fn new(source: Arc<dyn CardDataProvider>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// A cache with the one-hour default lifetime.
    pub fn with_default_ttl(source: Arc<dyn CardDataProvider>) -> Self {
        Self::new(source, DEFAULT_RULINGS_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Formatted rulings for `card_id`.
    ///
    /// Never fails: a database error yields a `"Rulings unavailable: ..."`
    /// sentinel that is returned but not stored.
    pub async fn get(&self, card_id: &str) -> String {
        if let Some(text) = self.fresh(card_id).await {
            trace!(card_id = %card_id, "Rulings cache hit");
            return text;
        }

        // Fetch without holding the lock
        match self.source.rulings(card_id).await {
            Ok(rulings) => {
                let text = format_rulings(&rulings);
                self.entries.write().await.insert(
                    card_id.to_string(),
                    CachedRulings {
                        text: text.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                debug!(card_id = %card_id, rulings = rulings.len(), "Cached rulings");
                text
            }
            Err(e) => {
                warn!(card_id = %card_id, error = %e, "Failed to fetch rulings");
                format!("{RULINGS_UNAVAILABLE}: {e}")
            }
        }
    }

    async fn fresh(&self, card_id: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(card_id)
            .filter(|entry| entry.fetched_at.elapsed() <= self.ttl)
            .map(|entry| entry.text.clone())
    }

    /// Drop the entry for one card so the next `get` refetches.
    pub async fn invalidate(&self, card_id: &str) -> bool {
        self.entries.write().await.remove(card_id).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// One `- comment` line per ruling, or [`NO_RULINGS`] for an empty list.
pub fn format_rulings(rulings: &[Ruling]) -> String {
    if rulings.is_empty() {
        return NO_RULINGS.to_string();
    }
    rulings
        .iter()
        .map(|r| format!("- {}", r.comment))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{StaticCardData, card};

    fn ruling(comment: &str) -> Ruling {
        Ruling {
            published_at: "2021-04-16".into(),
            comment: comment.into(),
        }
    }

    fn source() -> Arc<StaticCardData> {
        Arc::new(
            StaticCardData::new()
                .with_card(card("grist-id", "Grist, the Hunger Tide", "", ""))
                .with_rulings(
                    "grist-id",
                    vec![
                        ruling("Grist is a creature card in every zone but the battlefield."),
                        ruling("Grist is a planeswalker on the battlefield."),
                    ],
                )
                .with_rulings("plain-id", vec![]),
        )
    }

    #[test]
    fn formats_one_line_per_ruling() {
        let text = format_rulings(&[ruling("First."), ruling("Second.")]);
        assert_eq!(text, "- First.\n- Second.");
        assert_eq!(format_rulings(&[]), NO_RULINGS);
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_within_ttl_does_not_refetch() {
        let data = source();
        let cache = RulingsCache::new(data.clone(), Duration::from_secs(3600));

        let first = cache.get("grist-id").await;
        tokio::time::advance(Duration::from_secs(1800)).await;
        let second = cache.get("grist-id").await;

        assert_eq!(first, second);
        assert!(first.starts_with("- Grist is a creature card"));
        assert_eq!(data.rulings_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_is_refetched_once() {
        let data = source();
        let cache = RulingsCache::new(data.clone(), Duration::from_secs(3600));

        cache.get("grist-id").await;
        tokio::time::advance(Duration::from_secs(3601)).await;
        cache.get("grist-id").await;
        cache.get("grist-id").await;

        assert_eq!(data.rulings_calls(), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn empty_rulings_are_cached() {
        let data = source();
        let cache = RulingsCache::with_default_ttl(data.clone());

        assert_eq!(cache.get("plain-id").await, NO_RULINGS);
        assert_eq!(cache.get("plain-id").await, NO_RULINGS);
        assert_eq!(data.rulings_calls(), 1);
    }

    #[tokio::test]
    async fn failure_returns_sentinel_and_is_not_cached() {
        let data = source();
        let cache = RulingsCache::with_default_ttl(data.clone());

        data.set_unavailable(true);
        let text = cache.get("grist-id").await;
        assert!(text.starts_with(RULINGS_UNAVAILABLE));
        assert!(cache.is_empty().await);

        data.set_unavailable(false);
        let text = cache.get("grist-id").await;
        assert!(text.starts_with("- Grist"));
        assert_eq!(data.rulings_calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let data = source();
        let cache = RulingsCache::with_default_ttl(data.clone());

        cache.get("grist-id").await;
        assert!(cache.invalidate("grist-id").await);
        assert!(!cache.invalidate("grist-id").await);
        cache.get("grist-id").await;
        assert_eq!(data.rulings_calls(), 2);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_gets_all_receive_the_same_text() {
        let data = source();
        let cache = Arc::new(RulingsCache::with_default_ttl(data.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("grist-id").await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        let calls = data.rulings_calls();
        assert!((1..=8).contains(&calls));

        cache.get("grist-id").await;
        assert_eq!(data.rulings_calls(), calls);
    }
}
