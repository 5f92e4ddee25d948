//! Shared test doubles for the completion provider and the card database.

use async_trait::async_trait;
use mastermind_core::card::{Card, CardDataProvider, Ruling};
use mastermind_core::error::{CardDataError, ProviderError};
use mastermind_core::provider::{
    ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// What the scripted provider does for one `stream` call.
pub enum Script {
    /// Deliver these items, then close the channel.
    Chunks(Vec<Result<StreamChunk, ProviderError>>),
    /// Fail the request before any streaming starts.
    Reject(ProviderError),
    /// Never answer the request.
    Hang,
}

impl Script {
    /// Text fragments followed by the end signal.
    pub fn answer(fragments: &[&str]) -> Self {
        let mut items: Vec<_> = fragments
            .iter()
            .map(|f| Ok(StreamChunk::text(*f)))
            .collect();
        items.push(Ok(StreamChunk::end()));
        Self::Chunks(items)
    }
}

/// A mock provider that replays one script per `stream` call.
///
/// Panics if more calls are made than scripts provided.
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "scripted provider only streams".into(),
        ))
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedProvider: no more scripts");

        match script {
            Script::Reject(e) => Err(e),
            Script::Hang => futures::future::pending::<Result<ChunkReceiver, ProviderError>>().await,
            Script::Chunks(items) => {
                let (tx, rx) = tokio::sync::mpsc::channel(items.len().max(1));
                for item in items {
                    tx.try_send(item).unwrap();
                }
                Ok(rx)
            }
        }
    }
}

/// An in-memory card database with an outage switch and a rulings call counter.
#[derive(Default)]
pub struct StaticCardData {
    cards: HashMap<String, Card>,
    rulings: HashMap<String, Vec<Ruling>>,
    unavailable: AtomicBool,
    rulings_calls: AtomicUsize,
}

impl StaticCardData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.insert(card.name.clone(), card);
        self
    }

    pub fn with_rulings(mut self, card_id: &str, rulings: Vec<Ruling>) -> Self {
        self.rulings.insert(card_id.to_string(), rulings);
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn rulings_calls(&self) -> usize {
        self.rulings_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), CardDataError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CardDataError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CardDataProvider for StaticCardData {
    fn name(&self) -> &str {
        "static"
    }

    async fn card_by_name(&self, name: &str) -> Result<Card, CardDataError> {
        self.check_available()?;
        self.cards
            .get(name)
            .cloned()
            .ok_or_else(|| CardDataError::NotFound(name.to_string()))
    }

    async fn rulings(&self, card_id: &str) -> Result<Vec<Ruling>, CardDataError> {
        self.rulings_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.rulings
            .get(card_id)
            .cloned()
            .ok_or_else(|| CardDataError::NotFound(card_id.to_string()))
    }
}

/// Create a card.
pub fn card(id: &str, name: &str, oracle_text: &str, canonical_url: &str) -> Card {
    Card {
        id: id.into(),
        name: name.into(),
        oracle_text: oracle_text.into(),
        canonical_url: canonical_url.into(),
    }
}
