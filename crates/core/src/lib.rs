//! # Mastermind Core
//!
//! Domain types, traits, and error definitions for the Mastermind rules judge.
//! This crate has **no framework dependencies**: it defines the domain model
//! that the other crates implement against.
//!
//! External systems (the completion backend and the card database) are traits
//! here; implementations live in `mastermind-providers`, and tests substitute
//! in-memory mocks.

pub mod card;
pub mod error;
pub mod history;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use card::{Card, CardDataProvider, Ruling};
pub use error::{CardDataError, CorpusError, Error, ErrorKind, ProviderError, Result};
pub use history::ConversationHistory;
pub use message::{ConversationId, ConversationMessage, Message, Role};
pub use provider::{ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage};
