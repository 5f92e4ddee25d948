//! External service clients for Mastermind.
//!
//! The completion provider implements `mastermind_core::Provider`; the card
//! database client implements `mastermind_core::CardDataProvider`. The router
//! selects the completion backend based on configuration.

pub mod openai_compat;
pub mod router;
pub mod scryfall;

pub use openai_compat::OpenAiCompatProvider;
pub use router::ProviderRouter;
pub use scryfall::ScryfallClient;
