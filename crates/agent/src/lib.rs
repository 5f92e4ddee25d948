//! The judge's answer pipeline.
//!
//! One question flows through three stages:
//!
//! 1. **Ground**: the [`ContextAssembler`] gathers special-case overrides,
//!    card text with rulings, and matching Comprehensive Rules lines
//! 2. **Render**: the bundle becomes the instruction document
//! 3. **Stream**: the [`StreamingResponder`] sends document plus history to
//!    the provider and commits exactly one answer per question
//!
//! [`JudgeSession`] ties the stages to one conversation's history and card
//! selection.

pub mod context;
pub mod responder;
pub mod selection;
pub mod session;
pub mod turn;

#[cfg(test)]
mod test_helpers;

pub use context::{
    CardGrounding, CardLink, ContextAssembler, ContextBundle, RuleCorpusIndex, RuleLine,
    RulingsCache, SpecialCaseEntry, SpecialCaseRegistry, StyleGuide,
};
pub use responder::{INTERRUPTED_MARKER, ResponseStream, StreamingResponder};
pub use selection::CardSelection;
pub use session::JudgeSession;
pub use turn::{TurnOutcome, TurnState};
