//! Grounding sources and the assembler that merges them.
//!
//! # Sources (in priority order)
//!
//! | Priority | Source | Backing |
//! |----------|--------|---------|
//! | 1. Special Rules | [`SpecialCaseRegistry`] | Curated table from config |
//! | 2. Card Details | [`RulingsCache`] | Card database, cached per card id |
//! | 3. Rules Context | [`RuleCorpusIndex`] | Comprehensive Rules text file |

pub mod assembler;
pub mod corpus;
pub mod rulings;
pub mod special_cases;

pub use assembler::{CardGrounding, CardLink, ContextAssembler, ContextBundle, StyleGuide};
pub use corpus::{RuleCorpusIndex, RuleLine};
pub use rulings::RulingsCache;
pub use special_cases::{SpecialCaseEntry, SpecialCaseRegistry};
