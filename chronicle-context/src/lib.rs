//! # chronicle-context
//!
//! Token-budgeted prompt context built from the chronicle event store.
//!
//! A [`ContextCompressor`] reads an [`EventStore`](chronicle_core::EventStore)
//! and renders up to four sections for a character:
//!
//! ```text
//! RECENT EVENTS     bulleted events in the look-back window, domain-filtered
//! RELATIONSHIPS     allies, rivals, neutral
//! EMOTIONAL STATE   mood from recent important memories
//! <DOMAIN>          one-line summary for the consuming feature
//! ```
//!
//! Size is estimated at four characters per token. Over-budget contexts are
//! shrunk section by section; the budget is a target, not a guarantee.
//!
//! Per-domain wrappers (`get_performance_context`, `get_therapy_context`, ...)
//! are presets over the same algorithm. Memory digests
//! (`get_confessional_context`, `get_kitchen_context`, ...) render a
//! character's past for features that care less about the last few days.

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compress;
pub mod compressor;
pub mod config;
mod digest;
mod domain;
mod financial;
pub mod format;
pub mod names;
mod sections;

pub use compress::{
    CompressedContext, SectionKind, compress_context, compress_section, estimate_tokens,
    format_for_prompt,
};
pub use compressor::ContextCompressor;
pub use config::{ContextConfig, DomainFocus};
pub use financial::FinancialPatterns;
pub use names::CharacterNames;
