//! Error types for the chronicle core library.

use thiserror::Error;

use crate::event::EventType;
use crate::types::{EventCategory, EventId};

/// Top-level error type for store operations.
///
/// Only malformed input is an error. Unknown characters and event ids produce
/// empty results, and derivation problems surface as [`DerivationWarning`]s.
#[derive(Error, Debug)]
pub enum ChronicleError {
    /// A required draft field was absent or blank.
    #[error("Malformed event: missing required field `{field}`")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// A draft field was present but out of range.
    #[error("Malformed event: invalid `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A serialized draft could not be decoded.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Why a derivation pass could not run for an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// The catalog has no record for this event type.
    #[error("no catalog record for event type `{0}`")]
    UnknownEventType(EventType),

    /// The event category has no mapping in the derivation tables.
    #[error("category `{0}` has no derivation mapping")]
    UnsupportedCategory(EventCategory),
}

/// Which derivation pass produced a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationStage {
    /// Memory derivation.
    Memory,
    /// Relationship derivation.
    Relationship,
}

/// A non-fatal derivation failure reported back from `publish`.
///
/// The event it refers to is already in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationWarning {
    /// The event whose derived state is incomplete.
    pub event_id: EventId,
    /// The pass that was skipped.
    pub stage: DerivationStage,
    /// The underlying cause.
    pub error: DerivationError,
}

impl std::fmt::Display for DerivationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} derivation skipped for {}: {}",
            self.stage, self.event_id, self.error
        )
    }
}
