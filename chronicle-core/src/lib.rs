//! # Chronicle Core Library
//!
//! Event-sourced character memory for multi-domain character chat.
//!
//! Gameplay subsystems publish typed [`GameEvent`]s into an [`EventStore`].
//! Each publish appends the event to an in-memory log and, under the same
//! write lock, derives:
//!
//! - **Memories**: per-character [`CharacterMemory`] records for events that
//!   are important enough or always worth remembering (therapy, money,
//!   conflict)
//! - **Relationships**: directed [`CharacterRelationship`] ledgers of trust,
//!   respect, affection and rivalry for every pair of characters involved
//!
//! Consumers query history, memories and relationships to build prompt
//! context (see the `chronicle-context` crate).
//!
//! ```rust
//! use chronicle_core::{EventDraft, EventSource, EventStore, EventType, EventFilter};
//!
//! let store = EventStore::default();
//! let receipt = store
//!     .publish(
//!         EventDraft::new(EventType::KitchenArgument, EventSource::KitchenTable, "achilles")
//!             .with_secondary("joan")
//!             .with_description("Argued about the dishes"),
//!     )
//!     .unwrap();
//! assert!(receipt.is_clean());
//! assert_eq!(store.get_event_history("joan", &EventFilter::new()).len(), 1);
//! assert!(store.get_relationship("achilles", "joan").is_some());
//! ```

#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod memory;
pub mod metrics;
mod observation;
pub mod relationship;
pub mod retrieval;
pub mod store;
pub mod telemetry;
pub mod types;

pub use catalog::{EventCatalog, EventTypeRecord};
pub use config::{ChronicleConfig, ContextSettings, GeneralConfig, StoreSettings};
pub use error::{ChronicleError, DerivationError, DerivationStage, DerivationWarning, Result};
pub use event::{
    BattleDetails, EmotionalImpact, EventDraft, EventMetadata, EventType, FinancialDetails,
    GameEvent, TherapyDetails,
};
pub use memory::{
    CharacterMemory, ChatDomain, CrossReferenceData, DecisionType, FinancialMetadata,
    FinancialOutcome, MemoryType,
};
pub use metrics::{ChronicleCounters, CounterSnapshot};
pub use relationship::{CharacterRelationship, RelationshipDelta, RelationshipStatus, Trajectory};
pub use retrieval::{EventFilter, MemoryFilter};
pub use store::{EventStore, PublishReceipt, StoreStats};
pub use types::*;
