//! The event store: append-only log plus derived per-character state.
//!
//! All state sits behind one `parking_lot::RwLock`. `publish` derives
//! memories and relationship updates from the finalized event, then appends
//! the event and applies both derivations under a single write lock, so a
//! reader never sees an event without its derived state. Queries take the
//! read lock and return owned snapshots (events are shared as
//! `Arc<GameEvent>`).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::EventCatalog;
use crate::config::{ChronicleConfig, StoreSettings};
use crate::error::{DerivationStage, DerivationWarning, Result};
use crate::event::{EventDraft, GameEvent};
use crate::memory::CharacterMemory;
use crate::metrics::ChronicleCounters;
use crate::observation::{self, DirectedUpdate};
use crate::relationship::CharacterRelationship;
use crate::retrieval::{EventFilter, MemoryFilter};
use crate::types::{CharacterId, Clock, EventId, SystemClock};

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Id assigned to the new event.
    pub event_id: EventId,
    /// Derivation passes that were skipped. The event is in the log either way.
    pub warnings: Vec<DerivationWarning>,
}

impl PublishReceipt {
    /// Whether every derivation pass ran.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Sizes of the store's collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Events in the log.
    pub events: usize,
    /// Characters with at least one event.
    pub characters: usize,
    /// Memories across all characters.
    pub memories: usize,
    /// Directed relationship records.
    pub relationships: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    log: Vec<Arc<GameEvent>>,
    by_id: HashMap<EventId, usize>,
    events_by_character: HashMap<CharacterId, Vec<usize>>,
    memories: HashMap<CharacterId, Vec<CharacterMemory>>,
    relationships: HashMap<CharacterId, HashMap<CharacterId, CharacterRelationship>>,
}

/// In-memory, append-only game event store.
///
/// Construct one per running game instance and share it as
/// `Arc<EventStore>`.
#[derive(Debug)]
pub struct EventStore {
    state: RwLock<StoreState>,
    catalog: EventCatalog,
    settings: StoreSettings,
    clock: Arc<dyn Clock>,
    counters: ChronicleCounters,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(StoreSettings::default())
    }
}

impl EventStore {
    /// A store with the built-in catalog and the system clock.
    #[must_use]
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            catalog: EventCatalog::builtin(),
            settings,
            clock: Arc::new(SystemClock),
            counters: ChronicleCounters::new(),
        }
    }

    /// A store configured from the `[store]` section.
    #[must_use]
    pub fn from_config(config: &ChronicleConfig) -> Self {
        Self::new(config.store.clone())
    }

    /// Replace the event catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: EventCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // -----------------------------------------------------------------------
    // Publish
    // -----------------------------------------------------------------------

    /// Validate, append and derive.
    ///
    /// # Errors
    /// Returns `ChronicleError::MissingField` / `InvalidField` for a malformed
    /// draft; nothing is appended in that case. Derivation problems do not
    /// fail the publish and are returned in the receipt instead.
    pub fn publish(&self, draft: EventDraft) -> Result<PublishReceipt> {
        let event = match draft.finalize(EventId::new(), self.clock.now(), &self.catalog) {
            Ok(event) => event,
            Err(e) => {
                ChronicleCounters::bump(&self.counters.drafts_rejected);
                warn!(error = %e, "rejected event draft");
                return Err(e);
            }
        };

        let record = self.catalog.get(event.event_type);
        let memories = observation::derive_memories(&event, record, &self.settings);
        let updates = observation::derive_relationship_updates(&event, record);
        let event = Arc::new(event);
        let event_id = event.id;

        let mut warnings = Vec::new();
        let mut memory_count = 0_u64;
        let mut update_count = 0_u64;
        {
            let mut guard = self.state.write();
            let state = &mut *guard;

            let position = state.log.len();
            state.log.push(Arc::clone(&event));
            state.by_id.insert(event_id, position);
            for character in event.characters() {
                state
                    .events_by_character
                    .entry(character.clone())
                    .or_default()
                    .push(position);
            }

            match memories {
                Ok(memories) => {
                    memory_count = memories.len() as u64;
                    for memory in memories {
                        state
                            .memories
                            .entry(memory.character_id.clone())
                            .or_default()
                            .push(memory);
                    }
                }
                Err(error) => warnings.push(DerivationWarning {
                    event_id,
                    stage: DerivationStage::Memory,
                    error,
                }),
            }

            match updates {
                Ok(updates) => {
                    update_count = updates.len() as u64;
                    let window = self.settings.trajectory_window;
                    for DirectedUpdate {
                        owner,
                        other,
                        update,
                    } in updates
                    {
                        state
                            .relationships
                            .entry(owner.clone())
                            .or_default()
                            .entry(other.clone())
                            .or_insert_with(|| CharacterRelationship::new(owner, other, window))
                            .apply(&update);
                    }
                }
                Err(error) => warnings.push(DerivationWarning {
                    event_id,
                    stage: DerivationStage::Relationship,
                    error,
                }),
            }
        }

        ChronicleCounters::bump(&self.counters.events_published);
        ChronicleCounters::add(&self.counters.memories_derived, memory_count);
        ChronicleCounters::add(&self.counters.relationship_updates, update_count);
        ChronicleCounters::add(&self.counters.derivation_warnings, warnings.len() as u64);

        debug!(
            event_id = %event_id,
            event_type = %event.event_type,
            character = %event.primary_character_id,
            memories = memory_count,
            relationship_updates = update_count,
            "event published"
        );
        for warning in &warnings {
            warn!(
                event_id = %event_id,
                stage = ?warning.stage,
                error = %warning.error,
                "derivation skipped"
            );
        }

        Ok(PublishReceipt { event_id, warnings })
    }

    /// Decode a JSON draft and publish it.
    ///
    /// # Errors
    /// Returns `ChronicleError::MalformedEvent` if the JSON does not decode,
    /// or any error [`publish`](Self::publish) returns.
    pub fn publish_json(&self, json: &str) -> Result<PublishReceipt> {
        match EventDraft::from_json(json) {
            Ok(draft) => self.publish(draft),
            Err(e) => {
                ChronicleCounters::bump(&self.counters.drafts_rejected);
                warn!(error = %e, "rejected event draft");
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Events involving `character`, newest first.
    ///
    /// Ties on timestamp go to the later-published event. Unknown characters
    /// yield an empty list.
    #[must_use]
    pub fn get_event_history(&self, character: &str, filter: &EventFilter) -> Vec<Arc<GameEvent>> {
        let cutoff = self.cutoff(filter.time_range);
        let state = self.state.read();
        let Some(positions) = state.events_by_character.get(character) else {
            return Vec::new();
        };

        let mut events: Vec<Arc<GameEvent>> = positions
            .iter()
            .rev()
            .map(|&p| &state.log[p])
            .filter(|e| filter.matches(e, cutoff))
            .cloned()
            .collect();
        drop(state);

        // Stable: equal timestamps keep newest-published-first order.
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = filter.limit {
            events.truncate(limit);
        }
        events
    }

    /// Memories owned by `character`, newest first, ties broken by importance
    /// (highest first).
    #[must_use]
    pub fn get_character_memories(
        &self,
        character: &str,
        filter: &MemoryFilter,
    ) -> Vec<CharacterMemory> {
        let cutoff = self.cutoff(filter.time_range);
        let state = self.state.read();
        let Some(owned) = state.memories.get(character) else {
            return Vec::new();
        };

        let mut memories: Vec<CharacterMemory> = owned
            .iter()
            .rev()
            .filter(|m| filter.matches(m, cutoff))
            .cloned()
            .collect();
        drop(state);

        memories.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.importance.cmp(&a.importance))
        });
        if let Some(limit) = filter.limit {
            memories.truncate(limit);
        }
        memories
    }

    /// Every relationship record `character` holds, keyed by the other
    /// character. Only pairs that have interacted appear.
    #[must_use]
    pub fn get_relationship_summary(
        &self,
        character: &str,
    ) -> BTreeMap<CharacterId, CharacterRelationship> {
        self.state
            .read()
            .relationships
            .get(character)
            .map(|others| {
                others
                    .iter()
                    .map(|(id, rel)| (id.clone(), rel.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// How `character` feels about `other`, if they have interacted.
    #[must_use]
    pub fn get_relationship(&self, character: &str, other: &str) -> Option<CharacterRelationship> {
        self.state
            .read()
            .relationships
            .get(character)
            .and_then(|others| others.get(other))
            .cloned()
    }

    /// Point lookup by id.
    #[must_use]
    pub fn get_event(&self, id: EventId) -> Option<Arc<GameEvent>> {
        let state = self.state.read();
        state.by_id.get(&id).map(|&p| Arc::clone(&state.log[p]))
    }

    /// Collection sizes.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        StoreStats {
            events: state.log.len(),
            characters: state.events_by_character.len(),
            memories: state.memories.values().map(Vec::len).sum(),
            relationships: state.relationships.values().map(HashMap::len).sum(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The event catalog.
    #[must_use]
    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Derivation settings.
    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Runtime counters. The context compressor bumps the context counters
    /// here too.
    #[must_use]
    pub fn counters(&self) -> &ChronicleCounters {
        &self.counters
    }

    /// Current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn cutoff(&self, range: Option<crate::types::TimeRange>) -> Option<DateTime<Utc>> {
        range.map(|r| r.cutoff(self.clock.now()))
    }
}
