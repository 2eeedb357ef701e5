//! Event observation: turns a published event into derived state.
//!
//! Two passes run for every event, both pure functions of the event, its
//! catalog record and the store settings:
//!
//! 1. **Memory derivation**: one [`CharacterMemory`] for the primary
//!    character if the event is important enough (or its memory type is
//!    always remembered), plus one per secondary character for memory types
//!    that are shared.
//! 2. **Relationship derivation**: one [`RelationshipUpdate`] per direction
//!    for every pair of characters in the event.
//!
//! The store applies the results under its write lock.

use crate::catalog::EventTypeRecord;
use crate::config::StoreSettings;
use crate::error::DerivationError;
use crate::event::GameEvent;
use crate::memory::{CharacterMemory, CrossReferenceData, FinancialMetadata, MemoryType};
use crate::relationship::RelationshipUpdate;
use crate::types::{CharacterId, EventCategory, MemoryId, Valence};

/// Intensity lost by secondary characters without their own impact entry.
const SECONDARY_INTENSITY_DROP: u8 = 2;

/// One directed relationship change produced by an event.
#[derive(Debug, Clone)]
pub(crate) struct DirectedUpdate {
    pub owner: CharacterId,
    pub other: CharacterId,
    pub update: RelationshipUpdate,
}

/// Resolve the memory type for `event`.
///
/// The catalog memory type applies when the event kept its catalog category;
/// an overridden category maps through [`MemoryType::for_category`].
pub(crate) fn memory_type_for(
    event: &GameEvent,
    record: Option<&EventTypeRecord>,
) -> Result<MemoryType, DerivationError> {
    let record = record.ok_or(DerivationError::UnknownEventType(event.event_type))?;
    if event.category == record.category {
        Ok(record.memory_type)
    } else {
        MemoryType::for_category(event.category)
            .ok_or(DerivationError::UnsupportedCategory(event.category))
    }
}

/// Memory derivation pass.
pub(crate) fn derive_memories(
    event: &GameEvent,
    record: Option<&EventTypeRecord>,
    settings: &StoreSettings,
) -> Result<Vec<CharacterMemory>, DerivationError> {
    let memory_type = memory_type_for(event, record)?;
    let memorable = event.importance >= settings.memory_threshold
        || settings.is_always_memorable(memory_type);
    if !memorable {
        return Ok(Vec::new());
    }

    // `memory_type_for` already rejected a missing record.
    let default_valence = record.map_or(Valence::Neutral, |r| {
        if r.is_conflict && event.is_resolved() {
            Valence::Positive
        } else {
            r.valence
        }
    });
    let financial =
        (memory_type == MemoryType::Financial).then(|| FinancialMetadata::from_event(event));
    let primary_importance = primary_importance(event, memory_type);

    let mut memories = Vec::with_capacity(1 + event.secondary_character_ids.len());
    memories.push(build_memory(
        event,
        &event.primary_character_id,
        memory_type,
        primary_importance,
        default_valence,
        event.severity.base_intensity(),
        financial.clone(),
    ));

    if settings.is_bidirectional(memory_type) {
        let importance = primary_importance
            .saturating_sub(settings.secondary_importance_penalty)
            .max(1);
        let intensity = event
            .severity
            .base_intensity()
            .saturating_sub(SECONDARY_INTENSITY_DROP)
            .max(1);
        for secondary in &event.secondary_character_ids {
            memories.push(build_memory(
                event,
                secondary,
                memory_type,
                importance,
                default_valence,
                intensity,
                financial.clone(),
            ));
        }
    }

    Ok(memories)
}

fn primary_importance(event: &GameEvent, memory_type: MemoryType) -> u8 {
    let bonus = if memory_type == MemoryType::Financial {
        let amount = event.metadata.amount();
        if amount > 10_000.0 {
            2
        } else if amount > 5_000.0 {
            1
        } else {
            0
        }
    } else {
        0
    };
    event.importance.saturating_add(bonus).min(10)
}

fn build_memory(
    event: &GameEvent,
    owner: &CharacterId,
    memory_type: MemoryType,
    importance: u8,
    default_valence: Valence,
    default_intensity: u8,
    financial_metadata: Option<FinancialMetadata>,
) -> CharacterMemory {
    let own = event.impact_for(owner.as_str());
    let valence = own.map_or(default_valence, |i| i.impact);
    let intensity = own.map_or(default_intensity, |i| i.intensity);

    CharacterMemory {
        id: MemoryId::new(),
        character_id: owner.clone(),
        event_id: event.id,
        memory_type,
        content: event.description.clone(),
        emotional_valence: valence,
        emotional_intensity: intensity,
        importance,
        created_at: event.timestamp,
        associated_characters: event.characters().filter(|c| *c != owner).cloned().collect(),
        tags: event.tags.clone(),
        cross_reference_data: CrossReferenceData::score(event, memory_type, valence, intensity),
        financial_metadata,
    }
}

/// Relationship derivation pass.
///
/// Events with a single character touch no relationships and never fail.
pub(crate) fn derive_relationship_updates(
    event: &GameEvent,
    record: Option<&EventTypeRecord>,
) -> Result<Vec<DirectedUpdate>, DerivationError> {
    let characters: Vec<&CharacterId> = event.characters().collect();
    if characters.len() < 2 {
        return Ok(Vec::new());
    }
    let record = record.ok_or(DerivationError::UnknownEventType(event.event_type))?;

    let resolved = event.is_resolved();
    let base = record.effective_delta(resolved);
    let conflict = record.is_conflict && !resolved;
    let resolution = record.is_resolution || (record.is_conflict && resolved);
    let battle = event.category == EventCategory::Battle;

    let mut updates = Vec::with_capacity(characters.len() * (characters.len() - 1));
    for (i, a) in characters.iter().enumerate() {
        for b in &characters[i + 1..] {
            for (owner, other) in [(*a, *b), (*b, *a)] {
                let adjustment = event.impact_for(owner.as_str()).map_or(0, |impact| {
                    impact.impact.sign() * i32::from(impact.intensity / 2)
                });
                updates.push(DirectedUpdate {
                    owner: owner.clone(),
                    other: other.clone(),
                    update: RelationshipUpdate {
                        event_id: event.id,
                        timestamp: event.timestamp,
                        delta: base.with_affection(adjustment),
                        conflict,
                        resolution,
                        battle,
                    },
                });
            }
        }
    }
    Ok(updates)
}
