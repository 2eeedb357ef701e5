//! Character memories derived from published events.
//!
//! A [`CharacterMemory`] is one character's recollection of one event. It is
//! written once, when the event is published, and never modified afterwards;
//! queries filter by time window instead of deleting old memories.

pub mod cross_reference;
pub mod financial;

pub use cross_reference::{ChatDomain, CrossReferenceData};
pub use financial::{DecisionType, FinancialMetadata, FinancialOutcome};

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CharacterId, EventCategory, EventId, MemoryId, Valence};

/// What a memory is about. Mostly mirrors the event category, with conflict,
/// bonding and confession split out of the social categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    /// Arena fights.
    Battle,
    /// Everyday house life.
    Social,
    /// Therapy.
    Therapy,
    /// Training.
    Training,
    /// Levels and unlocks.
    Progression,
    /// Coaching chats.
    Communication,
    /// Money.
    Financial,
    /// Arguments and disputes.
    Conflict,
    /// Growing closer.
    Bonding,
    /// Gossip and scandal.
    Drama,
    /// Team exercises.
    GroupActivity,
    /// Personal problems shared.
    PersonalProblems,
    /// Confessional booth.
    Confession,
    /// Gear.
    Equipment,
    /// Skills and abilities.
    Skills,
    /// Battle planning.
    Strategy,
    /// Lounge small talk.
    CasualSocial,
}

impl MemoryType {
    /// Default memory type for an event category, if the category has one.
    #[must_use]
    pub fn for_category(category: EventCategory) -> Option<Self> {
        let memory_type = match category {
            EventCategory::Battle => Self::Battle,
            EventCategory::Social => Self::Social,
            EventCategory::Therapy => Self::Therapy,
            EventCategory::Training => Self::Training,
            EventCategory::Progression => Self::Progression,
            EventCategory::Communication => Self::Communication,
            EventCategory::Financial => Self::Financial,
            EventCategory::PersonalProblems => Self::PersonalProblems,
            EventCategory::GroupActivities => Self::GroupActivity,
            EventCategory::Equipment => Self::Equipment,
            EventCategory::Skills => Self::Skills,
            EventCategory::Confessional => Self::Confession,
            EventCategory::Strategy => Self::Strategy,
            EventCategory::Drama => Self::Drama,
            EventCategory::CasualSocial => Self::CasualSocial,
            EventCategory::RealEstate => return None,
        };
        Some(memory_type)
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Battle => "battle",
            Self::Social => "social",
            Self::Therapy => "therapy",
            Self::Training => "training",
            Self::Progression => "progression",
            Self::Communication => "communication",
            Self::Financial => "financial",
            Self::Conflict => "conflict",
            Self::Bonding => "bonding",
            Self::Drama => "drama",
            Self::GroupActivity => "group_activity",
            Self::PersonalProblems => "personal_problems",
            Self::Confession => "confession",
            Self::Equipment => "equipment",
            Self::Skills => "skills",
            Self::Strategy => "strategy",
            Self::CasualSocial => "casual_social",
        };
        f.write_str(name)
    }
}

/// One character's recollection of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterMemory {
    /// Unique identifier.
    pub id: MemoryId,
    /// Owner.
    pub character_id: CharacterId,
    /// The event this memory was derived from.
    pub event_id: EventId,
    /// What the memory is about.
    pub memory_type: MemoryType,
    /// Human-readable summary.
    pub content: String,
    /// How it felt.
    pub emotional_valence: Valence,
    /// How strongly it felt, 0–10.
    pub emotional_intensity: u8,
    /// 0–10.
    pub importance: u8,
    /// When the underlying event happened.
    pub created_at: DateTime<Utc>,
    /// Everyone else who was there.
    pub associated_characters: BTreeSet<CharacterId>,
    /// Tags copied from the event.
    pub tags: BTreeSet<String>,
    /// Scores read by the comedy-reference engine.
    pub cross_reference_data: CrossReferenceData,
    /// Present only for financial memories.
    pub financial_metadata: Option<FinancialMetadata>,
}

impl CharacterMemory {
    /// Whether the memory involves `other`.
    #[must_use]
    pub fn involves(&self, other: &str) -> bool {
        self.associated_characters.contains(other)
    }

    /// Whether the memory carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_but_real_estate_maps_to_a_memory_type() {
        assert_eq!(
            MemoryType::for_category(EventCategory::Confessional),
            Some(MemoryType::Confession)
        );
        assert_eq!(MemoryType::for_category(EventCategory::RealEstate), None);
    }

    #[test]
    fn memory_type_serializes_snake_case() {
        let json = serde_json::to_string(&MemoryType::GroupActivity).unwrap();
        assert_eq!(json, "\"group_activity\"");
        assert_eq!(MemoryType::PersonalProblems.to_string(), "personal_problems");
    }
}
