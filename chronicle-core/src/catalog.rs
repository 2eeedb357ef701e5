//! Event catalog: one record per event type.
//!
//! Everything the store needs to know about an event type lives in a single
//! [`EventTypeRecord`]: the category and severity a draft falls back to, the
//! memory it turns into, and how it moves relationships. Adding an event type
//! is one `register` call (or one line in [`EventCatalog::builtin`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::EventType;
use crate::memory::MemoryType;
use crate::relationship::RelationshipDelta;
use crate::types::{EventCategory, Severity, Valence};

/// Static facts about one event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeRecord {
    /// Default category.
    pub category: EventCategory,
    /// Default severity.
    pub severity: Severity,
    /// Memory type produced for this event.
    pub memory_type: MemoryType,
    /// How the event feels when nobody says otherwise.
    pub valence: Valence,
    /// Relationship change applied to every pair involved.
    pub delta: RelationshipDelta,
    /// Counts as a conflict between the characters involved.
    pub is_conflict: bool,
    /// Settles an earlier conflict.
    pub is_resolution: bool,
}

impl EventTypeRecord {
    /// A record with no relationship effect.
    #[must_use]
    pub const fn new(
        category: EventCategory,
        severity: Severity,
        memory_type: MemoryType,
        valence: Valence,
    ) -> Self {
        Self {
            category,
            severity,
            memory_type,
            valence,
            delta: RelationshipDelta::ZERO,
            is_conflict: false,
            is_resolution: false,
        }
    }

    /// Set the relationship delta.
    #[must_use]
    pub const fn delta(mut self, trust: i32, respect: i32, affection: i32, rivalry: i32) -> Self {
        self.delta = RelationshipDelta {
            trust,
            respect,
            affection,
            rivalry,
        };
        self
    }

    /// Mark as a conflict.
    #[must_use]
    pub const fn conflict(mut self) -> Self {
        self.is_conflict = true;
        self
    }

    /// Mark as a resolution.
    #[must_use]
    pub const fn resolution(mut self) -> Self {
        self.is_resolution = true;
        self
    }

    /// The delta to apply for an event with the given `resolved` flag.
    ///
    /// A conflict that arrives already resolved counts as a resolution.
    #[must_use]
    pub fn effective_delta(&self, resolved: bool) -> RelationshipDelta {
        if self.is_conflict && resolved {
            RelationshipDelta::RESOLUTION
        } else {
            self.delta
        }
    }
}

/// Lookup table from [`EventType`] to [`EventTypeRecord`].
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    records: HashMap<EventType, EventTypeRecord>,
}

impl EventCatalog {
    /// A catalog with no records.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace the record for `event_type`, returning the old one.
    pub fn register(
        &mut self,
        event_type: EventType,
        record: EventTypeRecord,
    ) -> Option<EventTypeRecord> {
        self.records.insert(event_type, record)
    }

    /// The record for `event_type`.
    #[must_use]
    pub fn get(&self, event_type: EventType) -> Option<&EventTypeRecord> {
        self.records.get(&event_type)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every event type whose record has `category`.
    pub fn types_in(&self, category: EventCategory) -> impl Iterator<Item = EventType> + '_ {
        self.records
            .iter()
            .filter(move |(_, r)| r.category == category)
            .map(|(t, _)| *t)
    }

    /// Records for the full built-in vocabulary.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn builtin() -> Self {
        use EventCategory as C;
        use EventType as T;
        use MemoryType as M;
        use Severity::{Critical, High, Low, Medium};
        use Valence::{Negative, Neutral, Positive};

        let r = EventTypeRecord::new;
        let entries = [
            // Battle
            (T::BattleStart, r(C::Battle, Low, M::Battle, Neutral)),
            (T::BattleEnd, r(C::Battle, Low, M::Battle, Neutral)),
            (T::BattleVictory, r(C::Battle, Medium, M::Battle, Positive).delta(3, 2, 0, 0)),
            (T::BattleDefeat, r(C::Battle, Medium, M::Battle, Negative).delta(-1, -1, 0, 0)),
            (T::CriticalHit, r(C::Battle, Low, M::Battle, Positive)),
            (T::StrategySuccess, r(C::Battle, Medium, M::Battle, Positive).delta(2, 2, 0, 0)),
            (T::StrategyFailure, r(C::Battle, Medium, M::Battle, Negative).delta(-1, -1, 0, 0)),
            (T::TeamCoordination, r(C::Battle, Medium, M::Battle, Positive).delta(2, 2, 1, 0)),
            (T::IndividualHeroics, r(C::Battle, Medium, M::Battle, Positive).delta(0, 3, 0, 1)),
            (
                T::BattleChatConflict,
                r(C::Battle, Medium, M::Conflict, Negative).delta(-3, -2, -1, 2).conflict(),
            ),
            // Social / living
            (
                T::KitchenArgument,
                r(C::Social, Medium, M::Conflict, Negative).delta(-5, -3, -2, 2).conflict(),
            ),
            (
                T::BathroomConflict,
                r(C::Social, Low, M::Conflict, Negative).delta(-3, -1, -1, 1).conflict(),
            ),
            (
                T::BedroomDispute,
                r(C::Social, Medium, M::Conflict, Negative).delta(-4, -2, -2, 2).conflict(),
            ),
            (T::MealSharing, r(C::Social, Low, M::Bonding, Positive).delta(1, 0, 1, 0)),
            (
                T::CleaningConflict,
                r(C::Social, Low, M::Conflict, Negative).delta(-2, -1, -1, 1).conflict(),
            ),
            (
                T::NoiseComplaint,
                r(C::Social, Low, M::Conflict, Negative).delta(-2, 0, -1, 1).conflict(),
            ),
            (T::AllianceFormed, r(C::Social, Medium, M::Bonding, Positive).delta(5, 3, 2, 0)),
            (
                T::AllianceBroken,
                r(C::Social, High, M::Conflict, Negative).delta(-6, -2, -3, 4).conflict(),
            ),
            (T::GossipSession, r(C::Social, Low, M::Drama, Neutral).delta(1, 0, 1, 0)),
            (
                T::LateNightConversation,
                r(C::Social, Low, M::Bonding, Positive).delta(3, 0, 2, 0),
            ),
            (T::GroupActivity, r(C::Social, Low, M::GroupActivity, Positive).delta(1, 0, 2, 0)),
            // Therapy
            (T::TherapySessionStart, r(C::Therapy, Low, M::Therapy, Neutral)),
            (T::TherapyBreakthrough, r(C::Therapy, High, M::Therapy, Positive).delta(2, 1, 0, 0)),
            (T::TherapyResistance, r(C::Therapy, Medium, M::Therapy, Negative)),
            (
                T::ConflictRevealed,
                r(C::Therapy, High, M::Conflict, Negative).delta(-2, 0, -1, 2).conflict(),
            ),
            (
                T::ConflictResolved,
                r(C::Therapy, High, M::Therapy, Positive).delta(4, 2, 0, -3).resolution(),
            ),
            (T::EmotionalRevelation, r(C::Therapy, Medium, M::Therapy, Positive).delta(1, 0, 1, 0)),
            (T::GroupTherapyInsight, r(C::Therapy, Medium, M::Therapy, Positive).delta(2, 1, 1, 0)),
            (T::TherapistIntervention, r(C::Therapy, Medium, M::Therapy, Neutral)),
            // Training
            (T::TrainingSession, r(C::Training, Low, M::Training, Neutral)),
            (T::SkillImprovement, r(C::Training, Medium, M::Training, Positive)),
            (T::MentalExhaustion, r(C::Training, Medium, M::Training, Negative)),
            (T::TrainingInjury, r(C::Training, High, M::Training, Negative)),
            (T::NewTechniqueLearned, r(C::Training, Medium, M::Training, Positive)),
            (T::TrainingMilestone, r(C::Training, Medium, M::Training, Positive)),
            (T::SparringSession, r(C::Training, Low, M::Training, Neutral).delta(1, 4, 0, 0)),
            (T::MeditationSession, r(C::Training, Low, M::Training, Positive)),
            // Equipment / progression
            (T::EquipmentEquipped, r(C::Progression, Low, M::Equipment, Positive)),
            (T::EquipmentUpgraded, r(C::Progression, Medium, M::Equipment, Positive)),
            (T::LevelUp, r(C::Progression, Medium, M::Progression, Positive)),
            (T::StatIncrease, r(C::Progression, Low, M::Progression, Positive)),
            (T::AbilityLearned, r(C::Progression, Medium, M::Skills, Positive)),
            (T::AchievementEarned, r(C::Progression, Medium, M::Progression, Positive)),
            (T::PowerUnlocked, r(C::Progression, High, M::Skills, Positive)),
            (T::SpellLearned, r(C::Progression, Medium, M::Skills, Positive)),
            // Coaching / communication
            (T::PerformanceCoaching, r(C::Communication, Low, M::Communication, Neutral)),
            (T::EquipmentAdvice, r(C::Equipment, Low, M::Equipment, Neutral)),
            (T::SkillConsultation, r(C::Skills, Low, M::Skills, Neutral)),
            (T::PersonalTraining, r(C::Training, Low, M::Training, Positive)),
            (
                T::TeamMeeting,
                r(C::Communication, Low, M::Communication, Neutral).delta(1, 1, 0, 0),
            ),
            (
                T::CasualConversation,
                r(C::CasualSocial, Low, M::CasualSocial, Positive).delta(1, 0, 1, 0),
            ),
            // Financial
            (T::EarningsReceived, r(C::Financial, Medium, M::Financial, Positive)),
            (T::FinancialDecisionMade, r(C::Financial, Medium, M::Financial, Neutral)),
            (T::CoachFinancialAdvice, r(C::Financial, Low, M::Financial, Neutral)),
            (T::FinancialStressIncrease, r(C::Financial, Medium, M::Financial, Negative)),
            (T::FinancialStressDecrease, r(C::Financial, Medium, M::Financial, Positive)),
            (T::LuxuryPurchase, r(C::Financial, Medium, M::Financial, Neutral)),
            (T::InvestmentMade, r(C::Financial, Medium, M::Financial, Neutral)),
            (T::InvestmentOutcome, r(C::Financial, Medium, M::Financial, Neutral)),
            (T::FinancialCrisis, r(C::Financial, Critical, M::Financial, Negative)),
            (T::FinancialBreakthrough, r(C::Financial, High, M::Financial, Positive)),
            (T::TrustGained, r(C::Financial, Medium, M::Financial, Positive).delta(5, 2, 0, 0)),
            (T::TrustLost, r(C::Financial, Medium, M::Financial, Negative).delta(-8, -3, 0, 0)),
            (T::FinancialSpiralStarted, r(C::Financial, High, M::Financial, Negative)),
            (T::FinancialSpiralBroken, r(C::Financial, High, M::Financial, Positive)),
            (T::VictorySplurge, r(C::Financial, Medium, M::Financial, Positive)),
            (T::DefeatDesperation, r(C::Financial, High, M::Financial, Negative)),
            // Personal problems
            (
                T::PersonalProblemShared,
                r(C::PersonalProblems, Medium, M::PersonalProblems, Neutral).delta(2, 0, 1, 0),
            ),
            (
                T::EmotionalSupportGiven,
                r(C::PersonalProblems, Medium, M::Bonding, Positive).delta(3, 1, 2, 0),
            ),
            (T::PersonalCrisis, r(C::PersonalProblems, High, M::PersonalProblems, Negative)),
            (
                T::EmbarrassingAdmission,
                r(C::PersonalProblems, Medium, M::PersonalProblems, Negative),
            ),
            (
                T::TrustBetrayed,
                r(C::PersonalProblems, High, M::Conflict, Negative)
                    .delta(-10, -3, -4, 3)
                    .conflict(),
            ),
            // Confessional
            (T::ConfessionMade, r(C::Confessional, Medium, M::Confession, Neutral)),
            (T::SecretRevealed, r(C::Confessional, High, M::Confession, Negative)),
            (T::GuiltExpressed, r(C::Confessional, Medium, M::Confession, Negative)),
            (T::BurdenLifted, r(C::Confessional, Medium, M::Confession, Positive)),
            // Drama
            (
                T::DramaStarted,
                r(C::Drama, Medium, M::Drama, Negative).delta(-2, -1, -1, 2).conflict(),
            ),
            (T::RumorSpread, r(C::Drama, Low, M::Drama, Negative).delta(-2, 0, -1, 1)),
            (T::ScandalRevealed, r(C::Drama, High, M::Drama, Negative).delta(-3, -2, 0, 1)),
            (
                T::BetrayalExposed,
                r(C::Drama, Critical, M::Conflict, Negative).delta(-10, -4, -5, 5).conflict(),
            ),
            (
                T::DramaResolved,
                r(C::Drama, Medium, M::Drama, Positive).delta(3, 1, 1, -2).resolution(),
            ),
            // Group activities
            (
                T::TeamBonding,
                r(C::GroupActivities, Medium, M::GroupActivity, Positive).delta(2, 1, 2, 0),
            ),
            (
                T::GroupConflict,
                r(C::GroupActivities, Medium, M::Conflict, Negative)
                    .delta(-3, -1, -1, 2)
                    .conflict(),
            ),
            (
                T::LeadershipShown,
                r(C::GroupActivities, Medium, M::GroupActivity, Positive).delta(1, 3, 0, 0),
            ),
            // Casual social
            (T::SmallTalk, r(C::CasualSocial, Low, M::CasualSocial, Neutral).delta(0, 0, 1, 0)),
            (
                T::FriendshipDeepened,
                r(C::CasualSocial, Medium, M::Bonding, Positive).delta(3, 1, 3, 0),
            ),
            (
                T::AwkwardMoment,
                r(C::CasualSocial, Low, M::CasualSocial, Negative).delta(0, 0, -1, 0),
            ),
        ];

        Self {
            records: entries.into_iter().collect(),
        }
    }
}
