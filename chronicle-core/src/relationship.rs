//! Directed relationship ledgers between pairs of characters.
//!
//! Each unordered pair touched by an event gets two records, one per
//! direction, because the same event can feel different to each side.
//! Records only change through [`CharacterRelationship::apply`], which the
//! store calls during publish, and every field is clamped after each update.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CharacterId, EventId};

/// Floor and ceiling for trust, respect and affection.
pub const LEVEL_BOUNDS: (i32, i32) = (-100, 100);
/// Floor and ceiling for rivalry.
pub const RIVALRY_BOUNDS: (i32, i32) = (0, 100);

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

/// Change applied to a relationship by one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDelta {
    /// Trust change.
    pub trust: i32,
    /// Respect change.
    pub respect: i32,
    /// Affection change.
    pub affection: i32,
    /// Rivalry change.
    pub rivalry: i32,
}

impl RelationshipDelta {
    /// No change.
    pub const ZERO: Self = Self {
        trust: 0,
        respect: 0,
        affection: 0,
        rivalry: 0,
    };

    /// Applied when a conflict is settled.
    pub const RESOLUTION: Self = Self {
        trust: 4,
        respect: 2,
        affection: 0,
        rivalry: -3,
    };

    /// Overall direction: positive fields count up, rivalry counts down.
    #[must_use]
    pub fn net(&self) -> i32 {
        self.trust + self.respect + self.affection - self.rivalry
    }

    /// Add `extra` to affection.
    #[must_use]
    pub fn with_affection(mut self, extra: i32) -> Self {
        self.affection += extra;
        self
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Recent direction of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    /// Getting better.
    Improving,
    /// Getting worse.
    Declining,
    /// No clear direction.
    Stable,
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        })
    }
}

/// Coarse label for a relationship, from `trust + affection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// ≤ −80.
    MortalEnemies,
    /// ≤ −60.
    Enemies,
    /// ≤ −40.
    Rivals,
    /// ≤ −20.
    Antagonistic,
    /// Below zero.
    Tense,
    /// Exactly zero.
    Strangers,
    /// ≤ 20.
    Acquaintances,
    /// ≤ 40.
    Friendly,
    /// ≤ 60.
    Friends,
    /// ≤ 80.
    CloseFriends,
    /// Above 80.
    BestFriends,
}

impl RelationshipStatus {
    /// Label a combined `trust + affection` score.
    #[must_use]
    pub fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=-80 => Self::MortalEnemies,
            -79..=-60 => Self::Enemies,
            -59..=-40 => Self::Rivals,
            -39..=-20 => Self::Antagonistic,
            -19..=-1 => Self::Tense,
            0 => Self::Strangers,
            1..=20 => Self::Acquaintances,
            21..=40 => Self::Friendly,
            41..=60 => Self::Friends,
            61..=80 => Self::CloseFriends,
            _ => Self::BestFriends,
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MortalEnemies => "mortal enemies",
            Self::Enemies => "enemies",
            Self::Rivals => "rivals",
            Self::Antagonistic => "antagonistic",
            Self::Tense => "tense",
            Self::Strangers => "strangers",
            Self::Acquaintances => "acquaintances",
            Self::Friendly => "friendly",
            Self::Friends => "friends",
            Self::CloseFriends => "close friends",
            Self::BestFriends => "best friends",
        })
    }
}

// ---------------------------------------------------------------------------
// Relationship record
// ---------------------------------------------------------------------------

/// What one event means for one direction of a relationship.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RelationshipUpdate {
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
    pub delta: RelationshipDelta,
    pub conflict: bool,
    pub resolution: bool,
    pub battle: bool,
}

/// How `character_id` feels about `other_character_id`.
///
/// Values handed out by the store are snapshots; changing them has no effect
/// on the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRelationship {
    /// Owner of this view.
    pub character_id: CharacterId,
    /// The other character.
    pub other_character_id: CharacterId,
    /// −100..100.
    pub trust_level: i32,
    /// −100..100.
    pub respect_level: i32,
    /// −100..100.
    pub affection_level: i32,
    /// 0..100.
    pub rivalry_intensity: i32,
    /// Every event both took part in.
    pub shared_experiences: Vec<EventId>,
    /// Conflict events between them.
    pub conflicts: Vec<EventId>,
    /// Events that settled a conflict.
    pub resolutions: Vec<EventId>,
    /// Battle events both fought in.
    pub shared_battles: u32,
    /// Events that moved the relationship up.
    pub positive_interactions: u32,
    /// Events that moved the relationship down.
    pub negative_interactions: u32,
    /// Every event both took part in, counted.
    pub interaction_count: u32,
    /// Timestamp of the latest shared event.
    pub last_interaction: Option<DateTime<Utc>>,
    recent_changes: VecDeque<i32>,
    window: usize,
}

impl CharacterRelationship {
    /// A blank record, created on first contact.
    #[must_use]
    pub fn new(
        character_id: CharacterId,
        other_character_id: CharacterId,
        trajectory_window: usize,
    ) -> Self {
        Self {
            character_id,
            other_character_id,
            trust_level: 0,
            respect_level: 0,
            affection_level: 0,
            rivalry_intensity: 0,
            shared_experiences: Vec::new(),
            conflicts: Vec::new(),
            resolutions: Vec::new(),
            shared_battles: 0,
            positive_interactions: 0,
            negative_interactions: 0,
            interaction_count: 0,
            last_interaction: None,
            recent_changes: VecDeque::with_capacity(trajectory_window),
            window: trajectory_window.max(1),
        }
    }

    /// Apply one event's effect, clamping every field.
    pub(crate) fn apply(&mut self, update: &RelationshipUpdate) {
        let before = self.score_sum();
        let d = update.delta;
        self.trust_level = clamp_level(self.trust_level + d.trust);
        self.respect_level = clamp_level(self.respect_level + d.respect);
        self.affection_level = clamp_level(self.affection_level + d.affection);
        self.rivalry_intensity = (self.rivalry_intensity + d.rivalry)
            .clamp(RIVALRY_BOUNDS.0, RIVALRY_BOUNDS.1);

        self.shared_experiences.push(update.event_id);
        if update.conflict {
            self.conflicts.push(update.event_id);
        }
        if update.resolution {
            self.resolutions.push(update.event_id);
        }
        if update.battle {
            self.shared_battles += 1;
        }
        match d.net() {
            n if n > 0 => self.positive_interactions += 1,
            n if n < 0 => self.negative_interactions += 1,
            _ => {}
        }
        self.interaction_count += 1;
        self.last_interaction = Some(
            self.last_interaction
                .map_or(update.timestamp, |t| t.max(update.timestamp)),
        );

        if self.recent_changes.len() == self.window {
            self.recent_changes.pop_front();
        }
        self.recent_changes.push_back(self.score_sum() - before);
    }

    /// Direction over the last few updates, after clamping.
    #[must_use]
    pub fn trajectory(&self) -> Trajectory {
        let total: i32 = self.recent_changes.iter().sum();
        match total {
            t if t > 0 => Trajectory::Improving,
            t if t < 0 => Trajectory::Declining,
            _ => Trajectory::Stable,
        }
    }

    /// Coarse label from trust and affection.
    #[must_use]
    pub fn status(&self) -> RelationshipStatus {
        RelationshipStatus::from_score(self.trust_level + self.affection_level)
    }

    /// Net changes that feed [`trajectory`](Self::trajectory), oldest first.
    #[must_use]
    pub fn recent_changes(&self) -> &VecDeque<i32> {
        &self.recent_changes
    }

    fn score_sum(&self) -> i32 {
        self.trust_level + self.respect_level + self.affection_level - self.rivalry_intensity
    }
}

fn clamp_level(value: i32) -> i32 {
    value.clamp(LEVEL_BOUNDS.0, LEVEL_BOUNDS.1)
}
