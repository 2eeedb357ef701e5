//! Scores the comedy-reference engine reads when picking callbacks.
//!
//! Computed once from the source event at derivation time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::MemoryType;
use crate::event::GameEvent;
use crate::types::{Severity, Valence};

/// Tags that mark an event as good comedy material.
pub const COMEDY_TAGS: &[&str] = &[
    "embarrassing",
    "awkward",
    "hypocritical",
    "ironic",
    "drama",
    "gossip",
    "secret",
    "confession",
    "argument",
    "funny",
    "quotable",
    "rebellion",
];

/// Chat features a memory can be brought up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatDomain {
    /// Kitchen table banter.
    KitchenTable,
    /// Confessional booth.
    Confessional,
    /// Therapy sessions.
    Therapy,
    /// Social lounge.
    Social,
    /// Financial advisory.
    Financial,
    /// Performance coaching.
    Performance,
    /// Training grounds.
    Training,
}

/// Per-memory callback scores, each 0–10.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReferenceData {
    /// How funny bringing it up would be.
    pub comedy_potential: u8,
    /// How much it contradicts the character's self-image.
    pub contradiction_potential: u8,
    /// How embarrassing it is.
    pub embarrassment_level: u8,
    /// How quotable.
    pub quotability: u8,
    /// How secret.
    pub secret_level: u8,
    /// Where it may be referenced.
    pub can_referenced_in: BTreeSet<ChatDomain>,
}

impl CrossReferenceData {
    /// Score `event` as seen by a character who felt it at `intensity` with
    /// `valence`.
    ///
    /// Numeric generic metadata keys with the same names as the score fields
    /// override the computed values.
    #[must_use]
    pub fn score(
        event: &GameEvent,
        memory_type: MemoryType,
        valence: Valence,
        intensity: u8,
    ) -> Self {
        let tag_hits = |tags: &[&str]| -> u8 {
            let hits = tags.iter().filter(|t| event.has_tag(t)).count();
            u8::try_from(hits).unwrap_or(u8::MAX)
        };
        let severity_weight: u8 = match event.severity {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        };
        let negative = valence == Valence::Negative;

        let comedy_hits = tag_hits(COMEDY_TAGS);
        let comedy = comedy_hits
            .saturating_mul(2)
            .saturating_add(if negative { severity_weight } else { 0 });

        let contradiction = tag_hits(&["hypocritical", "ironic", "rebellion"])
            .saturating_mul(3)
            .saturating_add(match memory_type {
                MemoryType::Conflict | MemoryType::Therapy | MemoryType::Confession => {
                    intensity / 2
                }
                _ => 0,
            });

        let embarrassment = tag_hits(&["embarrassing", "awkward"])
            .saturating_mul(4)
            .saturating_add(if negative { intensity / 3 } else { 0 });

        let quotability = tag_hits(&["quotable", "funny"])
            .saturating_mul(4)
            .saturating_add(severity_weight);

        let secret = tag_hits(&["secret", "confession"])
            .saturating_mul(4)
            .saturating_add(match memory_type {
                MemoryType::Confession => 3,
                MemoryType::PersonalProblems | MemoryType::Therapy => 1,
                _ => 0,
            });

        let pick = |key: &str, computed: u8| {
            event
                .metadata
                .score_hint(key)
                .unwrap_or_else(|| computed.min(10))
        };

        Self {
            comedy_potential: pick("comedy_potential", comedy),
            contradiction_potential: pick("contradiction_potential", contradiction),
            embarrassment_level: pick("embarrassment_level", embarrassment),
            quotability: pick("quotability", quotability),
            secret_level: pick("secret_level", secret),
            can_referenced_in: referenceable_domains(memory_type).iter().copied().collect(),
        }
    }

    /// Whether any of contradiction, embarrassment or quotability reaches
    /// `floor`.
    #[must_use]
    pub fn has_callback_hook(&self, floor: u8) -> bool {
        self.contradiction_potential >= floor
            || self.embarrassment_level >= floor
            || self.quotability >= floor
    }
}

/// Chat features where memories of `memory_type` may come up.
#[must_use]
pub fn referenceable_domains(memory_type: MemoryType) -> &'static [ChatDomain] {
    use ChatDomain::{Confessional, Financial, KitchenTable, Performance, Social, Therapy, Training};
    match memory_type {
        MemoryType::Conflict => &[KitchenTable, Confessional, Therapy, Social],
        MemoryType::Therapy => &[Confessional, KitchenTable],
        MemoryType::Financial => &[Financial, KitchenTable, Confessional],
        MemoryType::Battle => &[Performance, KitchenTable, Confessional, Social],
        MemoryType::Drama => &[KitchenTable, Confessional, Social],
        MemoryType::Social
        | MemoryType::Bonding
        | MemoryType::GroupActivity
        | MemoryType::CasualSocial => &[KitchenTable, Social],
        MemoryType::Confession | MemoryType::PersonalProblems => &[Confessional, Therapy],
        MemoryType::Training
        | MemoryType::Skills
        | MemoryType::Equipment
        | MemoryType::Progression => &[Performance, Training],
        MemoryType::Communication | MemoryType::Strategy => &[Performance],
    }
}
