//! Game events: the immutable facts the store records.
//!
//! Producers build an [`EventDraft`], the store validates it against the
//! [`EventCatalog`](crate::catalog::EventCatalog), assigns an id and
//! timestamp, and appends the resulting [`GameEvent`] to its log.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::EventCatalog;
use crate::error::{ChronicleError, Result};
use crate::memory::FinancialOutcome;
use crate::types::{CharacterId, EventCategory, EventId, EventSource, Severity, Valence};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

macro_rules! event_types {
    ($( $variant:ident => $name:literal ),+ $(,)?) => {
        /// Closed vocabulary of gameplay event types.
        ///
        /// Each type has a record in the [`EventCatalog`] that supplies its
        /// default category, severity and derivation behaviour.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum EventType {
            $( #[serde(rename = $name)] $variant, )+
        }

        impl EventType {
            /// Every event type.
            pub const ALL: &'static [EventType] = &[$(EventType::$variant),+];

            /// Wire name, e.g. `"kitchen_argument"`.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(EventType::$variant => $name,)+
                }
            }
        }
    };
}

event_types! {
    // Battle
    BattleStart => "battle_start",
    BattleEnd => "battle_end",
    BattleVictory => "battle_victory",
    BattleDefeat => "battle_defeat",
    CriticalHit => "critical_hit",
    StrategySuccess => "strategy_success",
    StrategyFailure => "strategy_failure",
    TeamCoordination => "team_coordination",
    IndividualHeroics => "individual_heroics",
    BattleChatConflict => "battle_chat_conflict",
    // Social / living
    KitchenArgument => "kitchen_argument",
    BathroomConflict => "bathroom_conflict",
    BedroomDispute => "bedroom_dispute",
    MealSharing => "meal_sharing",
    CleaningConflict => "cleaning_conflict",
    NoiseComplaint => "noise_complaint",
    AllianceFormed => "alliance_formed",
    AllianceBroken => "alliance_broken",
    GossipSession => "gossip_session",
    LateNightConversation => "late_night_conversation",
    GroupActivity => "group_activity",
    // Therapy
    TherapySessionStart => "therapy_session_start",
    TherapyBreakthrough => "therapy_breakthrough",
    TherapyResistance => "therapy_resistance",
    ConflictRevealed => "conflict_revealed",
    ConflictResolved => "conflict_resolved",
    EmotionalRevelation => "emotional_revelation",
    GroupTherapyInsight => "group_therapy_insight",
    TherapistIntervention => "therapist_intervention",
    // Training
    TrainingSession => "training_session",
    SkillImprovement => "skill_improvement",
    MentalExhaustion => "mental_exhaustion",
    TrainingInjury => "training_injury",
    NewTechniqueLearned => "new_technique_learned",
    TrainingMilestone => "training_milestone",
    SparringSession => "sparring_session",
    MeditationSession => "meditation_session",
    // Equipment / progression
    EquipmentEquipped => "equipment_equipped",
    EquipmentUpgraded => "equipment_upgraded",
    LevelUp => "level_up",
    StatIncrease => "stat_increase",
    AbilityLearned => "ability_learned",
    AchievementEarned => "achievement_earned",
    PowerUnlocked => "power_unlocked",
    SpellLearned => "spell_learned",
    // Coaching / communication
    PerformanceCoaching => "performance_coaching",
    EquipmentAdvice => "equipment_advice",
    SkillConsultation => "skill_consultation",
    PersonalTraining => "personal_training",
    TeamMeeting => "team_meeting",
    CasualConversation => "casual_conversation",
    // Financial
    EarningsReceived => "earnings_received",
    FinancialDecisionMade => "financial_decision_made",
    CoachFinancialAdvice => "coach_financial_advice",
    FinancialStressIncrease => "financial_stress_increase",
    FinancialStressDecrease => "financial_stress_decrease",
    LuxuryPurchase => "luxury_purchase",
    InvestmentMade => "investment_made",
    InvestmentOutcome => "investment_outcome",
    FinancialCrisis => "financial_crisis",
    FinancialBreakthrough => "financial_breakthrough",
    TrustGained => "trust_gained",
    TrustLost => "trust_lost",
    FinancialSpiralStarted => "financial_spiral_started",
    FinancialSpiralBroken => "financial_spiral_broken",
    VictorySplurge => "victory_splurge",
    DefeatDesperation => "defeat_desperation",
    // Personal problems
    PersonalProblemShared => "personal_problem_shared",
    EmotionalSupportGiven => "emotional_support_given",
    PersonalCrisis => "personal_crisis",
    EmbarrassingAdmission => "embarrassing_admission",
    TrustBetrayed => "trust_betrayed",
    // Confessional
    ConfessionMade => "confession_made",
    SecretRevealed => "secret_revealed",
    GuiltExpressed => "guilt_expressed",
    BurdenLifted => "burden_lifted",
    // Drama
    DramaStarted => "drama_started",
    RumorSpread => "rumor_spread",
    ScandalRevealed => "scandal_revealed",
    BetrayalExposed => "betrayal_exposed",
    DramaResolved => "drama_resolved",
    // Group activities
    TeamBonding => "team_bonding",
    GroupConflict => "group_conflict",
    LeadershipShown => "leadership_shown",
    // Casual social
    SmallTalk => "small_talk",
    FriendshipDeepened => "friendship_deepened",
    AwkwardMoment => "awkward_moment",
}

impl EventType {
    /// The wire name with underscores replaced by spaces.
    #[must_use]
    pub fn readable(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Emotional impact
// ---------------------------------------------------------------------------

/// How an event felt to one of the characters involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalImpact {
    /// Who felt it.
    pub character_id: CharacterId,
    /// Direction of the feeling.
    pub impact: Valence,
    /// Strength, 0–10.
    pub intensity: u8,
}

impl EmotionalImpact {
    /// Create an impact entry.
    #[must_use]
    pub fn new(character_id: impl Into<CharacterId>, impact: Valence, intensity: u8) -> Self {
        Self {
            character_id: character_id.into(),
            impact,
            intensity,
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Battle outcome details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleDetails {
    /// Winning character.
    #[serde(default)]
    pub winner: Option<CharacterId>,
    /// Losing character.
    #[serde(default)]
    pub loser: Option<CharacterId>,
    /// Most valuable player.
    #[serde(default)]
    pub mvp: Option<CharacterId>,
    /// Strategy used.
    #[serde(default)]
    pub strategy: Option<String>,
}

/// Money details attached to financial events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialDetails {
    /// Amount of money involved.
    #[serde(default)]
    pub amount: f64,
    /// Known outcome, if already decided.
    #[serde(default)]
    pub outcome: Option<FinancialOutcome>,
    /// Change in financial stress, percentage points.
    #[serde(default)]
    pub stress_change: i32,
    /// Change in trust towards the coach's advice, percentage points.
    #[serde(default)]
    pub trust_change: i32,
}

/// Therapy session details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TherapyDetails {
    /// Therapist running the session.
    #[serde(default)]
    pub therapist_id: Option<CharacterId>,
    /// 1–10 depth of the breakthrough.
    #[serde(default)]
    pub breakthrough_level: Option<u8>,
    /// Whether the patient resisted.
    #[serde(default)]
    pub resistance_shown: bool,
}

/// Domain-specific event payload.
///
/// Typed variants cover the fields the core actually reads; anything else
/// goes in [`EventMetadata::Generic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventMetadata {
    /// Arena outcome.
    Battle(BattleDetails),
    /// Money movement.
    Financial(FinancialDetails),
    /// Equipment change.
    Equipment {
        /// Item equipped or upgraded.
        item_name: String,
    },
    /// Skill learned or improved.
    Skill {
        /// Skill name.
        skill_name: String,
    },
    /// Therapy session.
    Therapy(TherapyDetails),
    /// Free-form key/value bag.
    Generic(Map<String, Value>),
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::Generic(Map::new())
    }
}

impl EventMetadata {
    /// Look up a raw generic field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Generic(map) => map.get(key),
            _ => None,
        }
    }

    /// A numeric generic field.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.field(key).and_then(Value::as_f64)
    }

    /// A string generic field.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Equipment item name, typed first then generic `item_name`.
    #[must_use]
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::Equipment { item_name } => Some(item_name),
            _ => self.text("item_name"),
        }
    }

    /// Skill name, typed first then generic `skill_name`.
    #[must_use]
    pub fn skill_name(&self) -> Option<&str> {
        match self {
            Self::Skill { skill_name } => Some(skill_name),
            _ => self.text("skill_name"),
        }
    }

    /// Money amount, typed first then generic `amount`.
    #[must_use]
    pub fn amount(&self) -> f64 {
        match self {
            Self::Financial(details) => details.amount,
            _ => self.number("amount").unwrap_or(0.0),
        }
    }

    /// Financial outcome, typed first then generic `outcome`.
    #[must_use]
    pub fn outcome(&self) -> Option<FinancialOutcome> {
        match self {
            Self::Financial(details) => details.outcome,
            _ => self.text("outcome").and_then(|o| o.parse().ok()),
        }
    }

    /// Stress change, typed first then generic `stress_change`.
    #[must_use]
    pub fn stress_change(&self) -> i32 {
        match self {
            Self::Financial(details) => details.stress_change,
            #[allow(clippy::cast_possible_truncation)]
            _ => self.number("stress_change").map_or(0, |v| v.round() as i32),
        }
    }

    /// Trust change, typed first then generic `trust_change`.
    #[must_use]
    pub fn trust_change(&self) -> i32 {
        match self {
            Self::Financial(details) => details.trust_change,
            #[allow(clippy::cast_possible_truncation)]
            _ => self.number("trust_change").map_or(0, |v| v.round() as i32),
        }
    }

    /// A 0–10 score hint stored under `key` in a generic bag.
    #[must_use]
    pub fn score_hint(&self, key: &str) -> Option<u8> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        self.number(key).map(|v| v.clamp(0.0, 10.0).round() as u8)
    }
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// An immutable, published fact about one or more characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Assigned by the store at publish time.
    pub id: EventId,
    /// What happened.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Which subsystem reported it.
    pub source: EventSource,
    /// Gameplay area.
    pub category: EventCategory,
    /// How serious it was.
    pub severity: Severity,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// The character the event is about.
    pub primary_character_id: CharacterId,
    /// Other characters involved. Never contains the primary.
    pub secondary_character_ids: BTreeSet<CharacterId>,
    /// Human-readable summary, rendered verbatim into context.
    pub description: String,
    /// Domain payload.
    pub metadata: EventMetadata,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
    /// 0–10.
    pub importance: u8,
    /// Whether a conflict-type event was settled.
    pub resolved: Option<bool>,
    /// Per-character feelings.
    pub emotional_impact: Vec<EmotionalImpact>,
}

impl GameEvent {
    /// The primary character followed by every secondary character.
    pub fn characters(&self) -> impl Iterator<Item = &CharacterId> {
        std::iter::once(&self.primary_character_id).chain(self.secondary_character_ids.iter())
    }

    /// Whether `character` took part in the event.
    #[must_use]
    pub fn involves(&self, character: &str) -> bool {
        self.primary_character_id.as_str() == character
            || self.secondary_character_ids.contains(character)
    }

    /// The emotional impact entry for `character`, if any.
    #[must_use]
    pub fn impact_for(&self, character: &str) -> Option<&EmotionalImpact> {
        self.emotional_impact
            .iter()
            .find(|i| i.character_id.as_str() == character)
    }

    /// Whether the event carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether the event was explicitly marked resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved == Some(true)
    }
}

// ---------------------------------------------------------------------------
// EventDraft
// ---------------------------------------------------------------------------

/// An event as submitted by a producer, before validation.
///
/// Required: `event_type`, `source`, `primary_character_id`. Everything else
/// has a default, most of them taken from the event catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDraft {
    /// What happened.
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    /// Which subsystem reported it.
    pub source: Option<EventSource>,
    /// The character the event is about.
    pub primary_character_id: Option<CharacterId>,
    /// Other characters involved.
    pub secondary_character_ids: BTreeSet<CharacterId>,
    /// Overrides the catalog category.
    pub category: Option<EventCategory>,
    /// Overrides the catalog severity.
    pub severity: Option<Severity>,
    /// Overrides the publish-time timestamp.
    pub timestamp: Option<DateTime<Utc>>,
    /// Human-readable summary.
    pub description: String,
    /// Domain payload.
    pub metadata: EventMetadata,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
    /// Overrides the severity-derived importance.
    pub importance: Option<u8>,
    /// Resolution flag.
    pub resolved: Option<bool>,
    /// Per-character feelings.
    pub emotional_impact: Vec<EmotionalImpact>,
}

impl EventDraft {
    /// Start a draft with the three required fields.
    #[must_use]
    pub fn new(
        event_type: EventType,
        source: EventSource,
        primary: impl Into<CharacterId>,
    ) -> Self {
        Self {
            event_type: Some(event_type),
            source: Some(source),
            primary_character_id: Some(primary.into()),
            ..Self::default()
        }
    }

    /// Decode a draft from JSON.
    ///
    /// # Errors
    /// Returns `ChronicleError::MalformedEvent` if the JSON does not match the
    /// draft schema (including unknown event types).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ChronicleError::MalformedEvent(e.to_string()))
    }

    /// Add a secondary character.
    #[must_use]
    pub fn with_secondary(mut self, id: impl Into<CharacterId>) -> Self {
        self.secondary_character_ids.insert(id.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Override the category.
    #[must_use]
    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Override the importance.
    #[must_use]
    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = Some(importance);
        self
    }

    /// Pin the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark resolved or unresolved.
    #[must_use]
    pub fn resolved(mut self, resolved: bool) -> Self {
        self.resolved = Some(resolved);
        self
    }

    /// Add an emotional impact entry.
    #[must_use]
    pub fn with_impact(mut self, impact: EmotionalImpact) -> Self {
        self.emotional_impact.push(impact);
        self
    }

    /// Validate the draft and turn it into a publishable event.
    ///
    /// Category and severity fall back to the catalog record for the type.
    /// Two normalisations apply, so the stored event is the draft plus id and
    /// timestamp only up to these:
    ///
    /// - the primary character is dropped from the secondaries, since it is
    ///   already a participant;
    /// - a blank description becomes the readable type name
    ///   (`kitchen_argument` → `kitchen argument`).
    pub(crate) fn finalize(
        self,
        id: EventId,
        now: DateTime<Utc>,
        catalog: &EventCatalog,
    ) -> Result<GameEvent> {
        let event_type = self
            .event_type
            .ok_or(ChronicleError::MissingField { field: "type" })?;
        let source = self
            .source
            .ok_or(ChronicleError::MissingField { field: "source" })?;
        let primary = self
            .primary_character_id
            .filter(|id| !id.is_blank())
            .ok_or(ChronicleError::MissingField {
                field: "primary_character_id",
            })?;

        if self.secondary_character_ids.iter().any(CharacterId::is_blank) {
            return Err(ChronicleError::InvalidField {
                field: "secondary_character_ids",
                reason: "blank character id".to_string(),
            });
        }
        if let Some(importance) = self.importance.filter(|i| *i > 10) {
            return Err(ChronicleError::InvalidField {
                field: "importance",
                reason: format!("{importance} is outside 0–10"),
            });
        }
        if let Some(bad) = self.emotional_impact.iter().find(|i| i.intensity > 10) {
            return Err(ChronicleError::InvalidField {
                field: "emotional_impact",
                reason: format!(
                    "intensity {} for {} is outside 0–10",
                    bad.intensity, bad.character_id
                ),
            });
        }

        let record = catalog.get(event_type);
        let category = self
            .category
            .or(record.map(|r| r.category))
            .ok_or(ChronicleError::MissingField { field: "category" })?;
        let severity = self
            .severity
            .or(record.map(|r| r.severity))
            .unwrap_or(Severity::Medium);
        let importance = self
            .importance
            .unwrap_or_else(|| severity.default_importance());

        let mut secondary = self.secondary_character_ids;
        secondary.remove(primary.as_str());

        let description = if self.description.trim().is_empty() {
            event_type.readable()
        } else {
            self.description
        };

        Ok(GameEvent {
            id,
            event_type,
            source,
            category,
            severity,
            timestamp: self.timestamp.unwrap_or(now),
            primary_character_id: primary,
            secondary_character_ids: secondary,
            description,
            metadata: self.metadata,
            tags: self.tags,
            importance,
            resolved: self.resolved,
            emotional_impact: self.emotional_impact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finalize(draft: EventDraft) -> Result<GameEvent> {
        draft.finalize(EventId::new(), Utc::now(), &EventCatalog::builtin())
    }

    #[test]
    fn event_type_names_round_trip_through_from_str() {
        for t in EventType::ALL {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), *t);
        }
        assert!("not_a_thing".parse::<EventType>().is_err());
    }

    #[test]
    fn missing_required_fields_are_reported_by_name() {
        let err = finalize(EventDraft::default()).unwrap_err();
        assert!(matches!(err, ChronicleError::MissingField { field: "type" }));

        let draft = EventDraft {
            event_type: Some(EventType::LevelUp),
            ..EventDraft::default()
        };
        let err = finalize(draft).unwrap_err();
        assert!(matches!(err, ChronicleError::MissingField { field: "source" }));

        let draft = EventDraft::new(EventType::LevelUp, EventSource::TrainingGrounds, " ");
        let err = finalize(draft).unwrap_err();
        assert!(matches!(
            err,
            ChronicleError::MissingField {
                field: "primary_character_id"
            }
        ));
    }

    #[test]
    fn defaults_come_from_catalog_and_severity() {
        let event = finalize(EventDraft::new(
            EventType::KitchenArgument,
            EventSource::KitchenTable,
            "achilles",
        ))
        .unwrap();
        assert_eq!(event.category, EventCategory::Social);
        assert_eq!(event.importance, event.severity.default_importance());
        assert_eq!(event.description, "kitchen argument");
    }

    #[test]
    fn primary_is_removed_from_secondaries() {
        let event = finalize(
            EventDraft::new(EventType::MealSharing, EventSource::KitchenTable, "joan")
                .with_secondary("joan")
                .with_secondary("tesla"),
        )
        .unwrap();
        assert_eq!(event.secondary_character_ids.len(), 1);
        assert!(event.involves("tesla"));
        assert_eq!(event.characters().count(), 2);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = finalize(
            EventDraft::new(EventType::LevelUp, EventSource::TrainingGrounds, "merlin")
                .with_importance(11),
        )
        .unwrap_err();
        assert!(matches!(err, ChronicleError::InvalidField { field: "importance", .. }));

        let err = finalize(
            EventDraft::new(EventType::LevelUp, EventSource::TrainingGrounds, "merlin")
                .with_impact(EmotionalImpact::new("merlin", Valence::Positive, 12)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ChronicleError::InvalidField {
                field: "emotional_impact",
                ..
            }
        ));
    }

    #[test]
    fn json_drafts_decode_with_typed_metadata() {
        let draft = EventDraft::from_json(
            r#"{
                "type": "equipment_upgraded",
                "source": "equipment_room",
                "primary_character_id": "achilles",
                "metadata": { "kind": "equipment", "item_name": "Bronze Shield" }
            }"#,
        )
        .unwrap();
        assert_eq!(draft.metadata.item_name(), Some("Bronze Shield"));

        let err = EventDraft::from_json(r#"{ "type": "moon_landing" }"#).unwrap_err();
        assert!(matches!(err, ChronicleError::MalformedEvent(_)));
    }

    #[test]
    fn generic_metadata_accessors_fall_back_to_keys() {
        let mut map = Map::new();
        map.insert("amount".into(), Value::from(12_500));
        map.insert("outcome".into(), Value::from("failure"));
        map.insert("comedy_potential".into(), Value::from(14));
        let meta = EventMetadata::Generic(map);
        assert!((meta.amount() - 12_500.0).abs() < f64::EPSILON);
        assert_eq!(meta.outcome(), Some(FinancialOutcome::Failure));
        assert_eq!(meta.score_hint("comedy_potential"), Some(10));
        assert_eq!(meta.item_name(), None);
    }
}
