//! Core type definitions shared by the event store and its consumers.
//!
//! Identifiers, the closed enums that describe events and memories, time
//! windows, and the injectable [`Clock`].

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Stable identifier of a character (e.g. `"holmes"`, `"sun_wukong"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    /// Wrap a raw character id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CharacterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for CharacterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CharacterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a published event, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event_{}", self.0.simple())
    }
}

/// Unique identifier for a derived memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory_{}", self.0.simple())
    }
}

// ---------------------------------------------------------------------------
// Event classification
// ---------------------------------------------------------------------------

/// How serious an event is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Routine.
    Low,
    /// Noticeable.
    Medium,
    /// Significant.
    High,
    /// Life-changing.
    Critical,
}

impl Severity {
    /// Importance (0–10) an event gets when the producer does not set one.
    #[must_use]
    pub fn default_importance(self) -> u8 {
        match self {
            Self::Low => 3,
            Self::Medium => 5,
            Self::High => 7,
            Self::Critical => 9,
        }
    }

    /// Emotional intensity (0–10) felt by the primary character when the
    /// event carries no explicit emotional impact for them.
    #[must_use]
    pub fn base_intensity(self) -> u8 {
        match self {
            Self::Low => 3,
            Self::Medium => 5,
            Self::High => 7,
            Self::Critical => 10,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Gameplay area an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Arena fights.
    Battle,
    /// Life in the shared house.
    Social,
    /// Therapy sessions.
    Therapy,
    /// Training grounds.
    Training,
    /// Levels, equipment, unlocks.
    Progression,
    /// Coaching and advisory chats.
    Communication,
    /// Money.
    Financial,
    /// Personal problems chat.
    PersonalProblems,
    /// Team-building and group exercises.
    GroupActivities,
    /// Equipment chat.
    Equipment,
    /// Skills and abilities chat.
    Skills,
    /// Confessional booth.
    Confessional,
    /// Housing and facilities.
    RealEstate,
    /// Battle planning.
    Strategy,
    /// Gossip, scandal, betrayal.
    Drama,
    /// Lounge small talk.
    CasualSocial,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Battle => "battle",
            Self::Social => "social",
            Self::Therapy => "therapy",
            Self::Training => "training",
            Self::Progression => "progression",
            Self::Communication => "communication",
            Self::Financial => "financial",
            Self::PersonalProblems => "personal_problems",
            Self::GroupActivities => "group_activities",
            Self::Equipment => "equipment",
            Self::Skills => "skills",
            Self::Confessional => "confessional",
            Self::RealEstate => "real_estate",
            Self::Strategy => "strategy",
            Self::Drama => "drama",
            Self::CasualSocial => "casual_social",
        };
        f.write_str(name)
    }
}

/// Subsystem that emitted an event.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    BattleArena,
    KitchenTable,
    TherapyRoom,
    TrainingGrounds,
    EquipmentRoom,
    ChatSystem,
    FinancialAdvisory,
    Bank,
    Marketplace,
    ConfessionalBooth,
    RealEstateOffice,
    StrategyRoom,
    MessageBoard,
    DramaBoard,
    SocialLounge,
    Clubhouse,
    PersonalProblemsChat,
    GroupActivitiesRoom,
    SkillsAdvisor,
    EquipmentAdvisor,
    AbilitiesAdvisor,
    LivingQuarters,
}

/// Emotional direction of an impact or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Valence {
    /// Felt good.
    Positive,
    /// Felt bad.
    Negative,
    /// Neither.
    #[default]
    Neutral,
}

impl Valence {
    /// +1, -1 or 0.
    #[must_use]
    pub fn sign(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
            Self::Neutral => 0,
        }
    }
}

impl fmt::Display for Valence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Look-back window used by queries and context configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    /// Last hour.
    #[serde(rename = "1_hour")]
    OneHour,
    /// Last six hours.
    #[serde(rename = "6_hours")]
    SixHours,
    /// Last day.
    #[serde(rename = "1_day")]
    OneDay,
    /// Last three days.
    #[serde(rename = "3_days")]
    ThreeDays,
    /// Last week.
    #[serde(rename = "1_week")]
    OneWeek,
    /// Last two weeks.
    #[serde(rename = "2_weeks")]
    TwoWeeks,
}

impl TimeRange {
    /// Length of the window.
    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            Self::OneHour => Duration::hours(1),
            Self::SixHours => Duration::hours(6),
            Self::OneDay => Duration::days(1),
            Self::ThreeDays => Duration::days(3),
            Self::OneWeek => Duration::weeks(1),
            Self::TwoWeeks => Duration::weeks(2),
        }
    }

    /// Oldest timestamp still inside the window ending at `now`.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }

    /// Human-readable label, e.g. `"3 days"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OneHour => "1 hour",
            Self::SixHours => "6 hours",
            Self::OneDay => "1 day",
            Self::ThreeDays => "3 days",
            Self::OneWeek => "1 week",
            Self::TwoWeeks => "2 weeks",
        }
    }
}

/// Source of the current time.
///
/// The store stamps events and resolves [`TimeRange`] cutoffs through this
/// trait so tests can pin time with [`ManualClock`].
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start the clock at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
