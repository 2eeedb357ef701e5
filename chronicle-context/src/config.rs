//! Per-call context configuration and the per-domain presets.

use std::fmt;

use serde::{Deserialize, Serialize};

use chronicle_core::{ChronicleError, EventCategory, TimeRange};

/// Which consuming feature a context is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainFocus {
    /// Performance coaching.
    Performance,
    /// Equipment advice.
    Equipment,
    /// Skills advice.
    Skills,
    /// Abilities advice.
    Abilities,
    /// Therapy.
    Therapy,
    /// Social lounge.
    Social,
    /// No domain filter, no domain summary.
    General,
}

impl DomainFocus {
    /// Event categories the recent-events section keeps for this domain.
    /// Empty for [`DomainFocus::General`], meaning no restriction.
    #[must_use]
    pub fn categories(self) -> &'static [EventCategory] {
        use EventCategory::{Battle, Communication, Progression, Social, Therapy, Training};
        match self {
            Self::Performance => &[Battle, Training],
            Self::Equipment => &[Progression, Battle],
            Self::Skills => &[Training, Progression],
            Self::Abilities => &[Training, Progression, Battle],
            Self::Therapy => &[Therapy, Social],
            Self::Social => &[Social, Communication],
            Self::General => &[],
        }
    }
}

impl fmt::Display for DomainFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Performance => "performance",
            Self::Equipment => "equipment",
            Self::Skills => "skills",
            Self::Abilities => "abilities",
            Self::Therapy => "therapy",
            Self::Social => "social",
            Self::General => "general",
        })
    }
}

/// What to put in a context and how big it may get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Token budget. A target, not a guarantee.
    pub max_tokens: usize,
    /// Consuming domain.
    pub domain_focus: DomainFocus,
    /// Render the recent-events section.
    #[serde(default = "default_true")]
    pub include_recent_events: bool,
    /// Render the relationships section.
    #[serde(default = "default_true")]
    pub include_relationships: bool,
    /// Render the emotional-state section.
    #[serde(default = "default_true")]
    pub include_emotional_state: bool,
    /// Render the domain summary line.
    #[serde(default = "default_true")]
    pub include_domain_specific: bool,
    /// Look-back window for recent events.
    pub time_range: TimeRange,
}

impl ContextConfig {
    /// Every section on.
    #[must_use]
    pub fn new(max_tokens: usize, domain_focus: DomainFocus, time_range: TimeRange) -> Self {
        Self {
            max_tokens,
            domain_focus,
            include_recent_events: true,
            include_relationships: true,
            include_emotional_state: true,
            include_domain_specific: true,
            time_range,
        }
    }

    /// Load a config from TOML.
    ///
    /// # Errors
    /// Returns `ChronicleError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> chronicle_core::Result<Self> {
        toml::from_str(toml_str).map_err(|e| ChronicleError::Config(e.to_string()))
    }

    /// Turn the relationships section off.
    #[must_use]
    pub fn without_relationships(mut self) -> Self {
        self.include_relationships = false;
        self
    }

    /// Turn the emotional-state section off.
    #[must_use]
    pub fn without_emotional_state(mut self) -> Self {
        self.include_emotional_state = false;
        self
    }

    // -----------------------------------------------------------------------
    // Presets
    // -----------------------------------------------------------------------

    /// Performance coaching: 200 tokens, 3 days, everything.
    #[must_use]
    pub fn performance() -> Self {
        Self::new(200, DomainFocus::Performance, TimeRange::ThreeDays)
    }

    /// Equipment advice: 150 tokens, 1 week, events and summary only.
    #[must_use]
    pub fn equipment() -> Self {
        Self::new(150, DomainFocus::Equipment, TimeRange::OneWeek)
            .without_relationships()
            .without_emotional_state()
    }

    /// Skills advice: 180 tokens, 1 week.
    #[must_use]
    pub fn skills() -> Self {
        Self::new(180, DomainFocus::Skills, TimeRange::OneWeek).without_relationships()
    }

    /// Abilities advice: 200 tokens, 1 week.
    #[must_use]
    pub fn abilities() -> Self {
        Self::new(200, DomainFocus::Abilities, TimeRange::OneWeek).without_relationships()
    }

    /// Therapy: 300 tokens, 1 week, everything.
    #[must_use]
    pub fn therapy() -> Self {
        Self::new(300, DomainFocus::Therapy, TimeRange::OneWeek)
    }

    /// Social lounge: 150 tokens, 3 days, no emotional state.
    #[must_use]
    pub fn social() -> Self {
        Self::new(150, DomainFocus::Social, TimeRange::ThreeDays).without_emotional_state()
    }

    /// Financial advisory: 250 tokens, 1 week, no domain filter.
    #[must_use]
    pub fn financial() -> Self {
        Self::new(250, DomainFocus::General, TimeRange::OneWeek).without_relationships()
    }

    /// Team battle chat: 250 tokens, 1 day, performance focus.
    #[must_use]
    pub fn team_battle() -> Self {
        Self::new(250, DomainFocus::Performance, TimeRange::OneDay)
    }
}

fn default_true() -> bool {
    true
}
