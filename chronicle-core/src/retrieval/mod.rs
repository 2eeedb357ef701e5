//! Query filters for events and memories.
//!
//! Every field is optional: an empty list or `None` means "no restriction on
//! this axis", and all set axes must match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventType, GameEvent};
use crate::memory::{CharacterMemory, MemoryType};
use crate::types::{EventCategory, Severity, TimeRange};

/// Filter for [`EventStore::get_event_history`](crate::EventStore::get_event_history).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    /// Keep events whose category is one of these.
    pub categories: Vec<EventCategory>,
    /// Keep events whose type is one of these.
    pub event_types: Vec<EventType>,
    /// Keep events whose severity is one of these.
    pub severities: Vec<Severity>,
    /// Keep events carrying at least one of these tags.
    pub tags: Vec<String>,
    /// Keep events with exactly this resolution flag.
    pub resolved: Option<bool>,
    /// Keep events inside this look-back window.
    pub time_range: Option<TimeRange>,
    /// Return at most this many events, newest first.
    pub limit: Option<usize>,
}

impl EventFilter {
    /// No restrictions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to `categories`.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = EventCategory>) -> Self {
        self.categories.extend(categories);
        self
    }

    /// Restrict to `event_types`.
    #[must_use]
    pub fn with_types(mut self, event_types: impl IntoIterator<Item = EventType>) -> Self {
        self.event_types.extend(event_types);
        self
    }

    /// Restrict to `severities`.
    #[must_use]
    pub fn with_severities(mut self, severities: impl IntoIterator<Item = Severity>) -> Self {
        self.severities.extend(severities);
        self
    }

    /// Require one of `tags`.
    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Require a resolution flag.
    #[must_use]
    pub fn resolved(mut self, resolved: bool) -> Self {
        self.resolved = Some(resolved);
        self
    }

    /// Restrict to a look-back window.
    #[must_use]
    pub fn within(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    /// Cap the result size.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `event` passes every set axis. `cutoff` is the resolved
    /// `time_range` boundary, if any.
    #[must_use]
    pub fn matches(&self, event: &GameEvent, cutoff: Option<DateTime<Utc>>) -> bool {
        (self.categories.is_empty() || self.categories.contains(&event.category))
            && (self.event_types.is_empty() || self.event_types.contains(&event.event_type))
            && (self.severities.is_empty() || self.severities.contains(&event.severity))
            && (self.tags.is_empty() || self.tags.iter().any(|t| event.has_tag(t)))
            && self.resolved.is_none_or(|r| event.resolved == Some(r))
            && cutoff.is_none_or(|c| event.timestamp >= c)
    }
}

/// Filter for [`EventStore::get_character_memories`](crate::EventStore::get_character_memories).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryFilter {
    /// Keep memories of this type.
    pub memory_type: Option<MemoryType>,
    /// Keep memories at least this important.
    pub min_importance: Option<u8>,
    /// Keep memories created inside this look-back window.
    pub time_range: Option<TimeRange>,
    /// Return at most this many memories.
    pub limit: Option<usize>,
}

impl MemoryFilter {
    /// No restrictions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one memory type.
    #[must_use]
    pub fn of_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    /// Require a minimum importance.
    #[must_use]
    pub fn min_importance(mut self, importance: u8) -> Self {
        self.min_importance = Some(importance);
        self
    }

    /// Restrict to a look-back window.
    #[must_use]
    pub fn within(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    /// Cap the result size.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `memory` passes every set axis.
    #[must_use]
    pub fn matches(&self, memory: &CharacterMemory, cutoff: Option<DateTime<Utc>>) -> bool {
        self.memory_type.is_none_or(|t| memory.memory_type == t)
            && self.min_importance.is_none_or(|i| memory.importance >= i)
            && cutoff.is_none_or(|c| memory.created_at >= c)
    }
}
