//! Generators for the recent-events, relationships and emotional-state
//! sections. Each returns an empty string when it has nothing to say.

use chrono::{DateTime, Utc};

use chronicle_core::{ContextSettings, EventFilter, EventStore, MemoryFilter, Valence};

use crate::config::ContextConfig;
use crate::format::event_line;
use crate::names::CharacterNames;

/// Everything a generator reads. Borrowed for the duration of one context.
pub(crate) struct Sources<'a> {
    pub store: &'a EventStore,
    pub names: &'a CharacterNames,
    pub settings: &'a ContextSettings,
    pub now: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Recent events
// ---------------------------------------------------------------------------

pub(crate) fn recent_events(src: &Sources<'_>, character: &str, config: &ContextConfig) -> String {
    let filter = EventFilter::new()
        .within(config.time_range)
        .limit(src.settings.recent_events_limit)
        .with_categories(config.domain_focus.categories().iter().copied());
    let events = src.store.get_event_history(character, &filter);
    if events.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = events
        .iter()
        .map(|e| {
            event_line(
                e,
                character,
                src.names,
                src.settings.max_named_participants,
                src.now,
            )
        })
        .collect();
    format!(
        "RECENT EVENTS (last {}):\n{}",
        config.time_range.label(),
        lines.join("\n")
    )
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

pub(crate) fn relationships(src: &Sources<'_>, character: &str) -> String {
    let summary = src.store.get_relationship_summary(character);
    if summary.is_empty() {
        return String::new();
    }

    let s = src.settings;
    let mut allies = Vec::new();
    let mut rivals = Vec::new();
    let mut neutral = Vec::new();
    for (other, rel) in &summary {
        let name = src.names.display(other.as_str());
        if rel.trust_level > s.ally_threshold || rel.affection_level > s.ally_threshold {
            allies.push((name, rel.trust_level));
        } else if rel.rivalry_intensity > s.rival_rivalry_threshold
            || rel.trust_level < s.rival_trust_threshold
        {
            rivals.push((name, rel.rivalry_intensity));
        } else {
            neutral.push(name);
        }
    }
    allies.sort_by(|a, b| b.1.cmp(&a.1));
    rivals.sort_by(|a, b| b.1.cmp(&a.1));

    let mut parts = Vec::new();
    if !allies.is_empty() {
        let listed: Vec<String> = allies
            .iter()
            .take(s.max_allies)
            .map(|(name, trust)| format!("{name} ({trust:+})"))
            .collect();
        parts.push(format!("Allies: {}", listed.join(", ")));
    }
    if !rivals.is_empty() {
        let listed: Vec<String> = rivals
            .iter()
            .take(s.max_rivals)
            .map(|(name, rivalry)| format!("{name} (rivalry {rivalry})"))
            .collect();
        parts.push(format!("Rivals: {}", listed.join(", ")));
    }
    if !neutral.is_empty() && parts.len() < 2 {
        let listed: Vec<&str> = neutral.iter().take(2).copied().collect();
        parts.push(format!("Neutral: {}", listed.join(", ")));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("RELATIONSHIPS:\n• {}", parts.join("\n• "))
    }
}

// ---------------------------------------------------------------------------
// Emotional state
// ---------------------------------------------------------------------------

/// Mood derived from recent important memories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mood {
    pub label: &'static str,
    pub confidence: i64,
    pub stress: i64,
}

pub(crate) fn mood(src: &Sources<'_>, character: &str) -> Option<Mood> {
    let memories = src.store.get_character_memories(
        character,
        &MemoryFilter::new()
            .min_importance(src.settings.emotional_importance_floor)
            .limit(src.settings.emotional_memory_limit),
    );
    if memories.is_empty() {
        return None;
    }

    let sum = |valence: Valence| -> i64 {
        memories
            .iter()
            .filter(|m| m.emotional_valence == valence)
            .map(|m| i64::from(m.emotional_intensity))
            .sum()
    };
    let positive = sum(Valence::Positive);
    let negative = sum(Valence::Negative);

    let label = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => "positive",
        std::cmp::Ordering::Less => "stressed",
        std::cmp::Ordering::Equal => "neutral",
    };
    Some(Mood {
        label,
        confidence: (50 + positive - negative).clamp(0, 100),
        stress: (negative * 10).min(100),
    })
}

pub(crate) fn emotional_state(src: &Sources<'_>, character: &str) -> String {
    mood(src, character).map_or_else(String::new, |m| {
        format!(
            "EMOTIONAL STATE: {} (confidence: {}%, stress: {}%)",
            m.label, m.confidence, m.stress
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::{
        EmotionalImpact, EventDraft, EventSource, EventType, ManualClock, MemoryType, Severity,
        TimeRange,
    };
    use chrono::Duration;
    use std::sync::Arc;

    fn fixture() -> (EventStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = EventStore::default().with_clock(clock.clone());
        (store, clock)
    }

    fn sources<'a>(
        store: &'a EventStore,
        names: &'a CharacterNames,
        settings: &'a ContextSettings,
    ) -> Sources<'a> {
        Sources {
            store,
            names,
            settings,
            now: store.now(),
        }
    }

    #[test]
    fn recent_events_lists_names_and_times() {
        let (store, clock) = fixture();
        store
            .publish(
                EventDraft::new(EventType::BattleVictory, EventSource::BattleArena, "achilles")
                    .with_secondary("joan")
                    .with_description("Won the arena final")
                    .with_severity(Severity::High),
            )
            .unwrap();
        clock.advance(Duration::hours(3));

        let names = CharacterNames::builtin();
        let settings = ContextSettings::default();
        let src = sources(&store, &names, &settings);
        let text = recent_events(&src, "achilles", &ContextConfig::performance());
        assert_eq!(
            text,
            "RECENT EVENTS (last 3 days):\n• 🟥 Won the arena final (with Joan of Arc) (3h ago)"
        );
    }

    #[test]
    fn recent_events_respect_domain_categories() {
        let (store, _clock) = fixture();
        store
            .publish(EventDraft::new(
                EventType::MealSharing,
                EventSource::KitchenTable,
                "merlin",
            ))
            .unwrap();
        let names = CharacterNames::builtin();
        let settings = ContextSettings::default();
        let src = sources(&store, &names, &settings);
        assert!(recent_events(&src, "merlin", &ContextConfig::performance()).is_empty());
        let general = ContextConfig::new(100, crate::DomainFocus::General, TimeRange::OneDay);
        assert!(recent_events(&src, "merlin", &general).contains("meal sharing"));
    }

    #[test]
    fn relationships_partition_and_backfill_neutral() {
        let (store, _clock) = fixture();
        for _ in 0..5 {
            store
                .publish(
                    EventDraft::new(EventType::AllianceFormed, EventSource::SocialLounge, "tesla")
                        .with_secondary("merlin"),
                )
                .unwrap();
        }
        store
            .publish(
                EventDraft::new(EventType::SmallTalk, EventSource::SocialLounge, "tesla")
                    .with_secondary("cleopatra"),
            )
            .unwrap();

        let names = CharacterNames::builtin();
        let settings = ContextSettings::default();
        let src = sources(&store, &names, &settings);
        let text = relationships(&src, "tesla");
        assert!(text.starts_with("RELATIONSHIPS:\n• Allies: Merlin (+25)"));
        assert!(text.contains("• Neutral: Cleopatra"));
        assert!(relationships(&src, "dracula").is_empty());
    }

    #[test]
    fn emotional_state_from_important_memories() {
        let (store, _clock) = fixture();
        store
            .publish(
                EventDraft::new(
                    EventType::PersonalCrisis,
                    EventSource::PersonalProblemsChat,
                    "dracula",
                )
                .with_importance(8)
                .with_impact(EmotionalImpact::new("dracula", Valence::Negative, 4)),
            )
            .unwrap();
        let names = CharacterNames::builtin();
        let settings = ContextSettings::default();
        let src = sources(&store, &names, &settings);
        assert_eq!(
            emotional_state(&src, "dracula"),
            "EMOTIONAL STATE: stressed (confidence: 46%, stress: 40%)"
        );
        assert!(emotional_state(&src, "joan").is_empty());
    }

    fn felt(
        store: &EventStore,
        clock: &ManualClock,
        event_type: EventType,
        importance: u8,
        impact: (Valence, u8),
    ) {
        store
            .publish(
                EventDraft::new(event_type, EventSource::PersonalProblemsChat, "dracula")
                    .with_importance(importance)
                    .with_impact(EmotionalImpact::new("dracula", impact.0, impact.1)),
            )
            .unwrap();
        clock.advance(Duration::hours(1));
    }

    #[test]
    fn emotional_state_saturates_at_the_bounds() {
        let (store, clock) = fixture();
        for _ in 0..6 {
            felt(&store, &clock, EventType::PersonalCrisis, 7, (Valence::Negative, 10));
        }
        let names = CharacterNames::builtin();
        let settings = ContextSettings::default();
        let src = sources(&store, &names, &settings);
        assert_eq!(
            emotional_state(&src, "dracula"),
            "EMOTIONAL STATE: stressed (confidence: 0%, stress: 100%)"
        );

        let (store, clock) = fixture();
        for _ in 0..6 {
            felt(&store, &clock, EventType::PersonalCrisis, 7, (Valence::Positive, 10));
        }
        let settings = ContextSettings {
            emotional_memory_limit: 6,
            ..ContextSettings::default()
        };
        let src = sources(&store, &names, &settings);
        assert_eq!(
            mood(&src, "dracula"),
            Some(Mood {
                label: "positive",
                confidence: 100,
                stress: 0
            })
        );
    }

    #[test]
    fn emotional_state_skips_minor_and_older_memories() {
        let (store, clock) = fixture();
        // Oldest: outside the five most recent.
        felt(&store, &clock, EventType::PersonalCrisis, 7, (Valence::Positive, 9));
        for _ in 0..3 {
            felt(&store, &clock, EventType::PersonalCrisis, 7, (Valence::Negative, 3));
        }
        for _ in 0..2 {
            felt(&store, &clock, EventType::PersonalCrisis, 7, (Valence::Positive, 4));
        }
        // Remembered, but below the importance floor.
        felt(&store, &clock, EventType::TherapyResistance, 5, (Valence::Negative, 10));
        let therapy = store
            .get_character_memories("dracula", &MemoryFilter::new().of_type(MemoryType::Therapy));
        assert_eq!(therapy.len(), 1);
        assert_eq!(therapy[0].importance, 5);

        let names = CharacterNames::builtin();
        let settings = ContextSettings::default();
        let src = sources(&store, &names, &settings);
        assert_eq!(
            emotional_state(&src, "dracula"),
            "EMOTIONAL STATE: stressed (confidence: 49%, stress: 90%)"
        );

        // One more memory in the window tips the balance.
        let wider = ContextSettings {
            emotional_memory_limit: 6,
            ..ContextSettings::default()
        };
        let src = sources(&store, &names, &wider);
        assert_eq!(
            emotional_state(&src, "dracula"),
            "EMOTIONAL STATE: positive (confidence: 58%, stress: 90%)"
        );
    }
}
