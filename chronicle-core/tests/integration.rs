//! Integration Tests: end-to-end publish and query flows.
//!
//! Each test drives the public `EventStore` surface only: publish drafts,
//! then check history, memories and relationships.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};

use chronicle_core::{
    ChronicleConfig, EmotionalImpact, EventCategory, EventDraft, EventFilter, EventSource,
    EventStore, EventType, ManualClock, MemoryFilter, MemoryType, Severity, Trajectory, Valence,
};

// ---------------------------------------------------------------------------
// Append-only log
// ---------------------------------------------------------------------------

#[test]
fn published_event_matches_its_draft() {
    let now = Utc::now();
    let store = EventStore::default().with_clock(Arc::new(ManualClock::new(now)));
    let draft = EventDraft::new(EventType::SparringSession, EventSource::TrainingGrounds, "achilles")
        .with_secondary("fenrir")
        .with_description("Traded blows until sundown")
        .with_tag("sparring")
        .with_impact(EmotionalImpact::new("achilles", Valence::Positive, 4));

    let receipt = store.publish(draft.clone()).unwrap();
    let event = store.get_event(receipt.event_id).unwrap();

    assert_eq!(event.id, receipt.event_id);
    assert_eq!(event.timestamp, now);
    assert_eq!(Some(event.event_type), draft.event_type);
    assert_eq!(Some(event.source), draft.source);
    assert_eq!(event.description, draft.description);
    assert_eq!(event.tags, draft.tags);
    assert_eq!(event.emotional_impact, draft.emotional_impact);
    assert_eq!(event.secondary_character_ids, draft.secondary_character_ids);

    // The primary never doubles as a secondary, and a blank description
    // reads as the type name.
    let doubled = store
        .publish(
            EventDraft::new(EventType::SparringSession, EventSource::TrainingGrounds, "achilles")
                .with_secondary("achilles")
                .with_secondary("fenrir"),
        )
        .unwrap();
    let normalised = store.get_event(doubled.event_id).unwrap();
    assert_eq!(normalised.secondary_character_ids.len(), 1);
    assert!(normalised.secondary_character_ids.iter().all(|id| id.as_str() == "fenrir"));
    assert_eq!(normalised.description, "sparring session");

    // Later publishes never disturb earlier events.
    for _ in 0..10 {
        store
            .publish(EventDraft::new(
                EventType::SparringSession,
                EventSource::TrainingGrounds,
                "achilles",
            ))
            .unwrap();
    }
    assert_eq!(*store.get_event(receipt.event_id).unwrap(), *event);
}

#[test]
fn json_drafts_publish_like_typed_drafts() {
    let store = EventStore::default();
    let receipt = store
        .publish_json(
            r#"{
                "type": "trust_lost",
                "source": "financial_advisory",
                "primary_character_id": "billy_the_kid",
                "secondary_character_ids": ["cleopatra"],
                "description": "Ignored the coach and lost it all",
                "metadata": { "kind": "financial", "amount": 8000, "trust_change": -15 }
            }"#,
        )
        .unwrap();
    let event = store.get_event(receipt.event_id).unwrap();
    assert_eq!(event.category, EventCategory::Financial);

    let memories = store.get_character_memories(
        "billy_the_kid",
        &MemoryFilter::new().of_type(MemoryType::Financial),
    );
    assert_eq!(memories.len(), 1);
    let money = memories[0].financial_metadata.as_ref().unwrap();
    assert_eq!(money.trust_impact, -15);

    assert!(store.publish_json("{ not json").is_err());
    assert_eq!(store.counters().snapshot().drafts_rejected, 1);
}

// ---------------------------------------------------------------------------
// Indexing
// ---------------------------------------------------------------------------

#[test]
fn every_participant_sees_the_event() {
    let store = EventStore::default();
    let receipt = store
        .publish(
            EventDraft::new(EventType::GroupActivity, EventSource::Clubhouse, "merlin")
                .with_secondary("dracula")
                .with_secondary("frankenstein"),
        )
        .unwrap();
    for character in ["merlin", "dracula", "frankenstein"] {
        let history = store.get_event_history(character, &EventFilter::new());
        assert!(history.iter().any(|e| e.id == receipt.event_id), "{character} missing event");
    }
    assert!(store.get_event_history("tesla", &EventFilter::new()).is_empty());
}

// ---------------------------------------------------------------------------
// Memory threshold
// ---------------------------------------------------------------------------

#[test]
fn importance_threshold_decides_memorability() {
    let store = EventStore::default();
    store
        .publish(
            EventDraft::new(EventType::AchievementEarned, EventSource::TrainingGrounds, "joan")
                .with_importance(5),
        )
        .unwrap();
    assert!(store.get_character_memories("joan", &MemoryFilter::new()).is_empty());

    store
        .publish(
            EventDraft::new(EventType::AchievementEarned, EventSource::TrainingGrounds, "joan")
                .with_importance(7),
        )
        .unwrap();
    assert_eq!(store.get_character_memories("joan", &MemoryFilter::new()).len(), 1);
}

#[test]
fn configured_threshold_is_respected() {
    let config = ChronicleConfig::from_toml("[store]\nmemory_threshold = 9").unwrap();
    let store = EventStore::from_config(&config);
    store
        .publish(
            EventDraft::new(EventType::LevelUp, EventSource::TrainingGrounds, "tesla")
                .with_importance(8),
        )
        .unwrap();
    assert!(store.get_character_memories("tesla", &MemoryFilter::new()).is_empty());
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn holmes_therapy_breakthrough_is_remembered() {
    let store = EventStore::default();
    store
        .publish(
            EventDraft::new(EventType::TherapyBreakthrough, EventSource::TherapyRoom, "holmes")
                .with_importance(8)
                .with_description("Admitted that solving cases is how he avoids feeling lonely")
                .with_impact(EmotionalImpact::new("holmes", Valence::Positive, 9)),
        )
        .unwrap();

    let memories = store.get_character_memories(
        "holmes",
        &MemoryFilter::new().of_type(MemoryType::Therapy),
    );
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].emotional_valence, Valence::Positive);
    assert_eq!(memories[0].emotional_intensity, 9);
    assert_eq!(memories[0].importance, 8);
}

#[test]
fn kitchen_argument_creates_rivalry_both_ways() {
    let store = EventStore::default();
    store
        .publish(
            EventDraft::new(EventType::KitchenArgument, EventSource::KitchenTable, "achilles")
                .with_secondary("joan")
                .with_severity(Severity::High)
                .resolved(false)
                .with_description("Shouting match over who ate the last of the ambrosia"),
        )
        .unwrap();

    let summary = store.get_relationship_summary("achilles");
    let joan = summary.get("joan").unwrap();
    assert!(joan.rivalry_intensity > 0);
    assert!(joan.trust_level < 0);
    assert_eq!(joan.conflicts.len(), 1);
    assert_eq!(joan.trajectory(), Trajectory::Declining);

    let back = store.get_relationship("joan", "achilles").unwrap();
    assert!(back.rivalry_intensity > 0);

    // Both sides remember the fight.
    assert_eq!(store.get_character_memories("joan", &MemoryFilter::new()).len(), 1);
}

#[test]
fn resolution_repairs_a_conflict() {
    let store = EventStore::default();
    let argue = || {
        EventDraft::new(EventType::KitchenArgument, EventSource::KitchenTable, "cleopatra")
            .with_secondary("genghis_khan")
    };
    store.publish(argue()).unwrap();
    let before = store.get_relationship("cleopatra", "genghis_khan").unwrap();

    store.publish(argue().resolved(true)).unwrap();
    let after = store.get_relationship("cleopatra", "genghis_khan").unwrap();

    assert!(after.trust_level > before.trust_level);
    assert!(after.rivalry_intensity < before.rivalry_intensity);
    assert_eq!(after.resolutions.len(), 1);
    assert_eq!(after.conflicts.len(), 1);
}

#[test]
fn shared_battles_are_counted() {
    let store = EventStore::default();
    for _ in 0..3 {
        store
            .publish(
                EventDraft::new(EventType::BattleVictory, EventSource::BattleArena, "sun_wukong")
                    .with_secondary("achilles"),
            )
            .unwrap();
    }
    let rel = store.get_relationship("achilles", "sun_wukong").unwrap();
    assert_eq!(rel.shared_battles, 3);
    assert_eq!(rel.positive_interactions, 3);
    assert_eq!(rel.trust_level, 9);
    assert_eq!(rel.trajectory(), Trajectory::Improving);
}

#[test]
fn old_memories_drop_out_of_windowed_queries() {
    let clock = Arc::new(ManualClock::new(Utc::now() - Duration::days(10)));
    let store = EventStore::default().with_clock(clock.clone());
    store
        .publish(EventDraft::new(
            EventType::FinancialCrisis,
            EventSource::Bank,
            "dracula",
        ))
        .unwrap();
    clock.advance(Duration::days(10));

    let all = store.get_character_memories("dracula", &MemoryFilter::new());
    let week = store.get_character_memories(
        "dracula",
        &MemoryFilter::new().within(chronicle_core::TimeRange::OneWeek),
    );
    assert_eq!(all.len(), 1);
    assert!(week.is_empty());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_publish_and_read() {
    let store = Arc::new(EventStore::default());
    let writers: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    store
                        .publish(
                            EventDraft::new(
                                EventType::MealSharing,
                                EventSource::KitchenTable,
                                format!("cook_{i}"),
                            )
                            .with_secondary("joan"),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..50 {
                // Every event visible to a reader already has its
                // relationship applied.
                let events = store.get_event_history("joan", &EventFilter::new());
                let interactions: u32 = store
                    .get_relationship_summary("joan")
                    .values()
                    .map(|r| r.interaction_count)
                    .sum();
                assert!(interactions as usize >= events.len());
            }
        })
    };
    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(store.stats().events, 200);
    assert_eq!(store.get_event_history("joan", &EventFilter::new()).len(), 200);
    assert_eq!(store.counters().snapshot().events_published, 200);
}
