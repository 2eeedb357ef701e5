//! Integration Tests: publish into a store, read back through the compressor.

use std::sync::Arc;

use chrono::{Duration, Utc};

use chronicle_context::{
    CompressedContext, ContextCompressor, ContextConfig, DomainFocus, compress_context,
};
use chronicle_core::{
    ChatDomain, DecisionType, EmotionalImpact, EventDraft, EventMetadata, EventSource, EventStore,
    EventType, FinancialDetails, FinancialOutcome, ManualClock, MemoryFilter, MemoryType,
    Severity, TimeRange, Trajectory, Valence,
};

fn fixture() -> (Arc<EventStore>, Arc<ManualClock>, ContextCompressor) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(EventStore::default().with_clock(clock.clone()));
    let compressor = ContextCompressor::new(Arc::clone(&store));
    (store, clock, compressor)
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn holmes_therapy_context_mentions_the_breakthrough() {
    let (store, _clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::TherapyBreakthrough, EventSource::TherapyRoom, "holmes")
                .with_importance(8)
                .with_impact(EmotionalImpact::new("holmes", Valence::Positive, 9)),
        )
        .unwrap();

    let text = compressor.get_therapy_context("holmes");
    assert!(text.contains("breakthrough"));
    assert!(text.contains("(1 session this week, 🎯 making progress)"));
    assert!(text.contains("EMOTIONAL STATE: positive (confidence: 59%, stress: 0%)"));

    let memories =
        store.get_character_memories("holmes", &MemoryFilter::new().of_type(MemoryType::Therapy));
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].emotional_valence, Valence::Positive);
}

#[test]
fn kitchen_argument_reads_as_a_tense_household() {
    let (store, _clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::KitchenArgument, EventSource::KitchenTable, "achilles")
                .with_secondary("joan")
                .with_description("Argued over the last olive")
                .with_severity(Severity::High)
                .resolved(false),
        )
        .unwrap();

    let summary = store.get_relationship_summary("achilles");
    assert!(summary["joan"].rivalry_intensity > 0);

    let text = compressor.get_social_context("achilles");
    assert!(text.contains("tense"));
    assert!(text.contains("• 🟥 Argued over the last olive (with Joan of Arc) (0m ago)"));
    assert!(text.contains("RELATIONSHIPS:\n• Neutral: Joan of Arc"));
}

#[test]
fn format_joins_sections_with_blank_lines() {
    let (store, _clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::BattleVictory, EventSource::BattleArena, "achilles")
                .with_description("Held the gate alone"),
        )
        .unwrap();

    let text = compressor.get_equipment_context("achilles");
    assert_eq!(
        text,
        "RECENT EVENTS (last 1 week):\n• 🟧 Held the gate alone (0m ago)\n\nEQUIPMENT: No recent changes"
    );
}

// ---------------------------------------------------------------------------
// Budget and compression
// ---------------------------------------------------------------------------

#[test]
fn generous_budget_skips_compression() {
    let (store, clock, compressor) = fixture();
    for event_type in [EventType::BattleVictory, EventType::BattleDefeat, EventType::TrainingSession] {
        store
            .publish(
                EventDraft::new(event_type, EventSource::BattleArena, "fenrir").with_secondary("merlin"),
            )
            .unwrap();
        clock.advance(Duration::hours(2));
    }

    let config = ContextConfig::new(2000, DomainFocus::Performance, TimeRange::OneWeek);
    let ctx = compressor.generate_compressed_context("fenrir", &config);
    assert!(ctx.token_count <= 2000);
    assert!(!ctx.compressed);
    assert_eq!(ctx, compressor.generate_sections("fenrir", &config));
    assert_eq!(store.counters().snapshot().compressions_applied, 0);
    assert_eq!(store.counters().snapshot().contexts_generated, 1);

    let text = compressor.get_comprehensive_context("fenrir", &config);
    assert_eq!(text, compressor.format_for_prompt(&ctx));
    assert!(text.starts_with("RECENT EVENTS"));
}

#[test]
fn tight_budget_compresses_domain_summary_first() {
    let (store, _clock, compressor) = fixture();
    for _ in 0..5 {
        store
            .publish(
                EventDraft::new(EventType::BattleVictory, EventSource::BattleArena, "achilles")
                    .with_secondary("joan")
                    .with_description("Crushed the Trojan line at dawn"),
            )
            .unwrap();
    }

    let config = ContextConfig::new(20, DomainFocus::Performance, TimeRange::ThreeDays);
    let raw = compressor.generate_sections("achilles", &config);
    assert_eq!(raw.domain_specific, "PERFORMANCE: 5W/0L (100% win rate, 📈 improving)");

    let ctx = compressor.generate_compressed_context("achilles", &config);
    assert!(ctx.compressed);
    assert_eq!(ctx.domain_specific, "PERFORMANCE: 5W/0L");
    assert!(!ctx.recent_events.contains("(with"));
    assert!(ctx.token_count > 20, "best effort stays over budget");
    assert_eq!(ctx.token_count, ctx.estimate_tokens(4));
    assert_eq!(store.counters().snapshot().compressions_applied, 1);
}

#[test]
fn compression_touches_relationships_only_after_earlier_sections() {
    let ctx = CompressedContext::from_sections(
        format!("RECENT EVENTS:\n{}", "• 🟧 Sparred (with Merlin) (3h ago)\n".repeat(8)),
        "RELATIONSHIPS:\n• Allies: Merlin (+25)".to_string(),
        String::new(),
        format!("PERFORMANCE: 3W/1L {}", "(75% win rate, 📈 improving) ".repeat(6)),
        4,
    );
    let original = ctx.clone();

    // Shrinking the domain line alone is enough.
    let budget = original.token_count - 40;
    let squeezed = compress_context(ctx.clone(), budget, 4);
    assert_eq!(squeezed.domain_specific, "PERFORMANCE: 3W/1L");
    assert_eq!(squeezed.recent_events, original.recent_events);
    assert_eq!(squeezed.relationships, original.relationships);

    // Needs the recent events too, still not the relationships.
    let budget = original.token_count - 80;
    let squeezed = compress_context(ctx, budget, 4);
    assert_ne!(squeezed.recent_events, original.recent_events);
    assert!(!squeezed.recent_events.contains("3h ago"));
    assert_eq!(squeezed.relationships, original.relationships);
    assert!(squeezed.token_count <= budget);
}

// ---------------------------------------------------------------------------
// Financial and team battle
// ---------------------------------------------------------------------------

fn money(
    store: &EventStore,
    who: &str,
    event_type: EventType,
    amount: f64,
    outcome: Option<FinancialOutcome>,
    stress_change: i32,
    trust_change: i32,
    description: &str,
) {
    store
        .publish(
            EventDraft::new(event_type, EventSource::FinancialAdvisory, who)
                .with_description(description)
                .with_metadata(EventMetadata::Financial(FinancialDetails {
                    amount,
                    outcome,
                    stress_change,
                    trust_change,
                })),
        )
        .unwrap();
}

fn seed_finances(store: &EventStore, clock: &ManualClock) {
    let entries = [
        (EventType::InvestmentMade, 12_500.0, Some(FinancialOutcome::Success), 0, 5, "Backed the chariot works"),
        (EventType::InvestmentMade, 3_000.0, Some(FinancialOutcome::Failure), 0, 5, "Bought into a sinking fleet"),
        (EventType::LuxuryPurchase, 2_000.0, None, 8, -5, "Gilded the palace barge"),
        (EventType::FinancialCrisis, 500.0, None, 8, -5, "Could not pay the cooks"),
    ];
    for (event_type, amount, outcome, stress, trust, description) in entries {
        money(store, "cleopatra", event_type, amount, outcome, stress, trust, description);
        clock.advance(Duration::minutes(1));
    }
}

#[test]
fn financial_patterns_summarise_decisions() {
    let (store, clock, compressor) = fixture();
    seed_finances(&store, &clock);

    let patterns = compressor.get_financial_patterns("cleopatra");
    assert_eq!(patterns.successful_decisions, 1);
    assert_eq!(patterns.failed_decisions, 2);
    assert!((patterns.total_amount - 18_000.0).abs() < f64::EPSILON);
    assert_eq!(
        patterns.common_decision_types,
        vec![DecisionType::Investment, DecisionType::Purchase, DecisionType::Crisis]
    );
    assert_eq!(patterns.stress_trend, Trajectory::Declining);
    assert_eq!(patterns.trust_trend, Trajectory::Declining);
}

#[test]
fn financial_context_leads_with_money_history() {
    let (store, clock, compressor) = fixture();
    assert!(compressor.get_financial_context("cleopatra").is_empty());

    seed_finances(&store, &clock);
    let text = compressor.get_financial_context("cleopatra");
    assert!(text.starts_with(
        "CHARACTER MEMORY HISTORY:\n• Could not pay the cooks (1m ago) [crisis, $500, failure]"
    ));
    assert!(text.contains("• Backed the chariot works (4m ago) [investment, $12,500, success]"));
    assert!(text.contains("\n\nRECENT FINANCIAL EVENTS:\n• 💥 Could not pay the cooks (1m ago)"));
    assert!(text.contains("EMOTIONAL STATE:"));
}

#[test]
fn financial_history_includes_non_money_memories() {
    let (store, clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::TherapyBreakthrough, EventSource::TherapyRoom, "cleopatra")
                .with_description("Admitted the spending is about control")
                .with_importance(8),
        )
        .unwrap();
    clock.advance(Duration::minutes(5));
    assert!(
        compressor
            .get_financial_context("cleopatra")
            .starts_with("CHARACTER MEMORY HISTORY:\n• Admitted the spending is about control (5m ago)\n\n")
    );

    seed_finances(&store, &clock);
    let text = compressor.get_financial_context("cleopatra");
    assert!(text.contains("• Admitted the spending is about control (9m ago)\n"));
    assert!(text.contains("• Gilded the palace barge (2m ago) [purchase, $2,000"));
}

#[test]
fn team_battle_context_lists_last_day_results() {
    let (store, clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::BattleDefeat, EventSource::BattleArena, "genghis_khan")
                .with_description("Outflanked at the river"),
        )
        .unwrap();
    clock.advance(Duration::hours(2));

    let text = compressor.get_team_battle_context("genghis_khan");
    assert!(text.starts_with(
        "RECENT BATTLE HISTORY:\n• Recent defeat: Outflanked at the river (2h ago)\n\n"
    ));
    assert!(text.contains("PERFORMANCE: 0W/1L (0% win rate, 📉 declining)"));
}

// ---------------------------------------------------------------------------
// Memory digests
// ---------------------------------------------------------------------------

#[test]
fn kitchen_digest_names_the_other_side() {
    let (store, _clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::KitchenArgument, EventSource::KitchenTable, "achilles")
                .with_secondary("joan")
                .with_description("Argued over the last olive")
                .with_severity(Severity::High),
        )
        .unwrap();

    assert_eq!(
        compressor.get_kitchen_context("achilles"),
        "Recent kitchen and living arrangement dynamics for Achilles:\n\
         - Argued over the last olive (tension with Joan of Arc) (heated)\n"
    );
    assert_eq!(
        compressor.get_kitchen_context("joan"),
        "Recent kitchen and living arrangement dynamics for Joan of Arc:\n\
         - Argued over the last olive (tension with Achilles)\n"
    );
}

#[test]
fn confessional_digest_flags_secrets() {
    let (store, _clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::ConfessionMade, EventSource::ConfessionalBooth, "dracula")
                .with_description("Admitted to fearing garlic")
                .with_importance(7)
                .with_tag("secret")
                .with_tag("embarrassing"),
        )
        .unwrap();

    let text = compressor.get_confessional_context("dracula");
    assert!(text.starts_with("Recent memories weighing on Dracula:\n"));
    assert!(text.contains("- Admitted to fearing garlic (secret shame)\n"));
}

#[test]
fn personal_problems_digest_adds_therapy_progress() {
    let (store, _clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::PersonalCrisis, EventSource::PersonalProblemsChat, "frankenstein")
                .with_description("Villagers at the door again")
                .with_impact(EmotionalImpact::new("frankenstein", Valence::Negative, 9)),
        )
        .unwrap();
    store
        .publish(
            EventDraft::new(EventType::TherapyBreakthrough, EventSource::TherapyRoom, "frankenstein")
                .with_description("Named the fear of rejection"),
        )
        .unwrap();

    let text = compressor.get_personal_problems_context("frankenstein");
    assert!(text.starts_with("Personal struggles and emotional state for Frankenstein:\n"));
    assert!(text.contains("- Villagers at the door again (very intense)\n"));
    assert!(text.contains("\nTherapy progress relevant to current problems:\n- Named the fear of rejection\n"));
}

#[test]
fn group_digest_needs_a_crowd_or_team_tag() {
    let (store, _clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::TeamBonding, EventSource::GroupActivitiesRoom, "tesla")
                .with_secondary("merlin")
                .with_secondary("joan")
                .with_description("Built a raft together")
                .with_importance(7)
                .with_tag("leadership"),
        )
        .unwrap();

    let text = compressor.get_group_activities_context("tesla");
    assert!(text.contains("- Built a raft together (with Joan of Arc, Merlin) (leadership moment)\n"));
}

#[test]
fn cross_reference_candidates_follow_domain_and_comedy() {
    let (store, clock, compressor) = fixture();
    store
        .publish(
            EventDraft::new(EventType::SkillImprovement, EventSource::TrainingGrounds, "billy_the_kid")
                .with_importance(7),
        )
        .unwrap();
    clock.advance(Duration::minutes(1));
    store
        .publish(
            EventDraft::new(EventType::BattleVictory, EventSource::BattleArena, "billy_the_kid")
                .with_importance(7)
                .with_description("Won the duel by tripping")
                .with_tag("funny")
                .with_tag("quotable")
                .with_tag("embarrassing"),
        )
        .unwrap();
    clock.advance(Duration::minutes(1));
    money(&store, "billy_the_kid", EventType::EarningsReceived, 100.0, None, 0, 0, "Bounty paid out");

    let picked: Vec<String> = compressor
        .cross_reference_candidates("billy_the_kid", ChatDomain::Financial, 5)
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(picked, vec!["Bounty paid out", "Won the duel by tripping"]);

    let capped = compressor.cross_reference_candidates("billy_the_kid", ChatDomain::Training, 1);
    assert_eq!(capped.len(), 1);
}
