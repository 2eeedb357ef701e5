//! Money history blocks and the financial pattern summary.

use std::collections::HashMap;

use serde::Serialize;

use chronicle_core::{
    CharacterMemory, DecisionType, EventCategory, EventFilter, FinancialOutcome, MemoryFilter,
    MemoryType, TimeRange, Trajectory,
};

use crate::format::{format_amount, severity_glyph, time_ago};
use crate::sections::Sources;

/// Memories of any type feeding the history block.
const HISTORY_MEMORIES: usize = 10;
/// Financial events fetched, of which [`SHOWN_EVENTS`] are rendered.
const FETCHED_EVENTS: usize = 10;
const SHOWN_EVENTS: usize = 5;
/// Memories scanned by [`patterns`].
const PATTERN_MEMORIES: usize = 20;
/// Most recent impacts compared by the trend split.
const TREND_WINDOW: usize = 5;
/// Half-to-half average change that counts as a trend.
const TREND_BAND: f64 = 2.0;

/// Summary of a character's money decisions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialPatterns {
    /// Decisions that worked out.
    pub successful_decisions: usize,
    /// Decisions that went badly.
    pub failed_decisions: usize,
    /// Sum of amounts involved.
    pub total_amount: f64,
    /// Up to three decision types, most frequent first.
    pub common_decision_types: Vec<DecisionType>,
    /// Improving when stress impacts are falling.
    pub stress_trend: Trajectory,
    /// Improving when trust impacts are rising.
    pub trust_trend: Trajectory,
}

/// The `CHARACTER MEMORY HISTORY` and `RECENT FINANCIAL EVENTS` blocks, each
/// followed by a blank line. Empty when the character has neither.
///
/// The history covers every memory type: an advisor needs the conflicts and
/// therapy behind a decision as much as the decision itself.
pub(crate) fn history_prefix(src: &Sources<'_>, character: &str) -> String {
    let mut out = String::new();

    let memories = src.store.get_character_memories(
        character,
        &MemoryFilter::new().limit(HISTORY_MEMORIES),
    );
    if !memories.is_empty() {
        let lines: Vec<String> = memories.iter().map(|m| history_line(src, m)).collect();
        out.push_str("CHARACTER MEMORY HISTORY:\n");
        out.push_str(&lines.join("\n"));
        out.push_str("\n\n");
    }

    let events = src.store.get_event_history(
        character,
        &EventFilter::new()
            .with_categories([EventCategory::Financial])
            .within(TimeRange::OneWeek)
            .limit(FETCHED_EVENTS),
    );
    if !events.is_empty() {
        let lines: Vec<String> = events
            .iter()
            .take(SHOWN_EVENTS)
            .map(|e| {
                format!(
                    "• {} {} ({})",
                    severity_glyph(e.severity),
                    e.description,
                    time_ago(src.now, e.timestamp)
                )
            })
            .collect();
        out.push_str("RECENT FINANCIAL EVENTS:\n");
        out.push_str(&lines.join("\n"));
        out.push_str("\n\n");
    }

    out
}

/// `• content (ago)`, with decision details appended for money memories.
fn history_line(src: &Sources<'_>, memory: &CharacterMemory) -> String {
    let line = format!("• {} ({})", memory.content, time_ago(src.now, memory.created_at));
    match &memory.financial_metadata {
        Some(meta) => format!(
            "{line} [{}, ${}, {}]",
            meta.decision_type,
            format_amount(meta.amount_involved),
            meta.outcome
        ),
        None => line,
    }
}

/// Summarise the most recent financial memories.
pub(crate) fn patterns(src: &Sources<'_>, character: &str) -> FinancialPatterns {
    let memories = src.store.get_character_memories(
        character,
        &MemoryFilter::new()
            .of_type(MemoryType::Financial)
            .limit(PATTERN_MEMORIES),
    );

    let mut successful = 0;
    let mut failed = 0;
    let mut total_amount = 0.0;
    let mut type_counts: HashMap<DecisionType, usize> = HashMap::new();
    // Newest first, as returned.
    let mut stress = Vec::new();
    let mut trust = Vec::new();

    for meta in memories.iter().filter_map(|m| m.financial_metadata.as_ref()) {
        match meta.outcome {
            FinancialOutcome::Success => successful += 1,
            FinancialOutcome::Failure => failed += 1,
            FinancialOutcome::Pending => {}
        }
        total_amount += meta.amount_involved;
        *type_counts.entry(meta.decision_type).or_default() += 1;
        stress.push(meta.stress_impact);
        trust.push(meta.trust_impact);
    }

    let mut ranked: Vec<(DecisionType, usize)> = type_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    FinancialPatterns {
        successful_decisions: successful,
        failed_decisions: failed,
        total_amount,
        common_decision_types: ranked.into_iter().take(3).map(|(t, _)| t).collect(),
        // Rising stress is bad news.
        stress_trend: invert(trend(&stress)),
        trust_trend: trend(&trust),
    }
}

/// Direction of the most recent [`TREND_WINDOW`] values, given newest first.
/// Compares the average of the older half against the newer half.
fn trend(newest_first: &[i32]) -> Trajectory {
    let mut window: Vec<f64> = newest_first
        .iter()
        .take(TREND_WINDOW)
        .map(|&v| f64::from(v))
        .collect();
    if window.len() < 2 {
        return Trajectory::Stable;
    }
    window.reverse();

    let (older, newer) = window.split_at(window.len() / 2);
    #[allow(clippy::cast_precision_loss)]
    let avg = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let diff = avg(newer) - avg(older);

    if diff > TREND_BAND {
        Trajectory::Improving
    } else if diff < -TREND_BAND {
        Trajectory::Declining
    } else {
        Trajectory::Stable
    }
}

fn invert(trajectory: Trajectory) -> Trajectory {
    match trajectory {
        Trajectory::Improving => Trajectory::Declining,
        Trajectory::Declining => Trajectory::Improving,
        Trajectory::Stable => Trajectory::Stable,
    }
}
