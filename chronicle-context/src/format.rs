//! Small text helpers shared by the section generators.

use chrono::{DateTime, Utc};

use chronicle_core::{GameEvent, Severity};

use crate::names::CharacterNames;

/// Single-glyph severity marker.
#[must_use]
pub fn severity_glyph(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "🟨",
        Severity::Medium => "🟧",
        Severity::High => "🟥",
        Severity::Critical => "💥",
    }
}

/// Coarse relative time: `Nm ago`, `Nh ago`, `yesterday`, `Nd ago`, `last week`.
///
/// Timestamps in the future read as `0m ago`.
#[must_use]
pub fn time_ago(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> String {
    let elapsed = (now - timestamp).max(chrono::Duration::zero());
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days == 1 {
        "yesterday".to_string()
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        "last week".to_string()
    }
}

/// One recent-events bullet as seen by `viewer`:
/// `• 🟥 description (with A, B) (3h ago)`.
#[must_use]
pub fn event_line(
    event: &GameEvent,
    viewer: &str,
    names: &CharacterNames,
    max_named: usize,
    now: DateTime<Utc>,
) -> String {
    let others: Vec<&str> = event
        .characters()
        .filter(|id| id.as_str() != viewer)
        .take(max_named)
        .map(|id| names.display(id.as_str()))
        .collect();

    let mut description = event.description.clone();
    if !others.is_empty() {
        description.push_str(" (with ");
        description.push_str(&others.join(", "));
        description.push(')');
    }
    format!(
        "• {} {description} ({})",
        severity_glyph(event.severity),
        time_ago(now, event.timestamp)
    )
}

/// Whole currency units with thousands separators, e.g. `12,500`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Whole-number percentage of `part` in `total`, 0 for an empty total.
#[must_use]
pub fn percent(part: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        (part * 100 + total / 2) / total
    }
}
