//! One-line domain summaries. Each returns a fixed "no data" sentence when
//! its event set is empty.

use chronicle_core::{EventCategory, EventFilter, EventType, GameEvent, TimeRange, Valence};

use crate::config::DomainFocus;
use crate::format::percent;
use crate::sections::Sources;

/// Summary line for `focus`, or empty for [`DomainFocus::General`].
pub(crate) fn summarize(src: &Sources<'_>, character: &str, focus: DomainFocus) -> String {
    match focus {
        DomainFocus::Performance => performance(src, character),
        DomainFocus::Equipment => equipment(src, character),
        DomainFocus::Skills => skills(src, character),
        DomainFocus::Abilities => abilities(src, character),
        DomainFocus::Therapy => therapy(src, character),
        DomainFocus::Social => social(src, character),
        DomainFocus::General => String::new(),
    }
}

fn history(
    src: &Sources<'_>,
    character: &str,
    categories: &[EventCategory],
    range: TimeRange,
) -> Vec<std::sync::Arc<GameEvent>> {
    src.store.get_event_history(
        character,
        &EventFilter::new()
            .with_categories(categories.iter().copied())
            .within(range),
    )
}

fn count(events: &[std::sync::Arc<GameEvent>], event_type: EventType) -> usize {
    events.iter().filter(|e| e.event_type == event_type).count()
}

fn performance(src: &Sources<'_>, character: &str) -> String {
    let battles = src.store.get_event_history(
        character,
        &EventFilter::new()
            .with_categories([EventCategory::Battle])
            .within(TimeRange::OneWeek)
            .limit(5),
    );
    let victories = count(&battles, EventType::BattleVictory);
    let defeats = count(&battles, EventType::BattleDefeat);
    let total = victories + defeats;
    if total == 0 {
        return "PERFORMANCE: No recent battles".to_string();
    }

    let trend = match victories.cmp(&defeats) {
        std::cmp::Ordering::Greater => "📈 improving",
        std::cmp::Ordering::Less => "📉 declining",
        std::cmp::Ordering::Equal => "➡️ stable",
    };
    format!(
        "PERFORMANCE: {victories}W/{defeats}L ({}% win rate, {trend})",
        percent(victories, total)
    )
}

fn equipment(src: &Sources<'_>, character: &str) -> String {
    let recent = history(src, character, &[EventCategory::Progression], TimeRange::ThreeDays);
    let changes: Vec<String> = recent
        .iter()
        .filter(|e| {
            matches!(
                e.event_type,
                EventType::EquipmentEquipped | EventType::EquipmentUpgraded
            )
        })
        .take(2)
        .map(|e| {
            let item = e.metadata.item_name().unwrap_or("gear");
            let verb = if e.event_type == EventType::EquipmentUpgraded {
                "upgraded"
            } else {
                "equipped"
            };
            format!("{item} {verb}")
        })
        .collect();

    if changes.is_empty() {
        "EQUIPMENT: No recent changes".to_string()
    } else {
        format!("EQUIPMENT: Recent changes - {}", changes.join(", "))
    }
}

fn skills(src: &Sources<'_>, character: &str) -> String {
    let learned: Vec<String> = history(
        src,
        character,
        &[EventCategory::Training, EventCategory::Progression],
        TimeRange::OneWeek,
    )
    .iter()
    .filter(|e| {
        matches!(
            e.event_type,
            EventType::SkillImprovement | EventType::NewTechniqueLearned
        )
    })
    .take(3)
    .map(|e| {
        e.metadata
            .skill_name()
            .or_else(|| e.description.split_whitespace().next())
            .unwrap_or_default()
            .to_string()
    })
    .collect();

    if learned.is_empty() {
        "SKILLS: No recent learning".to_string()
    } else {
        format!("SKILLS: Recently learned - {}", learned.join(", "))
    }
}

fn abilities(src: &Sources<'_>, character: &str) -> String {
    let developments: Vec<String> = history(
        src,
        character,
        &[
            EventCategory::Training,
            EventCategory::Progression,
            EventCategory::Battle,
        ],
        TimeRange::OneWeek,
    )
    .iter()
    .filter(|e| {
        matches!(
            e.event_type,
            EventType::AbilityLearned
                | EventType::PowerUnlocked
                | EventType::SpellLearned
                | EventType::SkillImprovement
        )
    })
    .take(3)
    .map(|e| {
        let head = e.description.split(':').next().unwrap_or_default().trim();
        if head.is_empty() {
            e.event_type.readable()
        } else {
            head.to_string()
        }
    })
    .collect();

    if developments.is_empty() {
        "ABILITIES: No recent developments".to_string()
    } else {
        format!("ABILITIES: Recent developments - {}", developments.join(", "))
    }
}

fn therapy(src: &Sources<'_>, character: &str) -> String {
    let sessions = history(src, character, &[EventCategory::Therapy], TimeRange::OneWeek);
    if sessions.is_empty() {
        return "THERAPY: No recent sessions".to_string();
    }

    let breakthroughs = count(&sessions, EventType::TherapyBreakthrough);
    let resistance = count(&sessions, EventType::TherapyResistance);
    let progress = match breakthroughs.cmp(&resistance) {
        std::cmp::Ordering::Greater => "🎯 making progress",
        std::cmp::Ordering::Less => "🛡️ showing resistance",
        std::cmp::Ordering::Equal => "➡️ stable",
    };
    format!(
        "THERAPY: {breakthroughs} {}, {resistance} resistance ({} {} this week, {progress})",
        plural(breakthroughs, "breakthrough", "breakthroughs"),
        sessions.len(),
        plural(sessions.len(), "session", "sessions"),
    )
}

fn social(src: &Sources<'_>, character: &str) -> String {
    let events = history(src, character, &[EventCategory::Social], TimeRange::ThreeDays);
    if events.is_empty() {
        return "SOCIAL: Quiet few days".to_string();
    }

    let catalog = src.store.catalog();
    let (mut conflicts, mut positive) = (0_usize, 0_usize);
    for event in &events {
        let Some(record) = catalog.get(event.event_type) else {
            continue;
        };
        if record.is_conflict && !event.is_resolved() {
            conflicts += 1;
        } else if record.valence == Valence::Positive || record.is_conflict {
            positive += 1;
        }
    }

    let mood = match conflicts.cmp(&positive) {
        std::cmp::Ordering::Greater => "⚡ tense household",
        std::cmp::Ordering::Less => "🤝 harmonious",
        std::cmp::Ordering::Equal => "😐 typical interactions",
    };
    format!(
        "SOCIAL: {} {}, {mood}",
        events.len(),
        plural(events.len(), "interaction", "interactions")
    )
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
