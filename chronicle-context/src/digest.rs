//! Memory digests for the chat features that lean on a character's past
//! rather than on recent events: confessional, kitchen table, group
//! activities, personal problems, training and real estate.
//!
//! Each digest scans the character's 20 most recent memories, keeps the
//! memory types its feature cares about, selects the relevant ones and
//! renders them as `- content (note)` lines under a heading. An optional
//! follow-up block lists related memories.

use chrono::Duration;

use chronicle_core::{CharacterMemory, ChatDomain, MemoryFilter, MemoryType, Valence};

use crate::sections::Sources;

/// Memories scanned by every digest and by [`cross_reference_candidates`].
const SCANNED_MEMORIES: usize = 20;
/// Follow-up entries per digest.
const FOLLOW_UP_LIMIT: usize = 2;
/// Callback references listed under a digest.
const REFERENCE_LIMIT: usize = 3;

fn recent_memories(src: &Sources<'_>, character: &str) -> Vec<CharacterMemory> {
    src.store
        .get_character_memories(character, &MemoryFilter::new().limit(SCANNED_MEMORIES))
}

fn of_types(
    memories: &[CharacterMemory],
    types: &[MemoryType],
    take: usize,
) -> Vec<CharacterMemory> {
    memories
        .iter()
        .filter(|m| types.contains(&m.memory_type))
        .take(take)
        .cloned()
        .collect()
}

fn associates(src: &Sources<'_>, memory: &CharacterMemory) -> String {
    memory
        .associated_characters
        .iter()
        .map(|id| src.names.display(id.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render(heading: &str, lines: &[String], follow_up: Option<(&str, Vec<String>)>) -> String {
    let mut out = format!("{heading}:\n");
    for line in lines {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    if let Some((title, entries)) = follow_up.filter(|(_, e)| !e.is_empty()) {
        out.push('\n');
        out.push_str(title);
        out.push_str(":\n");
        for entry in entries {
            out.push_str("- ");
            out.push_str(&entry);
            out.push('\n');
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Cross-references
// ---------------------------------------------------------------------------

/// Memories the comedy-reference engine may bring up in `domain`, newest
/// first, at most `limit`.
pub(crate) fn cross_reference_candidates(
    src: &Sources<'_>,
    character: &str,
    domain: ChatDomain,
    limit: usize,
) -> Vec<CharacterMemory> {
    recent_memories(src, character)
        .into_iter()
        .filter(|m| {
            let x = &m.cross_reference_data;
            x.comedy_potential >= 6
                || x.can_referenced_in.contains(&domain)
                || x.has_callback_hook(5)
        })
        .take(limit)
        .collect()
}

fn reference_lines(src: &Sources<'_>, character: &str, domain: ChatDomain) -> Vec<String> {
    cross_reference_candidates(src, character, domain, REFERENCE_LIMIT)
        .into_iter()
        .map(|m| m.content)
        .collect()
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

pub(crate) fn confessional(src: &Sources<'_>, character: &str) -> String {
    let memories = of_types(
        &recent_memories(src, character),
        &[
            MemoryType::Conflict,
            MemoryType::Therapy,
            MemoryType::PersonalProblems,
            MemoryType::Drama,
            MemoryType::Confession,
        ],
        8,
    );
    let lines: Vec<String> = memories
        .iter()
        .filter(|m| {
            let x = &m.cross_reference_data;
            x.embarrassment_level >= 3 || x.secret_level >= 3 || m.emotional_intensity >= 6
        })
        .map(|m| {
            let x = &m.cross_reference_data;
            let mut line = m.content.clone();
            if x.embarrassment_level >= 5 {
                line.push_str(" (deeply embarrassing)");
            }
            if x.secret_level >= 5 {
                line.push_str(" (secret shame)");
            }
            line
        })
        .collect();

    render(
        &format!("Recent memories weighing on {}", src.names.display(character)),
        &lines,
        Some((
            "Potential contradictions to address",
            reference_lines(src, character, ChatDomain::Confessional),
        )),
    )
}

pub(crate) fn kitchen(src: &Sources<'_>, character: &str) -> String {
    let memories = of_types(
        &recent_memories(src, character),
        &[MemoryType::Social, MemoryType::Conflict, MemoryType::Drama],
        8,
    );
    let lines: Vec<String> = memories
        .iter()
        .filter(|m| {
            ["kitchen", "living", "daily", "routine"].iter().any(|t| m.has_tag(t))
                || (m.memory_type == MemoryType::Conflict && !m.associated_characters.is_empty())
        })
        .map(|m| {
            let mut line = m.content.clone();
            if !m.associated_characters.is_empty() {
                line.push_str(&format!(" (tension with {})", associates(src, m)));
            }
            if m.emotional_intensity >= 7 {
                line.push_str(" (heated)");
            }
            line
        })
        .collect();

    render(
        &format!(
            "Recent kitchen and living arrangement dynamics for {}",
            src.names.display(character)
        ),
        &lines,
        None,
    )
}

pub(crate) fn group_activities(src: &Sources<'_>, character: &str) -> String {
    let memories = of_types(
        &recent_memories(src, character),
        &[
            MemoryType::GroupActivity,
            MemoryType::Social,
            MemoryType::Conflict,
            MemoryType::Bonding,
        ],
        8,
    );
    let lines: Vec<String> = memories
        .iter()
        .filter(|m| m.associated_characters.len() >= 2 || m.has_tag("team") || m.has_tag("group"))
        .map(|m| {
            let mut line = m.content.clone();
            if !m.associated_characters.is_empty() {
                line.push_str(&format!(" (with {})", associates(src, m)));
            }
            if m.has_tag("leadership") {
                line.push_str(" (leadership moment)");
            } else if m.has_tag("cooperation") {
                line.push_str(" (cooperation)");
            }
            line
        })
        .collect();

    render(
        &format!("Group dynamics and social patterns for {}", src.names.display(character)),
        &lines,
        None,
    )
}

pub(crate) fn personal_problems(src: &Sources<'_>, character: &str) -> String {
    let memories = of_types(
        &recent_memories(src, character),
        &[
            MemoryType::PersonalProblems,
            MemoryType::Therapy,
            MemoryType::Conflict,
            MemoryType::Social,
        ],
        10,
    );
    let week_ago = src.now - Duration::days(7);
    let lines: Vec<String> = memories
        .iter()
        .filter(|m| {
            m.emotional_intensity >= 5
                || (m.memory_type == MemoryType::Conflict && m.created_at > week_ago)
        })
        .map(|m| {
            let note = match m.emotional_intensity {
                8.. => " (very intense)",
                6..=7 => " (significant)",
                _ => "",
            };
            format!("{}{note}", m.content)
        })
        .collect();
    let therapy: Vec<String> = memories
        .iter()
        .filter(|m| m.memory_type == MemoryType::Therapy)
        .take(FOLLOW_UP_LIMIT)
        .map(|m| m.content.clone())
        .collect();

    render(
        &format!(
            "Personal struggles and emotional state for {}",
            src.names.display(character)
        ),
        &lines,
        Some(("Therapy progress relevant to current problems", therapy)),
    )
}

pub(crate) fn training(src: &Sources<'_>, character: &str) -> String {
    let memories = of_types(
        &recent_memories(src, character),
        &[
            MemoryType::Training,
            MemoryType::Battle,
            MemoryType::Progression,
            MemoryType::PersonalProblems,
            MemoryType::Therapy,
        ],
        8,
    );
    let lines: Vec<String> = memories
        .iter()
        .filter(|m| {
            m.has_tag("physical")
                || m.has_tag("training")
                || m.memory_type == MemoryType::Training
                || (m.memory_type == MemoryType::Therapy && m.has_tag("confidence"))
                || m.memory_type == MemoryType::PersonalProblems
        })
        .map(|m| {
            let note = match m.emotional_valence {
                Valence::Positive => " (progress)",
                Valence::Negative => " (setback)",
                Valence::Neutral => "",
            };
            format!("{}{note}", m.content)
        })
        .collect();

    render(
        &format!(
            "Training history and mental state for {}",
            src.names.display(character)
        ),
        &lines,
        Some((
            "Ironic contrasts with other areas",
            reference_lines(src, character, ChatDomain::Training),
        )),
    )
}

pub(crate) fn real_estate(src: &Sources<'_>, character: &str) -> String {
    let memories = of_types(
        &recent_memories(src, character),
        &[
            MemoryType::Social,
            MemoryType::Conflict,
            MemoryType::Bonding,
            MemoryType::Therapy,
        ],
        6,
    );
    let lines: Vec<String> = memories
        .iter()
        .filter(|m| {
            (m.memory_type == MemoryType::Conflict && !m.associated_characters.is_empty())
                || m.has_tag("privacy")
                || m.has_tag("space")
                || (m.memory_type == MemoryType::Therapy && m.has_tag("boundaries"))
        })
        .map(|m| {
            let mut line = m.content.clone();
            if m.has_tag("privacy") {
                line.push_str(" (privacy concern)");
            }
            if !m.associated_characters.is_empty() {
                line.push_str(&format!(" (involves {})", associates(src, m)));
            }
            line
        })
        .collect();
    let therapy: Vec<String> = memories
        .iter()
        .filter(|m| m.memory_type == MemoryType::Therapy)
        .take(FOLLOW_UP_LIMIT)
        .map(|m| m.content.clone())
        .collect();

    render(
        &format!("Living situation insights for {}", src.names.display(character)),
        &lines,
        Some(("Therapy insights affecting living preferences", therapy)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_skips_empty_follow_up() {
        let text = render("Heading", &["one".to_string()], Some(("More", Vec::new())));
        assert_eq!(text, "Heading:\n- one\n");
    }

    #[test]
    fn render_appends_follow_up_block() {
        let text = render(
            "Heading",
            &[],
            Some(("More", vec!["a".to_string(), "b".to_string()])),
        );
        assert_eq!(text, "Heading:\n\nMore:\n- a\n- b\n");
    }
}
