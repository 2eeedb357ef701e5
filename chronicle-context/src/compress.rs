//! The compressed-context value and the lossy shrink pass.
//!
//! Size is estimated with a fixed characters-per-token ratio, no tokenizer.
//! When a context is over budget, sections are shrunk one at a time in
//! [`SectionKind::COMPRESSION_ORDER`] until the estimate fits or every
//! section has been visited.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parenthetical asides, e.g. `(with Joan of Arc)`.
#[allow(clippy::expect_used)]
static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

/// Exact relative times that collapse to "recent".
#[allow(clippy::expect_used)]
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+h ago|\d+d ago|yesterday").expect("valid regex"));

/// Whitespace runs, newlines included.
#[allow(clippy::expect_used)]
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// The four sections of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Domain summary line.
    DomainSpecific,
    /// Recent event bullets.
    RecentEvents,
    /// Allies, rivals, neutral.
    Relationships,
    /// Mood line.
    EmotionalState,
}

impl SectionKind {
    /// Order in which sections are shrunk: ascending priority number, so the
    /// domain summary goes first.
    pub const COMPRESSION_ORDER: [Self; 4] = [
        Self::DomainSpecific,
        Self::RecentEvents,
        Self::Relationships,
        Self::EmotionalState,
    ];

    /// Order in which sections are rendered.
    pub const RENDER_ORDER: [Self; 4] = [
        Self::RecentEvents,
        Self::Relationships,
        Self::EmotionalState,
        Self::DomainSpecific,
    ];

    /// Compression priority, 1 (first) to 4 (last).
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::DomainSpecific => 1,
            Self::RecentEvents => 2,
            Self::Relationships => 3,
            Self::EmotionalState => 4,
        }
    }
}

/// A rendered, size-estimated context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedContext {
    /// Recent event bullets, or empty.
    pub recent_events: String,
    /// Relationship lines, or empty.
    pub relationships: String,
    /// Mood line, or empty.
    pub emotional_state: String,
    /// Domain summary line, or empty.
    pub domain_specific: String,
    /// Estimated size of the non-empty sections joined with newlines.
    pub token_count: usize,
    /// Whether the shrink pass ran.
    pub compressed: bool,
}

impl CompressedContext {
    /// Build from sections and estimate its size.
    #[must_use]
    pub fn from_sections(
        recent_events: String,
        relationships: String,
        emotional_state: String,
        domain_specific: String,
        chars_per_token: usize,
    ) -> Self {
        let mut ctx = Self {
            recent_events,
            relationships,
            emotional_state,
            domain_specific,
            token_count: 0,
            compressed: false,
        };
        ctx.token_count = ctx.estimate_tokens(chars_per_token);
        ctx
    }

    /// Text of one section.
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::RecentEvents => &self.recent_events,
            SectionKind::Relationships => &self.relationships,
            SectionKind::EmotionalState => &self.emotional_state,
            SectionKind::DomainSpecific => &self.domain_specific,
        }
    }

    fn section_mut(&mut self, kind: SectionKind) -> &mut String {
        match kind {
            SectionKind::RecentEvents => &mut self.recent_events,
            SectionKind::Relationships => &mut self.relationships,
            SectionKind::EmotionalState => &mut self.emotional_state,
            SectionKind::DomainSpecific => &mut self.domain_specific,
        }
    }

    /// Non-empty sections in render order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        SectionKind::RENDER_ORDER
            .into_iter()
            .map(|kind| self.section(kind))
            .filter(|s| !s.is_empty())
    }

    /// Re-estimate the size from the current section text.
    #[must_use]
    pub fn estimate_tokens(&self, chars_per_token: usize) -> usize {
        let separators = self.sections().count().saturating_sub(1);
        let chars: usize = self.sections().map(|s| s.chars().count()).sum();
        estimate_tokens_for_chars(chars + separators, chars_per_token)
    }

    /// Whether every section is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections().next().is_none()
    }
}

/// `ceil(chars / chars_per_token)` for `text`.
#[must_use]
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    estimate_tokens_for_chars(text.chars().count(), chars_per_token)
}

fn estimate_tokens_for_chars(chars: usize, chars_per_token: usize) -> usize {
    chars.div_ceil(chars_per_token.max(1))
}

/// Shrink one section: drop parentheticals, collapse exact relative times to
/// "recent", collapse whitespace.
#[must_use]
pub fn compress_section(content: &str) -> String {
    let stripped = PARENTHETICAL_RE.replace_all(content, "");
    let coarse = RELATIVE_TIME_RE.replace_all(&stripped, "recent");
    WHITESPACE_RE.replace_all(&coarse, " ").trim().to_string()
}

/// Shrink sections in [`SectionKind::COMPRESSION_ORDER`] until the estimate is
/// within `max_tokens`. Returns the best effort if it never fits.
#[must_use]
pub fn compress_context(
    mut ctx: CompressedContext,
    max_tokens: usize,
    chars_per_token: usize,
) -> CompressedContext {
    for kind in SectionKind::COMPRESSION_ORDER {
        if ctx.token_count <= max_tokens {
            break;
        }
        let section = ctx.section_mut(kind);
        if section.is_empty() {
            continue;
        }
        *section = compress_section(section);
        ctx.compressed = true;
        ctx.token_count = ctx.estimate_tokens(chars_per_token);
    }
    ctx
}

/// Join the non-empty sections with a blank line, ready for a prompt.
#[must_use]
pub fn format_for_prompt(ctx: &CompressedContext) -> String {
    ctx.sections().collect::<Vec<_>>().join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_up() {
        assert_eq!(estimate_tokens("", 4), 0);
        assert_eq!(estimate_tokens("abcd", 4), 1);
        assert_eq!(estimate_tokens("abcde", 4), 2);
        // Characters, not bytes.
        assert_eq!(estimate_tokens("💥💥💥💥", 4), 1);
    }

    #[test]
    fn section_shrink_rules() {
        let before = "• 🟥 Argued (with Joan of Arc) (3h ago)\n• 🟧 Sparred   yesterday\n• Won 2d ago";
        assert_eq!(compress_section(before), "• 🟥 Argued • 🟧 Sparred recent • Won recent");
        // Minute-level phrases survive outside parentheses.
        assert_eq!(compress_section("ate 5m ago"), "ate 5m ago");
    }

    #[test]
    fn token_count_joins_sections_with_newlines() {
        let ctx = CompressedContext::from_sections(
            "abc".into(),
            String::new(),
            "de".into(),
            String::new(),
            1,
        );
        assert_eq!(ctx.token_count, 6);
        assert_eq!(format_for_prompt(&ctx), "abc\n\nde");
    }

    #[test]
    fn within_budget_is_untouched() {
        let ctx = CompressedContext::from_sections(
            "RECENT (1h ago)".into(),
            String::new(),
            String::new(),
            "DOMAIN (x)".into(),
            4,
        );
        let out = compress_context(ctx.clone(), 100, 4);
        assert_eq!(out, ctx);
        assert!(!out.compressed);
    }

    #[test]
    fn stops_once_within_budget() {
        let domain = format!("DOMAIN {}", "(aside) ".repeat(20));
        let recent = "RECENT (with Merlin) (3h ago)".to_string();
        let ctx = CompressedContext::from_sections(
            recent.clone(),
            "RELATIONSHIPS (keep)".into(),
            String::new(),
            domain,
            4,
        );
        let target = ctx.token_count - 30;
        let out = compress_context(ctx, target, 4);
        assert_eq!(out.domain_specific, "DOMAIN");
        assert_eq!(out.recent_events, recent);
        assert_eq!(out.relationships, "RELATIONSHIPS (keep)");
        assert!(out.token_count <= target);
    }

    #[test]
    fn impossible_budget_returns_best_effort() {
        let ctx = CompressedContext::from_sections(
            "RECENT EVENTS".into(),
            "RELATIONSHIPS".into(),
            "EMOTIONAL STATE".into(),
            "DOMAIN".into(),
            4,
        );
        let out = compress_context(ctx, 1, 4);
        assert!(out.compressed);
        assert!(out.token_count > 1);
        assert_eq!(out.token_count, out.estimate_tokens(4));
    }
}
