//! The context compressor: turns store state into token-budgeted prompt text.
//!
//! Read-only over the store. One instance can serve any number of threads.

use std::sync::Arc;

use tracing::debug;

use chronicle_core::{
    CharacterMemory, ChatDomain, ChronicleConfig, ChronicleCounters, ContextSettings,
    EventCategory, EventFilter, EventStore, TimeRange,
};

use crate::compress::{self, CompressedContext};
use crate::config::ContextConfig;
use crate::digest;
use crate::domain;
use crate::financial::{self, FinancialPatterns};
use crate::format::time_ago;
use crate::names::CharacterNames;
use crate::sections::{self, Sources};

/// Builds domain-specific prompt context from an [`EventStore`].
#[derive(Debug, Clone)]
pub struct ContextCompressor {
    store: Arc<EventStore>,
    names: CharacterNames,
    settings: ContextSettings,
}

impl ContextCompressor {
    /// A compressor over `store` with the built-in roster and default limits.
    #[must_use]
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            store,
            names: CharacterNames::builtin(),
            settings: ContextSettings::default(),
        }
    }

    /// A compressor using the `[context]` section of `config`.
    #[must_use]
    pub fn from_config(store: Arc<EventStore>, config: &ChronicleConfig) -> Self {
        Self::new(store).with_settings(config.context.clone())
    }

    /// Replace the name table.
    #[must_use]
    pub fn with_names(mut self, names: CharacterNames) -> Self {
        self.names = names;
        self
    }

    /// Replace the rendering limits.
    #[must_use]
    pub fn with_settings(mut self, settings: ContextSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    fn sources(&self) -> Sources<'_> {
        Sources {
            store: &self.store,
            names: &self.names,
            settings: &self.settings,
            now: self.store.now(),
        }
    }

    // -----------------------------------------------------------------------
    // General algorithm
    // -----------------------------------------------------------------------

    /// Render every enabled section without compressing.
    #[must_use]
    pub fn generate_sections(&self, character: &str, config: &ContextConfig) -> CompressedContext {
        let src = self.sources();
        CompressedContext::from_sections(
            config
                .include_recent_events
                .then(|| sections::recent_events(&src, character, config))
                .unwrap_or_default(),
            config
                .include_relationships
                .then(|| sections::relationships(&src, character))
                .unwrap_or_default(),
            config
                .include_emotional_state
                .then(|| sections::emotional_state(&src, character))
                .unwrap_or_default(),
            config
                .include_domain_specific
                .then(|| domain::summarize(&src, character, config.domain_focus))
                .unwrap_or_default(),
            self.settings.chars_per_token,
        )
    }

    /// Render the enabled sections and shrink them if they exceed
    /// `config.max_tokens`. The result may still be over budget.
    #[must_use]
    pub fn generate_compressed_context(
        &self,
        character: &str,
        config: &ContextConfig,
    ) -> CompressedContext {
        let counters = self.store.counters();
        ChronicleCounters::bump(&counters.contexts_generated);

        let raw = self.generate_sections(character, config);
        if raw.token_count <= config.max_tokens {
            return raw;
        }

        let before = raw.token_count;
        let ctx = compress::compress_context(raw, config.max_tokens, self.settings.chars_per_token);
        ChronicleCounters::bump(&counters.compressions_applied);
        debug!(
            character = %character,
            domain = %config.domain_focus,
            before,
            after = ctx.token_count,
            max_tokens = config.max_tokens,
            "context compressed"
        );
        ctx
    }

    /// Join the non-empty sections of `ctx` for a prompt.
    #[must_use]
    pub fn format_for_prompt(&self, ctx: &CompressedContext) -> String {
        compress::format_for_prompt(ctx)
    }

    /// Generate and format in one step.
    #[must_use]
    pub fn get_comprehensive_context(&self, character: &str, config: &ContextConfig) -> String {
        self.format_for_prompt(&self.generate_compressed_context(character, config))
    }

    // -----------------------------------------------------------------------
    // Per-domain wrappers
    // -----------------------------------------------------------------------

    /// Performance coaching context.
    #[must_use]
    pub fn get_performance_context(&self, character: &str) -> String {
        self.get_comprehensive_context(character, &ContextConfig::performance())
    }

    /// Equipment advice context.
    #[must_use]
    pub fn get_equipment_context(&self, character: &str) -> String {
        self.get_comprehensive_context(character, &ContextConfig::equipment())
    }

    /// Skills advice context.
    #[must_use]
    pub fn get_skills_context(&self, character: &str) -> String {
        self.get_comprehensive_context(character, &ContextConfig::skills())
    }

    /// Abilities advice context.
    #[must_use]
    pub fn get_abilities_context(&self, character: &str) -> String {
        self.get_comprehensive_context(character, &ContextConfig::abilities())
    }

    /// Therapy context.
    #[must_use]
    pub fn get_therapy_context(&self, character: &str) -> String {
        self.get_comprehensive_context(character, &ContextConfig::therapy())
    }

    /// Social lounge context.
    #[must_use]
    pub fn get_social_context(&self, character: &str) -> String {
        self.get_comprehensive_context(character, &ContextConfig::social())
    }

    /// Financial advisory context: decision history and recent money events
    /// ahead of the general context. Empty when the character has no money
    /// history at all.
    #[must_use]
    pub fn get_financial_context(&self, character: &str) -> String {
        let prefix = financial::history_prefix(&self.sources(), character);
        if prefix.is_empty() {
            return prefix;
        }
        prefix + &self.get_comprehensive_context(character, &ContextConfig::financial())
    }

    /// Team battle chat context: the last day's battles ahead of the
    /// performance context.
    #[must_use]
    pub fn get_team_battle_context(&self, character: &str) -> String {
        let now = self.store.now();
        let battles = self.store.get_event_history(
            character,
            &EventFilter::new()
                .with_categories([EventCategory::Battle])
                .within(TimeRange::OneDay)
                .limit(3),
        );

        let mut out = String::new();
        if !battles.is_empty() {
            let lines: Vec<String> = battles
                .iter()
                .map(|e| {
                    let name = e.event_type.as_str();
                    let result = if name.contains("victory") {
                        "victory"
                    } else if name.contains("defeat") {
                        "defeat"
                    } else {
                        "participation"
                    };
                    format!(
                        "• Recent {result}: {} ({})",
                        e.description,
                        time_ago(now, e.timestamp)
                    )
                })
                .collect();
            out.push_str("RECENT BATTLE HISTORY:\n");
            out.push_str(&lines.join("\n"));
            out.push_str("\n\n");
        }
        out + &self.get_comprehensive_context(character, &ContextConfig::team_battle())
    }

    /// Patterns across the character's recent money decisions.
    #[must_use]
    pub fn get_financial_patterns(&self, character: &str) -> FinancialPatterns {
        financial::patterns(&self.sources(), character)
    }

    // -----------------------------------------------------------------------
    // Memory digests
    // -----------------------------------------------------------------------

    /// Embarrassing, secret or intense memories for the confessional.
    #[must_use]
    pub fn get_confessional_context(&self, character: &str) -> String {
        digest::confessional(&self.sources(), character)
    }

    /// Household tension for the kitchen table.
    #[must_use]
    pub fn get_kitchen_context(&self, character: &str) -> String {
        digest::kitchen(&self.sources(), character)
    }

    /// Team dynamics for group activities.
    #[must_use]
    pub fn get_group_activities_context(&self, character: &str) -> String {
        digest::group_activities(&self.sources(), character)
    }

    /// Struggles and therapy progress for the personal problems chat.
    #[must_use]
    pub fn get_personal_problems_context(&self, character: &str) -> String {
        digest::personal_problems(&self.sources(), character)
    }

    /// Progress and setbacks for the training grounds.
    #[must_use]
    pub fn get_training_context(&self, character: &str) -> String {
        digest::training(&self.sources(), character)
    }

    /// Privacy and space issues for the real estate office.
    #[must_use]
    pub fn get_real_estate_context(&self, character: &str) -> String {
        digest::real_estate(&self.sources(), character)
    }

    /// Memories a comedy-reference engine may bring up in `domain`.
    #[must_use]
    pub fn cross_reference_candidates(
        &self,
        character: &str,
        domain: ChatDomain,
        limit: usize,
    ) -> Vec<CharacterMemory> {
        digest::cross_reference_candidates(&self.sources(), character, domain, limit)
    }
}
