//! Configuration for the chronicle event store and context compressor.
//!
//! Maps directly to `chronicle.toml`. Every field has a default, so a partial
//! file (or an empty one) is valid.

use serde::{Deserialize, Serialize};

use crate::memory::MemoryType;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChronicleConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Event store and derivation settings.
    #[serde(default)]
    pub store: StoreSettings,
    /// Context generation settings.
    #[serde(default)]
    pub context: ContextSettings,
}

impl ChronicleConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ChronicleError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::ChronicleError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of the human format.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// Memory and relationship derivation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Minimum event importance that produces a memory.
    #[serde(default = "default_6")]
    pub memory_threshold: u8,
    /// Memory types that are remembered regardless of importance.
    #[serde(default = "default_always_memorable")]
    pub always_memorable: Vec<MemoryType>,
    /// Memory types that also produce memories for secondary characters.
    #[serde(default = "default_bidirectional")]
    pub bidirectional_memory_types: Vec<MemoryType>,
    /// Number of recent net relationship changes used for trajectory.
    #[serde(default = "default_5_usize")]
    pub trajectory_window: usize,
    /// Importance subtracted from memories given to secondary characters.
    #[serde(default = "default_2")]
    pub secondary_importance_penalty: u8,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            memory_threshold: 6,
            always_memorable: default_always_memorable(),
            bidirectional_memory_types: default_bidirectional(),
            trajectory_window: 5,
            secondary_importance_penalty: 2,
        }
    }
}

impl StoreSettings {
    /// Whether `memory_type` bypasses the importance threshold.
    #[must_use]
    pub fn is_always_memorable(&self, memory_type: MemoryType) -> bool {
        self.always_memorable.contains(&memory_type)
    }

    /// Whether `memory_type` is shared with secondary characters.
    #[must_use]
    pub fn is_bidirectional(&self, memory_type: MemoryType) -> bool {
        self.bidirectional_memory_types.contains(&memory_type)
    }
}

/// Rendering limits used by the context compressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSettings {
    /// Characters per estimated token.
    #[serde(default = "default_4_usize")]
    pub chars_per_token: usize,
    /// Events shown in the recent-events section.
    #[serde(default = "default_5_usize")]
    pub recent_events_limit: usize,
    /// Other characters named per event line.
    #[serde(default = "default_2_usize")]
    pub max_named_participants: usize,
    /// Memories read for the emotional-state section.
    #[serde(default = "default_5_usize")]
    pub emotional_memory_limit: usize,
    /// Minimum memory importance for the emotional-state section.
    #[serde(default = "default_6")]
    pub emotional_importance_floor: u8,
    /// Allies rendered.
    #[serde(default = "default_3_usize")]
    pub max_allies: usize,
    /// Rivals rendered.
    #[serde(default = "default_2_usize")]
    pub max_rivals: usize,
    /// Trust or affection above this makes an ally.
    #[serde(default = "default_20")]
    pub ally_threshold: i32,
    /// Rivalry above this makes a rival.
    #[serde(default = "default_30")]
    pub rival_rivalry_threshold: i32,
    /// Trust below this makes a rival.
    #[serde(default = "default_minus_20")]
    pub rival_trust_threshold: i32,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            chars_per_token: 4,
            recent_events_limit: 5,
            max_named_participants: 2,
            emotional_memory_limit: 5,
            emotional_importance_floor: 6,
            max_allies: 3,
            max_rivals: 2,
            ally_threshold: 20,
            rival_rivalry_threshold: 30,
            rival_trust_threshold: -20,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".to_string()
}
fn default_always_memorable() -> Vec<MemoryType> {
    vec![MemoryType::Therapy, MemoryType::Financial, MemoryType::Conflict]
}
fn default_bidirectional() -> Vec<MemoryType> {
    vec![
        MemoryType::Conflict,
        MemoryType::Social,
        MemoryType::Bonding,
        MemoryType::Drama,
        MemoryType::GroupActivity,
    ]
}
fn default_2() -> u8 {
    2
}
fn default_6() -> u8 {
    6
}
fn default_2_usize() -> usize {
    2
}
fn default_3_usize() -> usize {
    3
}
fn default_4_usize() -> usize {
    4
}
fn default_5_usize() -> usize {
    5
}
fn default_20() -> i32 {
    20
}
fn default_30() -> i32 {
    30
}
fn default_minus_20() -> i32 {
    -20
}
