//! Runtime counters for the event store and context compressor.
//!
//! Lock-free `AtomicU64` counters owned by each [`EventStore`](crate::EventStore)
//! instance. They are bumped on the hot path and read on export.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters for publish and context activity.
#[derive(Debug)]
pub struct ChronicleCounters {
    /// Events appended to the log.
    pub events_published: AtomicU64,
    /// Drafts rejected as malformed.
    pub drafts_rejected: AtomicU64,
    /// Memories derived from events.
    pub memories_derived: AtomicU64,
    /// Directed relationship records updated.
    pub relationship_updates: AtomicU64,
    /// Derivation passes skipped with a warning.
    pub derivation_warnings: AtomicU64,
    /// Contexts generated by the compressor.
    pub contexts_generated: AtomicU64,
    /// Contexts that needed the compression pass.
    pub compressions_applied: AtomicU64,
}

impl ChronicleCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events_published: AtomicU64::new(0),
            drafts_rejected: AtomicU64::new(0),
            memories_derived: AtomicU64::new(0),
            relationship_updates: AtomicU64::new(0),
            derivation_warnings: AtomicU64::new(0),
            contexts_generated: AtomicU64::new(0),
            compressions_applied: AtomicU64::new(0),
        }
    }

    /// Add `n` to `counter`.
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Add one to `counter`.
    pub fn bump(counter: &AtomicU64) {
        Self::add(counter, 1);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            events_published: self.events_published.load(Ordering::Relaxed),
            drafts_rejected: self.drafts_rejected.load(Ordering::Relaxed),
            memories_derived: self.memories_derived.load(Ordering::Relaxed),
            relationship_updates: self.relationship_updates.load(Ordering::Relaxed),
            derivation_warnings: self.derivation_warnings.load(Ordering::Relaxed),
            contexts_generated: self.contexts_generated.load(Ordering::Relaxed),
            compressions_applied: self.compressions_applied.load(Ordering::Relaxed),
        }
    }
}

impl Default for ChronicleCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Events appended to the log.
    pub events_published: u64,
    /// Drafts rejected as malformed.
    pub drafts_rejected: u64,
    /// Memories derived from events.
    pub memories_derived: u64,
    /// Directed relationship records updated.
    pub relationship_updates: u64,
    /// Derivation passes skipped with a warning.
    pub derivation_warnings: u64,
    /// Contexts generated.
    pub contexts_generated: u64,
    /// Contexts that needed compression.
    pub compressions_applied: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let rows = [
            ("events_published", "Events appended to the log", self.events_published),
            ("drafts_rejected", "Drafts rejected as malformed", self.drafts_rejected),
            ("memories_derived", "Character memories derived", self.memories_derived),
            (
                "relationship_updates",
                "Directed relationship updates",
                self.relationship_updates,
            ),
            (
                "derivation_warnings",
                "Derivation passes skipped",
                self.derivation_warnings,
            ),
            ("contexts_generated", "Contexts generated", self.contexts_generated),
            (
                "compressions_applied",
                "Contexts that needed compression",
                self.compressions_applied,
            ),
        ];

        let mut out = String::new();
        for (name, help, value) in rows {
            out.push_str(&format!(
                "# HELP chronicle_{name}_total {help}\n\
                 # TYPE chronicle_{name}_total counter\n\
                 chronicle_{name}_total {value}\n"
            ));
        }
        out
    }
}
