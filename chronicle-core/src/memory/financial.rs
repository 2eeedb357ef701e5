//! Financial metadata carried by money-related memories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::event::{EventType, GameEvent};

/// Kind of money decision behind a financial memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    /// Put money somewhere hoping for a return.
    Investment,
    /// Bought something, including splurges.
    Purchase,
    /// Took or ignored coaching advice.
    Advice,
    /// Money emergency.
    Crisis,
    /// Self-reinforcing bad decisions.
    Spiral,
    /// Money turned around.
    Breakthrough,
    /// Anything else.
    Other,
}

impl DecisionType {
    /// Classify an event type. Follows the wording of the type name.
    #[must_use]
    pub fn from_event_type(event_type: EventType) -> Self {
        let name = event_type.as_str();
        if name.contains("investment") {
            Self::Investment
        } else if name.contains("purchase") || name.contains("splurge") {
            Self::Purchase
        } else if name.contains("advice") || name.contains("trust") {
            Self::Advice
        } else if name.contains("crisis") {
            Self::Crisis
        } else if name.contains("spiral") {
            Self::Spiral
        } else if name.contains("breakthrough") {
            Self::Breakthrough
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Investment => "investment",
            Self::Purchase => "purchase",
            Self::Advice => "advice",
            Self::Crisis => "crisis",
            Self::Spiral => "spiral",
            Self::Breakthrough => "breakthrough",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// How a money decision turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialOutcome {
    /// Worked out.
    Success,
    /// Went badly.
    Failure,
    /// Not known yet.
    Pending,
}

impl fmt::Display for FinancialOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Pending => "pending",
        })
    }
}

impl FromStr for FinancialOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown financial outcome: '{other}'")),
        }
    }
}

/// Money details attached to a financial memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetadata {
    /// What kind of decision it was.
    pub decision_type: DecisionType,
    /// Amount of money involved.
    pub amount_involved: f64,
    /// How it turned out.
    pub outcome: FinancialOutcome,
    /// Change in financial stress.
    pub stress_impact: i32,
    /// Change in trust towards the coach.
    pub trust_impact: i32,
}

impl FinancialMetadata {
    /// Build from a financial event.
    ///
    /// The outcome comes from the event metadata when present, otherwise from
    /// the event type, otherwise it is pending.
    #[must_use]
    pub fn from_event(event: &GameEvent) -> Self {
        let outcome = event.metadata.outcome().unwrap_or(match event.event_type {
            EventType::FinancialBreakthrough
            | EventType::TrustGained
            | EventType::FinancialSpiralBroken => FinancialOutcome::Success,
            EventType::FinancialCrisis
            | EventType::FinancialSpiralStarted
            | EventType::TrustLost => FinancialOutcome::Failure,
            _ => FinancialOutcome::Pending,
        });

        Self {
            decision_type: DecisionType::from_event_type(event.event_type),
            amount_involved: event.metadata.amount(),
            outcome,
            stress_impact: event.metadata.stress_change(),
            trust_impact: event.metadata.trust_change(),
        }
    }
}
