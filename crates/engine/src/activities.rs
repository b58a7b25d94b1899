//! Activity primitives.
//!
//! An `Activity` is a single plannable item within a city stop. It carries a
//! planned cost fixed at creation time and, once the traveler logs real
//! spend, an authoritative actual cost. The two are tracked independently:
//! an activity with no logged spend contributes zero to actual totals, not
//! its planned cost.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    Sightseeing,
    Food,
    Transport,
    Stay,
    Other,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sightseeing => "Sightseeing",
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Stay => "Stay",
            Self::Other => "Other",
        }
    }

    /// Lenient mapping for labels coming from suggestion payloads: the
    /// service returns free text, so anything unrecognized lands in `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "sightseeing" => Self::Sightseeing,
            "food" => Self::Food,
            "transport" => Self::Transport,
            "stay" => Self::Stay,
            _ => Self::Other,
        }
    }
}

impl TryFrom<&str> for ActivityKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sightseeing" => Ok(Self::Sightseeing),
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "stay" => Ok(Self::Stay),
            "other" => Ok(Self::Other),
            other => Err(EngineError::validation(
                "type",
                format!("invalid activity type: {other}"),
            )),
        }
    }
}

impl core::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub kind: ActivityKind,
    /// Planned cost, fixed when the activity enters the itinerary.
    pub cost: Money,
    /// Logged spend. Absent until the traveler records it; once set it is
    /// the authoritative spent amount for this activity.
    pub actual_cost: Option<Money>,
    /// Free-text duration label ("2 hours", "Full day", ...).
    pub duration: String,
    /// Optional scheduled time label ("09:00 AM").
    pub time: Option<String>,
}

impl Activity {
    pub fn new(
        id: String,
        name: String,
        kind: ActivityKind,
        cost: Money,
        duration: String,
        time: Option<String>,
    ) -> ResultEngine<Self> {
        if name.trim().is_empty() {
            return Err(EngineError::validation("name", "activity name is empty"));
        }
        if cost.is_negative() {
            return Err(EngineError::validation("cost", "cost must be >= 0"));
        }
        Ok(Self {
            id,
            name,
            kind,
            cost,
            actual_cost: None,
            duration,
            time,
        })
    }

    /// Records the real amount spent on this activity, replacing any
    /// previously logged value.
    pub fn log_spend(&mut self, amount: Money) -> ResultEngine<()> {
        if amount.is_negative() {
            return Err(EngineError::validation(
                "actual_cost",
                "spent amount must be >= 0",
            ));
        }
        self.actual_cost = Some(amount);
        Ok(())
    }
}
