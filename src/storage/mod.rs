mod booking_ledger;
mod flight_store;
pub mod format;

pub use booking_ledger::*;
pub use flight_store::*;

use serde::{Deserialize, Serialize};

/// On-disk layout of the booking ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerFormat {
    /// `AA100 - New York: 12A | SERVICES:F2,D4,C0 | COST:$11.50`.
    /// Bookings are identified by their position only.
    #[default]
    Text,
    /// One JSON object per line, each with a stable id.
    Jsonl,
}

impl LedgerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerFormat::Text => "text",
            LedgerFormat::Jsonl => "jsonl",
        }
    }

    /// Whether records in this format carry a stable booking id.
    pub fn stores_ids(&self) -> bool {
        matches!(self, LedgerFormat::Jsonl)
    }
}

impl std::fmt::Display for LedgerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LedgerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LedgerFormat::Text),
            "jsonl" | "json-lines" => Ok(LedgerFormat::Jsonl),
            other => Err(format!(
                "unknown ledger format '{}' (expected 'text' or 'jsonl')",
                other
            )),
        }
    }
}
