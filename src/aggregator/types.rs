//! Aggregated price snapshot types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which side of the book a source won
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QuoteSide {
    Bid,
    Ask,
}

impl QuoteSide {
    fn tag(self) -> &'static str {
        match self {
            QuoteSide::Bid => "BID",
            QuoteSide::Ask => "ASK",
        }
    }
}

/// One (source, side) contribution to a snapshot's winning prices
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceContribution {
    pub source: String,
    pub side: QuoteSide,
}

impl fmt::Display for SourceContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.source, self.side.tag())
    }
}

/// Unparsable provenance token
#[derive(Debug, Error)]
#[error("invalid provenance token: {0}")]
pub struct ProvenanceParseError(String);

/// The set of sources whose quotes match a snapshot's winning bid/ask.
///
/// Ties include every matching source. Serialized at the boundary as
/// `SOURCE_BID`/`SOURCE_ASK` tokens joined by `|`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    entries: BTreeSet<SourceContribution>,
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a winning contribution
    pub fn record(&mut self, source: &str, side: QuoteSide) {
        self.entries.insert(SourceContribution {
            source: source.to_string(),
            side,
        });
    }

    pub fn contains(&self, source: &str, side: QuoteSide) -> bool {
        self.entries
            .iter()
            .any(|e| e.source == source && e.side == side)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceContribution> {
        self.entries.iter()
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.entries {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{entry}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Provenance {
    type Err = ProvenanceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = BTreeSet::new();
        for token in s.split('|').filter(|t| !t.is_empty()) {
            let contribution = if let Some(source) = token.strip_suffix("_BID") {
                SourceContribution {
                    source: source.to_string(),
                    side: QuoteSide::Bid,
                }
            } else if let Some(source) = token.strip_suffix("_ASK") {
                SourceContribution {
                    source: source.to_string(),
                    side: QuoteSide::Ask,
                }
            } else {
                return Err(ProvenanceParseError(token.to_string()));
            };
            entries.insert(contribution);
        }
        Ok(Self { entries })
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Provenance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Best bid/ask for one pair from one aggregation cycle
///
/// Only written when the cycle produced both sides; history is retained
/// and the most recent `created_at` wins for trading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Trading pair (e.g. "ETHUSDT")
    pub pair: String,
    /// Highest bid across contributing sources
    pub best_bid_price: Decimal,
    /// Lowest ask across contributing sources
    pub best_ask_price: Decimal,
    /// Which source(s) produced the winning prices
    pub provenance: Provenance,
    /// When this snapshot was aggregated
    pub created_at: DateTime<Utc>,
}
