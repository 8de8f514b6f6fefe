//! Price aggregation engine
//!
//! Merges book tickers from every registered market data source into a
//! single best-bid/best-ask snapshot per trading pair, with provenance
//! for the winning quotes.

mod engine;
mod types;

pub use engine::PriceAggregator;
pub use types::{PriceSnapshot, Provenance, ProvenanceParseError, QuoteSide, SourceContribution};
