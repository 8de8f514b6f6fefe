//! Market data source types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single book-ticker quote from one source
///
/// Ephemeral: produced per fetch cycle and consumed by the aggregator,
/// never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerQuote {
    /// Trading symbol (e.g. "ETHUSDT")
    pub symbol: String,
    /// Highest price the source will buy at, if quoted
    pub bid_price: Option<Decimal>,
    /// Lowest price the source will sell at, if quoted
    pub ask_price: Option<Decimal>,
    /// Source identifier (e.g. "BINANCE")
    pub source: String,
}
