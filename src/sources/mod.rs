//! Market data sources
//!
//! REST book-ticker providers feeding the price aggregator. A source
//! that errors or returns garbage contributes nothing for the cycle;
//! it never fails the caller.

mod binance;
mod huobi;
mod types;

pub use binance::BinanceSource;
pub use huobi::HuobiSource;
pub use types::TickerQuote;

use async_trait::async_trait;
use std::collections::HashSet;

/// Trait for market data source implementations
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Stable source identifier recorded in snapshot provenance
    fn name(&self) -> &str;

    /// Fetch book tickers for the requested pairs.
    ///
    /// Errors are swallowed at this boundary: a failing source logs the
    /// problem and returns an empty contribution for the cycle.
    async fn fetch(&self, pairs: &HashSet<String>) -> Vec<TickerQuote>;
}
