//! Binance REST book-ticker source

use super::{MarketSource, TickerQuote};
use crate::telemetry::{increment, CounterMetric};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;

const SOURCE: &str = "BINANCE";

/// One entry of the `/api/v3/ticker/bookTicker` response
#[derive(Debug, Deserialize)]
struct BinanceBookTicker {
    symbol: String,
    #[serde(rename = "bidPrice")]
    bid_price: String,
    #[serde(rename = "bidQty")]
    #[allow(dead_code)]
    bid_qty: String,
    #[serde(rename = "askPrice")]
    ask_price: String,
    #[serde(rename = "askQty")]
    #[allow(dead_code)]
    ask_qty: String,
}

/// Binance book-ticker source
pub struct BinanceSource {
    client: reqwest::Client,
    url: String,
}

impl BinanceSource {
    /// Create a new Binance source for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn request(&self) -> anyhow::Result<Vec<BinanceBookTicker>> {
        let tickers = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(tickers)
    }

    /// Convert raw tickers into quotes for the supported pairs.
    ///
    /// Binance quotes prices as strings; an unparsable side becomes a
    /// missing side rather than dropping the whole ticker.
    fn to_quotes(tickers: Vec<BinanceBookTicker>, pairs: &HashSet<String>) -> Vec<TickerQuote> {
        tickers
            .into_iter()
            .filter(|t| pairs.contains(&t.symbol))
            .map(|t| TickerQuote {
                bid_price: Decimal::from_str(&t.bid_price).ok(),
                ask_price: Decimal::from_str(&t.ask_price).ok(),
                symbol: t.symbol,
                source: SOURCE.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl MarketSource for BinanceSource {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self, pairs: &HashSet<String>) -> Vec<TickerQuote> {
        match self.request().await {
            Ok(tickers) => Self::to_quotes(tickers, pairs),
            Err(error) => {
                increment(CounterMetric::SourceFetchFailures);
                tracing::error!(source = SOURCE, %error, "ticker fetch failed");
                Vec::new()
            }
        }
    }
}
