//! Huobi REST market-tickers source

use super::{MarketSource, TickerQuote};
use crate::telemetry::{increment, CounterMetric};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;

const SOURCE: &str = "HUOBI";

/// Envelope of the `/market/tickers` response
#[derive(Debug, Deserialize)]
struct HuobiTickersWrapper {
    #[allow(dead_code)]
    status: Option<String>,
    #[serde(default)]
    data: Vec<HuobiTicker>,
}

/// One ticker in the Huobi envelope; symbols come lower-cased and
/// prices as JSON numbers
#[derive(Debug, Deserialize)]
struct HuobiTicker {
    symbol: String,
    bid: Option<Decimal>,
    ask: Option<Decimal>,
}

/// Huobi market-tickers source
pub struct HuobiSource {
    client: reqwest::Client,
    url: String,
}

impl HuobiSource {
    /// Create a new Huobi source for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn request(&self) -> anyhow::Result<HuobiTickersWrapper> {
        let wrapper = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(wrapper)
    }

    fn to_quotes(wrapper: HuobiTickersWrapper, pairs: &HashSet<String>) -> Vec<TickerQuote> {
        wrapper
            .data
            .into_iter()
            .map(|t| TickerQuote {
                symbol: t.symbol.to_uppercase(),
                bid_price: t.bid,
                ask_price: t.ask,
                source: SOURCE.to_string(),
            })
            .filter(|q| pairs.contains(&q.symbol))
            .collect()
    }
}

#[async_trait]
impl MarketSource for HuobiSource {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self, pairs: &HashSet<String>) -> Vec<TickerQuote> {
        match self.request().await {
            Ok(wrapper) => Self::to_quotes(wrapper, pairs),
            Err(error) => {
                increment(CounterMetric::SourceFetchFailures);
                tracing::warn!(source = SOURCE, %error, "ticker fetch failed");
                Vec::new()
            }
        }
    }
}
