//! Best-of price aggregation across market data sources

use super::{PriceSnapshot, Provenance, QuoteSide};
use crate::ledger::SnapshotStore;
use crate::sources::{MarketSource, TickerQuote};
use crate::telemetry::{increment, CounterMetric};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Merges quotes from all registered sources into one best-bid/best-ask
/// snapshot per supported pair, once per cycle.
pub struct PriceAggregator {
    sources: Vec<Arc<dyn MarketSource>>,
    store: Arc<dyn SnapshotStore>,
    pairs: HashSet<String>,
    fetch_timeout: Duration,
}

impl PriceAggregator {
    /// Create an aggregator over the given sources and snapshot store
    pub fn new(
        sources: Vec<Arc<dyn MarketSource>>,
        store: Arc<dyn SnapshotStore>,
        pairs: impl IntoIterator<Item = String>,
        fetch_timeout: Duration,
    ) -> Self {
        let pairs = pairs
            .into_iter()
            .map(|p| p.trim().to_uppercase())
            .collect();
        Self {
            sources,
            store,
            pairs,
            fetch_timeout,
        }
    }

    /// Run one aggregation cycle.
    ///
    /// Returns the number of snapshots written. A cycle with no usable
    /// quotes writes nothing and is not an error.
    pub async fn aggregate(&self) -> anyhow::Result<usize> {
        let quotes = self.fetch_all().await;
        let snapshots = self.build_snapshots(quotes);
        if snapshots.is_empty() {
            tracing::warn!("no aggregatable quotes this cycle");
            return Ok(0);
        }

        let attempted: Vec<String> = snapshots.iter().map(|s| s.pair.clone()).collect();
        let count = snapshots.len();
        if let Err(error) = self.store.save_batch(snapshots).await {
            tracing::error!(%error, pairs = ?attempted, "failed to persist aggregated snapshots");
            return Err(error.into());
        }

        increment(CounterMetric::SnapshotsWritten);
        tracing::info!(count, "saved aggregated prices");
        Ok(count)
    }

    /// Periodic aggregation loop. Each cycle stands alone: a failed or
    /// slow cycle never blocks the next beyond the interval delay.
    pub async fn run(&self, every: Duration) {
        tracing::info!(
            interval_secs = every.as_secs(),
            pairs = ?self.pairs,
            "starting price aggregation loop"
        );
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            increment(CounterMetric::AggregationCycles);
            if let Err(error) = self.aggregate().await {
                tracing::warn!(%error, "aggregation cycle failed");
            }
        }
    }

    /// Fetch every source concurrently, each bounded by the fetch
    /// timeout. A timed-out source contributes nothing for the cycle.
    async fn fetch_all(&self) -> Vec<TickerQuote> {
        let fetches = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                match tokio::time::timeout(self.fetch_timeout, source.fetch(&self.pairs)).await {
                    Ok(quotes) => quotes,
                    Err(_) => {
                        increment(CounterMetric::SourceFetchFailures);
                        tracing::warn!(
                            source = source.name(),
                            timeout_secs = self.fetch_timeout.as_secs(),
                            "source fetch timed out"
                        );
                        Vec::new()
                    }
                }
            }
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }

    fn build_snapshots(&self, quotes: Vec<TickerQuote>) -> Vec<PriceSnapshot> {
        let mut by_pair: HashMap<String, Vec<TickerQuote>> = HashMap::new();
        for quote in quotes {
            by_pair
                .entry(quote.symbol.trim().to_uppercase())
                .or_default()
                .push(quote);
        }

        let now = Utc::now();
        let mut snapshots = Vec::new();
        for pair in &self.pairs {
            let Some(pair_quotes) = by_pair.get(pair) else {
                tracing::warn!(pair = %pair, "no price data received");
                continue;
            };
            if let Some(snapshot) = Self::best_of(pair, pair_quotes, now) {
                snapshots.push(snapshot);
            }
        }
        snapshots
    }

    /// Best bid is the maximum over non-null bids, best ask the minimum
    /// over non-null asks; every source matching a winning value lands
    /// in provenance. Pairs missing either side are skipped entirely.
    fn best_of(
        pair: &str,
        quotes: &[TickerQuote],
        created_at: DateTime<Utc>,
    ) -> Option<PriceSnapshot> {
        let mut best_bid: Option<Decimal> = None;
        let mut best_ask: Option<Decimal> = None;
        for quote in quotes {
            if let Some(bid) = quote.bid_price {
                if best_bid.map_or(true, |b| bid > b) {
                    best_bid = Some(bid);
                }
            }
            if let Some(ask) = quote.ask_price {
                if best_ask.map_or(true, |a| ask < a) {
                    best_ask = Some(ask);
                }
            }
        }
        let (best_bid, best_ask) = (best_bid?, best_ask?);

        let mut provenance = Provenance::new();
        for quote in quotes {
            if quote.bid_price == Some(best_bid) {
                provenance.record(&quote.source, QuoteSide::Bid);
            }
            if quote.ask_price == Some(best_ask) {
                provenance.record(&quote.source, QuoteSide::Ask);
            }
        }

        Some(PriceSnapshot {
            pair: pair.to_string(),
            best_bid_price: best_bid,
            best_ask_price: best_ask,
            provenance,
            created_at,
        })
    }
}
