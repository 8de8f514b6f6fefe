//! Freshness-gated price reads
//!
//! Settlement must never execute against an old price, so every read
//! re-checks the snapshot's age against the staleness bound. Nothing
//! here is cached.

use crate::aggregator::PriceSnapshot;
use crate::ledger::{SnapshotStore, StoreError, TradeType};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Price read errors
#[derive(Debug, Error)]
pub enum PriceError {
    /// No snapshot exists for the pair; the pair is not tradable
    #[error("price not found for {pair}")]
    NotFound { pair: String },
    /// A snapshot exists but is older than the freshness bound
    #[error("price for {pair} is stale ({age_secs}s old, limit {limit_secs}s)")]
    Stale {
        pair: String,
        age_secs: i64,
        limit_secs: i64,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reads the latest aggregated price for a pair and enforces the
/// staleness bound before it may price a trade.
#[derive(Clone)]
pub struct PriceReader {
    store: Arc<dyn SnapshotStore>,
    stale_after: Duration,
}

impl PriceReader {
    /// Create a reader with the given staleness bound
    pub fn new(store: Arc<dyn SnapshotStore>, stale_after: Duration) -> Self {
        Self { store, stale_after }
    }

    /// The latest snapshot for a pair, regardless of age.
    ///
    /// For display only; trades must go through [`Self::best_price`].
    pub async fn latest(&self, pair: &str) -> Result<PriceSnapshot, PriceError> {
        let pair = pair.trim().to_uppercase();
        self.store
            .latest_for_pair(&pair)
            .await?
            .ok_or(PriceError::NotFound { pair })
    }

    /// The tradable price for a pair: ask for a BUY, bid for a SELL.
    ///
    /// Re-evaluates freshness on every call.
    pub async fn best_price(
        &self,
        pair: &str,
        trade_type: TradeType,
    ) -> Result<Decimal, PriceError> {
        let snapshot = self.latest(pair).await?;

        let age = Utc::now() - snapshot.created_at;
        if age > self.stale_after {
            return Err(PriceError::Stale {
                pair: snapshot.pair,
                age_secs: age.num_seconds(),
                limit_secs: self.stale_after.num_seconds(),
            });
        }

        Ok(match trade_type {
            TradeType::Buy => snapshot.best_ask_price,
            TradeType::Sell => snapshot.best_bid_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Provenance;
    use crate::ledger::InMemorySnapshotStore;
    use rust_decimal_macros::dec;

    const THRESHOLD_SECS: i64 = 15;

    fn snapshot(age_secs: i64) -> PriceSnapshot {
        PriceSnapshot {
            pair: "ETHUSDT".to_string(),
            best_bid_price: dec!(2000.00),
            best_ask_price: dec!(2001.00),
            provenance: Provenance::new(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    async fn reader_with(snapshots: Vec<PriceSnapshot>) -> PriceReader {
        let store = Arc::new(InMemorySnapshotStore::new());
        store.save_batch(snapshots).await.unwrap();
        PriceReader::new(store, Duration::seconds(THRESHOLD_SECS))
    }

    #[tokio::test]
    async fn test_buy_takes_ask_sell_takes_bid() {
        let reader = reader_with(vec![snapshot(0)]).await;

        let ask = reader.best_price("ETHUSDT", TradeType::Buy).await.unwrap();
        assert_eq!(ask, dec!(2001.00));

        let bid = reader.best_price("ETHUSDT", TradeType::Sell).await.unwrap();
        assert_eq!(bid, dec!(2000.00));
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_not_found() {
        let reader = reader_with(vec![]).await;

        let result = reader.best_price("ETHUSDT", TradeType::Buy).await;
        assert!(matches!(result, Err(PriceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_snapshot_just_inside_threshold_is_fresh() {
        let reader = reader_with(vec![snapshot(THRESHOLD_SECS - 1)]).await;
        assert!(reader.best_price("ETHUSDT", TradeType::Buy).await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_past_threshold_is_stale() {
        let reader = reader_with(vec![snapshot(THRESHOLD_SECS + 1)]).await;

        let result = reader.best_price("ETHUSDT", TradeType::Buy).await;
        match result {
            Err(PriceError::Stale {
                pair,
                age_secs,
                limit_secs,
            }) => {
                assert_eq!(pair, "ETHUSDT");
                assert!(age_secs > limit_secs);
            }
            other => panic!("expected stale price, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pair_normalized_before_lookup() {
        let reader = reader_with(vec![snapshot(0)]).await;
        assert!(reader.best_price(" ethusdt ", TradeType::Buy).await.is_ok());
    }

    #[tokio::test]
    async fn test_latest_ignores_staleness() {
        let reader = reader_with(vec![snapshot(THRESHOLD_SECS + 100)]).await;
        let latest = reader.latest("ETHUSDT").await.unwrap();
        assert_eq!(latest.best_bid_price, dec!(2000.00));
    }
}
