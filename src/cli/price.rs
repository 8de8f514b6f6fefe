//! Price command implementation

use super::build_sources;
use crate::aggregator::PriceAggregator;
use crate::config::Config;
use crate::ledger::{InMemorySnapshotStore, SnapshotStore};
use crate::pricing::PriceReader;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Trading pair symbol, e.g. ETHUSDT
    pub pair: String,
}

impl PriceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let sources = build_sources(&config.sources);
        anyhow::ensure!(!sources.is_empty(), "no market sources enabled");

        let pair = self.pair.trim().to_uppercase();
        let store: Arc<dyn SnapshotStore> = Arc::new(InMemorySnapshotStore::new());
        let aggregator = PriceAggregator::new(
            sources,
            Arc::clone(&store),
            [pair.clone()],
            Duration::from_secs(config.aggregator.fetch_timeout_secs),
        );
        aggregator.aggregate().await?;

        let reader = PriceReader::new(
            store,
            chrono::Duration::seconds(config.trading.stale_price_threshold_secs as i64),
        );
        let snapshot = reader.latest(&pair).await?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }
}
