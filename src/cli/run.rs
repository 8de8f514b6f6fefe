//! Run command implementation

use super::build_sources;
use crate::aggregator::PriceAggregator;
use crate::config::Config;
use crate::ledger::InMemorySnapshotStore;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the aggregation interval in seconds
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let sources = build_sources(&config.sources);
        anyhow::ensure!(!sources.is_empty(), "no market sources enabled");

        let store = Arc::new(InMemorySnapshotStore::new());
        let aggregator = PriceAggregator::new(
            sources,
            store,
            config.aggregator.pairs.iter().cloned(),
            Duration::from_secs(config.aggregator.fetch_timeout_secs),
        );

        let every =
            Duration::from_secs(self.interval_secs.unwrap_or(config.aggregator.interval_secs));
        tokio::select! {
            _ = aggregator.run(every) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
            }
        }
        Ok(())
    }
}
