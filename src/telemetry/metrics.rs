//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Aggregation cycles started
    AggregationCycles,
    /// Snapshot batches persisted
    SnapshotsWritten,
    /// Source fetches that errored or timed out
    SourceFetchFailures,
    /// Trades settled successfully
    TradesSettled,
    /// Version conflicts hit during settlement
    TradeConflicts,
    /// Trades abandoned after the retry budget
    TradeFailures,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::AggregationCycles => "coinflow_aggregation_cycles_total",
            CounterMetric::SnapshotsWritten => "coinflow_snapshots_written_total",
            CounterMetric::SourceFetchFailures => "coinflow_source_fetch_failures_total",
            CounterMetric::TradesSettled => "coinflow_trades_settled_total",
            CounterMetric::TradeConflicts => "coinflow_trade_conflicts_total",
            CounterMetric::TradeFailures => "coinflow_trade_failures_total",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Start the Prometheus exporter on the given port
pub fn init_exporter(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(port, "metrics exporter listening");
    Ok(())
}
