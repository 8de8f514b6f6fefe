//! Configuration types for coinflow

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price aggregation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Supported trading pairs, e.g. ["ETHUSDT", "BTCUSDT"]
    pub pairs: Vec<String>,

    /// Seconds between aggregation cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-source fetch timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_interval_secs() -> u64 {
    10
}
fn default_fetch_timeout_secs() -> u64 {
    5
}

/// Market data source endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_binance")]
    pub binance: SourceConfig,
    #[serde(default = "default_huobi")]
    pub huobi: SourceConfig,
}

/// A single source endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub url: String,
}

fn default_true() -> bool {
    true
}

fn default_binance() -> SourceConfig {
    SourceConfig {
        enabled: true,
        url: "https://api.binance.com/api/v3/ticker/bookTicker".to_string(),
    }
}

fn default_huobi() -> SourceConfig {
    SourceConfig {
        enabled: true,
        url: "https://api.huobi.pro/market/tickers".to_string(),
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            binance: default_binance(),
            huobi: default_huobi(),
        }
    }
}

/// Trade settlement configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Quote currency every supported pair trades against
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    /// Maximum age for a trade price. The aggregator runs every 10s,
    /// so 15s gives a 5s buffer.
    #[serde(default = "default_stale_price_threshold_secs")]
    pub stale_price_threshold_secs: u64,

    /// Create missing wallets with zero balance instead of rejecting
    #[serde(default)]
    pub auto_create_wallets: bool,

    /// How many version conflicts to retry before giving up
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Base backoff between conflict retries (doubles per attempt)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum fractional digits accepted on trade quantities
    #[serde(default = "default_max_quantity_scale")]
    pub max_quantity_scale: u32,
}

fn default_quote_currency() -> String {
    "USDT".to_string()
}
fn default_stale_price_threshold_secs() -> u64 {
    15
}
fn default_max_conflict_retries() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    100
}
fn default_max_quantity_scale() -> u32 {
    8
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            quote_currency: default_quote_currency(),
            stale_price_threshold_secs: 15,
            auto_create_wallets: false,
            max_conflict_retries: 3,
            retry_backoff_ms: 100,
            max_quantity_scale: 8,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus listener port; no exporter is started when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
