//! CLI interface for coinflow
//!
//! Provides subcommands for:
//! - `run`: Start the price aggregation daemon
//! - `price`: Aggregate once and print a pair's snapshot
//! - `config`: Show the effective configuration

mod price;
mod run;

pub use price::PriceArgs;
pub use run::RunArgs;

use crate::config::SourcesConfig;
use crate::sources::{BinanceSource, HuobiSource, MarketSource};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "coinflow")]
#[command(about = "Price aggregation and trade settlement core for a crypto exchange backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the price aggregation daemon
    Run(RunArgs),
    /// Aggregate once and print a pair's snapshot
    Price(PriceArgs),
    /// Show the effective configuration
    Config,
}

/// Instantiate every enabled market source
pub(crate) fn build_sources(config: &SourcesConfig) -> Vec<Arc<dyn MarketSource>> {
    let mut sources: Vec<Arc<dyn MarketSource>> = Vec::new();
    if config.binance.enabled {
        sources.push(Arc::new(BinanceSource::new(config.binance.url.clone())));
    }
    if config.huobi.enabled {
        sources.push(Arc::new(HuobiSource::new(config.huobi.url.clone())));
    }
    sources
}
