//! coinflow: price aggregation and trade settlement core for a crypto
//! exchange backend
//!
//! This library provides the core components for:
//! - Book-ticker quotes from multiple market data sources (Binance, Huobi)
//! - Per-pair best-bid/best-ask aggregation with provenance tracking
//! - Freshness-gated price reads for trade execution
//! - Versioned wallet ledger contracts with in-memory implementations
//! - Atomic, conflict-retried trade settlement with an audit trail
//! - Structured logging and Prometheus metrics

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod pricing;
pub mod settlement;
pub mod sources;
pub mod symbol;
pub mod telemetry;
