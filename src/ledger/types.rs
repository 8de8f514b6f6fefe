//! Wallet and trade audit data model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identifier
pub type UserId = Uuid;

/// Wallet identifier
pub type WalletId = Uuid;

/// Trade transaction identifier
pub type TransactionId = Uuid;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

/// Outcome recorded on an audit row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Completed,
    Failed,
}

/// A user's balance in one currency.
///
/// The sole source of truth for balances. `version` is bumped on every
/// committed update and guards conditional writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub currency: String,
    pub balance: Decimal,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A conditional balance write: applies only while the wallet is still
/// at `expected_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletUpdate {
    pub wallet_id: WalletId,
    pub expected_version: u64,
    pub new_balance: Decimal,
}

/// Write-once audit record of a settled trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    /// Trading pair (e.g. "ETHUSDT"), upper-cased
    pub symbol: String,
    pub trade_type: TradeType,
    /// Base-currency quantity traded
    pub quantity: Decimal,
    /// Execution price per unit of base currency
    pub price: Decimal,
    /// Quote-currency amount spent or received
    pub total_amount: Decimal,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}
