//! Trade settlement types

use crate::ledger::{StoreError, TradeType, UserId};
use crate::pricing::PriceError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated trade request.
///
/// Structural validation (non-null fields, known trade type) happens
/// upstream; the user id is resolved by the authentication layer and
/// passed in explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub user_id: UserId,
    /// Trading pair (e.g. "ETHUSDT")
    pub symbol: String,
    pub trade_type: TradeType,
    /// Base-currency quantity, > 0
    pub quantity: Decimal,
}

/// Trade settlement errors
#[derive(Debug, Error)]
pub enum TradeError {
    #[error(transparent)]
    Price(#[from] PriceError),

    /// The symbol does not decompose against the configured quote
    /// currency
    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    /// Quantity must be positive
    #[error("invalid quantity: {0}")]
    InvalidQuantity(Decimal),

    /// Required wallet missing and auto-creation is disabled
    #[error("wallet not found for currency {currency} and auto-creation is disabled")]
    WalletNotFound { currency: String },

    /// Debit wallet cannot cover the trade
    #[error("insufficient {currency} balance")]
    InsufficientBalance { currency: String },

    /// Version conflicts persisted past the retry budget; the request
    /// as a whole may be retried
    #[error("trade abandoned after {attempts} conflicting attempts")]
    Contention { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
