//! Ledger store contracts
//!
//! Abstract persistence ports for wallets, trade audit records and
//! price snapshots, plus in-memory implementations. Real persistence
//! is an external collaborator; anything that satisfies these traits
//! (a SQL schema with a version column, say) plugs in unchanged.

mod memory;
mod types;

pub use memory::{InMemoryLedger, InMemorySnapshotStore};
pub use types::{
    TradeStatus, TradeTransaction, TradeType, TransactionId, UserId, Wallet, WalletId,
    WalletUpdate,
};

use crate::aggregator::PriceSnapshot;
use async_trait::async_trait;
use thiserror::Error;

/// Ledger store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The wallet changed since it was read
    #[error("version conflict on wallet {wallet_id}: expected {expected}, found {actual}")]
    VersionConflict {
        wallet_id: WalletId,
        expected: u64,
        actual: u64,
    },
    /// A live wallet already exists for this (user, currency)
    #[error("wallet already exists for user {user_id} currency {currency}")]
    DuplicateWallet { user_id: UserId, currency: String },
    /// Referenced wallet does not exist
    #[error("wallet {0} not found")]
    WalletMissing(WalletId),
    /// Backend failure unrelated to the data itself
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the failed operation can succeed on a clean re-read.
    ///
    /// Covers the optimistic-concurrency races: a stale version, or two
    /// writers auto-creating the same wallet.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. } | StoreError::DuplicateWallet { .. }
        )
    }
}

/// Durable, versioned wallet records plus the append-only trade audit
/// trail.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Look up the live wallet for (user, currency)
    async fn find_wallet(
        &self,
        user_id: UserId,
        currency: &str,
    ) -> Result<Option<Wallet>, StoreError>;

    /// Create a zero-balance wallet at version 0.
    ///
    /// Fails with [`StoreError::DuplicateWallet`] if one already exists
    /// for the (user, currency) pair.
    async fn create_wallet(&self, user_id: UserId, currency: &str) -> Result<Wallet, StoreError>;

    /// Apply two conditional balance writes, both or neither.
    ///
    /// Writes are issued in the order given; the caller decides that
    /// order. Each write only applies while its wallet is still at the
    /// expected version, otherwise the whole pair fails with
    /// [`StoreError::VersionConflict`] and nothing is changed.
    async fn update_wallet_pair(
        &self,
        first: WalletUpdate,
        second: WalletUpdate,
    ) -> Result<(Wallet, Wallet), StoreError>;

    /// Append one immutable trade audit record
    async fn append_transaction(
        &self,
        transaction: TradeTransaction,
    ) -> Result<TradeTransaction, StoreError>;

    /// All wallets owned by a user
    async fn wallets_by_user(&self, user_id: UserId) -> Result<Vec<Wallet>, StoreError>;

    /// A user's trade history, newest first
    async fn transactions_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TradeTransaction>, StoreError>;
}

/// Price snapshot persistence: batch writes from the aggregator,
/// latest-by-pair reads for pricing.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist one cycle's snapshots as a batch
    async fn save_batch(&self, snapshots: Vec<PriceSnapshot>) -> Result<(), StoreError>;

    /// The most recent snapshot for a pair, by `created_at`
    async fn latest_for_pair(&self, pair: &str) -> Result<Option<PriceSnapshot>, StoreError>;
}
