//! In-memory store implementations
//!
//! Thread-safe map-backed stores used by tests and the CLI. The pair
//! update runs under one write lock, which gives the same both-or-
//! neither guarantee a SQL implementation gets from a transaction.

use super::{
    LedgerStore, SnapshotStore, StoreError, TradeTransaction, UserId, Wallet, WalletId,
    WalletUpdate,
};
use crate::aggregator::PriceSnapshot;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory wallet and transaction store
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    wallets: Arc<RwLock<HashMap<WalletId, Wallet>>>,
    transactions: Arc<RwLock<Vec<TradeTransaction>>>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a wallet with a starting balance, for seeding tests and
    /// demo runs
    pub async fn seed_wallet(&self, user_id: UserId, currency: &str, balance: Decimal) -> Wallet {
        let now = Utc::now();
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id,
            currency: currency.to_uppercase(),
            balance,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        let mut wallets = self.wallets.write().await;
        wallets.insert(wallet.id, wallet.clone());
        wallet
    }

    /// Number of audit records appended so far
    pub async fn transaction_count(&self) -> usize {
        self.transactions.read().await.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn find_wallet(
        &self,
        user_id: UserId,
        currency: &str,
    ) -> Result<Option<Wallet>, StoreError> {
        let wallets = self.wallets.read().await;
        Ok(wallets
            .values()
            .find(|w| w.user_id == user_id && w.currency.eq_ignore_ascii_case(currency))
            .cloned())
    }

    async fn create_wallet(&self, user_id: UserId, currency: &str) -> Result<Wallet, StoreError> {
        let mut wallets = self.wallets.write().await;
        if wallets
            .values()
            .any(|w| w.user_id == user_id && w.currency.eq_ignore_ascii_case(currency))
        {
            return Err(StoreError::DuplicateWallet {
                user_id,
                currency: currency.to_string(),
            });
        }

        let now = Utc::now();
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id,
            currency: currency.to_uppercase(),
            balance: Decimal::ZERO,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    async fn update_wallet_pair(
        &self,
        first: WalletUpdate,
        second: WalletUpdate,
    ) -> Result<(Wallet, Wallet), StoreError> {
        let mut wallets = self.wallets.write().await;

        // Verify both versions before touching either balance
        for update in [&first, &second] {
            let current = wallets
                .get(&update.wallet_id)
                .ok_or(StoreError::WalletMissing(update.wallet_id))?;
            if current.version != update.expected_version {
                return Err(StoreError::VersionConflict {
                    wallet_id: update.wallet_id,
                    expected: update.expected_version,
                    actual: current.version,
                });
            }
        }

        let now = Utc::now();
        let mut apply = |update: &WalletUpdate| -> Result<Wallet, StoreError> {
            let wallet = wallets
                .get_mut(&update.wallet_id)
                .ok_or(StoreError::WalletMissing(update.wallet_id))?;
            wallet.balance = update.new_balance;
            wallet.version += 1;
            wallet.updated_at = now;
            Ok(wallet.clone())
        };
        let updated_first = apply(&first)?;
        let updated_second = apply(&second)?;
        Ok((updated_first, updated_second))
    }

    async fn append_transaction(
        &self,
        transaction: TradeTransaction,
    ) -> Result<TradeTransaction, StoreError> {
        let mut transactions = self.transactions.write().await;
        transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn wallets_by_user(&self, user_id: UserId) -> Result<Vec<Wallet>, StoreError> {
        let wallets = self.wallets.read().await;
        let mut owned: Vec<Wallet> = wallets
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.currency.cmp(&b.currency));
        Ok(owned)
    }

    async fn transactions_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TradeTransaction>, StoreError> {
        let transactions = self.transactions.read().await;
        let mut history: Vec<TradeTransaction> = transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(history)
    }
}

/// In-memory price snapshot store; retains history, latest wins
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Arc<RwLock<Vec<PriceSnapshot>>>,
}

impl InMemorySnapshotStore {
    /// Create an empty snapshot store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total snapshots retained, across all pairs
    pub async fn count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save_batch(&self, batch: Vec<PriceSnapshot>) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.extend(batch);
        Ok(())
    }

    async fn latest_for_pair(&self, pair: &str) -> Result<Option<PriceSnapshot>, StoreError> {
        let snapshots = self.snapshots.read().await;
        let mut latest: Option<&PriceSnapshot> = None;
        for snapshot in snapshots.iter() {
            if !snapshot.pair.eq_ignore_ascii_case(pair) {
                continue;
            }
            // >= so the last-committed snapshot wins a created_at tie
            if latest.map_or(true, |l| snapshot.created_at >= l.created_at) {
                latest = Some(snapshot);
            }
        }
        Ok(latest.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Provenance;
    use crate::ledger::{TradeStatus, TradeType};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn snapshot(pair: &str, bid: Decimal, ask: Decimal, age_secs: i64) -> PriceSnapshot {
        PriceSnapshot {
            pair: pair.to_string(),
            best_bid_price: bid,
            best_ask_price: ask,
            provenance: Provenance::new(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn transaction(user_id: UserId, age_secs: i64) -> TradeTransaction {
        TradeTransaction {
            id: Uuid::new_v4(),
            user_id,
            symbol: "ETHUSDT".to_string(),
            trade_type: TradeType::Buy,
            quantity: dec!(1.0),
            price: dec!(2000.00),
            total_amount: dec!(2000.00),
            status: TradeStatus::Completed,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_wallet() {
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();

        let created = ledger.create_wallet(user_id, "USDT").await.unwrap();
        assert_eq!(created.balance, Decimal::ZERO);
        assert_eq!(created.version, 0);

        let found = ledger.find_wallet(user_id, "USDT").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(ledger.find_wallet(user_id, "ETH").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_wallet_rejected() {
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();

        ledger.create_wallet(user_id, "USDT").await.unwrap();
        let result = ledger.create_wallet(user_id, "USDT").await;
        assert!(matches!(result, Err(StoreError::DuplicateWallet { .. })));
    }

    #[tokio::test]
    async fn test_update_pair_bumps_versions() {
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();
        let usdt = ledger.seed_wallet(user_id, "USDT", dec!(5000.00)).await;
        let eth = ledger.seed_wallet(user_id, "ETH", dec!(0)).await;

        let (updated_usdt, updated_eth) = ledger
            .update_wallet_pair(
                WalletUpdate {
                    wallet_id: usdt.id,
                    expected_version: 0,
                    new_balance: dec!(3000.00),
                },
                WalletUpdate {
                    wallet_id: eth.id,
                    expected_version: 0,
                    new_balance: dec!(1.0),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated_usdt.balance, dec!(3000.00));
        assert_eq!(updated_usdt.version, 1);
        assert_eq!(updated_eth.balance, dec!(1.0));
        assert_eq!(updated_eth.version, 1);
    }

    #[tokio::test]
    async fn test_update_pair_stale_version_changes_nothing() {
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();
        let usdt = ledger.seed_wallet(user_id, "USDT", dec!(5000.00)).await;
        let eth = ledger.seed_wallet(user_id, "ETH", dec!(0)).await;

        let result = ledger
            .update_wallet_pair(
                WalletUpdate {
                    wallet_id: usdt.id,
                    expected_version: 0,
                    new_balance: dec!(3000.00),
                },
                WalletUpdate {
                    wallet_id: eth.id,
                    expected_version: 7,
                    new_balance: dec!(1.0),
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

        // Neither wallet moved
        let usdt_after = ledger.find_wallet(user_id, "USDT").await.unwrap().unwrap();
        let eth_after = ledger.find_wallet(user_id, "ETH").await.unwrap().unwrap();
        assert_eq!(usdt_after.balance, dec!(5000.00));
        assert_eq!(usdt_after.version, 0);
        assert_eq!(eth_after.balance, dec!(0));
    }

    #[tokio::test]
    async fn test_update_pair_missing_wallet() {
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();
        let usdt = ledger.seed_wallet(user_id, "USDT", dec!(100)).await;

        let result = ledger
            .update_wallet_pair(
                WalletUpdate {
                    wallet_id: usdt.id,
                    expected_version: 0,
                    new_balance: dec!(50),
                },
                WalletUpdate {
                    wallet_id: Uuid::new_v4(),
                    expected_version: 0,
                    new_balance: dec!(1),
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::WalletMissing(_))));
    }

    #[tokio::test]
    async fn test_transactions_by_user_newest_first() {
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        ledger.append_transaction(transaction(user_id, 30)).await.unwrap();
        ledger.append_transaction(transaction(user_id, 10)).await.unwrap();
        ledger.append_transaction(transaction(other, 5)).await.unwrap();

        let history = ledger.transactions_by_user(user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].created_at > history[1].created_at);
    }

    #[tokio::test]
    async fn test_wallets_by_user_sorted_by_currency() {
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();
        ledger.seed_wallet(user_id, "USDT", dec!(10)).await;
        ledger.seed_wallet(user_id, "BTC", dec!(1)).await;
        ledger.seed_wallet(user_id, "ETH", dec!(2)).await;

        let wallets = ledger.wallets_by_user(user_id).await.unwrap();
        let currencies: Vec<&str> = wallets.iter().map(|w| w.currency.as_str()).collect();
        assert_eq!(currencies, vec!["BTC", "ETH", "USDT"]);
    }

    #[tokio::test]
    async fn test_latest_snapshot_by_recency() {
        let store = InMemorySnapshotStore::new();
        store
            .save_batch(vec![
                snapshot("ETHUSDT", dec!(1990.00), dec!(2010.00), 60),
                snapshot("ETHUSDT", dec!(1995.00), dec!(2005.00), 5),
                snapshot("BTCUSDT", dec!(60000.00), dec!(60050.00), 5),
            ])
            .await
            .unwrap();

        let latest = store.latest_for_pair("ETHUSDT").await.unwrap().unwrap();
        assert_eq!(latest.best_bid_price, dec!(1995.00));
        assert_eq!(store.count().await, 3);
    }

    #[tokio::test]
    async fn test_latest_snapshot_tie_takes_last_committed() {
        let store = InMemorySnapshotStore::new();
        let created_at = Utc::now();
        let mut earlier = snapshot("ETHUSDT", dec!(1990.00), dec!(2010.00), 0);
        earlier.created_at = created_at;
        let mut later = snapshot("ETHUSDT", dec!(1995.00), dec!(2005.00), 0);
        later.created_at = created_at;

        store.save_batch(vec![earlier]).await.unwrap();
        store.save_batch(vec![later]).await.unwrap();

        let latest = store.latest_for_pair("ETHUSDT").await.unwrap().unwrap();
        assert_eq!(latest.best_bid_price, dec!(1995.00));
    }

    #[tokio::test]
    async fn test_latest_snapshot_unknown_pair() {
        let store = InMemorySnapshotStore::new();
        assert!(store.latest_for_pair("ETHUSDT").await.unwrap().is_none());
    }
}
