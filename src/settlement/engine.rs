//! Trade settlement engine
//!
//! Executes one trade request as a single consistent balance
//! transition: price the trade, verify the debit balance, write both
//! wallets conditionally on their captured versions, append one audit
//! record. Version conflicts restart the whole sequence (the price may
//! have moved) up to a bounded number of retries.

use super::{TradeError, TradeRequest};
use crate::config::TradingConfig;
use crate::ledger::{
    LedgerStore, TradeStatus, TradeTransaction, TradeType, UserId, Wallet, WalletUpdate,
};
use crate::pricing::PriceReader;
use crate::symbol::TradingPair;
use crate::telemetry::{increment, CounterMetric};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Settles trades against the ledger at freshly read aggregated prices
pub struct SettlementEngine {
    ledger: Arc<dyn LedgerStore>,
    prices: PriceReader,
    config: TradingConfig,
}

impl SettlementEngine {
    /// Create an engine over the given ledger and price reader
    pub fn new(ledger: Arc<dyn LedgerStore>, prices: PriceReader, config: TradingConfig) -> Self {
        Self {
            ledger,
            prices,
            config,
        }
    }

    /// Execute one trade, retrying version conflicts with backoff.
    ///
    /// Either every effect commits (two wallet writes plus one audit
    /// record) or none does. A conflict that survives the retry budget
    /// surfaces as [`TradeError::Contention`].
    pub async fn trade(&self, request: TradeRequest) -> Result<TradeTransaction, TradeError> {
        let pair = TradingPair::parse(&request.symbol, &self.config.quote_currency)
            .ok_or_else(|| TradeError::UnsupportedSymbol(request.symbol.clone()))?;
        let quantity = request.quantity.round_dp_with_strategy(
            self.config.max_quantity_scale,
            RoundingStrategy::MidpointAwayFromZero,
        );
        if quantity <= Decimal::ZERO {
            return Err(TradeError::InvalidQuantity(request.quantity));
        }

        let mut conflicts: u32 = 0;
        loop {
            match self.settle_once(&request, &pair, quantity).await {
                Err(TradeError::Store(error)) if error.is_retryable() => {
                    conflicts += 1;
                    increment(CounterMetric::TradeConflicts);
                    if conflicts > self.config.max_conflict_retries {
                        increment(CounterMetric::TradeFailures);
                        tracing::warn!(
                            user_id = %request.user_id,
                            symbol = %pair.symbol(),
                            conflicts,
                            "trade abandoned after repeated conflicts"
                        );
                        return Err(TradeError::Contention {
                            attempts: conflicts,
                        });
                    }
                    let backoff =
                        Duration::from_millis(self.config.retry_backoff_ms << (conflicts - 1));
                    tracing::debug!(
                        user_id = %request.user_id,
                        symbol = %pair.symbol(),
                        attempt = conflicts,
                        backoff_ms = backoff.as_millis() as u64,
                        "settlement conflict, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                other => return other,
            }
        }
    }

    /// One settlement attempt against freshly read price and wallets
    async fn settle_once(
        &self,
        request: &TradeRequest,
        pair: &TradingPair,
        quantity: Decimal,
    ) -> Result<TradeTransaction, TradeError> {
        let price = self
            .prices
            .best_price(pair.symbol(), request.trade_type)
            .await?;
        let total_quote = price * quantity;

        // BUY spends quote and receives base; SELL the reverse
        let (debit_currency, credit_currency, debit_amount, credit_amount) =
            match request.trade_type {
                TradeType::Buy => (pair.quote(), pair.base(), total_quote, quantity),
                TradeType::Sell => (pair.base(), pair.quote(), quantity, total_quote),
            };

        let debit = self.resolve_wallet(request.user_id, debit_currency).await?;
        let credit = self
            .resolve_wallet(request.user_id, credit_currency)
            .await?;

        if debit.balance < debit_amount {
            return Err(TradeError::InsufficientBalance {
                currency: debit.currency,
            });
        }

        let debit_update = WalletUpdate {
            wallet_id: debit.id,
            expected_version: debit.version,
            new_balance: debit.balance - debit_amount,
        };
        let credit_update = WalletUpdate {
            wallet_id: credit.id,
            expected_version: credit.version,
            new_balance: credit.balance + credit_amount,
        };

        // Fixed write order by wallet id, independent of debit/credit
        // role, so two opposing trades on the same pair cannot deadlock
        let (first, second) = if debit.id <= credit.id {
            (debit_update, credit_update)
        } else {
            (credit_update, debit_update)
        };
        self.ledger.update_wallet_pair(first, second).await?;

        let transaction = self
            .ledger
            .append_transaction(TradeTransaction {
                id: Uuid::new_v4(),
                user_id: request.user_id,
                symbol: pair.symbol().to_string(),
                trade_type: request.trade_type,
                quantity,
                price,
                total_amount: total_quote,
                status: TradeStatus::Completed,
                created_at: Utc::now(),
            })
            .await?;

        increment(CounterMetric::TradesSettled);
        tracing::info!(
            user_id = %request.user_id,
            symbol = %pair.symbol(),
            trade_type = ?request.trade_type,
            %quantity,
            %price,
            "trade settled"
        );
        Ok(transaction)
    }

    /// Find the user's wallet for a currency, auto-creating it at zero
    /// balance when the policy allows
    async fn resolve_wallet(&self, user_id: UserId, currency: &str) -> Result<Wallet, TradeError> {
        if let Some(wallet) = self.ledger.find_wallet(user_id, currency).await? {
            return Ok(wallet);
        }
        if !self.config.auto_create_wallets {
            return Err(TradeError::WalletNotFound {
                currency: currency.to_string(),
            });
        }
        tracing::info!(%user_id, currency, "auto-creating wallet");
        Ok(self.ledger.create_wallet(user_id, currency).await?)
    }
}
