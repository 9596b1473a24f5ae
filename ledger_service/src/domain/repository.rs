use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Transaction, Wallet};
use crate::domain::error::LedgerError;
use crate::domain::types::{IdempotencyKey, TxnId, UserId};

/// Sole writer of wallet and transaction rows. Every mutating method is a
/// single atomic SQL statement combining the wallet balance change and the
/// transaction insert/update, so callers never need their own transaction.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait LedgerStore: Send + Sync {
    async fn charge(
        &self,
        user_id: UserId,
        idempotency_key: IdempotencyKey,
        amount: i64,
        release_time: Option<DateTime<Utc>>,
    ) -> Result<TxnId, LedgerError>;

    async fn debit(
        &self,
        user_id: UserId,
        idempotency_key: IdempotencyKey,
        amount: i64,
        release_time: DateTime<Utc>,
    ) -> Result<TxnId, LedgerError>;

    async fn release_due(&self, batch_size: i64) -> Result<Vec<Transaction>, LedgerError>;

    async fn get_pending_debits(&self, limit: i64) -> Result<Vec<Transaction>, LedgerError>;

    async fn settle_debit_success(
        &self,
        txn_id: TxnId,
        bank_txn_id: &str,
    ) -> Result<(), LedgerError>;

    async fn settle_debit_failure(&self, txn_id: TxnId) -> Result<(), LedgerError>;

    async fn increment_retry(&self, txn_id: TxnId) -> Result<(), LedgerError>;

    async fn get_balance(&self, user_id: UserId) -> Result<Wallet, LedgerError>;

    async fn list_transactions(
        &self,
        user_id: UserId,
        cursor: Option<TxnId>,
        limit: i64,
    ) -> Result<(Vec<Transaction>, Option<TxnId>), LedgerError>;
}
