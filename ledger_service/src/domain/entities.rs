use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{IdempotencyKey, TxnId, UserId};

/// A user's wallet. Created lazily by the first successful charge.
///
/// `available_balance` is always `<= total_balance`: a charge with a
/// future release time increases `total_balance` but not
/// `available_balance` until the release worker promotes it, and a debit
/// reserves from `available_balance` immediately while leaving
/// `total_balance` untouched until the withdraw worker settles it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: UserId,
    pub total_balance: i64,
    pub available_balance: i64,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// The zero-valued wallet returned for a user with no transaction history.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            total_balance: 0,
            available_balance: 0,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
pub enum TransactionStatus {
    Blocked,
    Success,
    Failed,
    /// Reserved for future manual-cancellation tooling; no operation in
    /// this crate transitions a row into this state yet.
    Canceled,
}

/// A single ledger entry. Rows are append-mostly: after insert, only
/// `status`, `released`, `retry_count`, `bank_txn_id` and `updated_at`
/// are ever mutated, and only by the ledger store's own SQL flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxnId,
    pub user_id: UserId,
    pub kind: TransactionType,
    pub status: TransactionStatus,
    /// Signed, in the smallest currency unit: positive for credits,
    /// negative for debits.
    pub amount: i64,
    pub release_time: Option<DateTime<Utc>>,
    pub released: bool,
    pub idempotency_key: IdempotencyKey,
    pub retry_count: i32,
    pub bank_txn_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Absolute value of `amount`, i.e. the magnitude a caller or bank
    /// would recognize regardless of the entry's sign convention.
    pub fn magnitude(&self) -> i64 {
        self.amount.abs()
    }
}

/// A page of a user's transaction history, returned by `list_transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub next_cursor: Option<TxnId>,
}
