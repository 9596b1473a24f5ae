use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::{Transaction, TransactionStatus, TransactionType, Wallet};
use crate::domain::types::{IdempotencyKey, TxnId, UserId};

/// Row shape of the `wallets` table. `id` is the surrogate primary key;
/// the domain entity is keyed by `user_id` alone since callers never
/// need the surrogate.
#[derive(Debug, FromRow)]
pub struct WalletModel {
    pub user_id: UserId,
    pub total_balance: i64,
    pub available_balance: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<WalletModel> for Wallet {
    fn from(m: WalletModel) -> Self {
        Self {
            user_id: m.user_id,
            total_balance: m.total_balance,
            available_balance: m.available_balance,
            updated_at: m.updated_at,
        }
    }
}

/// Row shape of the `transactions` table.
#[derive(Debug, FromRow)]
pub struct TransactionModel {
    pub id: TxnId,
    pub user_id: UserId,
    #[sqlx(rename = "type")]
    pub kind: TransactionType,
    pub status: TransactionStatus,
    pub amount: i64,
    pub release_time: Option<DateTime<Utc>>,
    pub released: bool,
    pub idempotency_key: IdempotencyKey,
    pub retry_count: i32,
    pub bank_txn_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionModel> for Transaction {
    fn from(m: TransactionModel) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            kind: m.kind,
            status: m.status,
            amount: m.amount,
            release_time: m.release_time,
            released: m.released,
            idempotency_key: m.idempotency_key,
            retry_count: m.retry_count,
            bank_txn_id: m.bank_txn_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
