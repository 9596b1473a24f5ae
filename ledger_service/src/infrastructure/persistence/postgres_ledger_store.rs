use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::entities::{Transaction, Wallet};
use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerStore;
use crate::domain::types::{IdempotencyKey, TxnId, UserId};
use crate::infrastructure::persistence::models::TransactionModel;

pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHARGE_IMMEDIATE: &str = r#"
WITH upserted_wallet AS (
    INSERT INTO wallets (user_id, total_balance, available_balance)
    VALUES ($1, $2, $2)
    ON CONFLICT (user_id) DO UPDATE
    SET total_balance = wallets.total_balance + EXCLUDED.total_balance,
        available_balance = wallets.available_balance + EXCLUDED.total_balance,
        updated_at = NOW()
    RETURNING id AS wallet_id, user_id
),
inserted_txn AS (
    INSERT INTO transactions
        (id, wallet_id, user_id, type, status, amount, release_time, released, idempotency_key)
    SELECT $5, wallet_id, user_id, 'credit', 'success', $2, $3, TRUE, $4
    FROM upserted_wallet
    RETURNING id
)
SELECT id FROM inserted_txn;
"#;

const CHARGE_DEFERRED: &str = r#"
WITH upserted_wallet AS (
    INSERT INTO wallets (user_id, total_balance, available_balance)
    VALUES ($1, $2, 0)
    ON CONFLICT (user_id) DO UPDATE
    SET total_balance = wallets.total_balance + EXCLUDED.total_balance,
        updated_at = NOW()
    RETURNING id AS wallet_id, user_id
),
inserted_txn AS (
    INSERT INTO transactions
        (id, wallet_id, user_id, type, status, amount, release_time, released, idempotency_key)
    SELECT $5, wallet_id, user_id, 'credit', 'blocked', $2, $3, FALSE, $4
    FROM upserted_wallet
    RETURNING id
)
SELECT id FROM inserted_txn;
"#;

const DEBIT_WITH_RELEASE: &str = r#"
WITH updated_wallet AS (
    UPDATE wallets
    SET available_balance = available_balance - $2,
        updated_at = NOW()
    WHERE user_id = $1 AND available_balance >= $2
    RETURNING id, user_id
),
inserted_txn AS (
    INSERT INTO transactions
        (id, wallet_id, user_id, type, status, amount, release_time, released, idempotency_key)
    SELECT $5, updated_wallet.id, updated_wallet.user_id, 'debit', 'blocked', $2 * -1, $3, FALSE, $4
    FROM updated_wallet
    RETURNING id
)
SELECT id FROM inserted_txn;
"#;

const RELEASE_DUE: &str = r#"
WITH due AS (
    SELECT id
    FROM transactions
    WHERE status = 'blocked' AND type = 'credit' AND released = FALSE AND release_time <= NOW()
    ORDER BY release_time ASC
    LIMIT $1
    FOR UPDATE SKIP LOCKED
),
released AS (
    UPDATE transactions
    SET status = 'success', released = TRUE, updated_at = NOW()
    FROM due
    WHERE transactions.id = due.id
    RETURNING transactions.*
),
credited AS (
    UPDATE wallets
    SET available_balance = wallets.available_balance + released.amount,
        updated_at = NOW()
    FROM released
    WHERE wallets.user_id = released.user_id
)
SELECT * FROM released;
"#;

const PENDING_DEBITS: &str = r#"
SELECT *
FROM transactions
WHERE type = 'debit' AND status = 'blocked' AND released = FALSE
ORDER BY created_at ASC
LIMIT $1
FOR UPDATE SKIP LOCKED
"#;

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn charge(
        &self,
        user_id: UserId,
        idempotency_key: IdempotencyKey,
        amount: i64,
        release_time: Option<DateTime<Utc>>,
    ) -> Result<TxnId, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::Invalid(
                "charge amount must be positive".into(),
            ));
        }
        if let Some(t) = release_time {
            if t <= Utc::now() {
                return Err(LedgerError::Invalid(
                    "release time must be in the future".into(),
                ));
            }
        }

        let query = if release_time.is_none() {
            CHARGE_IMMEDIATE
        } else {
            CHARGE_DEFERRED
        };
        let new_id = TxnId::new();

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(amount)
            .bind(release_time)
            .bind(idempotency_key)
            .bind(new_id)
            .fetch_one(&self.pool)
            .await?;

        let id: TxnId = row.try_get("id")?;
        Ok(id)
    }

    async fn debit(
        &self,
        user_id: UserId,
        idempotency_key: IdempotencyKey,
        amount: i64,
        release_time: DateTime<Utc>,
    ) -> Result<TxnId, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::Invalid("debit amount must be positive".into()));
        }
        if release_time <= Utc::now() {
            return Err(LedgerError::Invalid(
                "release time must be in the future".into(),
            ));
        }

        let new_id = TxnId::new();

        let row = sqlx::query(DEBIT_WITH_RELEASE)
            .bind(user_id)
            .bind(amount)
            .bind(release_time)
            .bind(idempotency_key)
            .bind(new_id)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or(LedgerError::InsufficientFunds)?;
        let id: TxnId = row.try_get("id")?;
        Ok(id)
    }

    async fn release_due(&self, batch_size: i64) -> Result<Vec<Transaction>, LedgerError> {
        let rows = sqlx::query_as::<_, TransactionModel>(RELEASE_DUE)
            .bind(batch_size)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn get_pending_debits(&self, limit: i64) -> Result<Vec<Transaction>, LedgerError> {
        let rows = sqlx::query_as::<_, TransactionModel>(PENDING_DEBITS)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn settle_debit_success(
        &self,
        txn_id: TxnId,
        bank_txn_id: &str,
    ) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("UPDATE transactions SET status = 'success', released = TRUE, bank_txn_id = $2, updated_at = NOW() WHERE id = $1 RETURNING user_id, amount")
            .bind(txn_id)
            .bind(bank_txn_id)
            .fetch_one(&mut *tx)
            .await?;

        let user_id: UserId = row.try_get("user_id")?;
        let amount: i64 = row.try_get("amount")?;

        sqlx::query(
            "UPDATE wallets SET total_balance = total_balance - $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(amount.abs())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn settle_debit_failure(&self, txn_id: TxnId) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "UPDATE transactions SET status = 'failed', updated_at = NOW() WHERE id = $1 RETURNING user_id, amount",
        )
        .bind(txn_id)
        .fetch_one(&mut *tx)
        .await?;

        let user_id: UserId = row.try_get("user_id")?;
        let amount: i64 = row.try_get("amount")?;

        sqlx::query(
            "UPDATE wallets SET available_balance = available_balance + $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(amount.abs())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn increment_retry(&self, txn_id: TxnId) -> Result<(), LedgerError> {
        sqlx::query("UPDATE transactions SET retry_count = retry_count + 1, updated_at = NOW() WHERE id = $1")
            .bind(txn_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_balance(&self, user_id: UserId) -> Result<Wallet, LedgerError> {
        let row = sqlx::query_as::<_, crate::infrastructure::persistence::models::WalletModel>(
            "SELECT user_id, total_balance, available_balance, updated_at FROM wallets WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Wallet::from).unwrap_or_else(|| Wallet::empty(user_id)))
    }

    async fn list_transactions(
        &self,
        user_id: UserId,
        cursor: Option<TxnId>,
        limit: i64,
    ) -> Result<(Vec<Transaction>, Option<TxnId>), LedgerError> {
        let limit = limit.clamp(1, 30);

        let rows = match cursor {
            Some(cursor) => {
                sqlx::query_as::<_, TransactionModel>(
                    "SELECT * FROM transactions WHERE user_id = $1 AND id < $2 ORDER BY id DESC LIMIT $3",
                )
                .bind(user_id)
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TransactionModel>(
                    "SELECT * FROM transactions WHERE user_id = $1 ORDER BY id DESC LIMIT $2",
                )
                .bind(user_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let next_cursor = if rows.len() as i64 == limit {
            rows.last().map(|r| r.id)
        } else {
            None
        };

        let transactions = rows.into_iter().map(Transaction::from).collect();
        Ok((transactions, next_cursor))
    }
}
