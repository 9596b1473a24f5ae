use async_trait::async_trait;

use crate::domain::error::LedgerError;
use crate::domain::types::{IdempotencyKey, UserId};

/// External bank connector used by the withdraw worker. Implementations
/// must be safely retryable: a caller that times out and retries with the
/// same `idempotency_key` must not be charged twice on the bank's side.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait BankPort: Send + Sync {
    async fn withdraw(
        &self,
        user_id: UserId,
        idempotency_key: IdempotencyKey,
        amount: i64,
    ) -> Result<String, LedgerError>;
}
