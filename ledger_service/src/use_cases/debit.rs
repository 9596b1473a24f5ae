use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerStore;
use crate::domain::types::{IdempotencyKey, TxnId, UserId};

/// Validates and reserves a debit against a user's available balance.
///
/// Unlike charges, a debit's `release_time` is mandatory: it governs
/// when the withdraw worker is allowed to pick the row up, not when the
/// reservation itself takes effect (that happens immediately).
#[derive(Clone)]
pub struct DebitUseCase {
    store: Arc<dyn LedgerStore>,
}

impl DebitUseCase {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(name = "DebitUseCase::execute", skip(self))]
    pub async fn execute(
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

        self.store
            .debit(user_id, idempotency_key, amount, release_time)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::MockLedgerStore;
    use chrono::Duration;
    use uuid::Uuid;

    fn user() -> UserId {
        UserId(1)
    }

    fn idem() -> IdempotencyKey {
        IdempotencyKey(Uuid::now_v7())
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let store = MockLedgerStore::new();
        let use_case = DebitUseCase::new(Arc::new(store));
        let future = Utc::now() + Duration::minutes(1);

        let result = use_case.execute(user(), idem(), -10, future).await;

        assert!(matches!(result, Err(LedgerError::Invalid(_))));
    }

    #[tokio::test]
    async fn rejects_past_release_time() {
        let store = MockLedgerStore::new();
        let use_case = DebitUseCase::new(Arc::new(store));
        let past = Utc::now() - Duration::minutes(1);

        let result = use_case.execute(user(), idem(), 500, past).await;

        assert!(matches!(result, Err(LedgerError::Invalid(_))));
    }

    #[tokio::test]
    async fn surfaces_insufficient_funds_from_store() {
        let mut store = MockLedgerStore::new();
        store
            .expect_debit()
            .times(1)
            .returning(|_, _, _, _| Err(LedgerError::InsufficientFunds));

        let use_case = DebitUseCase::new(Arc::new(store));
        let future = Utc::now() + Duration::minutes(1);

        let result = use_case.execute(user(), idem(), 500, future).await;

        assert!(matches!(result, Err(LedgerError::InsufficientFunds)));
    }
}
