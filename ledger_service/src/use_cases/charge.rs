use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerStore;
use crate::domain::types::{IdempotencyKey, TxnId, UserId};

/// Validates and posts a credit to a user's wallet.
///
/// Charges with no `release_time` post immediately as `success`; charges
/// with a future `release_time` post as `blocked` and are later promoted
/// by the release worker.
#[derive(Clone)]
pub struct ChargeUseCase {
    store: Arc<dyn LedgerStore>,
}

impl ChargeUseCase {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(name = "ChargeUseCase::execute", skip(self))]
    pub async fn execute(
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

        self.store
            .charge(user_id, idempotency_key, amount, release_time)
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
        let use_case = ChargeUseCase::new(Arc::new(store));

        let result = use_case.execute(user(), idem(), 0, None).await;

        assert!(matches!(result, Err(LedgerError::Invalid(_))));
    }

    #[tokio::test]
    async fn rejects_past_release_time() {
        let store = MockLedgerStore::new();
        let use_case = ChargeUseCase::new(Arc::new(store));
        let past = Utc::now() - Duration::seconds(5);

        let result = use_case.execute(user(), idem(), 100, Some(past)).await;

        assert!(matches!(result, Err(LedgerError::Invalid(_))));
    }

    #[tokio::test]
    async fn forwards_valid_immediate_charge_to_store() {
        let mut store = MockLedgerStore::new();
        let expected_id = TxnId::new();
        store
            .expect_charge()
            .withf(|_, _, amount, release_time| *amount == 1000 && release_time.is_none())
            .times(1)
            .returning(move |_, _, _, _| Ok(expected_id));

        let use_case = ChargeUseCase::new(Arc::new(store));
        let result = use_case.execute(user(), idem(), 1000, None).await;

        assert!(result.is_ok());
    }
}
