use std::sync::Arc;

use crate::domain::entities::Transaction;
use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerStore;
use crate::domain::types::{TxnId, UserId};

const DEFAULT_LIMIT: i64 = 10;

/// Thin query handler returning a cursor-paginated page of a user's
/// transaction history, newest first.
#[derive(Clone)]
pub struct ListTransactionsUseCase {
    store: Arc<dyn LedgerStore>,
}

impl ListTransactionsUseCase {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(name = "ListTransactionsUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        user_id: UserId,
        cursor: Option<TxnId>,
        limit: Option<i64>,
    ) -> Result<(Vec<Transaction>, Option<TxnId>), LedgerError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 30);
        self.store.list_transactions(user_id, cursor, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::MockLedgerStore;

    #[tokio::test]
    async fn defaults_limit_when_absent() {
        let mut store = MockLedgerStore::new();
        store
            .expect_list_transactions()
            .withf(|_, _, limit| *limit == DEFAULT_LIMIT)
            .times(1)
            .returning(|_, _, _| Ok((vec![], None)));

        let use_case = ListTransactionsUseCase::new(Arc::new(store));
        let result = use_case.execute(UserId(1), None, None).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn clamps_limit_above_max() {
        let mut store = MockLedgerStore::new();
        store
            .expect_list_transactions()
            .withf(|_, _, limit| *limit == 30)
            .times(1)
            .returning(|_, _, _| Ok((vec![], None)));

        let use_case = ListTransactionsUseCase::new(Arc::new(store));
        let result = use_case.execute(UserId(1), None, Some(1000)).await;

        assert!(result.is_ok());
    }
}
