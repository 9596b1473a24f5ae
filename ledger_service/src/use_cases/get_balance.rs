use std::sync::Arc;

use crate::domain::entities::Wallet;
use crate::domain::error::LedgerError;
use crate::domain::repository::LedgerStore;
use crate::domain::types::UserId;

/// Thin query handler returning a user's current wallet balances.
#[derive(Clone)]
pub struct GetBalanceUseCase {
    store: Arc<dyn LedgerStore>,
}

impl GetBalanceUseCase {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(name = "GetBalanceUseCase::execute", skip(self))]
    pub async fn execute(&self, user_id: UserId) -> Result<Wallet, LedgerError> {
        self.store.get_balance(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::MockLedgerStore;

    #[tokio::test]
    async fn returns_wallet_from_store() {
        let mut store = MockLedgerStore::new();
        let user_id = UserId(42);
        store
            .expect_get_balance()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |id| Ok(Wallet::empty(id)));

        let use_case = GetBalanceUseCase::new(Arc::new(store));
        let wallet = use_case.execute(user_id).await.unwrap();

        assert_eq!(wallet.user_id, user_id);
        assert_eq!(wallet.total_balance, 0);
    }
}
