use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::domain::repository::LedgerStore;

const RELEASE_CALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Periodically promotes due blocked credits to available balance.
///
/// Runs `worker_count` independent ticker loops against the same store;
/// safety under concurrent execution comes entirely from the store's
/// skip-locked selector, not from any in-process coordination here.
pub struct ReleaseWorker {
    store: Arc<dyn LedgerStore>,
    interval: Duration,
    batch_size: i64,
    worker_count: usize,
}

impl ReleaseWorker {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        interval: Duration,
        batch_size: i64,
        worker_count: usize,
    ) -> Self {
        Self {
            store,
            interval,
            batch_size,
            worker_count,
        }
    }

    /// Spawns the configured number of loops and returns a handle that
    /// stops them all when dropped or when `stop` is sent.
    pub fn start(self: Arc<Self>) -> watch::Sender<bool> {
        let (stop_tx, stop_rx) = watch::channel(false);

        for id in 0..self.worker_count {
            let worker = self.clone();
            let mut stop_rx = stop_rx.clone();
            tokio::spawn(async move {
                worker.worker_loop(id, &mut stop_rx).await;
            });
        }

        stop_tx
    }

    async fn worker_loop(&self, id: usize, stop: &mut watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        tracing::info!(worker = id, "release worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.release(id).await;
                }
                _ = stop.changed() => {
                    tracing::info!(worker = id, "release worker stopped");
                    return;
                }
            }
        }
    }

    async fn release(&self, id: usize) {
        let result = timeout(RELEASE_CALL_TIMEOUT, self.store.release_due(self.batch_size)).await;

        match result {
            Ok(Ok(released)) => {
                for txn in &released {
                    tracing::info!(worker = id, txn_id = %txn.id, "transaction released");
                }
            }
            Ok(Err(err)) => {
                tracing::error!(worker = id, error = %err, "release failed");
            }
            Err(_) => {
                tracing::error!(worker = id, "release timed out");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Transaction, TransactionStatus, TransactionType};
    use crate::domain::error::LedgerError;
    use crate::domain::repository::MockLedgerStore;
    use crate::domain::types::{IdempotencyKey, TxnId, UserId};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_txn() -> Transaction {
        Transaction {
            id: TxnId::new(),
            user_id: UserId(1),
            kind: TransactionType::Credit,
            status: TransactionStatus::Success,
            amount: 500,
            release_time: Some(Utc::now()),
            released: true,
            idempotency_key: IdempotencyKey(Uuid::now_v7()),
            retry_count: 0,
            bank_txn_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn a_tick_with_nothing_due_is_not_an_error() {
        let mut store = MockLedgerStore::new();
        store
            .expect_release_due()
            .times(1)
            .returning(|_| Ok(vec![]));

        let worker = ReleaseWorker::new(Arc::new(store), Duration::from_secs(1), 100, 1);
        worker.release(0).await;
    }

    #[tokio::test]
    async fn a_tick_logs_each_released_row_without_panicking() {
        let mut store = MockLedgerStore::new();
        store
            .expect_release_due()
            .times(1)
            .returning(|_| Ok(vec![sample_txn(), sample_txn()]));

        let worker = ReleaseWorker::new(Arc::new(store), Duration::from_secs(1), 100, 1);
        worker.release(0).await;
    }

    #[tokio::test]
    async fn a_transient_store_error_is_swallowed_for_the_next_tick() {
        let mut store = MockLedgerStore::new();
        store
            .expect_release_due()
            .times(1)
            .returning(|_| Err(LedgerError::Transient("connection reset".into())));

        let worker = ReleaseWorker::new(Arc::new(store), Duration::from_secs(1), 100, 1);
        worker.release(0).await;
    }
}
