use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use crate::domain::bank::BankPort;
use crate::domain::entities::Transaction;
use crate::domain::repository::LedgerStore;

const WITHDRAW_CALL_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: i32 = 5;

/// Drains pending debits to the bank through a driver + bounded pool of
/// bank-caller loops, fed by a single in-memory queue.
///
/// The queue is bounded to `worker_count` so the driver blocks (and, past
/// its tick deadline, drops the remainder for next tick) rather than
/// growing an unbounded backlog in memory.
pub struct WithdrawWorker {
    store: Arc<dyn LedgerStore>,
    bank: Arc<dyn BankPort>,
    interval: Duration,
    limit: i64,
    worker_count: usize,
}

impl WithdrawWorker {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        bank: Arc<dyn BankPort>,
        interval: Duration,
        limit: i64,
        worker_count: usize,
    ) -> Self {
        Self {
            store,
            bank,
            interval,
            limit,
            worker_count,
        }
    }

    /// Starts the bank-caller pool once, then the ticking driver. Returns
    /// a handle that stops the driver when sent to; callers field is
    /// taken care of by that same queue hangup.
    pub fn start(self: Arc<Self>) -> watch::Sender<bool> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (tx, rx) = mpsc::channel::<Transaction>(self.worker_count.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        for id in 0..self.worker_count {
            let worker = self.clone();
            let rx = rx.clone();
            tokio::spawn(async move {
                worker.caller_loop(id, rx).await;
            });
        }

        let driver = self.clone();
        let mut stop_rx = stop_rx.clone();
        tokio::spawn(async move {
            driver.driver_loop(tx, &mut stop_rx).await;
        });

        stop_tx
    }

    async fn driver_loop(&self, tx: mpsc::Sender<Transaction>, stop: &mut watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        tracing::info!("withdraw driver started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.drive(&tx).await;
                }
                _ = stop.changed() => {
                    tracing::info!("withdraw driver stopped");
                    return;
                }
            }
        }
    }

    async fn drive(&self, tx: &mpsc::Sender<Transaction>) {
        let pending = match self.store.get_pending_debits(self.limit).await {
            Ok(pending) => pending,
            Err(err) => {
                tracing::error!(error = %err, "failed to read pending debits");
                return;
            }
        };

        for txn in pending {
            // Enqueueing is itself bounded by the tick interval: if every
            // caller is busy past the deadline, the remaining rows are left
            // for the next tick rather than piling up here.
            if timeout(self.interval, tx.send(txn)).await.is_err() {
                tracing::warn!("withdraw queue saturated, deferring remainder to next tick");
                break;
            }
        }
    }

    async fn caller_loop(&self, id: usize, rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Transaction>>>) {
        tracing::info!(worker = id, "bank caller started");
        loop {
            let txn = {
                let mut rx = rx.lock().await;
                rx.recv().await
            };
            let Some(txn) = txn else {
                tracing::info!(worker = id, "bank caller stopped");
                return;
            };
            self.settle(id, txn).await;
        }
    }

    async fn settle(&self, id: usize, txn: Transaction) {
        let result = timeout(
            WITHDRAW_CALL_TIMEOUT,
            self.bank
                .withdraw(txn.user_id, txn.idempotency_key, txn.magnitude()),
        )
        .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(_) => Err(crate::domain::error::LedgerError::BankFailure(
                "bank call timed out".into(),
            )),
        };

        match outcome {
            Ok(bank_txn_id) => {
                if let Err(err) = self
                    .store
                    .settle_debit_success(txn.id, &bank_txn_id)
                    .await
                {
                    tracing::error!(worker = id, txn_id = %txn.id, error = %err, "failed to settle success");
                    return;
                }
                tracing::info!(worker = id, txn_id = %txn.id, "withdraw succeeded");
            }
            Err(err) => {
                tracing::error!(worker = id, txn_id = %txn.id, error = %err, "bank call failed");
                if txn.retry_count + 1 >= MAX_RETRIES {
                    if let Err(err) = self.store.settle_debit_failure(txn.id).await {
                        tracing::error!(worker = id, txn_id = %txn.id, error = %err, "failed to mark failed");
                    }
                } else if let Err(err) = self.store.increment_retry(txn.id).await {
                    tracing::error!(worker = id, txn_id = %txn.id, error = %err, "failed to increment retry");
                }
            }
        }
    }
}
