use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use crate::domain::bank::BankPort;
use crate::domain::error::LedgerError;
use crate::domain::types::{IdempotencyKey, UserId};

/// Stand-in for the real bank connector. Mimics a flaky upstream: most
/// calls succeed after a short delay, one in five hangs long enough to
/// blow the caller's deadline.
pub struct MockBankPort {
    call_timeout: Duration,
}

impl MockBankPort {
    pub fn new() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for MockBankPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankPort for MockBankPort {
    async fn withdraw(
        &self,
        _user_id: UserId,
        _idempotency_key: IdempotencyKey,
        _amount: i64,
    ) -> Result<String, LedgerError> {
        let call = async {
            let hangs = rand::thread_rng().gen_bool(0.20);
            if hangs {
                tokio::time::sleep(Duration::from_millis(5001)).await;
            } else {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Uuid::now_v7().to_string()
        };

        timeout(self.call_timeout, call)
            .await
            .map_err(|_| LedgerError::BankFailure("bank call timed out".into()))
    }
}
