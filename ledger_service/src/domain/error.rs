use thiserror::Error;

/// Errors produced by the ledger store and propagated up through use cases
/// and workers. Variants map directly to the error kinds the API and the
/// background workers need to branch on — not to individual SQL failure
/// modes.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("idempotency key already posted")]
    AlreadyPosted,

    #[error("insufficient available balance")]
    InsufficientFunds,

    #[error("transient store error: {0}")]
    Transient(String),

    #[error("bank call failed: {0}")]
    BankFailure(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return LedgerError::AlreadyPosted;
            }
        }
        LedgerError::Transient(err.to_string())
    }
}
