pub mod models;
pub mod postgres_ledger_store;
