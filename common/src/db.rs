use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Builds a Postgres connection pool sized from `database.{max_open_conns,max_idle_conns}`.
///
/// `max_idle_conns` has no direct sqlx equivalent (sqlx pools don't
/// distinguish idle capacity from max capacity); it is kept in `DatabaseConfig`
/// for parity with the source configuration surface and currently only
/// influences `min_connections`.
pub async fn connect(cfg: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(cfg.max_open_conns)
        .min_connections(cfg.max_idle_conns)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&cfg.connection_string())
        .await
}
