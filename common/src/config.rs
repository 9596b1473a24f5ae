use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration shared by all three binaries.
///
/// Loaded with `Config::load()`, which layers built-in defaults, an optional
/// `resources/config.yaml` file, and finally `WALLET_*` environment variables
/// (dots replaced by underscores, e.g. `WALLET_DATABASE_HOST`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub release: WorkerConfig,
    pub withdraw: WithdrawConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    #[serde(with = "humantime_seconds")]
    pub conn_max_lifetime: Duration,
}

impl DatabaseConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.dbname, self.sslmode
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    #[serde(with = "humantime_seconds")]
    pub interval: Duration,
    pub batch_size: i64,
    pub worker_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawConfig {
    #[serde(with = "humantime_seconds")]
    pub interval: Duration,
    pub batch_size: i64,
    pub worker_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(with = "humantime_seconds")]
    pub database_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Durations are expressed as plain seconds in config sources; this module
/// bridges that to `std::time::Duration` without pulling in a humantime dep.
mod humantime_seconds {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
}

impl Settings {
    /// Loads configuration from defaults, an optional `resources/config.yaml`
    /// file, and `WALLET_*` environment overrides, in that precedence order.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .set_default("server.port", "8080")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "postgres")?
            .set_default("database.dbname", "wallet_db")?
            .set_default("database.sslmode", "disable")?
            .set_default("database.max_open_conns", 25)?
            .set_default("database.max_idle_conns", 5)?
            .set_default("database.conn_max_lifetime", 300.0)?
            .set_default("release.interval", 5.0)?
            .set_default("release.batch_size", 100)?
            .set_default("release.worker_count", 2)?
            .set_default("withdraw.interval", 5.0)?
            .set_default("withdraw.batch_size", 50)?
            .set_default("withdraw.worker_count", 4)?
            .set_default("health.database_timeout", 5.0)?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name("./resources/config").required(false))
            .add_source(
                config::Environment::with_prefix("WALLET")
                    .separator("_")
                    .try_parsing(true),
            );

        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }
}
