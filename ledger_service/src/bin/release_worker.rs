use std::sync::Arc;

use common::config::Settings;
use ledger_service::infrastructure::persistence::postgres_ledger_store::PostgresLedgerStore;
use ledger_service::workers::release_worker::ReleaseWorker;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("fatal: failed to load configuration: {e}");
        std::process::exit(1);
    });

    common::logging::init(&settings.logging.level);
    info!("starting release job");

    let pool = common::db::connect(&settings.database).await?;
    let store = Arc::new(PostgresLedgerStore::new(pool));

    let worker = Arc::new(ReleaseWorker::new(
        store,
        settings.release.interval,
        settings.release.batch_size,
        settings.release.worker_count,
    ));
    let stop = worker.start();

    wait_for_shutdown_signal().await;
    info!("shutting down release job");
    let _ = stop.send(true);

    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
