use std::sync::Arc;

use common::config::Settings;
use ledger_service::api::http_routes::{
    routes, AppState, MovementRequest, TransactionPageResponse, TransactionResponse,
    WalletResponse,
};
use ledger_service::infrastructure::persistence::postgres_ledger_store::PostgresLedgerStore;
use ledger_service::use_cases::{
    charge::ChargeUseCase, debit::DebitUseCase, get_balance::GetBalanceUseCase,
    list_transactions::ListTransactionsUseCase,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        ledger_service::api::http_routes::get_balance,
        ledger_service::api::http_routes::list_transactions,
        ledger_service::api::http_routes::charge,
        ledger_service::api::http_routes::withdraw,
    ),
    components(schemas(
        WalletResponse,
        TransactionResponse,
        TransactionPageResponse,
        MovementRequest
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("fatal: failed to load configuration: {e}");
        std::process::exit(1);
    });

    common::logging::init(&settings.logging.level);
    info!("starting ledger API server");

    let pool = common::db::connect(&settings.database).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("connected to database and applied migrations");

    let store = Arc::new(PostgresLedgerStore::new(pool.clone()));

    let app_state = Arc::new(AppState {
        charge_use_case: ChargeUseCase::new(store.clone()),
        debit_use_case: DebitUseCase::new(store.clone()),
        get_balance_use_case: GetBalanceUseCase::new(store.clone()),
        list_transactions_use_case: ListTransactionsUseCase::new(store.clone()),
        db_pool: pool,
        health_timeout: settings.health.database_timeout,
    });

    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let addr = format!("0.0.0.0:{}", settings.server.port);
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
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
