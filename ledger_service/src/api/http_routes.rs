use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::domain::entities::{Transaction, Wallet};
use crate::domain::types::{IdempotencyKey, TxnId, UserId};
use crate::use_cases::charge::ChargeUseCase;
use crate::use_cases::debit::DebitUseCase;
use crate::use_cases::get_balance::GetBalanceUseCase;
use crate::use_cases::list_transactions::ListTransactionsUseCase;

pub struct AppState {
    pub charge_use_case: ChargeUseCase,
    pub debit_use_case: DebitUseCase,
    pub get_balance_use_case: GetBalanceUseCase,
    pub list_transactions_use_case: ListTransactionsUseCase,
    pub db_pool: PgPool,
    pub health_timeout: Duration,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/wallet/{userid}", get(get_balance))
        .route("/api/v1/wallet/{userid}/transactions", get(list_transactions))
        .route("/api/v1/wallet/{userid}/charge", post(charge))
        .route("/api/v1/wallet/{userid}/withdraw", post(withdraw))
        .route("/ping", get(ping))
        .route("/liveness", get(liveness))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct WalletResponse {
    pub total_balance: i64,
    pub available_balance: i64,
}

impl From<Wallet> for WalletResponse {
    fn from(w: Wallet) -> Self {
        Self {
            total_balance: w.total_balance,
            available_balance: w.available_balance,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TransactionResponse {
    pub id: String,
    pub kind: String,
    pub status: String,
    pub amount: i64,
    pub release_time: Option<DateTime<Utc>>,
    pub released: bool,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id.to_string(),
            kind: format!("{:?}", t.kind).to_lowercase(),
            status: format!("{:?}", t.status).to_lowercase(),
            amount: t.amount,
            release_time: t.release_time,
            released: t.released,
            retry_count: t.retry_count,
            created_at: t.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TransactionPageResponse {
    pub transaction_list: Vec<TransactionResponse>,
    pub cursor: Option<String>,
}

#[derive(Deserialize)]
pub struct TransactionsQuery {
    pub cursor: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct MovementRequest {
    pub amount: i64,
    pub idempotency: Uuid,
    pub release_time: Option<DateTime<Utc>>,
}

/// `GET /api/v1/wallet/{userid}`
#[utoipa::path(get, path = "/api/v1/wallet/{userid}", responses((status = 200, body = WalletResponse)))]
#[tracing::instrument(skip(state))]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(userid): Path<i64>,
) -> Result<Json<ApiResponse<WalletResponse>>, ApiError> {
    let wallet = state.get_balance_use_case.execute(UserId(userid)).await?;
    Ok(Json(ApiResponse::ok(wallet.into())))
}

/// `GET /api/v1/wallet/{userid}/transactions`
#[utoipa::path(get, path = "/api/v1/wallet/{userid}/transactions", responses((status = 200, body = TransactionPageResponse)))]
#[tracing::instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(userid): Path<i64>,
    Query(q): Query<TransactionsQuery>,
) -> Result<Json<ApiResponse<TransactionPageResponse>>, ApiError> {
    let cursor = q.cursor.map(TxnId);
    let (transactions, next_cursor) = state
        .list_transactions_use_case
        .execute(UserId(userid), cursor, q.limit)
        .await?;

    Ok(Json(ApiResponse::ok(TransactionPageResponse {
        transaction_list: transactions.into_iter().map(Into::into).collect(),
        cursor: next_cursor.map(|c| c.to_string()),
    })))
}

/// `POST /api/v1/wallet/{userid}/charge`
#[utoipa::path(post, path = "/api/v1/wallet/{userid}/charge", request_body = MovementRequest, responses((status = 200, body = String)))]
#[tracing::instrument(skip(state, body))]
pub async fn charge(
    State(state): State<Arc<AppState>>,
    Path(userid): Path<i64>,
    Json(body): Json<MovementRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let txn_id = state
        .charge_use_case
        .execute(
            UserId(userid),
            IdempotencyKey(body.idempotency),
            body.amount,
            body.release_time,
        )
        .await?;

    Ok(Json(ApiResponse::ok(txn_id.to_string())))
}

/// `POST /api/v1/wallet/{userid}/withdraw`
#[utoipa::path(post, path = "/api/v1/wallet/{userid}/withdraw", request_body = MovementRequest, responses((status = 200, body = String)))]
#[tracing::instrument(skip(state, body))]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Path(userid): Path<i64>,
    Json(body): Json<MovementRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let release_time = body.release_time.ok_or_else(|| {
        ApiError::from(crate::domain::error::LedgerError::Invalid(
            "withdraw requires a release_time".into(),
        ))
    })?;

    let txn_id = state
        .debit_use_case
        .execute(
            UserId(userid),
            IdempotencyKey(body.idempotency),
            body.amount,
            release_time,
        )
        .await?;

    Ok(Json(ApiResponse::ok(txn_id.to_string())))
}

/// Always returns 200 once the process is accepting connections.
pub async fn ping() -> &'static str {
    "pong"
}

/// Always returns 200 as long as the event loop is responsive.
pub async fn liveness() -> &'static str {
    "alive"
}

/// Returns 503 if a bounded-timeout ping of the database fails.
pub async fn health(State(state): State<Arc<AppState>>) -> (axum::http::StatusCode, &'static str) {
    match tokio::time::timeout(state.health_timeout, sqlx::query("SELECT 1").execute(&state.db_pool)).await {
        Ok(Ok(_)) => (axum::http::StatusCode::OK, "ok"),
        _ => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
    }
}
