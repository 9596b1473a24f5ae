use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::response::ApiResponse;
use crate::domain::error::LedgerError;

pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LedgerError::Invalid(_) => (StatusCode::BAD_REQUEST, "invalid request"),
            LedgerError::AlreadyPosted => (StatusCode::CONFLICT, "idempotency key already posted"),
            LedgerError::InsufficientFunds => {
                (StatusCode::BAD_REQUEST, "insufficient available balance")
            }
            LedgerError::Transient(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
            LedgerError::BankFailure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
        };

        let body = Json(ApiResponse::<()>::err(message, self.0.to_string()));
        (status, body).into_response()
    }
}
