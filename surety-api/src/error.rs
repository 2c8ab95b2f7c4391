use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use surety_core::SuretyError;

#[derive(Debug)]
pub enum AppError {
    Ledger(SuretyError),
    ValidationError(String),
    NotFoundError(String),
    Anyhow(anyhow::Error),
}

/// HTTP status and stable error code for a ledger rejection
fn classify(err: &SuretyError) -> (StatusCode, &'static str) {
    match err {
        SuretyError::Unauthorized(_) => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
        SuretyError::IndexMismatch { .. } => (StatusCode::FORBIDDEN, "INDEX_MISMATCH"),
        SuretyError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        SuretyError::NotRegistered(_) => (StatusCode::NOT_FOUND, "NOT_REGISTERED"),
        SuretyError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE"),
        SuretyError::DuplicateApplication(_) => (StatusCode::CONFLICT, "DUPLICATE_APPLICATION"),
        SuretyError::DuplicatePurchase { .. } => (StatusCode::CONFLICT, "DUPLICATE_PURCHASE"),
        SuretyError::AlreadyClaimed { .. } => (StatusCode::CONFLICT, "ALREADY_CLAIMED"),
        SuretyError::InsufficientValue { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_VALUE"),
        SuretyError::AmountOutOfRange { .. } => (StatusCode::BAD_REQUEST, "AMOUNT_OUT_OF_RANGE"),
        SuretyError::NotEligible { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_ELIGIBLE"),
        SuretyError::NotOperational => (StatusCode::SERVICE_UNAVAILABLE, "NOT_OPERATIONAL"),
        SuretyError::InsufficientEscrowBalance { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INSUFFICIENT_ESCROW_BALANCE")
        }
        SuretyError::InvalidConfig(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_CONFIG"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            AppError::Ledger(err) => {
                let (status, code) = classify(&err);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Ledger failure: {}", err);
                }
                (status, code, err.to_string())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

impl From<SuretyError> for AppError {
    fn from(err: SuretyError) -> Self {
        Self::Ledger(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
