use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use surety_shared::{AccountId, FlightStatus};

use crate::error::AppError;
use crate::flights::FlightRef;
use crate::middleware::{caller_middleware, CallerContext};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IndexesResponse {
    pub oracle: AccountId,
    pub indexes: [u8; 3],
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub index: u8,
    #[serde(flatten)]
    pub flight: FlightRef,
    pub status_code: FlightStatus,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponseResponse {
    pub recorded: bool,
    pub finalized: Option<FlightStatus>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/oracles", post(register_oracle))
        .route("/v1/oracles/me", get(get_my_indexes))
        .route("/v1/oracles/responses", post(submit_oracle_response))
        .route_layer(middleware::from_fn(caller_middleware))
}

/// POST /v1/oracles
/// Register the calling account as an oracle; the transferred value pays the fee
pub async fn register_oracle(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<IndexesResponse>, AppError> {
    let indexes = state
        .surety
        .register_oracle(&caller.account, caller.value)
        .await?;

    Ok(Json(IndexesResponse {
        oracle: caller.account,
        indexes,
    }))
}

/// GET /v1/oracles/me
pub async fn get_my_indexes(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<IndexesResponse>, AppError> {
    let indexes = state.surety.get_my_indexes(&caller.account).await?;
    Ok(Json(IndexesResponse {
        oracle: caller.account,
        indexes,
    }))
}

/// POST /v1/oracles/responses
pub async fn submit_oracle_response(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<SubmitResponseRequest>,
) -> Result<Json<SubmitResponseResponse>, AppError> {
    let outcome = state
        .surety
        .submit_oracle_response(&caller.account, req.index, req.flight.key(), req.status_code)
        .await?;

    Ok(Json(SubmitResponseResponse {
        recorded: outcome.recorded,
        finalized: outcome.finalized,
    }))
}
