use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use surety_governance::{Airline, ApprovalOutcome};
use surety_shared::{AccountId, AirlineState};

use crate::error::AppError;
use crate::middleware::{caller_middleware, CallerContext};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AirlineStateResponse {
    pub airline: AccountId,
    pub state: AirlineState,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub airline: AccountId,
    pub state: AirlineState,
    pub approvals: Option<usize>,
    pub required: Option<usize>,
}

pub fn routes() -> Router<AppState> {
    let calls = Router::new()
        .route("/v1/airlines", post(apply_for_airline))
        .route("/v1/airlines/dues", post(pay_airline_due))
        .route("/v1/airlines/{id}/approve", post(approve_airline))
        .route_layer(middleware::from_fn(caller_middleware));

    Router::new()
        .route("/v1/airlines/{id}", get(get_airline))
        .merge(calls)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/airlines
/// Apply for membership as the calling account
pub async fn apply_for_airline(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<AirlineStateResponse>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("Airline name is required".to_string()));
    }

    let airline_state = state
        .surety
        .apply_for_airline(&caller.account, name.to_string())
        .await?;

    Ok(Json(AirlineStateResponse {
        airline: caller.account,
        state: airline_state,
    }))
}

/// POST /v1/airlines/:id/approve
/// Cast the calling funded airline's vote for `id`
pub async fn approve_airline(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<ApprovalResponse>, AppError> {
    let target = AccountId::new(id);
    let outcome = state.surety.approve_airline(&caller.account, &target).await?;

    let response = match outcome {
        ApprovalOutcome::Pending { approvals, required } => ApprovalResponse {
            airline: target,
            state: AirlineState::Applied,
            approvals: Some(approvals),
            required: Some(required),
        },
        ApprovalOutcome::Approved => ApprovalResponse {
            airline: target,
            state: AirlineState::Approved,
            approvals: None,
            required: None,
        },
        ApprovalOutcome::Unchanged(current) => ApprovalResponse {
            airline: target,
            state: current,
            approvals: None,
            required: None,
        },
    };
    Ok(Json(response))
}

/// POST /v1/airlines/dues
/// Pay the membership due with the call's transferred value
pub async fn pay_airline_due(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<AirlineStateResponse>, AppError> {
    let airline_state = state
        .surety
        .pay_airline_due(&caller.account, caller.value)
        .await?;

    Ok(Json(AirlineStateResponse {
        airline: caller.account,
        state: airline_state,
    }))
}

/// GET /v1/airlines/:id
pub async fn get_airline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Airline>, AppError> {
    let id = AccountId::new(id);
    state
        .surety
        .get_airline(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("airline {}", id)))
}
