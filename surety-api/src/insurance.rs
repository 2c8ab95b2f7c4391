use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use surety_escrow::{Insurance, Payout};
use surety_shared::AccountId;

use crate::error::AppError;
use crate::flights::FlightRef;
use crate::middleware::{caller_middleware, CallerContext};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let calls = Router::new()
        .route("/v1/insurance", post(purchase_insurance))
        .route("/v1/insurance/withdraw", post(withdraw_payout))
        .route_layer(middleware::from_fn(caller_middleware));

    Router::new()
        .route("/v1/insurance/{passenger}", get(get_insurance))
        .merge(calls)
}

/// POST /v1/insurance
/// Insure the caller on a flight; the transferred value is the premium
pub async fn purchase_insurance(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<FlightRef>,
) -> Result<Json<Insurance>, AppError> {
    let policy = state
        .surety
        .purchase_insurance(&caller.account, req.key(), caller.value)
        .await?;
    Ok(Json(policy))
}

/// GET /v1/insurance/:passenger?airline=..&flight=..&timestamp=..
pub async fn get_insurance(
    State(state): State<AppState>,
    Path(passenger): Path<String>,
    Query(flight): Query<FlightRef>,
) -> Result<Json<Insurance>, AppError> {
    let policy = state
        .surety
        .get_insurance(&AccountId::new(passenger), &flight.key())
        .await?;
    Ok(Json(policy))
}

/// POST /v1/insurance/withdraw
pub async fn withdraw_payout(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<FlightRef>,
) -> Result<Json<Payout>, AppError> {
    let payout = state
        .surety
        .withdraw_payout(&caller.account, &req.key())
        .await?;
    Ok(Json(payout))
}
