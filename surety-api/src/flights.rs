use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use surety_escrow::Flight;
use surety_shared::{AccountId, FlightKey, FlightStatus};

use crate::error::AppError;
use crate::middleware::{caller_middleware, CallerContext};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterFlightRequest {
    pub flight: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct RegisterFlightResponse {
    pub position: usize,
    pub key: FlightKey,
}

#[derive(Debug, Serialize)]
pub struct FlightListResponse {
    pub count: usize,
    pub flights: Vec<Flight>,
}

/// Identifies a flight in request bodies and query strings
#[derive(Debug, Clone, Deserialize)]
pub struct FlightRef {
    pub airline: String,
    pub flight: String,
    pub timestamp: i64,
}

impl FlightRef {
    pub fn key(&self) -> FlightKey {
        FlightKey::new(AccountId::new(self.airline.clone()), self.flight.clone(), self.timestamp)
    }
}

#[derive(Debug, Serialize)]
pub struct FetchStatusResponse {
    pub index: u8,
    pub key: FlightKey,
    pub status: FlightStatus,
}

pub fn routes() -> Router<AppState> {
    let register = post(register_flight).route_layer(middleware::from_fn(caller_middleware));

    Router::new()
        .route("/v1/flights", get(list_flights).merge(register))
        .route("/v1/flights/status", post(fetch_flight_status))
        .route("/v1/flights/{position}", get(get_flight))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/flights
/// Schedule a flight operated by the calling airline
pub async fn register_flight(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<RegisterFlightRequest>,
) -> Result<Json<RegisterFlightResponse>, AppError> {
    if req.flight.trim().is_empty() {
        return Err(AppError::ValidationError("Flight code is required".to_string()));
    }

    let key = FlightKey::new(caller.account.clone(), req.flight.clone(), req.timestamp);
    let position = state
        .surety
        .register_flight(&caller.account, req.flight, req.timestamp)
        .await?;

    Ok(Json(RegisterFlightResponse { position, key }))
}

/// GET /v1/flights
pub async fn list_flights(State(state): State<AppState>) -> Json<FlightListResponse> {
    let flights = state.surety.get_flights().await;
    Json(FlightListResponse {
        count: flights.len(),
        flights,
    })
}

/// GET /v1/flights/:position
pub async fn get_flight(
    State(state): State<AppState>,
    Path(position): Path<usize>,
) -> Result<Json<Flight>, AppError> {
    state
        .surety
        .get_flight(position)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("flight #{}", position)))
}

/// POST /v1/flights/status
/// Ask the oracle network for a flight's status
pub async fn fetch_flight_status(
    State(state): State<AppState>,
    Json(req): Json<FlightRef>,
) -> Result<Json<FetchStatusResponse>, AppError> {
    let key = req.key();
    let index = state.surety.fetch_flight_status(key.clone()).await?;
    let status = state.surety.get_flight_status(&key).await;

    Ok(Json(FetchStatusResponse { index, key, status }))
}
