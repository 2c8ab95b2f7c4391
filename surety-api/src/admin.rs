use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use surety_shared::units::format_units;
use surety_shared::AccountId;

use crate::error::AppError;
use crate::middleware::{caller_middleware, CallerContext};
use crate::orchestrator::LedgerSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OperationalRequest {
    pub operational: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub target: AccountId,
    pub allowed: bool,
}

#[derive(Debug, Serialize)]
pub struct AuthorizedResponse {
    pub target: AccountId,
    pub authorized: bool,
}

/// Ledger amounts rendered in whole units, e.g. `"1.5"`
#[derive(Debug, Serialize)]
pub struct DisplayAmounts {
    pub airline_due: String,
    pub max_insurance_amount: String,
    pub registration_fee: String,
    pub escrow_balance: String,
    pub outstanding_liability: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub ledger: LedgerSnapshot,
    pub display: DisplayAmounts,
}

impl TryFrom<LedgerSnapshot> for StatusResponse {
    type Error = AppError;

    fn try_from(ledger: LedgerSnapshot) -> Result<Self, AppError> {
        let units = |amount| format_units(amount).map_err(|e| AppError::Anyhow(e.into()));
        let display = DisplayAmounts {
            airline_due: units(ledger.airline_due)?,
            max_insurance_amount: units(ledger.max_insurance_amount)?,
            registration_fee: units(ledger.registration_fee)?,
            escrow_balance: units(ledger.escrow_balance)?,
            outstanding_liability: units(ledger.outstanding_liability)?,
        };
        Ok(Self { ledger, display })
    }
}

pub fn routes() -> Router<AppState> {
    let calls = Router::new()
        .route("/v1/admin/operational", post(set_operating_status))
        .route("/v1/admin/authorized", post(set_authorized_status))
        .route_layer(middleware::from_fn(caller_middleware));

    Router::new()
        .route("/v1/admin/status", get(get_status))
        .route("/v1/admin/authorized/{target}", get(get_authorized_status))
        .merge(calls)
}

/// GET /v1/admin/status
/// Operational flag, constants and escrow balances
pub async fn get_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let snapshot = state.surety.snapshot().await;
    Ok(Json(StatusResponse::try_from(snapshot)?))
}

/// POST /v1/admin/operational
pub async fn set_operating_status(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<OperationalRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    state
        .surety
        .set_operating_status(&caller.account, req.operational)
        .await?;
    let snapshot = state.surety.snapshot().await;
    Ok(Json(StatusResponse::try_from(snapshot)?))
}

/// POST /v1/admin/authorized
pub async fn set_authorized_status(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<AuthorizeRequest>,
) -> Result<Json<AuthorizedResponse>, AppError> {
    state
        .surety
        .set_authorized_status(&caller.account, &req.target, req.allowed)
        .await?;

    let authorized = state.surety.get_authorized_status(&req.target).await;
    Ok(Json(AuthorizedResponse {
        target: req.target,
        authorized,
    }))
}

/// GET /v1/admin/authorized/:target
pub async fn get_authorized_status(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Json<AuthorizedResponse> {
    let target = AccountId::new(target);
    let authorized = state.surety.get_authorized_status(&target).await;
    Json(AuthorizedResponse { target, authorized })
}
