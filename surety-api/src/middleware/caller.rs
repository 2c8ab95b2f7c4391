use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use surety_shared::{AccountId, Wei};

/// Identity of the calling account, supplied by the host
pub const ACCOUNT_HEADER: &str = "x-surety-account";
/// Value transferred with the call, in base units
pub const VALUE_HEADER: &str = "x-surety-value";

#[derive(Debug, Clone)]
pub struct CallerContext {
    pub account: AccountId,
    pub value: Wei,
}

// ============================================================================
// Caller Middleware
// ============================================================================

/// Rejects requests without a caller identity (401) or with a malformed
/// value (400); otherwise injects a `CallerContext` extension.
pub async fn caller_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let account = req
        .headers()
        .get(ACCOUNT_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AccountId::from)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let value = match req.headers().get(VALUE_HEADER) {
        None => 0,
        Some(raw) => raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<Wei>().ok())
            .ok_or(StatusCode::BAD_REQUEST)?,
    };

    req.extensions_mut().insert(CallerContext { account, value });

    Ok(next.run(req).await)
}
