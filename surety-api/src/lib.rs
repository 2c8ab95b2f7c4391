use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod airlines;
pub mod error;
pub mod events;
pub mod flights;
pub mod insurance;
pub mod ledger;
pub mod middleware;
pub mod oracles;
pub mod orchestrator;
pub mod state;
pub mod worker;

pub use ledger::Ledger;
pub use orchestrator::FlightSuretyApp;
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static(middleware::ACCOUNT_HEADER),
            axum::http::HeaderName::from_static(middleware::VALUE_HEADER),
        ]);

    Router::new()
        .merge(airlines::routes())
        .merge(flights::routes())
        .merge(oracles::routes())
        .merge(insurance::routes())
        .merge(admin::routes())
        .merge(events::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
