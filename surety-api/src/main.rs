use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use surety_api::{app, worker, AppState, FlightSuretyApp, Ledger};
use surety_core::OsIndexSource;
use surety_store::{Config, EventBus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "surety_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Surety API on port {}", config.server.port);

    let ledger_config = config.ledger.to_ledger_config()?;
    let admin = config.ledger.admin_id();
    let ledger = Ledger::new(
        &ledger_config,
        admin.clone(),
        config.ledger.founding_airline_name.clone(),
        Box::new(OsIndexSource),
    )?;

    // Event bus shared by the facade, SSE clients and the simulator
    let events = EventBus::new(1024);
    let surety = Arc::new(FlightSuretyApp::new(
        config.ledger.orchestrator_id(),
        ledger,
        events,
    ));

    // The admin authorizes the facade before it takes any traffic
    surety
        .set_authorized_status(&admin, surety.identity(), true)
        .await?;

    if config.simulator.enabled {
        let simulator = surety.clone();
        let oracle_count = config.simulator.oracle_count;
        tokio::spawn(async move {
            if let Err(e) = worker::start_oracle_simulator(simulator, oracle_count).await {
                tracing::error!("Oracle simulator failed: {}", e);
            }
        });
    }

    let app = app(AppState::new(surety));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
