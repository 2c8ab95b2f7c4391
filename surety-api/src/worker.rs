use rand::Rng;
use std::sync::Arc;
use surety_core::SuretyResult;
use surety_shared::{AccountId, FlightKey, FlightStatus, LedgerEvent};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::orchestrator::FlightSuretyApp;

/// An oracle account driven by the simulator
#[derive(Debug, Clone)]
pub struct SimulatedOracle {
    pub account: AccountId,
    pub indexes: [u8; 3],
}

/// Register `count` oracles, each paying exactly the registration fee
pub async fn register_oracles(
    surety: &FlightSuretyApp,
    count: usize,
) -> SuretyResult<Vec<SimulatedOracle>> {
    let fee = surety.snapshot().await.registration_fee;
    let mut oracles = Vec::with_capacity(count);

    for n in 0..count {
        let account = AccountId::new(format!("oracle-{:02}", n));
        let indexes = surety.register_oracle(&account, fee).await?;
        debug!(oracle = %account, ?indexes, "Simulated oracle registered");
        oracles.push(SimulatedOracle { account, indexes });
    }
    Ok(oracles)
}

/// Answers every `OracleRequest` on the bus: each oracle holding the
/// requested index submits a uniformly random status from its own task.
///
/// Subscribes before registering so no request raised meanwhile is missed.
/// Returns when the event bus closes.
pub async fn start_oracle_simulator(surety: Arc<FlightSuretyApp>, oracle_count: usize) -> SuretyResult<()> {
    let mut rx = surety.events().subscribe();
    let oracles = register_oracles(&surety, oracle_count).await?;

    info!("Oracle simulator started with {} oracles", oracles.len());

    loop {
        match rx.recv().await {
            Ok(LedgerEvent::OracleRequest(request)) => {
                let index = request.index;
                let flight = FlightKey::new(request.airline, request.flight, request.timestamp);

                for oracle in oracles.iter().filter(|oracle| oracle.indexes.contains(&index)) {
                    let status = random_status();
                    let surety = surety.clone();
                    let account = oracle.account.clone();
                    let flight = flight.clone();

                    tokio::spawn(async move {
                        match surety
                            .submit_oracle_response(&account, index, flight, status)
                            .await
                        {
                            Ok(outcome) => {
                                debug!(oracle = %account, %status, finalized = ?outcome.finalized, "Oracle responded")
                            }
                            Err(e) => debug!(oracle = %account, "Oracle response rejected: {}", e),
                        }
                    });
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Oracle simulator lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Event bus closed, oracle simulator stopping");
                return Ok(());
            }
        }
    }
}

fn random_status() -> FlightStatus {
    let mut rng = rand::thread_rng();
    FlightStatus::ALL[rng.gen_range(0..FlightStatus::ALL.len())]
}
