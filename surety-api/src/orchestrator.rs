use crate::ledger::Ledger;
use surety_core::SuretyResult;
use surety_escrow::{Flight, Insurance, Payout};
use surety_governance::{Airline, ApprovalOutcome};
use surety_oracle::ResponseOutcome;
use surety_shared::{AccountId, AirlineState, FlightKey, FlightStatus, Wei};
use surety_store::EventBus;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Constants and balances exposed read-only
#[derive(Debug, Clone, serde::Serialize)]
pub struct LedgerSnapshot {
    pub operational: bool,
    pub admin: AccountId,
    pub airline_due: Wei,
    pub max_insurance_amount: Wei,
    pub registration_fee: Wei,
    pub escrow_balance: Wei,
    pub outstanding_liability: Wei,
    pub funded_airlines: usize,
    pub flights: usize,
    pub oracles: usize,
}

/// User-facing facade. Forwards every call to the ledger under its own
/// identity and publishes the events a successful call produced.
///
/// Calls are serialized on one lock: each runs to completion before the
/// next starts, so two responses can never both finalize a round and two
/// withdrawals can never both pay one policy.
pub struct FlightSuretyApp {
    identity: AccountId,
    ledger: Mutex<Ledger>,
    events: EventBus,
}

impl FlightSuretyApp {
    pub fn new(identity: AccountId, ledger: Ledger, events: EventBus) -> Self {
        Self {
            identity,
            ledger: Mutex::new(ledger),
            events,
        }
    }

    /// Identity this orchestrator acts under; the admin must authorize it
    pub fn identity(&self) -> &AccountId {
        &self.identity
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    async fn transact<T, F>(&self, operation: &'static str, call: F) -> SuretyResult<T>
    where
        F: FnOnce(&mut Ledger, &AccountId) -> SuretyResult<T> + Send,
        T: Send,
    {
        let (result, events) = {
            let mut ledger = self.ledger.lock().await;
            let result = call(&mut *ledger, &self.identity);
            (result, ledger.drain_events())
        };

        match &result {
            Ok(_) => {
                for event in events {
                    self.events.publish(event);
                }
            }
            Err(e) if e.is_fatal() => error!(operation, error = %e, "Ledger invariant violated"),
            Err(e) => debug!(operation, error = %e, "Ledger call rejected"),
        }
        result
    }

    async fn read<T, F>(&self, query: F) -> T
    where
        F: FnOnce(&Ledger) -> T + Send,
        T: Send,
    {
        let ledger = self.ledger.lock().await;
        query(&*ledger)
    }

    // ========================================================================
    // Administration (called directly by the admin, not through the facade)
    // ========================================================================

    pub async fn set_authorized_status(
        &self,
        caller: &AccountId,
        target: &AccountId,
        allowed: bool,
    ) -> SuretyResult<()> {
        self.transact("set_authorized_status", |ledger, _| {
            ledger.set_authorized_status(caller, target, allowed)
        })
        .await
    }

    pub async fn get_authorized_status(&self, target: &AccountId) -> bool {
        self.read(|ledger| ledger.is_authorized(target)).await
    }

    pub async fn set_operating_status(&self, caller: &AccountId, operational: bool) -> SuretyResult<()> {
        self.transact("set_operating_status", |ledger, _| {
            ledger.set_operating_status(caller, operational)
        })
        .await
    }

    pub async fn is_operational(&self) -> bool {
        self.read(|ledger| ledger.is_operational()).await
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.read(|ledger| LedgerSnapshot {
            operational: ledger.is_operational(),
            admin: ledger.admin().clone(),
            airline_due: ledger.airline_due(),
            max_insurance_amount: ledger.max_insurance_amount(),
            registration_fee: ledger.registration_fee(),
            escrow_balance: ledger.escrow_balance(),
            outstanding_liability: ledger.outstanding_liability(),
            funded_airlines: ledger.funded_airline_count(),
            flights: ledger.flights_count(),
            oracles: ledger.oracle_count(),
        })
        .await
    }

    // ========================================================================
    // Airlines
    // ========================================================================

    pub async fn apply_for_airline(&self, caller: &AccountId, name: String) -> SuretyResult<AirlineState> {
        self.transact("apply_for_airline", |ledger, app| {
            ledger.apply_for_airline(app, caller, name)
        })
        .await
    }

    pub async fn approve_airline(
        &self,
        caller: &AccountId,
        target: &AccountId,
    ) -> SuretyResult<ApprovalOutcome> {
        self.transact("approve_airline", |ledger, app| {
            ledger.approve_airline(app, caller, target)
        })
        .await
    }

    pub async fn pay_airline_due(&self, caller: &AccountId, value: Wei) -> SuretyResult<AirlineState> {
        self.transact("pay_airline_due", |ledger, app| {
            ledger.pay_airline_due(app, caller, value)
        })
        .await
    }

    pub async fn get_airline_state(&self, airline: &AccountId) -> SuretyResult<AirlineState> {
        self.read(|ledger| ledger.airline_state(airline)).await
    }

    pub async fn get_airline(&self, airline: &AccountId) -> Option<Airline> {
        self.read(|ledger| ledger.airline(airline).cloned()).await
    }

    // ========================================================================
    // Flights
    // ========================================================================

    pub async fn register_flight(
        &self,
        caller: &AccountId,
        flight: String,
        timestamp: i64,
    ) -> SuretyResult<usize> {
        self.transact("register_flight", |ledger, app| {
            ledger.register_flight(app, caller, flight, timestamp)
        })
        .await
    }

    pub async fn get_flight(&self, position: usize) -> Option<Flight> {
        self.read(|ledger| ledger.flight(position).cloned()).await
    }

    pub async fn get_flights(&self) -> Vec<Flight> {
        self.read(|ledger| ledger.flights().cloned().collect()).await
    }

    pub async fn get_flights_count(&self) -> usize {
        self.read(|ledger| ledger.flights_count()).await
    }

    pub async fn get_flight_status(&self, flight: &FlightKey) -> FlightStatus {
        self.read(|ledger| ledger.flight_status(flight)).await
    }

    /// Ask the oracles about a flight; returns the index bucket that was asked
    pub async fn fetch_flight_status(&self, flight: FlightKey) -> SuretyResult<u8> {
        self.transact("fetch_flight_status", |ledger, app| {
            ledger.fetch_flight_status(app, flight)
        })
        .await
    }

    // ========================================================================
    // Oracles
    // ========================================================================

    pub async fn register_oracle(&self, caller: &AccountId, value: Wei) -> SuretyResult<[u8; 3]> {
        self.transact("register_oracle", |ledger, app| {
            ledger.register_oracle(app, caller, value)
        })
        .await
    }

    pub async fn get_my_indexes(&self, caller: &AccountId) -> SuretyResult<[u8; 3]> {
        self.read(|ledger| ledger.oracle_indexes(caller)).await
    }

    pub async fn submit_oracle_response(
        &self,
        caller: &AccountId,
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
    ) -> SuretyResult<ResponseOutcome> {
        self.transact("submit_oracle_response", |ledger, app| {
            ledger.submit_oracle_response(app, caller, index, flight, status)
        })
        .await
    }

    // ========================================================================
    // Insurance
    // ========================================================================

    pub async fn purchase_insurance(
        &self,
        caller: &AccountId,
        flight: FlightKey,
        value: Wei,
    ) -> SuretyResult<Insurance> {
        self.transact("purchase_insurance", |ledger, app| {
            ledger.purchase_insurance(app, caller, flight, value)
        })
        .await
    }

    pub async fn get_insurance(&self, passenger: &AccountId, flight: &FlightKey) -> SuretyResult<Insurance> {
        self.read(|ledger| ledger.insurance(passenger, flight)).await
    }

    pub async fn withdraw_payout(&self, caller: &AccountId, flight: &FlightKey) -> SuretyResult<Payout> {
        self.transact("withdraw_payout", |ledger, app| {
            ledger.withdraw_payout(app, caller, flight)
        })
        .await
    }

    pub async fn escrow_balance(&self) -> Wei {
        self.read(|ledger| ledger.escrow_balance()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use surety_core::{LedgerConfig, SeededIndexSource, SuretyError};
    use surety_shared::LedgerEvent;

    const UNIT: Wei = 1_000_000_000_000_000_000;

    async fn surety() -> Arc<FlightSuretyApp> {
        let admin = AccountId::from("admin");
        let ledger = Ledger::new(
            &LedgerConfig::default(),
            admin.clone(),
            "Founding Airline".to_string(),
            Box::new(SeededIndexSource::new(7)),
        )
        .unwrap();
        let app = Arc::new(FlightSuretyApp::new(AccountId::from("app"), ledger, EventBus::new(256)));
        app.set_authorized_status(&admin, app.identity(), true).await.unwrap();
        app
    }

    fn flight() -> FlightKey {
        FlightKey::new(AccountId::from("admin"), "ND1309".to_string(), 1_700_000_000)
    }

    #[tokio::test]
    async fn test_unauthorized_facade_is_rejected() {
        let ledger = Ledger::new(
            &LedgerConfig::default(),
            AccountId::from("admin"),
            "Founding Airline".to_string(),
            Box::new(SeededIndexSource::new(1)),
        )
        .unwrap();
        let app = FlightSuretyApp::new(AccountId::from("rogue"), ledger, EventBus::new(16));

        let result = app.apply_for_airline(&AccountId::from("a1"), "A1".to_string()).await;
        assert_eq!(result, Err(SuretyError::Unauthorized(AccountId::from("rogue"))));
    }

    #[tokio::test]
    async fn test_successful_calls_publish_events() {
        let app = surety().await;
        let mut rx = app.events().subscribe();

        let index = app.fetch_flight_status(flight()).await.unwrap();
        match rx.recv().await.unwrap() {
            LedgerEvent::OracleRequest(event) => {
                assert_eq!(event.index, index);
                assert_eq!(event.flight, "ND1309");
            }
            other => panic!("unexpected event {:?}", other),
        }

        // Rejected calls publish nothing
        let result = app.purchase_insurance(&AccountId::from("p"), flight(), 0).await;
        assert!(result.is_err());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_withdrawals_pay_once() {
        let app = surety().await;
        let passenger = AccountId::from("passenger");

        // A second airline's due backs the payout
        let airline = AccountId::from("airline-2");
        app.apply_for_airline(&airline, "Second".to_string()).await.unwrap();
        app.approve_airline(&AccountId::from("admin"), &airline).await.unwrap();
        app.pay_airline_due(&airline, 10 * UNIT).await.unwrap();

        app.purchase_insurance(&passenger, flight(), UNIT).await.unwrap();
        let index = app.fetch_flight_status(flight()).await.unwrap();

        // Keep registering until three oracles hold the requested index
        let mut holders = Vec::new();
        let mut n = 0;
        while holders.len() < 3 {
            let oracle = AccountId::new(format!("oracle-{}", n));
            let indexes = app.register_oracle(&oracle, UNIT).await.unwrap();
            if indexes.contains(&index) {
                holders.push(oracle);
            }
            n += 1;
        }

        // Respond concurrently; exactly one response finalizes
        let mut tasks = Vec::new();
        for oracle in holders {
            let app = app.clone();
            tasks.push(tokio::spawn(async move {
                app.submit_oracle_response(&oracle, index, flight(), FlightStatus::LateAirline)
                    .await
                    .unwrap()
            }));
        }
        let mut finalized = 0;
        for task in tasks {
            if task.await.unwrap().finalized.is_some() {
                finalized += 1;
            }
        }
        assert_eq!(finalized, 1);
        assert_eq!(app.get_flight_status(&flight()).await, FlightStatus::LateAirline);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let app = app.clone();
            let passenger = passenger.clone();
            tasks.push(tokio::spawn(async move {
                app.withdraw_payout(&passenger, &flight()).await
            }));
        }
        let mut paid = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(payout) => {
                    assert_eq!(payout.amount, 3 * UNIT / 2);
                    paid += 1;
                }
                Err(e) => assert!(matches!(e, SuretyError::AlreadyClaimed { .. })),
            }
        }
        assert_eq!(paid, 1);
        assert_eq!(app.escrow_balance().await, 11 * UNIT - 3 * UNIT / 2);
    }
}
