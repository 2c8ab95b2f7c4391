use surety_core::{AuthorizationLedger, IndexSource, LedgerConfig, SuretyError, SuretyResult};
use surety_escrow::{EscrowTerms, Flight, FlightSchedule, Insurance, InsuranceLedger, Payout};
use surety_governance::{Airline, AirlineRegistry, ApprovalOutcome, GovernanceRules};
use surety_oracle::{ConsensusEngine, OracleRegistry, RequestKey, ResponseOutcome};
use surety_shared::models::events::{
    AirlineStateChangedEvent, InsurancePurchasedEvent, PayoutWithdrawnEvent,
};
use surety_shared::{AccountId, AirlineState, FlightKey, FlightStatus, LedgerEvent, Wei};

/// The whole ledger state. Every mutating call names the orchestrator it
/// arrives through; the call is rejected unless that orchestrator is
/// authorized and the ledger is operational.
///
/// Preconditions are checked before anything is written, so a failed call
/// leaves no partial state and queues no events.
pub struct Ledger {
    auth: AuthorizationLedger,
    airlines: AirlineRegistry,
    oracles: OracleRegistry,
    consensus: ConsensusEngine,
    schedule: FlightSchedule,
    escrow: InsuranceLedger,
    entropy: Box<dyn IndexSource>,
    outbox: Vec<LedgerEvent>,
}

impl Ledger {
    /// Build a ledger administered by `admin`, who is also the founding airline
    pub fn new(
        config: &LedgerConfig,
        admin: AccountId,
        founding_airline_name: String,
        entropy: Box<dyn IndexSource>,
    ) -> SuretyResult<Self> {
        config.validate()?;

        Ok(Self {
            auth: AuthorizationLedger::new(admin.clone()),
            airlines: AirlineRegistry::with_founder(
                GovernanceRules::from(config),
                admin,
                founding_airline_name,
            ),
            oracles: OracleRegistry::new(config.registration_fee, config.index_buckets),
            consensus: ConsensusEngine::new(config.min_responses, config.index_buckets),
            schedule: FlightSchedule::new(),
            escrow: InsuranceLedger::new(EscrowTerms::from(config)),
            entropy,
            outbox: Vec::new(),
        })
    }

    /// Events queued by calls since the last drain
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn guard(&self, orchestrator: &AccountId) -> SuretyResult<()> {
        self.auth.ensure_operational()?;
        self.auth.ensure_authorized(orchestrator)
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    pub fn set_authorized_status(
        &mut self,
        caller: &AccountId,
        target: &AccountId,
        allowed: bool,
    ) -> SuretyResult<()> {
        self.auth.set_authorized_status(caller, target, allowed)
    }

    pub fn is_authorized(&self, target: &AccountId) -> bool {
        self.auth.is_authorized(target)
    }

    pub fn set_operating_status(&mut self, caller: &AccountId, operational: bool) -> SuretyResult<()> {
        self.auth.set_operating_status(caller, operational)
    }

    pub fn is_operational(&self) -> bool {
        self.auth.is_operational()
    }

    pub fn admin(&self) -> &AccountId {
        self.auth.admin()
    }

    // ------------------------------------------------------------------
    // Airline governance
    // ------------------------------------------------------------------

    pub fn apply_for_airline(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        name: String,
    ) -> SuretyResult<AirlineState> {
        self.guard(orchestrator)?;
        let state = self.airlines.apply(caller, name)?.state;
        self.airline_changed(caller, state);
        Ok(state)
    }

    pub fn approve_airline(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        target: &AccountId,
    ) -> SuretyResult<ApprovalOutcome> {
        self.guard(orchestrator)?;
        let outcome = self.airlines.approve(caller, target)?;
        if outcome == ApprovalOutcome::Approved {
            self.airline_changed(target, AirlineState::Approved);
        }
        Ok(outcome)
    }

    /// Fund an approved airline; the whole value backs the escrow
    pub fn pay_airline_due(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        value: Wei,
    ) -> SuretyResult<AirlineState> {
        self.guard(orchestrator)?;
        let credited = self.airlines.pay_due(caller, value)?;
        self.escrow.deposit(credited);
        self.airline_changed(caller, AirlineState::Funded);
        Ok(AirlineState::Funded)
    }

    pub fn airline_state(&self, id: &AccountId) -> SuretyResult<AirlineState> {
        self.airlines.state_of(id)
    }

    pub fn airline(&self, id: &AccountId) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn funded_airline_count(&self) -> usize {
        self.airlines.funded_count()
    }

    pub fn airline_due(&self) -> Wei {
        self.airlines.rules().airline_due
    }

    fn airline_changed(&mut self, airline: &AccountId, state: AirlineState) {
        self.outbox
            .push(LedgerEvent::AirlineStateChanged(AirlineStateChangedEvent {
                airline: airline.clone(),
                state,
            }));
    }

    // ------------------------------------------------------------------
    // Flight schedule
    // ------------------------------------------------------------------

    /// Schedule a flight operated by the calling (funded) airline
    pub fn register_flight(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        flight: String,
        timestamp: i64,
    ) -> SuretyResult<usize> {
        self.guard(orchestrator)?;
        self.airlines.ensure_funded(caller, "register flight")?;
        self.schedule
            .register(FlightKey::new(caller.clone(), flight, timestamp))
    }

    pub fn flight(&self, position: usize) -> Option<&Flight> {
        self.schedule.get(position)
    }

    pub fn flights(&self) -> impl Iterator<Item = &Flight> {
        self.schedule.iter()
    }

    pub fn flights_count(&self) -> usize {
        self.schedule.len()
    }

    pub fn flight_status(&self, flight: &FlightKey) -> FlightStatus {
        self.schedule.status(flight)
    }

    // ------------------------------------------------------------------
    // Oracles and status consensus
    // ------------------------------------------------------------------

    pub fn register_oracle(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        value: Wei,
    ) -> SuretyResult<[u8; 3]> {
        self.guard(orchestrator)?;
        self.oracles.register(caller, value, self.entropy.as_mut())
    }

    pub fn oracle_indexes(&self, caller: &AccountId) -> SuretyResult<[u8; 3]> {
        self.oracles.indexes_of(caller)
    }

    pub fn registration_fee(&self) -> Wei {
        self.oracles.registration_fee()
    }

    pub fn oracle_count(&self) -> usize {
        self.oracles.len()
    }

    /// Ask oracles for the status of `flight`; returns the index bucket asked.
    ///
    /// A round still awaiting quorum is reused. Otherwise a new round starts
    /// and the flight's status goes back to `Unknown` until it resolves.
    pub fn fetch_flight_status(
        &mut self,
        orchestrator: &AccountId,
        flight: FlightKey,
    ) -> SuretyResult<u8> {
        self.guard(orchestrator)?;
        let round = self.consensus.open_round(flight, self.entropy.as_mut());
        if !round.reused {
            self.schedule.reset_status(&round.key.flight);
        }

        self.outbox
            .push(LedgerEvent::oracle_request(round.key.index, &round.key.flight));
        Ok(round.key.index)
    }

    pub fn submit_oracle_response(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
    ) -> SuretyResult<ResponseOutcome> {
        self.guard(orchestrator)?;
        self.oracles.ensure_holds(caller, index)?;

        let key = RequestKey::new(index, flight);
        let outcome = self.consensus.submit(caller, &key, status)?;
        self.outbox.push(LedgerEvent::oracle_report(&key.flight, status));

        if let Some(resolved) = outcome.finalized {
            self.schedule.record_status(&key.flight, resolved);
            self.outbox
                .push(LedgerEvent::flight_status_info(&key.flight, resolved));
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Insurance escrow
    // ------------------------------------------------------------------

    pub fn purchase_insurance(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        flight: FlightKey,
        value: Wei,
    ) -> SuretyResult<Insurance> {
        self.guard(orchestrator)?;
        let policy = self.escrow.purchase(caller, &flight, value)?.clone();

        self.outbox
            .push(LedgerEvent::InsurancePurchased(InsurancePurchasedEvent {
                passenger: caller.clone(),
                flight,
                price: policy.price,
                payout_price: policy.payout_price,
            }));
        Ok(policy)
    }

    pub fn insurance(&self, passenger: &AccountId, flight: &FlightKey) -> SuretyResult<Insurance> {
        self.escrow
            .insurance(passenger, flight)
            .cloned()
            .ok_or_else(|| SuretyError::NotFound(format!("insurance of {} on {}", passenger, flight)))
    }

    /// Release the payout for a delayed flight to the insured caller
    pub fn withdraw_payout(
        &mut self,
        orchestrator: &AccountId,
        caller: &AccountId,
        flight: &FlightKey,
    ) -> SuretyResult<Payout> {
        self.guard(orchestrator)?;
        let status = self.schedule.status(flight);
        let payout = self.escrow.withdraw(caller, flight, status)?;

        self.outbox
            .push(LedgerEvent::PayoutWithdrawn(PayoutWithdrawnEvent {
                passenger: payout.passenger.clone(),
                flight: payout.flight.clone(),
                amount: payout.amount,
            }));
        Ok(payout)
    }

    pub fn max_insurance_amount(&self) -> Wei {
        self.escrow.terms().max_insurance_amount
    }

    pub fn escrow_balance(&self) -> Wei {
        self.escrow.balance()
    }

    pub fn outstanding_liability(&self) -> Wei {
        self.escrow.outstanding_liability()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: Wei = 1_000_000_000_000_000_000;

    /// Hands out indexes round-robin so every bucket is held by the same number of oracles
    struct Cycle {
        next: u8,
    }

    impl IndexSource for Cycle {
        fn next_index(&mut self, buckets: u8) -> u8 {
            let index = self.next % buckets;
            self.next = self.next.wrapping_add(1);
            index
        }
    }

    fn admin() -> AccountId {
        AccountId::from("admin")
    }

    fn app() -> AccountId {
        AccountId::from("app")
    }

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new(
            &LedgerConfig::default(),
            admin(),
            "Founding Airline".to_string(),
            Box::new(Cycle { next: 0 }),
        )
        .unwrap();
        ledger.set_authorized_status(&admin(), &app(), true).unwrap();
        ledger
    }

    fn flight() -> FlightKey {
        FlightKey::new(admin(), "ND1309".to_string(), 1_700_000_000)
    }

    /// Registers ten oracles; with round-robin draws each bucket has three holders
    fn with_oracles(ledger: &mut Ledger) -> Vec<AccountId> {
        (0..10)
            .map(|n| {
                let oracle = AccountId::new(format!("oracle-{}", n));
                ledger.register_oracle(&app(), &oracle, UNIT).unwrap();
                oracle
            })
            .collect()
    }

    fn holders(ledger: &Ledger, oracles: &[AccountId], index: u8) -> Vec<AccountId> {
        oracles
            .iter()
            .filter(|oracle| ledger.oracle_indexes(oracle).unwrap().contains(&index))
            .cloned()
            .collect()
    }

    #[test]
    fn test_calls_require_authorized_orchestrator() {
        let mut ledger = ledger();
        let stranger = AccountId::from("stranger");

        let result = ledger.apply_for_airline(&stranger, &AccountId::from("a1"), "A1".to_string());
        assert_eq!(result, Err(SuretyError::Unauthorized(stranger.clone())));

        // Only the admin manages authorization
        let result = ledger.set_authorized_status(&stranger, &stranger, true);
        assert_eq!(result, Err(SuretyError::Unauthorized(stranger.clone())));

        ledger.set_authorized_status(&admin(), &app(), false).unwrap();
        assert!(!ledger.is_authorized(&app()));
        let result = ledger.register_oracle(&app(), &AccountId::from("o"), UNIT);
        assert_eq!(result, Err(SuretyError::Unauthorized(app())));
    }

    #[test]
    fn test_paused_ledger_rejects_mutations() {
        let mut ledger = ledger();
        ledger.set_operating_status(&admin(), false).unwrap();

        let result = ledger.fetch_flight_status(&app(), flight());
        assert_eq!(result, Err(SuretyError::NotOperational));
        assert_eq!(ledger.flight_status(&flight()), FlightStatus::Unknown);

        // Reads keep working
        assert_eq!(ledger.airline_state(&admin()).unwrap(), AirlineState::Funded);

        ledger.set_operating_status(&admin(), true).unwrap();
        assert!(ledger.fetch_flight_status(&app(), flight()).is_ok());
    }

    #[test]
    fn test_airline_funding_backs_escrow() {
        let mut ledger = ledger();
        let airline = AccountId::from("airline-2");

        ledger.apply_for_airline(&app(), &airline, "Second".to_string()).unwrap();
        let outcome = ledger.approve_airline(&app(), &admin(), &airline).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Approved);

        let state = ledger.pay_airline_due(&app(), &airline, 10 * UNIT).unwrap();
        assert_eq!(state, AirlineState::Funded);
        assert_eq!(ledger.escrow_balance(), 10 * UNIT);
        assert_eq!(ledger.funded_airline_count(), 2);

        let kinds: Vec<&str> = ledger.drain_events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["AirlineStateChanged"; 3]);
    }

    #[test]
    fn test_only_funded_airlines_register_flights() {
        let mut ledger = ledger();
        let applicant = AccountId::from("airline-2");
        ledger.apply_for_airline(&app(), &applicant, "Second".to_string()).unwrap();

        let result = ledger.register_flight(&app(), &applicant, "X1".to_string(), 1);
        assert!(matches!(result, Err(SuretyError::InvalidState { .. })));

        let result = ledger.register_flight(&app(), &AccountId::from("nobody"), "X1".to_string(), 1);
        assert!(matches!(result, Err(SuretyError::NotFound(_))));

        let position = ledger
            .register_flight(&app(), &admin(), "ND1309".to_string(), 1_700_000_000)
            .unwrap();
        assert_eq!(position, 0);
        assert_eq!(ledger.flights_count(), 1);
        assert_eq!(ledger.flight(0).unwrap().key, flight());
    }

    #[test]
    fn test_delayed_flight_pays_out() {
        let mut ledger = ledger();
        let passenger = AccountId::from("passenger");
        let oracles = with_oracles(&mut ledger);
        ledger.deposit_for_test(10 * UNIT);
        ledger
            .register_flight(&app(), &admin(), "ND1309".to_string(), 1_700_000_000)
            .unwrap();

        ledger.purchase_insurance(&app(), &passenger, flight(), UNIT).unwrap();
        let index = ledger.fetch_flight_status(&app(), flight()).unwrap();
        ledger.drain_events();

        let responders = holders(&ledger, &oracles, index);
        assert_eq!(responders.len(), 3);
        for oracle in &responders {
            ledger
                .submit_oracle_response(&app(), oracle, index, flight(), FlightStatus::LateAirline)
                .unwrap();
        }
        assert_eq!(ledger.flight_status(&flight()), FlightStatus::LateAirline);

        let events = ledger.drain_events();
        let resolved: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, LedgerEvent::FlightStatusInfo(_)))
            .collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(events.len(), 4);

        let payout = ledger.withdraw_payout(&app(), &passenger, &flight()).unwrap();
        assert_eq!(payout.amount, 3 * UNIT / 2);
        assert_eq!(ledger.escrow_balance(), 11 * UNIT - 3 * UNIT / 2);
        assert!(ledger.insurance(&passenger, &flight()).unwrap().claimed);

        let again = ledger.withdraw_payout(&app(), &passenger, &flight());
        assert!(matches!(again, Err(SuretyError::AlreadyClaimed { .. })));
    }

    #[test]
    fn test_responses_need_a_held_index() {
        let mut ledger = ledger();
        let oracles = with_oracles(&mut ledger);
        let index = ledger.fetch_flight_status(&app(), flight()).unwrap();

        let outsider = oracles
            .iter()
            .find(|oracle| !ledger.oracle_indexes(oracle).unwrap().contains(&index))
            .unwrap()
            .clone();
        let result =
            ledger.submit_oracle_response(&app(), &outsider, index, flight(), FlightStatus::OnTime);
        assert_eq!(result, Err(SuretyError::IndexMismatch { oracle: outsider, index }));

        let unregistered = AccountId::from("ghost");
        let result =
            ledger.submit_oracle_response(&app(), &unregistered, index, flight(), FlightStatus::OnTime);
        assert!(matches!(result, Err(SuretyError::IndexMismatch { .. })));
    }

    #[test]
    fn test_refetch_resets_resolved_status() {
        let mut ledger = ledger();
        let oracles = with_oracles(&mut ledger);

        let index = ledger.fetch_flight_status(&app(), flight()).unwrap();
        // An unresolved round is reused
        assert_eq!(ledger.fetch_flight_status(&app(), flight()).unwrap(), index);

        for oracle in holders(&ledger, &oracles, index) {
            ledger
                .submit_oracle_response(&app(), &oracle, index, flight(), FlightStatus::OnTime)
                .unwrap();
        }
        assert_eq!(ledger.flight_status(&flight()), FlightStatus::OnTime);

        ledger.fetch_flight_status(&app(), flight()).unwrap();
        assert_eq!(ledger.flight_status(&flight()), FlightStatus::Unknown);
    }

    #[test]
    fn test_status_requests_do_not_schedule_flights() {
        let mut ledger = ledger();
        let oracles = with_oracles(&mut ledger);

        for n in 0..50 {
            let bogus = FlightKey::new(AccountId::from("nobody"), format!("BOGUS{}", n), n);
            ledger.fetch_flight_status(&app(), bogus).unwrap();
        }
        assert_eq!(ledger.flights_count(), 0);
        assert!(ledger.flight(0).is_none());

        // A resolved round on an unscheduled key still records its status
        let index = ledger.fetch_flight_status(&app(), flight()).unwrap();
        for oracle in holders(&ledger, &oracles, index) {
            ledger
                .submit_oracle_response(&app(), &oracle, index, flight(), FlightStatus::LateOther)
                .unwrap();
        }
        assert_eq!(ledger.flights_count(), 0);
        assert_eq!(ledger.flight_status(&flight()), FlightStatus::LateOther);
    }

    #[test]
    fn test_rejected_call_queues_no_events() {
        let mut ledger = ledger();
        ledger.drain_events();

        let result = ledger.purchase_insurance(&app(), &AccountId::from("p"), flight(), 2 * UNIT);
        assert!(matches!(result, Err(SuretyError::AmountOutOfRange { .. })));
        assert_eq!(ledger.escrow_balance(), 0);
        assert!(ledger.drain_events().is_empty());
    }

    impl Ledger {
        fn deposit_for_test(&mut self, amount: Wei) {
            self.escrow.deposit(amount);
        }
    }
}
