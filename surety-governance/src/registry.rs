use crate::models::Airline;
use crate::quorum::quorum;
use std::collections::HashMap;
use surety_core::{LedgerConfig, SuretyError, SuretyResult};
use surety_shared::{AccountId, AirlineState, Wei};
use tracing::{debug, info};

/// Membership rules taken from the ledger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernanceRules {
    pub airline_due: Wei,
    pub bootstrap_threshold: usize,
}

impl From<&LedgerConfig> for GovernanceRules {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            airline_due: config.airline_due,
            bootstrap_threshold: config.bootstrap_threshold,
        }
    }
}

/// Result of a single approval vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Vote recorded, target still short of quorum
    Pending { approvals: usize, required: usize },
    /// This vote carried the target to `Approved`
    Approved,
    /// Target was already past `Applied`; nothing changed
    Unchanged(AirlineState),
}

/// Manages airline lifecycle and multiparty admission votes
pub struct AirlineRegistry {
    airlines: HashMap<AccountId, Airline>,
    rules: GovernanceRules,
}

impl AirlineRegistry {
    pub fn new(rules: GovernanceRules) -> Self {
        Self {
            airlines: HashMap::new(),
            rules,
        }
    }

    /// Registry seeded with a founding member that is already funded
    pub fn with_founder(rules: GovernanceRules, founder: AccountId, name: String) -> Self {
        let mut registry = Self::new(rules);
        info!(airline = %founder, "Founding airline registered");
        registry
            .airlines
            .insert(founder.clone(), Airline::founder(founder, name));
        registry
    }

    pub fn rules(&self) -> &GovernanceRules {
        &self.rules
    }

    /// Create an application in `Applied` state keyed by the caller
    pub fn apply(&mut self, caller: &AccountId, name: String) -> SuretyResult<&Airline> {
        if self.airlines.contains_key(caller) {
            return Err(SuretyError::DuplicateApplication(caller.clone()));
        }

        info!(airline = %caller, name = %name, "Airline applied");
        let airline = self
            .airlines
            .entry(caller.clone())
            .or_insert_with(|| Airline::new(caller.clone(), name));
        Ok(airline)
    }

    /// Cast `voter`'s approval for `target`.
    ///
    /// Votes are one per voter per target; a repeated vote is ignored.
    pub fn approve(&mut self, voter: &AccountId, target: &AccountId) -> SuretyResult<ApprovalOutcome> {
        let voter_state = self.state_of(voter)?;
        if voter_state != AirlineState::Funded {
            return Err(SuretyError::invalid_state("approve airlines", voter, voter_state));
        }

        let required = quorum(self.funded_count(), self.rules.bootstrap_threshold);
        let airline = self.get_airline_mut(target)?;

        if airline.state != AirlineState::Applied {
            return Ok(ApprovalOutcome::Unchanged(airline.state));
        }

        if !airline.add_approval(voter.clone()) {
            debug!(voter = %voter, target = %target, "Repeated approval ignored");
        }

        let approvals = airline.approvals.len();
        if approvals >= required {
            airline.advance(AirlineState::Approved);
            info!(airline = %target, approvals, required, "Airline approved");
            Ok(ApprovalOutcome::Approved)
        } else {
            debug!(airline = %target, approvals, required, "Approval recorded, awaiting quorum");
            Ok(ApprovalOutcome::Pending { approvals, required })
        }
    }

    /// Transition: Approved → Funded once at least the due is paid.
    ///
    /// Returns the value to credit to escrow. Overpayment is kept, not refunded.
    pub fn pay_due(&mut self, caller: &AccountId, value: Wei) -> SuretyResult<Wei> {
        let due = self.rules.airline_due;
        let airline = self.get_airline_mut(caller)?;

        if airline.state != AirlineState::Approved {
            return Err(SuretyError::invalid_state("pay dues", caller, airline.state));
        }
        if value < due {
            return Err(SuretyError::InsufficientValue {
                required: due,
                provided: value,
            });
        }

        airline.due_paid = true;
        airline.advance(AirlineState::Funded);
        info!(airline = %caller, value, "Airline funded");
        Ok(value)
    }

    pub fn get(&self, id: &AccountId) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn state_of(&self, id: &AccountId) -> SuretyResult<AirlineState> {
        self.airlines
            .get(id)
            .map(|airline| airline.state)
            .ok_or_else(|| SuretyError::NotFound(format!("airline {}", id)))
    }

    /// Fails unless `id` is a funded member
    pub fn ensure_funded(&self, id: &AccountId, operation: &'static str) -> SuretyResult<()> {
        match self.state_of(id)? {
            AirlineState::Funded => Ok(()),
            state => Err(SuretyError::invalid_state(operation, id, state)),
        }
    }

    pub fn funded_count(&self) -> usize {
        self.airlines
            .values()
            .filter(|airline| airline.state == AirlineState::Funded)
            .count()
    }

    pub fn len(&self) -> usize {
        self.airlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airlines.is_empty()
    }

    fn get_airline_mut(&mut self, id: &AccountId) -> SuretyResult<&mut Airline> {
        self.airlines
            .get_mut(id)
            .ok_or_else(|| SuretyError::NotFound(format!("airline {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUE: Wei = 10;

    fn rules() -> GovernanceRules {
        GovernanceRules {
            airline_due: DUE,
            bootstrap_threshold: 5,
        }
    }

    fn account(n: usize) -> AccountId {
        AccountId::new(format!("airline-{}", n))
    }

    /// Founder plus `extra` funded members
    fn federation(extra: usize) -> AirlineRegistry {
        let mut registry = AirlineRegistry::with_founder(rules(), account(0), "Founder".to_string());
        for n in 1..=extra {
            registry.apply(&account(n), format!("Airline {}", n)).unwrap();
            for voter in 0..n {
                registry.approve(&account(voter), &account(n)).unwrap();
            }
            registry.pay_due(&account(n), DUE).unwrap();
        }
        registry
    }

    #[test]
    fn test_airline_lifecycle() {
        let mut registry = federation(0);
        let applicant = account(1);

        registry.apply(&applicant, "Second airline".to_string()).unwrap();
        assert_eq!(registry.state_of(&applicant).unwrap(), AirlineState::Applied);

        // Applied → Approved
        let outcome = registry.approve(&account(0), &applicant).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Approved);
        assert_eq!(registry.state_of(&applicant).unwrap(), AirlineState::Approved);

        // Approved → Funded
        let credited = registry.pay_due(&applicant, DUE + 3).unwrap();
        assert_eq!(credited, DUE + 3);
        assert_eq!(registry.state_of(&applicant).unwrap(), AirlineState::Funded);
        assert!(registry.get(&applicant).unwrap().due_paid);
        assert_eq!(registry.funded_count(), 2);
    }

    #[test]
    fn test_duplicate_application() {
        let mut registry = federation(0);
        registry.apply(&account(1), "A".to_string()).unwrap();

        let result = registry.apply(&account(1), "A again".to_string());
        assert_eq!(result.err(), Some(SuretyError::DuplicateApplication(account(1))));
        assert_eq!(registry.get(&account(1)).unwrap().name, "A");
    }

    #[test]
    fn test_single_approval_below_bootstrap_threshold() {
        // founder + 3 funded = 4 members
        let mut registry = federation(3);
        assert_eq!(registry.funded_count(), 4);

        registry.apply(&account(4), "Fifth airline".to_string()).unwrap();
        let outcome = registry.approve(&account(2), &account(4)).unwrap();

        assert_eq!(outcome, ApprovalOutcome::Approved);
        assert_eq!(registry.state_of(&account(4)).unwrap(), AirlineState::Approved);
    }

    #[test]
    fn test_multiparty_consensus_at_threshold() {
        let mut registry = federation(4);
        assert_eq!(registry.funded_count(), 5);
        let target = account(5);
        registry.apply(&target, "Sixth airline".to_string()).unwrap();

        let outcome = registry.approve(&account(0), &target).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Pending { approvals: 1, required: 3 });

        // Re-vote is ignored
        let outcome = registry.approve(&account(0), &target).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Pending { approvals: 1, required: 3 });

        registry.approve(&account(1), &target).unwrap();
        assert_eq!(registry.state_of(&target).unwrap(), AirlineState::Applied);

        let outcome = registry.approve(&account(2), &target).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Approved);
        assert_eq!(registry.state_of(&target).unwrap(), AirlineState::Approved);
    }

    #[test]
    fn test_approving_past_applied_is_noop() {
        let mut registry = federation(1);

        let outcome = registry.approve(&account(0), &account(1)).unwrap();
        assert_eq!(outcome, ApprovalOutcome::Unchanged(AirlineState::Funded));
        assert_eq!(registry.state_of(&account(1)).unwrap(), AirlineState::Funded);
    }

    #[test]
    fn test_only_funded_airlines_vote() {
        let mut registry = federation(0);
        registry.apply(&account(1), "A".to_string()).unwrap();
        registry.apply(&account(2), "B".to_string()).unwrap();

        let result = registry.approve(&account(1), &account(2));
        assert!(matches!(result, Err(SuretyError::InvalidState { .. })));

        let result = registry.approve(&account(9), &account(2));
        assert!(matches!(result, Err(SuretyError::NotFound(_))));

        let result = registry.approve(&account(0), &account(9));
        assert!(matches!(result, Err(SuretyError::NotFound(_))));
    }

    #[test]
    fn test_due_payment_rules() {
        let mut registry = federation(0);
        registry.apply(&account(1), "A".to_string()).unwrap();

        // Cannot pay while still Applied
        let result = registry.pay_due(&account(1), DUE);
        assert!(matches!(result, Err(SuretyError::InvalidState { .. })));

        registry.approve(&account(0), &account(1)).unwrap();
        let result = registry.pay_due(&account(1), DUE - 1);
        assert_eq!(
            result,
            Err(SuretyError::InsufficientValue { required: DUE, provided: DUE - 1 })
        );
        assert_eq!(registry.state_of(&account(1)).unwrap(), AirlineState::Approved);

        registry.pay_due(&account(1), DUE).unwrap();

        // Funded airlines cannot pay again
        let result = registry.pay_due(&account(1), DUE);
        assert!(matches!(result, Err(SuretyError::InvalidState { .. })));
    }

    #[test]
    fn test_state_never_regresses() {
        let mut registry = federation(5);
        let snapshot: Vec<AirlineState> = (0..=5)
            .map(|n| registry.state_of(&account(n)).unwrap())
            .collect();

        // Every operation against existing members either fails or is a no-op
        for n in 0..=5 {
            let _ = registry.apply(&account(n), "again".to_string());
            let _ = registry.approve(&account(0), &account(n));
            let _ = registry.pay_due(&account(n), DUE);
        }

        for (n, before) in snapshot.into_iter().enumerate() {
            assert_eq!(registry.state_of(&account(n)).unwrap(), before);
        }

        let mut airline = Airline::new(account(99), "x".to_string());
        airline.advance(AirlineState::Funded);
        airline.advance(AirlineState::Applied);
        assert_eq!(airline.state, AirlineState::Funded);
    }
}
