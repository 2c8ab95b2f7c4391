use crate::models::{Insurance, Payout};
use chrono::Utc;
use std::collections::HashMap;
use surety_core::{LedgerConfig, SuretyError, SuretyResult};
use surety_shared::{AccountId, FlightKey, FlightStatus, Wei};
use tracing::{error, info};

/// Purchase cap and payout multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowTerms {
    pub max_insurance_amount: Wei,
    pub payout_multiplier_percent: u32,
}

impl From<&LedgerConfig> for EscrowTerms {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            max_insurance_amount: config.max_insurance_amount,
            payout_multiplier_percent: config.payout_multiplier_percent,
        }
    }
}

impl EscrowTerms {
    /// Payout owed for a premium of `price`
    pub fn payout_for(&self, price: Wei) -> Option<Wei> {
        price
            .checked_mul(Wei::from(self.payout_multiplier_percent))
            .map(|scaled| scaled / 100)
    }
}

/// Holds premiums and airline dues, and pays out delayed-flight claims.
///
/// Invariant: `balance` covers every payout handed out; a shortfall means the
/// funding invariant was broken elsewhere.
pub struct InsuranceLedger {
    policies: HashMap<(AccountId, FlightKey), Insurance>,
    balance: Wei,
    terms: EscrowTerms,
}

impl InsuranceLedger {
    pub fn new(terms: EscrowTerms) -> Self {
        Self {
            policies: HashMap::new(),
            balance: 0,
            terms,
        }
    }

    pub fn terms(&self) -> &EscrowTerms {
        &self.terms
    }

    pub fn balance(&self) -> Wei {
        self.balance
    }

    /// Credit backing funds (airline dues)
    pub fn deposit(&mut self, amount: Wei) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Buy a policy for `flight` with premium `value`
    pub fn purchase(
        &mut self,
        passenger: &AccountId,
        flight: &FlightKey,
        value: Wei,
    ) -> SuretyResult<&Insurance> {
        let max = self.terms.max_insurance_amount;
        if value == 0 || value > max {
            return Err(SuretyError::AmountOutOfRange { amount: value, max });
        }

        let policy_key = (passenger.clone(), flight.clone());
        if self.policies.contains_key(&policy_key) {
            return Err(SuretyError::DuplicatePurchase {
                passenger: passenger.clone(),
                flight: flight.to_string(),
            });
        }

        let payout_price = self
            .terms
            .payout_for(value)
            .ok_or(SuretyError::AmountOutOfRange { amount: value, max })?;

        self.balance = self.balance.saturating_add(value);
        info!(passenger = %passenger, flight = %flight, price = value, payout_price, "Insurance purchased");

        let policy = self.policies.entry(policy_key).or_insert_with(|| Insurance {
            passenger: passenger.clone(),
            flight: flight.clone(),
            price: value,
            payout_price,
            claimed: false,
            purchased_at: Utc::now(),
            claimed_at: None,
        });
        Ok(policy)
    }

    pub fn insurance(&self, passenger: &AccountId, flight: &FlightKey) -> Option<&Insurance> {
        self.policies.get(&(passenger.clone(), flight.clone()))
    }

    /// Pay out a policy on a delayed flight. Either the full payout is released
    /// and the policy marked claimed, or nothing changes.
    pub fn withdraw(
        &mut self,
        passenger: &AccountId,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> SuretyResult<Payout> {
        let available = self.balance;
        let policy = self
            .policies
            .get_mut(&(passenger.clone(), flight.clone()))
            .ok_or_else(|| SuretyError::NotFound(format!("insurance of {} on {}", passenger, flight)))?;

        if !status.is_payout_eligible() {
            return Err(SuretyError::NotEligible {
                flight: flight.to_string(),
                status,
            });
        }
        if policy.claimed {
            return Err(SuretyError::AlreadyClaimed {
                passenger: passenger.clone(),
                flight: flight.to_string(),
            });
        }
        if available < policy.payout_price {
            error!(
                passenger = %passenger,
                flight = %flight,
                required = policy.payout_price,
                available,
                "Escrow cannot cover payout"
            );
            return Err(SuretyError::InsufficientEscrowBalance {
                required: policy.payout_price,
                available,
            });
        }

        policy.claim();
        let amount = policy.payout_price;
        self.balance = available - amount;
        info!(passenger = %passenger, flight = %flight, amount, "Payout withdrawn");

        Ok(Payout {
            passenger: passenger.clone(),
            flight: flight.clone(),
            amount,
        })
    }

    /// Sum of payouts not yet claimed
    pub fn outstanding_liability(&self) -> Wei {
        self.policies
            .values()
            .filter(|policy| !policy.claimed)
            .fold(0, |total: Wei, policy| total.saturating_add(policy.payout_price))
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: Wei = 1_000_000_000_000_000_000;

    fn ledger() -> InsuranceLedger {
        InsuranceLedger::new(EscrowTerms::from(&LedgerConfig::default()))
    }

    fn passenger() -> AccountId {
        AccountId::new("passenger")
    }

    fn flight() -> FlightKey {
        FlightKey::new(AccountId::new("airline"), "ND1309", 1_700_000_000)
    }

    #[test]
    fn test_purchase_at_cap() {
        let mut ledger = ledger();
        let policy = ledger.purchase(&passenger(), &flight(), CAP).unwrap();

        assert_eq!(policy.price, CAP);
        assert_eq!(policy.payout_price, CAP + CAP / 2);
        assert!(!policy.claimed);
        assert_eq!(ledger.balance(), CAP);
        assert_eq!(ledger.outstanding_liability(), CAP + CAP / 2);
    }

    #[test]
    fn test_amount_range() {
        let mut ledger = ledger();

        let over = ledger.purchase(&passenger(), &flight(), CAP + 1);
        assert_eq!(over.err(), Some(SuretyError::AmountOutOfRange { amount: CAP + 1, max: CAP }));

        let double = ledger.purchase(&passenger(), &flight(), CAP * 2);
        assert!(matches!(double, Err(SuretyError::AmountOutOfRange { .. })));

        let zero = ledger.purchase(&passenger(), &flight(), 0);
        assert!(matches!(zero, Err(SuretyError::AmountOutOfRange { .. })));

        assert_eq!(ledger.policy_count(), 0);
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_duplicate_purchase() {
        let mut ledger = ledger();
        ledger.purchase(&passenger(), &flight(), CAP / 2).unwrap();

        let again = ledger.purchase(&passenger(), &flight(), CAP / 2);
        assert!(matches!(again, Err(SuretyError::DuplicatePurchase { .. })));
        assert_eq!(ledger.balance(), CAP / 2);

        // Another passenger on the same flight is independent
        ledger.purchase(&AccountId::new("other"), &flight(), CAP / 2).unwrap();
        assert_eq!(ledger.policy_count(), 2);
    }

    #[test]
    fn test_withdraw_once_on_delay() {
        let mut ledger = ledger();
        ledger.deposit(10 * CAP);
        ledger.purchase(&passenger(), &flight(), CAP).unwrap();

        let payout = ledger.withdraw(&passenger(), &flight(), FlightStatus::LateAirline).unwrap();
        assert_eq!(payout.amount, CAP + CAP / 2);
        assert_eq!(ledger.balance(), 11 * CAP - payout.amount);
        assert!(ledger.insurance(&passenger(), &flight()).unwrap().claimed);

        let again = ledger.withdraw(&passenger(), &flight(), FlightStatus::LateAirline);
        assert!(matches!(again, Err(SuretyError::AlreadyClaimed { .. })));
        assert_eq!(ledger.balance(), 11 * CAP - payout.amount);
        assert_eq!(ledger.outstanding_liability(), 0);
    }

    #[test]
    fn test_withdraw_requires_delay_status() {
        let mut ledger = ledger();
        ledger.deposit(10 * CAP);
        ledger.purchase(&passenger(), &flight(), CAP).unwrap();

        for status in [FlightStatus::OnTime, FlightStatus::Unknown] {
            let result = ledger.withdraw(&passenger(), &flight(), status);
            assert!(matches!(result, Err(SuretyError::NotEligible { .. })));
        }
        assert!(!ledger.insurance(&passenger(), &flight()).unwrap().claimed);
    }

    #[test]
    fn test_shortfall_pays_nothing() {
        let mut ledger = ledger();
        // premium alone cannot cover 1.5x
        ledger.purchase(&passenger(), &flight(), CAP).unwrap();

        let result = ledger.withdraw(&passenger(), &flight(), FlightStatus::LateOther);
        assert_eq!(
            result,
            Err(SuretyError::InsufficientEscrowBalance {
                required: CAP + CAP / 2,
                available: CAP,
            })
        );
        assert!(result.unwrap_err().is_fatal());
        assert_eq!(ledger.balance(), CAP);
        assert!(!ledger.insurance(&passenger(), &flight()).unwrap().claimed);
    }

    #[test]
    fn test_withdraw_without_policy() {
        let mut ledger = ledger();
        let result = ledger.withdraw(&passenger(), &flight(), FlightStatus::LateAirline);
        assert!(matches!(result, Err(SuretyError::NotFound(_))));
    }
}
