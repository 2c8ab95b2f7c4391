use serde::{Deserialize, Serialize};
use surety_shared::Wei;

use crate::error::{SuretyError, SuretyResult};

const ONE_UNIT: Wei = 1_000_000_000_000_000_000;

/// Ledger-wide constants, in base units where monetary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Minimum value an approved airline must pay to become funded
    pub airline_due: Wei,

    /// Cap on a single insurance purchase
    pub max_insurance_amount: Wei,

    /// Fee an oracle pays to register
    pub registration_fee: Wei,

    /// Matching responses needed to finalize a round
    pub min_responses: usize,

    /// Number of oracle index buckets (indexes fall in `[0, index_buckets)`)
    pub index_buckets: u8,

    /// Funded-airline count from which approvals need multiparty consensus
    pub bootstrap_threshold: usize,

    /// Payout as a percentage of the premium
    pub payout_multiplier_percent: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            airline_due: 10 * ONE_UNIT,
            max_insurance_amount: ONE_UNIT,
            registration_fee: ONE_UNIT,
            min_responses: 3,
            index_buckets: 10,
            bootstrap_threshold: 5,
            payout_multiplier_percent: 150,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> SuretyResult<()> {
        // each oracle needs three distinct indexes
        if self.index_buckets < 3 {
            return Err(SuretyError::InvalidConfig(format!(
                "index_buckets must be at least 3, got {}",
                self.index_buckets
            )));
        }
        if self.min_responses == 0 {
            return Err(SuretyError::InvalidConfig(
                "min_responses must be positive".to_string(),
            ));
        }
        if self.max_insurance_amount == 0 {
            return Err(SuretyError::InvalidConfig(
                "max_insurance_amount must be positive".to_string(),
            ));
        }
        if self.payout_multiplier_percent < 100 {
            return Err(SuretyError::InvalidConfig(format!(
                "payout_multiplier_percent must be at least 100, got {}",
                self.payout_multiplier_percent
            )));
        }
        Ok(())
    }
}
