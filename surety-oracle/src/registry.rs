use crate::models::Oracle;
use chrono::Utc;
use std::collections::HashMap;
use surety_core::entropy::distinct_indexes;
use surety_core::{IndexSource, SuretyError, SuretyResult};
use surety_shared::{AccountId, Wei};
use tracing::info;

/// Fee-gated oracle registration with random index assignment
pub struct OracleRegistry {
    oracles: HashMap<AccountId, Oracle>,
    registration_fee: Wei,
    index_buckets: u8,
    fees_collected: Wei,
}

impl OracleRegistry {
    pub fn new(registration_fee: Wei, index_buckets: u8) -> Self {
        Self {
            oracles: HashMap::new(),
            registration_fee,
            index_buckets,
            fees_collected: 0,
        }
    }

    pub fn registration_fee(&self) -> Wei {
        self.registration_fee
    }

    pub fn index_buckets(&self) -> u8 {
        self.index_buckets
    }

    pub fn fees_collected(&self) -> Wei {
        self.fees_collected
    }

    /// Register `caller` as an oracle and assign three distinct indexes
    pub fn register(
        &mut self,
        caller: &AccountId,
        value: Wei,
        source: &mut dyn IndexSource,
    ) -> SuretyResult<[u8; 3]> {
        if value < self.registration_fee {
            return Err(SuretyError::InsufficientValue {
                required: self.registration_fee,
                provided: value,
            });
        }
        if self.oracles.contains_key(caller) {
            return Err(SuretyError::invalid_state("register oracle", caller, "REGISTERED"));
        }

        let indexes = distinct_indexes(source, self.index_buckets);
        self.oracles.insert(
            caller.clone(),
            Oracle {
                id: caller.clone(),
                indexes,
                fee_paid: true,
                registered_at: Utc::now(),
            },
        );
        self.fees_collected = self.fees_collected.saturating_add(value);

        info!(oracle = %caller, ?indexes, "Oracle registered");
        Ok(indexes)
    }

    pub fn indexes_of(&self, caller: &AccountId) -> SuretyResult<[u8; 3]> {
        self.oracles
            .get(caller)
            .map(|oracle| oracle.indexes)
            .ok_or_else(|| SuretyError::NotRegistered(caller.clone()))
    }

    /// Fails with `IndexMismatch` unless `oracle` is registered and holds `index`
    pub fn ensure_holds(&self, oracle: &AccountId, index: u8) -> SuretyResult<()> {
        match self.oracles.get(oracle) {
            Some(record) if record.holds(index) => Ok(()),
            _ => Err(SuretyError::IndexMismatch {
                oracle: oracle.clone(),
                index,
            }),
        }
    }

    pub fn get(&self, id: &AccountId) -> Option<&Oracle> {
        self.oracles.get(id)
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }
}
