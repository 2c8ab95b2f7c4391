use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use surety_shared::{AccountId, FlightKey, FlightStatus};

/// A registered status reporter. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oracle {
    pub id: AccountId,
    /// Three pairwise-distinct buckets this oracle answers for
    pub indexes: [u8; 3],
    pub fee_paid: bool,
    pub registered_at: DateTime<Utc>,
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Identity of one consensus round
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub index: u8,
    pub flight: FlightKey,
}

impl RequestKey {
    pub fn new(index: u8, flight: FlightKey) -> Self {
        Self { index, flight }
    }
}

/// One status round for a flight, answered by oracles holding `index`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    pub id: Uuid,
    pub key: RequestKey,
    /// Oracles that reported each status
    pub responses: BTreeMap<FlightStatus, BTreeSet<AccountId>>,
    pub finalized: bool,
    /// Status that reached quorum first, once finalized
    pub outcome: Option<FlightStatus>,
    pub opened_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl OracleRequest {
    pub fn new(key: RequestKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            responses: BTreeMap::new(),
            finalized: false,
            outcome: None,
            opened_at: Utc::now(),
            finalized_at: None,
        }
    }

    /// Record a response, returning whether it was new and the bucket size.
    /// Repeating the same (oracle, status) pair does not count twice.
    pub fn record(&mut self, oracle: &AccountId, status: FlightStatus) -> (bool, usize) {
        let bucket = self.responses.entry(status).or_default();
        let added = bucket.insert(oracle.clone());
        (added, bucket.len())
    }

    pub fn finalize(&mut self, status: FlightStatus) {
        self.finalized = true;
        self.outcome = Some(status);
        self.finalized_at = Some(Utc::now());
    }

    pub fn response_count(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map_or(0, |bucket| bucket.len())
    }
}
