use crate::models::{OracleRequest, RequestKey};
use std::collections::HashMap;
use surety_core::{IndexSource, SuretyError, SuretyResult};
use surety_shared::{AccountId, FlightKey, FlightStatus};
use tracing::{debug, info};

/// A round handed back by `open_round`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOpened {
    pub key: RequestKey,
    /// An unfinalized round already existed for this flight
    pub reused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseOutcome {
    /// False when this (oracle, status) pair had already been counted
    pub recorded: bool,
    /// Set only on the response that carried the round over the threshold
    pub finalized: Option<FlightStatus>,
}

/// Tallies oracle responses per round and finalizes on the first status to
/// reach `min_responses`. Later responses are kept but cannot overturn it.
///
/// Rounds never time out: a round short of quorum stays open indefinitely.
pub struct ConsensusEngine {
    requests: HashMap<RequestKey, OracleRequest>,
    /// Flight → index of its currently unfinalized round
    open_rounds: HashMap<FlightKey, u8>,
    min_responses: usize,
    index_buckets: u8,
}

impl ConsensusEngine {
    pub fn new(min_responses: usize, index_buckets: u8) -> Self {
        Self {
            requests: HashMap::new(),
            open_rounds: HashMap::new(),
            min_responses,
            index_buckets,
        }
    }

    pub fn min_responses(&self) -> usize {
        self.min_responses
    }

    /// Open a round for `flight`, or hand back the one still awaiting quorum
    pub fn open_round(&mut self, flight: FlightKey, source: &mut dyn IndexSource) -> RoundOpened {
        if let Some(&index) = self.open_rounds.get(&flight) {
            debug!(flight = %flight, index, "Reusing open oracle round");
            return RoundOpened {
                key: RequestKey::new(index, flight),
                reused: true,
            };
        }

        let index = source.next_index(self.index_buckets);
        let key = RequestKey::new(index, flight.clone());
        let request = OracleRequest::new(key.clone());
        info!(flight = %flight, index, request_id = %request.id, "Oracle round opened");

        self.requests.insert(key.clone(), request);
        self.open_rounds.insert(flight, index);
        RoundOpened { key, reused: false }
    }

    /// Count `oracle`'s report of `status` for the round at `key`.
    ///
    /// Caller is responsible for checking the oracle holds `key.index`.
    pub fn submit(
        &mut self,
        oracle: &AccountId,
        key: &RequestKey,
        status: FlightStatus,
    ) -> SuretyResult<ResponseOutcome> {
        let min_responses = self.min_responses;
        let request = self.requests.get_mut(key).ok_or_else(|| {
            SuretyError::NotFound(format!("oracle request {} at index {}", key.flight, key.index))
        })?;

        let (recorded, count) = request.record(oracle, status);
        debug!(oracle = %oracle, flight = %key.flight, %status, count, recorded, "Oracle response");

        if request.finalized || count < min_responses {
            return Ok(ResponseOutcome {
                recorded,
                finalized: None,
            });
        }

        request.finalize(status);
        self.open_rounds.remove(&key.flight);
        info!(flight = %key.flight, index = key.index, %status, "Oracle round finalized");

        Ok(ResponseOutcome {
            recorded,
            finalized: Some(status),
        })
    }

    pub fn request(&self, key: &RequestKey) -> Option<&OracleRequest> {
        self.requests.get(key)
    }

    /// Index of the round still awaiting quorum for `flight`, if any
    pub fn open_index(&self, flight: &FlightKey) -> Option<u8> {
        self.open_rounds.get(flight).copied()
    }
}
