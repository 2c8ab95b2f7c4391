use crate::models::Flight;
use std::collections::HashMap;
use surety_core::{SuretyError, SuretyResult};
use surety_shared::{FlightKey, FlightStatus};
use tracing::{debug, info};

/// Flight table: scheduled flights live in insertion order and are addressed
/// by position or by composite key.
///
/// Status rounds may resolve for keys no airline scheduled. Those statuses are
/// kept aside so they never appear as rows; scheduling the key later adopts them.
#[derive(Default)]
pub struct FlightSchedule {
    flights: Vec<Flight>,
    positions: HashMap<FlightKey, usize>,
    unscheduled: HashMap<FlightKey, FlightStatus>,
}

impl FlightSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a flight. The caller has already checked the airline is funded.
    pub fn register(&mut self, key: FlightKey) -> SuretyResult<usize> {
        if self.positions.contains_key(&key) {
            return Err(SuretyError::invalid_state("register flight", &key, "SCHEDULED"));
        }

        let mut flight = Flight::new(key.clone());
        if let Some(status) = self.unscheduled.remove(&key) {
            flight.set_status(status);
        }

        let position = self.flights.len();
        self.flights.push(flight);
        self.positions.insert(key.clone(), position);
        info!(flight = %key, position, "Flight scheduled");
        Ok(position)
    }

    /// Start a new status cycle: back to `Unknown` until the next round resolves
    pub fn reset_status(&mut self, key: &FlightKey) {
        match self.positions.get(key) {
            Some(&position) => self.flights[position].set_status(FlightStatus::Unknown),
            None => {
                self.unscheduled.remove(key);
            }
        }
    }

    /// Write the status a consensus round resolved to
    pub fn record_status(&mut self, key: &FlightKey, status: FlightStatus) {
        match self.positions.get(key) {
            Some(&position) => self.flights[position].set_status(status),
            None => {
                debug!(flight = %key, %status, "Status resolved for unscheduled flight");
                self.unscheduled.insert(key.clone(), status);
            }
        }
    }

    /// Current status, `Unknown` for flights never resolved
    pub fn status(&self, key: &FlightKey) -> FlightStatus {
        match self.get_by_key(key) {
            Some(flight) => flight.status_code,
            None => self
                .unscheduled
                .get(key)
                .copied()
                .unwrap_or(FlightStatus::Unknown),
        }
    }

    pub fn get(&self, position: usize) -> Option<&Flight> {
        self.flights.get(position)
    }

    pub fn get_by_key(&self, key: &FlightKey) -> Option<&Flight> {
        self.positions.get(key).map(|&position| &self.flights[position])
    }

    pub fn is_scheduled(&self, key: &FlightKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of scheduled flights
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.flights.iter()
    }
}
