use crate::orchestrator::FlightSuretyApp;
use std::sync::Arc;
use surety_store::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub surety: Arc<FlightSuretyApp>,
    pub events: EventBus,
}

impl AppState {
    pub fn new(surety: Arc<FlightSuretyApp>) -> Self {
        let events = surety.events().clone();
        Self { surety, events }
    }
}
