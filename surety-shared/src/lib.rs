pub mod models;
pub mod units;

pub use models::{AccountId, AirlineState, FlightKey, FlightStatus, Wei};
pub use models::events::LedgerEvent;
