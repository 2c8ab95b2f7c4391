pub mod ledger;
pub mod models;
pub mod schedule;

pub use ledger::{EscrowTerms, InsuranceLedger};
pub use models::{Flight, Insurance, Payout};
pub use schedule::FlightSchedule;
