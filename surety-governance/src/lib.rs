pub mod models;
pub mod quorum;
pub mod registry;

pub use models::Airline;
pub use quorum::quorum;
pub use registry::{AirlineRegistry, ApprovalOutcome, GovernanceRules};
