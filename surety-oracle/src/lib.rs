pub mod consensus;
pub mod models;
pub mod registry;

pub use consensus::{ConsensusEngine, ResponseOutcome, RoundOpened};
pub use models::{Oracle, OracleRequest, RequestKey};
pub use registry::OracleRegistry;
