pub mod authorization;
pub mod config;
pub mod entropy;
pub mod error;

pub use authorization::AuthorizationLedger;
pub use config::LedgerConfig;
pub use entropy::{IndexSource, OsIndexSource, SeededIndexSource};
pub use error::{SuretyError, SuretyResult};
