use surety_shared::{AccountId, FlightStatus, Wei};

/// Every failure the ledger can surface to a caller.
///
/// All of these are raised before any state is written, so a failed call
/// leaves the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuretyError {
    #[error("Caller is not authorized: {0}")]
    Unauthorized(AccountId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot {operation} while {subject} is {state}")]
    InvalidState {
        operation: &'static str,
        subject: String,
        state: String,
    },

    #[error("Insufficient value: required {required}, provided {provided}")]
    InsufficientValue { required: Wei, provided: Wei },

    #[error("Amount {amount} outside of (0, {max}]")]
    AmountOutOfRange { amount: Wei, max: Wei },

    #[error("Insurance already purchased by {passenger} for {flight}")]
    DuplicatePurchase { passenger: AccountId, flight: String },

    #[error("Airline already applied: {0}")]
    DuplicateApplication(AccountId),

    #[error("Oracle {oracle} does not hold index {index}")]
    IndexMismatch { oracle: AccountId, index: u8 },

    #[error("Flight {flight} is not eligible for payout (status {status})")]
    NotEligible { flight: String, status: FlightStatus },

    #[error("Payout already claimed by {passenger} for {flight}")]
    AlreadyClaimed { passenger: AccountId, flight: String },

    #[error("Escrow balance {available} cannot cover payout of {required}")]
    InsufficientEscrowBalance { required: Wei, available: Wei },

    #[error("Oracle not registered: {0}")]
    NotRegistered(AccountId),

    #[error("Ledger is not operational")]
    NotOperational,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SuretyError {
    /// The escrow funding invariant is broken; operators must be alerted
    pub fn is_fatal(&self) -> bool {
        matches!(self, SuretyError::InsufficientEscrowBalance { .. })
    }

    pub fn invalid_state(
        operation: &'static str,
        subject: impl ToString,
        state: impl ToString,
    ) -> Self {
        SuretyError::InvalidState {
            operation,
            subject: subject.to_string(),
            state: state.to_string(),
        }
    }
}

pub type SuretyResult<T> = Result<T, SuretyError>;
