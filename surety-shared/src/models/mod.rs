use serde::{Deserialize, Serialize};
use std::fmt;

pub mod events;

/// Amount of native value in the ledger's smallest unit.
pub type Wei = u128;

/// Opaque account identity supplied by the host environment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Airline membership lifecycle. Only ever advances Applied → Approved → Funded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirlineState {
    Applied,
    Approved,
    Funded,
}

impl AirlineState {
    /// Numeric code used by external callers (0, 1, 2)
    pub fn code(self) -> u8 {
        match self {
            AirlineState::Applied => 0,
            AirlineState::Approved => 1,
            AirlineState::Funded => 2,
        }
    }
}

impl fmt::Display for AirlineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AirlineState::Applied => "APPLIED",
            AirlineState::Approved => "APPROVED",
            AirlineState::Funded => "FUNDED",
        };
        f.write_str(label)
    }
}

/// Resolved status of a flight as reported by oracles.
///
/// Serialized as the numeric status code (0, 10, 20, 30, 40, 50).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum FlightStatus {
    #[default]
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    pub fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Delay codes entitle insured passengers to a payout
    pub fn is_payout_eligible(self) -> bool {
        matches!(
            self,
            FlightStatus::LateAirline
                | FlightStatus::LateWeather
                | FlightStatus::LateTechnical
                | FlightStatus::LateOther
        )
    }
}

impl TryFrom<u8> for FlightStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(UnknownStatusCode(code))
    }
}

impl From<FlightStatus> for u8 {
    fn from(status: FlightStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unknown flight status code: {0}")]
pub struct UnknownStatusCode(pub u8);

/// Composite identity of a scheduled flight
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: AccountId,
    pub flight: String,
    /// Departure time, unix seconds
    pub timestamp: i64,
}

impl FlightKey {
    pub fn new(airline: AccountId, flight: impl Into<String>, timestamp: i64) -> Self {
        Self {
            airline,
            flight: flight.into(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.flight, self.timestamp)
    }
}
