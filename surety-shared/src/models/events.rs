use serde::{Deserialize, Serialize};

use super::{AccountId, AirlineState, FlightKey, FlightStatus, Wei};

/// A new consensus round was opened; responders holding `index` should report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleRequestEvent {
    pub index: u8,
    pub airline: AccountId,
    pub flight: String,
    pub timestamp: i64,
}

/// An oracle response was accepted into a round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleReportEvent {
    pub airline: AccountId,
    pub flight: String,
    pub timestamp: i64,
    pub status_code: FlightStatus,
}

/// A round reached quorum and the flight status is now resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightStatusInfoEvent {
    pub airline: AccountId,
    pub flight: String,
    pub timestamp: i64,
    pub status_code: FlightStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirlineStateChangedEvent {
    pub airline: AccountId,
    pub state: AirlineState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsurancePurchasedEvent {
    pub passenger: AccountId,
    pub flight: FlightKey,
    pub price: Wei,
    pub payout_price: Wei,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoutWithdrawnEvent {
    pub passenger: AccountId,
    pub flight: FlightKey,
    pub amount: Wei,
}

/// Notifications the ledger publishes for external consumers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEvent {
    OracleRequest(OracleRequestEvent),
    OracleReport(OracleReportEvent),
    FlightStatusInfo(FlightStatusInfoEvent),
    AirlineStateChanged(AirlineStateChangedEvent),
    InsurancePurchased(InsurancePurchasedEvent),
    PayoutWithdrawn(PayoutWithdrawnEvent),
}

impl LedgerEvent {
    /// Stable event name, used as the SSE event type
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::OracleRequest(_) => "OracleRequest",
            LedgerEvent::OracleReport(_) => "OracleReport",
            LedgerEvent::FlightStatusInfo(_) => "FlightStatusInfo",
            LedgerEvent::AirlineStateChanged(_) => "AirlineStateChanged",
            LedgerEvent::InsurancePurchased(_) => "InsurancePurchased",
            LedgerEvent::PayoutWithdrawn(_) => "PayoutWithdrawn",
        }
    }

    pub fn oracle_request(index: u8, flight: &FlightKey) -> Self {
        LedgerEvent::OracleRequest(OracleRequestEvent {
            index,
            airline: flight.airline.clone(),
            flight: flight.flight.clone(),
            timestamp: flight.timestamp,
        })
    }

    pub fn oracle_report(flight: &FlightKey, status_code: FlightStatus) -> Self {
        LedgerEvent::OracleReport(OracleReportEvent {
            airline: flight.airline.clone(),
            flight: flight.flight.clone(),
            timestamp: flight.timestamp,
            status_code,
        })
    }

    pub fn flight_status_info(flight: &FlightKey, status_code: FlightStatus) -> Self {
        LedgerEvent::FlightStatusInfo(FlightStatusInfoEvent {
            airline: flight.airline.clone(),
            flight: flight.flight.clone(),
            timestamp: flight.timestamp,
            status_code,
        })
    }
}
