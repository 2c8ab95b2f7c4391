use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use surety_shared::{AccountId, FlightKey, FlightStatus, Wei};

/// A flight scheduled by its (funded) airline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status_code: FlightStatus,
    pub updated_at: DateTime<Utc>,
}

impl Flight {
    pub fn new(key: FlightKey) -> Self {
        Self {
            key,
            status_code: FlightStatus::Unknown,
            updated_at: Utc::now(),
        }
    }

    pub fn set_status(&mut self, status: FlightStatus) {
        self.status_code = status;
        self.updated_at = Utc::now();
    }
}

/// A passenger's policy on one flight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insurance {
    pub passenger: AccountId,
    pub flight: FlightKey,
    pub price: Wei,
    pub payout_price: Wei,
    pub claimed: bool,
    pub purchased_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Insurance {
    /// Mark as paid out (never deleted)
    pub fn claim(&mut self) {
        self.claimed = true;
        self.claimed_at = Some(Utc::now());
    }
}

/// Value released to a passenger by a successful claim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payout {
    pub passenger: AccountId,
    pub flight: FlightKey,
    pub amount: Wei,
}
