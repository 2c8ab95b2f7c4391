use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use surety_shared::{AccountId, AirlineState};

/// A federation member or applicant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airline {
    pub id: AccountId,
    pub name: String,
    pub state: AirlineState,
    /// Funded airlines that voted to approve this one
    pub approvals: BTreeSet<AccountId>,
    pub due_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Airline {
    pub fn new(id: AccountId, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            state: AirlineState::Applied,
            approvals: BTreeSet::new(),
            due_paid: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The founding member starts out funded
    pub fn founder(id: AccountId, name: String) -> Self {
        let mut airline = Self::new(id, name);
        airline.state = AirlineState::Funded;
        airline.due_paid = true;
        airline
    }

    /// Record a vote; returns false if this voter already voted
    pub fn add_approval(&mut self, voter: AccountId) -> bool {
        let added = self.approvals.insert(voter);
        if added {
            self.updated_at = Utc::now();
        }
        added
    }

    /// Move forward in the lifecycle. Never moves backward.
    pub fn advance(&mut self, next: AirlineState) {
        if next > self.state {
            self.state = next;
            self.updated_at = Utc::now();
        }
    }
}
