use std::collections::HashSet;
use surety_shared::AccountId;
use tracing::info;

use crate::error::{SuretyError, SuretyResult};

/// Tracks which orchestrators may mutate governance and escrow state, and
/// whether the ledger is accepting mutations at all.
#[derive(Debug, Clone)]
pub struct AuthorizationLedger {
    admin: AccountId,
    authorized: HashSet<AccountId>,
    operational: bool,
}

impl AuthorizationLedger {
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            authorized: HashSet::new(),
            operational: true,
        }
    }

    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    /// Grant or revoke mutation rights. Restricted to the administrative identity.
    pub fn set_authorized_status(
        &mut self,
        caller: &AccountId,
        target: &AccountId,
        allowed: bool,
    ) -> SuretyResult<()> {
        self.ensure_admin(caller)?;

        if allowed {
            self.authorized.insert(target.clone());
        } else {
            self.authorized.remove(target);
        }

        info!(target = %target, allowed, "Authorization updated");
        Ok(())
    }

    pub fn is_authorized(&self, target: &AccountId) -> bool {
        self.authorized.contains(target)
    }

    pub fn ensure_authorized(&self, orchestrator: &AccountId) -> SuretyResult<()> {
        if self.is_authorized(orchestrator) {
            Ok(())
        } else {
            Err(SuretyError::Unauthorized(orchestrator.clone()))
        }
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Pause or resume all mutating operations. Admin only.
    pub fn set_operating_status(&mut self, caller: &AccountId, operational: bool) -> SuretyResult<()> {
        self.ensure_admin(caller)?;
        self.operational = operational;
        info!(operational, "Operating status changed");
        Ok(())
    }

    pub fn ensure_operational(&self) -> SuretyResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::NotOperational)
        }
    }

    fn ensure_admin(&self, caller: &AccountId) -> SuretyResult<()> {
        if caller == &self.admin {
            Ok(())
        } else {
            Err(SuretyError::Unauthorized(caller.clone()))
        }
    }
}
