use confreg_gate::{GateError, Grant, Privilege};
use confreg_types::Quota;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Maximum registrant count and whether purchases are held to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaPolicy {
    limit: Quota,
    enforce: bool,
}

impl QuotaPolicy {
    pub fn new(limit: Quota, enforce: bool) -> Self {
        Self { limit, enforce }
    }

    pub fn limit(&self) -> Quota {
        self.limit
    }

    pub fn is_enforced(&self) -> bool {
        self.enforce
    }

    /// Replace the quota under a `ChangeQuota` grant; returns the previous
    /// value.
    ///
    /// Any value is accepted, including one below the current count, which
    /// simply blocks further purchases.
    pub fn change(&mut self, grant: &Grant, new_limit: Quota) -> Result<Quota, GateError> {
        grant.require(Privilege::ChangeQuota)?;
        let previous = self.limit;
        self.limit = new_limit;
        Ok(previous)
    }

    /// Check that a purchase moving the count from `count` to `count_after`
    /// stays within the quota.
    ///
    /// A purchase that does not move the count is always admitted.
    pub fn admit(&self, count: u64, count_after: u64) -> Result<(), RegistryError> {
        if !self.enforce || count_after <= count || self.limit.admits(count_after) {
            return Ok(());
        }
        Err(RegistryError::QuotaExceeded {
            quota: self.limit,
            count,
        })
    }
}
