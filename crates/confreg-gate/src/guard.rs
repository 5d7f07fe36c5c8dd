use std::fmt;

use confreg_types::RegistrantId;
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Operations reserved for the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    /// Set a new maximum registrant count.
    ChangeQuota,
    /// Return a registrant's full recorded payment.
    RefundTicket,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChangeQuota => write!(f, "change quota"),
            Self::RefundTicket => write!(f, "refund tickets"),
        }
    }
}

/// Proof that a caller passed [`AccessGuard::authorize`] for one privilege.
///
/// Only the guard can issue a grant, so an operation that takes one needs no
/// caller check of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grant {
    caller: RegistrantId,
    privilege: Privilege,
}

impl Grant {
    pub fn caller(&self) -> RegistrantId {
        self.caller
    }

    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    /// Fails unless this grant is for `privilege`.
    pub fn require(&self, privilege: Privilege) -> Result<(), GateError> {
        if self.privilege == privilege {
            return Ok(());
        }
        Err(GateError::Unauthorized {
            caller: self.caller,
            privilege,
        })
    }
}

/// Operator check for privileged operations.
///
/// The operator identity is captured once at construction and cannot be
/// replaced: the guard exposes no setter, and the registry stores it by
/// value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGuard {
    operator: RegistrantId,
}

impl AccessGuard {
    pub fn new(operator: RegistrantId) -> Self {
        Self { operator }
    }

    /// The operator identity recorded at deployment.
    pub fn operator(&self) -> RegistrantId {
        self.operator
    }

    /// Returns `true` if `caller` is the operator.
    pub fn is_operator(&self, caller: &RegistrantId) -> bool {
        *caller == self.operator
    }

    /// Require that `caller` holds `privilege`, returning a [`Grant`] for it.
    ///
    /// Every privilege belongs to the operator alone, so this reduces to
    /// [`Self::is_operator`]; the privilege is carried into the error and the
    /// log line.
    pub fn authorize(
        &self,
        caller: &RegistrantId,
        privilege: Privilege,
    ) -> Result<Grant, GateError> {
        if self.is_operator(caller) {
            return Ok(Grant {
                caller: *caller,
                privilege,
            });
        }

        tracing::warn!(%caller, %privilege, "privileged call denied");
        Err(GateError::Unauthorized {
            caller: *caller,
            privilege,
        })
    }
}
