use confreg_types::RegistrantId;

use crate::guard::Privilege;

/// Errors produced by the access guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The caller is not the operator.
    #[error("unauthorized: {caller} may not {privilege}")]
    Unauthorized {
        caller: RegistrantId,
        privilege: Privilege,
    },
}

impl GateError {
    /// The privilege that was denied.
    pub fn privilege(&self) -> Privilege {
        match self {
            Self::Unauthorized { privilege, .. } => *privilege,
        }
    }
}
