use confreg_types::{Amount, RegistrantId};
use serde::{Deserialize, Serialize};

/// What the host environment tells the registry about a call: who made it
/// and how much value came attached.
///
/// The registry trusts both fields; authenticating the caller and moving the
/// attached value are the host's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: RegistrantId,
    pub value: Amount,
}

impl CallContext {
    /// A call with no attached value.
    pub fn new(caller: RegistrantId) -> Self {
        Self {
            caller,
            value: Amount::ZERO,
        }
    }

    /// A call carrying `value`.
    pub fn paying(caller: RegistrantId, value: Amount) -> Self {
        Self { caller, value }
    }
}
