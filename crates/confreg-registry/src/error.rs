use confreg_types::Quota;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Gate(#[from] confreg_gate::GateError),

    #[error(transparent)]
    Ledger(#[from] confreg_ledger::LedgerError),

    #[error("quota exceeded: quota is {quota}, {count} registrants already admitted")]
    QuotaExceeded { quota: Quota, count: u64 },

    #[error("operation does not accept attached value")]
    ValueNotAccepted,

    #[error("payout failed: {0}")]
    Payout(#[from] crate::payout::PayoutError),

    #[error("registry lock poisoned: {0}")]
    Poisoned(&'static str),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl RegistryError {
    /// Returns `true` if the caller was rejected by the access guard.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Gate(confreg_gate::GateError::Unauthorized { .. }))
    }

    /// Returns `true` if a refund was rejected for not matching the
    /// recorded payment exactly.
    pub fn is_partial_refund(&self) -> bool {
        matches!(
            self,
            Self::Ledger(confreg_ledger::LedgerError::PartialRefundRejected { .. })
        )
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
