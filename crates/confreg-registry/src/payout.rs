use std::sync::Mutex;

use confreg_types::{Amount, RegistrantId, TypeError};
use serde::{Deserialize, Serialize};

/// Errors reported by a payout backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayoutError {
    #[error("transfer to {recipient} of {amount} declined: {reason}")]
    Declined {
        recipient: RegistrantId,
        amount: Amount,
        reason: String,
    },

    #[error("payout backend unavailable: {0}")]
    Unavailable(String),
}

/// A completed outbound transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub recipient: RegistrantId,
    pub amount: Amount,
}

/// Moves refunded value out to a registrant.
///
/// Called while the registry's write lock is held, after every refund
/// precondition has passed and before the ledger is touched. An error
/// aborts the refund with no ledger change.
pub trait Payout: Send + Sync {
    fn transfer(&self, recipient: &RegistrantId, amount: Amount) -> Result<(), PayoutError>;
}

/// Payout for hosts that move value themselves once the call returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPayout;

impl Payout for NoopPayout {
    fn transfer(&self, _recipient: &RegistrantId, _amount: Amount) -> Result<(), PayoutError> {
        Ok(())
    }
}

/// Payout that records every transfer in order.
#[derive(Debug, Default)]
pub struct RecordingPayout {
    transfers: Mutex<Vec<Transfer>>,
}

impl RecordingPayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfers made so far, oldest first.
    pub fn transfers(&self) -> Vec<Transfer> {
        match self.transfers.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Total value paid out.
    pub fn total(&self) -> Result<Amount, TypeError> {
        self.transfers()
            .iter()
            .try_fold(Amount::ZERO, |acc, t| acc.checked_add(t.amount))
    }
}

impl Payout for RecordingPayout {
    fn transfer(&self, recipient: &RegistrantId, amount: Amount) -> Result<(), PayoutError> {
        let mut transfers = self
            .transfers
            .lock()
            .map_err(|_| PayoutError::Unavailable("transfer log lock poisoned".into()))?;
        transfers.push(Transfer {
            recipient: *recipient,
            amount,
        });
        Ok(())
    }
}
