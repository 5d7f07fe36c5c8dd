use confreg_gate::AccessGuard;
use confreg_ledger::{ConservationAudit, InMemoryLedger};
use confreg_types::RegistrantId;
use serde::{Deserialize, Serialize};

use crate::config::validate_capacity;
use crate::error::RegistryError;
use crate::notify::{Notification, NotificationLog};
use crate::quota::QuotaPolicy;
use crate::workflow::RegistryState;

/// Current snapshot format.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Serializable image of a registry's full state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySnapshot {
    pub format: u32,
    pub operator: RegistrantId,
    pub quota: QuotaPolicy,
    pub ledger: InMemoryLedger,
    pub notifications: Vec<Notification>,
    pub notification_capacity: usize,
}

impl RegistrySnapshot {
    pub(crate) fn capture(state: &RegistryState) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            operator: state.guard.operator(),
            quota: state.quota,
            ledger: state.ledger.clone(),
            notifications: state.log.entries().to_vec(),
            notification_capacity: state.log.capacity(),
        }
    }

    /// Check the snapshot and rebuild the state it describes.
    ///
    /// Rejects unknown formats, a held balance that differs from the sum of
    /// recorded payments, and an audit trail whose sequence has gaps.
    pub(crate) fn into_state(self) -> Result<RegistryState, RegistryError> {
        if self.format != SNAPSHOT_FORMAT {
            return Err(RegistryError::InvalidSnapshot(format!(
                "unsupported format {}, expected {SNAPSHOT_FORMAT}",
                self.format
            )));
        }
        validate_capacity(self.notification_capacity)
            .map_err(|e| RegistryError::InvalidSnapshot(e.to_string()))?;
        ConservationAudit::verify(&self.ledger)
            .map_err(|e| RegistryError::InvalidSnapshot(e.to_string()))?;
        for (index, notification) in self.notifications.iter().enumerate() {
            let expected = index as u64 + 1;
            if notification.seq != expected {
                return Err(RegistryError::InvalidSnapshot(format!(
                    "notification sequence gap: expected {expected}, found {}",
                    notification.seq
                )));
            }
        }

        Ok(RegistryState {
            guard: AccessGuard::new(self.operator),
            quota: self.quota,
            ledger: self.ledger,
            log: NotificationLog::from_entries(self.notifications, self.notification_capacity),
        })
    }

    /// Domain-separated BLAKE3 digest of the snapshot's canonical JSON.
    ///
    /// Two snapshots have the same digest iff they describe bit-for-bit the
    /// same state.
    pub fn digest(&self) -> Result<[u8; 32], RegistryError> {
        let encoded =
            serde_json::to_vec(self).map_err(|e| RegistryError::Serialization(e.to_string()))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"confreg-snapshot-v1:");
        hasher.update(&encoded);
        Ok(*hasher.finalize().as_bytes())
    }

    pub fn digest_hex(&self) -> Result<String, RegistryError> {
        self.digest().map(hex::encode)
    }

    pub fn to_json_pretty(&self) -> Result<String, RegistryError> {
        serde_json::to_string_pretty(self).map_err(|e| RegistryError::Serialization(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(text).map_err(|e| RegistryError::InvalidSnapshot(e.to_string()))
    }
}
