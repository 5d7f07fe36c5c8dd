use std::path::Path;

use confreg_ledger::CountingPolicy;
use confreg_types::Quota;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Upper bound on per-subscriber notification channel capacity.
pub const MAX_NOTIFICATION_CAPACITY: usize = 1 << 16;

/// Deployment parameters for a registry.
///
/// Loaded from TOML; every field is optional and unknown keys are rejected.
///
/// ```toml
/// quota = 650
/// enforce_quota = true
/// notification_capacity = 256
///
/// [counting]
/// mode = "unique_registrants"
/// release_on_refund = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Initial maximum registrant count.
    pub quota: Quota,
    /// Reject purchases that would push the count past the quota.
    pub enforce_quota: bool,
    /// How the registrant count moves on purchase and refund.
    pub counting: CountingPolicy,
    /// Capacity of each subscriber's notification channel.
    pub notification_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            quota: Quota::new(500),
            enforce_quota: true,
            counting: CountingPolicy::default(),
            notification_capacity: 1024,
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        let config: Self =
            toml::from_str(text).map_err(|e| RegistryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        validate_capacity(self.notification_capacity)
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<(), RegistryError> {
    if capacity == 0 || capacity > MAX_NOTIFICATION_CAPACITY {
        return Err(RegistryError::Config(format!(
            "notification_capacity must be between 1 and {MAX_NOTIFICATION_CAPACITY}, got {capacity}"
        )));
    }
    Ok(())
}
