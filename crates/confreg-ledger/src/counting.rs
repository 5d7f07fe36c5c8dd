use serde::{Deserialize, Serialize};

/// What a single successful purchase adds to the registrant count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Every successful purchase counts as one registration.
    #[default]
    PerPurchase,
    /// Only a purchase by an identity with no recorded payment counts.
    UniqueRegistrants,
}

/// How the registrant count moves on purchase and refund.
///
/// The default counts every purchase and never releases a slot on refund,
/// which keeps the count monotonically non-decreasing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountingPolicy {
    pub mode: CountingMode,
    /// Decrement the count when a registrant is refunded.
    pub release_on_refund: bool,
}

impl CountingPolicy {
    /// Count increment for a purchase. `paid_before_is_zero` is set when the
    /// purchaser had no recorded payment.
    pub fn purchase_increment(&self, paid_before_is_zero: bool) -> u64 {
        match self.mode {
            CountingMode::PerPurchase => 1,
            CountingMode::UniqueRegistrants => u64::from(paid_before_is_zero),
        }
    }

    /// Count decrement for a successful refund.
    pub fn refund_decrement(&self) -> u64 {
        u64::from(self.release_on_refund)
    }
}
