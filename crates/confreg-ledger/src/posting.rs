use confreg_types::{Amount, RegistrantId};
use serde::{Deserialize, Serialize};

/// Direction of a ledger posting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostingKind {
    /// Value deposited by a purchaser.
    Credit,
    /// A registrant's full payment returned.
    Settle,
}

/// A fully validated ledger transition.
///
/// Only `plan_credit` / `plan_settle` can build one. A posting records the
/// book state it was planned against as well as every post-state value;
/// applying it to a book that has moved since fails with
/// [`LedgerError::StalePosting`](crate::LedgerError::StalePosting).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub(crate) kind: PostingKind,
    pub(crate) registrant: RegistrantId,
    pub(crate) amount: Amount,
    pub(crate) paid_before: Amount,
    pub(crate) balance_before: Amount,
    pub(crate) count_before: u64,
    pub(crate) paid_after: Amount,
    pub(crate) balance_after: Amount,
    pub(crate) count_after: u64,
}

impl Posting {
    pub fn kind(&self) -> PostingKind {
        self.kind
    }

    pub fn registrant(&self) -> RegistrantId {
        self.registrant
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Registrant's recorded payment once applied.
    pub fn paid_after(&self) -> Amount {
        self.paid_after
    }

    /// Held balance once applied.
    pub fn balance_after(&self) -> Amount {
        self.balance_after
    }

    /// Registrant count once applied.
    pub fn count_after(&self) -> u64 {
        self.count_after
    }

    /// Registrant count the posting was planned against.
    pub fn count_before(&self) -> u64 {
        self.count_before
    }
}
