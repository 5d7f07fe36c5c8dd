use std::collections::BTreeMap;

use confreg_types::{Amount, RegistrantId};
use serde::{Deserialize, Serialize};

use crate::counting::CountingPolicy;
use crate::error::LedgerError;
use crate::posting::{Posting, PostingKind};
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory payment book.
///
/// The book holds no lock of its own: it is owned by the registry, which
/// serializes every access. Entries whose recorded payment drops to zero are
/// removed, so two books with the same observable state serialize
/// identically.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InMemoryLedger {
    policy: CountingPolicy,
    paid: BTreeMap<RegistrantId, Amount>,
    held: Amount,
    count: u64,
}

impl InMemoryLedger {
    pub fn new(policy: CountingPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// The counting policy fixed at construction.
    pub fn policy(&self) -> CountingPolicy {
        self.policy
    }

    /// Sum of every recorded payment.
    pub fn recorded_total(&self) -> Result<Amount, LedgerError> {
        self.paid
            .values()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(*amount))
            .map_err(LedgerError::from)
    }
}

impl LedgerReader for InMemoryLedger {
    fn amount_paid(&self, registrant: &RegistrantId) -> Amount {
        self.paid.get(registrant).copied().unwrap_or_default()
    }

    fn balance(&self) -> Amount {
        self.held
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn registrants(&self) -> Vec<(RegistrantId, Amount)> {
        self.paid.iter().map(|(id, amount)| (*id, *amount)).collect()
    }
}

impl LedgerWriter for InMemoryLedger {
    fn plan_credit(
        &self,
        registrant: &RegistrantId,
        amount: Amount,
    ) -> Result<Posting, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroDeposit);
        }

        let before = self.amount_paid(registrant);
        let paid_after = before.checked_add(amount)?;
        let balance_after = self.held.checked_add(amount)?;
        let count_after = self
            .count
            .checked_add(self.policy.purchase_increment(before.is_zero()))
            .ok_or(LedgerError::CountOverflow)?;

        Ok(Posting {
            kind: PostingKind::Credit,
            registrant: *registrant,
            amount,
            paid_before: before,
            balance_before: self.held,
            count_before: self.count,
            paid_after,
            balance_after,
            count_after,
        })
    }

    fn plan_settle(
        &self,
        registrant: &RegistrantId,
        amount: Amount,
    ) -> Result<Posting, LedgerError> {
        let recorded = self.amount_paid(registrant);
        if amount != recorded {
            return Err(LedgerError::PartialRefundRejected {
                registrant: *registrant,
                requested: amount,
                recorded,
            });
        }
        if recorded.is_zero() {
            return Err(LedgerError::NothingToRefund(*registrant));
        }

        // Unreachable while held == sum(paid); a book restored from a bad
        // snapshot is the only way here.
        let balance_after =
            self.held
                .checked_sub(amount)
                .map_err(|_| LedgerError::ConservationViolated {
                    held: self.held,
                    recorded: self.recorded_total().unwrap_or(recorded),
                })?;

        Ok(Posting {
            kind: PostingKind::Settle,
            registrant: *registrant,
            amount,
            paid_before: recorded,
            balance_before: self.held,
            count_before: self.count,
            paid_after: Amount::ZERO,
            balance_after,
            count_after: self.count.saturating_sub(self.policy.refund_decrement()),
        })
    }

    fn check_current(&self, posting: &Posting) -> Result<(), LedgerError> {
        if posting.balance_before != self.held
            || posting.count_before != self.count
            || posting.paid_before != self.amount_paid(&posting.registrant)
        {
            return Err(LedgerError::StalePosting {
                registrant: posting.registrant,
            });
        }
        Ok(())
    }

    fn apply(&mut self, posting: &Posting) -> Result<(), LedgerError> {
        self.check_current(posting)?;

        if posting.paid_after.is_zero() {
            self.paid.remove(&posting.registrant);
        } else {
            self.paid.insert(posting.registrant, posting.paid_after);
        }
        self.held = posting.balance_after;
        self.count = posting.count_after;

        tracing::debug!(
            kind = ?posting.kind,
            registrant = %posting.registrant,
            amount = %posting.amount,
            balance = %self.held,
            count = self.count,
            "ledger posting applied"
        );
        Ok(())
    }
}
