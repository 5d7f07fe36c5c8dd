use confreg_types::{Amount, RegistrantId};

use crate::error::LedgerError;
use crate::posting::Posting;

/// Read boundary for the payment ledger. All reads are pure.
pub trait LedgerReader {
    /// Recorded payment for `registrant`; zero if the identity is unknown.
    fn amount_paid(&self, registrant: &RegistrantId) -> Amount;

    /// Total value currently held.
    fn balance(&self) -> Amount;

    /// Current registrant count.
    fn count(&self) -> u64;

    /// Identities with a non-zero recorded payment, in identity order.
    fn registrants(&self) -> Vec<(RegistrantId, Amount)>;
}

/// Write boundary for the payment ledger.
///
/// Writers are two-phase. `plan_*` validates against the current book
/// without touching it; `apply` commits a plan, provided the book has not
/// moved since it was planned. `credit` and `settle` run both phases, so a
/// failed call leaves the book untouched.
pub trait LedgerWriter: LedgerReader {
    fn plan_credit(&self, registrant: &RegistrantId, amount: Amount)
        -> Result<Posting, LedgerError>;

    fn plan_settle(&self, registrant: &RegistrantId, amount: Amount)
        -> Result<Posting, LedgerError>;

    /// Fails with `StalePosting` if the book no longer matches the state the
    /// posting was planned against.
    fn check_current(&self, posting: &Posting) -> Result<(), LedgerError>;

    fn apply(&mut self, posting: &Posting) -> Result<(), LedgerError>;

    fn credit(&mut self, registrant: &RegistrantId, amount: Amount) -> Result<Posting, LedgerError> {
        let posting = self.plan_credit(registrant, amount)?;
        self.apply(&posting)?;
        Ok(posting)
    }

    fn settle(&mut self, registrant: &RegistrantId, amount: Amount) -> Result<Posting, LedgerError> {
        let posting = self.plan_settle(registrant, amount)?;
        self.apply(&posting)?;
        Ok(posting)
    }
}
