use confreg_types::Amount;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Result of a conservation audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Held balance as stored.
    pub held: Amount,
    /// Sum of every recorded payment.
    pub recorded: Amount,
    /// Number of identities with a non-zero recorded payment.
    pub registrants: usize,
    /// Registrant count as stored.
    pub count: u64,
}

impl AuditReport {
    /// Returns `true` if no value is created, destroyed, or retained outside
    /// recorded payments.
    pub fn is_balanced(&self) -> bool {
        self.held == self.recorded
    }
}

/// Conservation auditor: re-derives the held balance from the payment book.
pub struct ConservationAudit;

impl ConservationAudit {
    pub fn audit<R: LedgerReader>(reader: &R) -> Result<AuditReport, LedgerError> {
        let entries = reader.registrants();
        let recorded = entries
            .iter()
            .try_fold(Amount::ZERO, |acc, (_, amount)| acc.checked_add(*amount))?;

        Ok(AuditReport {
            held: reader.balance(),
            recorded,
            registrants: entries.len(),
            count: reader.count(),
        })
    }

    /// Audit and fail with [`LedgerError::ConservationViolated`] on mismatch.
    pub fn verify<R: LedgerReader>(reader: &R) -> Result<AuditReport, LedgerError> {
        let report = Self::audit(reader)?;
        if !report.is_balanced() {
            return Err(LedgerError::ConservationViolated {
                held: report.held,
                recorded: report.recorded,
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use crate::traits::LedgerWriter;
    use confreg_types::RegistrantId;

    #[test]
    fn fresh_ledger_is_balanced() {
        let report = ConservationAudit::verify(&InMemoryLedger::default()).unwrap();
        assert!(report.is_balanced());
        assert_eq!(report.registrants, 0);
    }

    #[test]
    fn audit_counts_active_registrants() {
        let mut ledger = InMemoryLedger::default();
        ledger
            .credit(&RegistrantId::from_label("a"), Amount::new(20))
            .unwrap();
        ledger
            .credit(&RegistrantId::from_label("b"), Amount::new(30))
            .unwrap();

        let report = ConservationAudit::verify(&ledger).unwrap();
        assert_eq!(report.recorded, Amount::new(50));
        assert_eq!(report.registrants, 2);
        assert_eq!(report.count, 2);
    }

    #[test]
    fn tampered_balance_is_detected() {
        let mut ledger = InMemoryLedger::default();
        ledger
            .credit(&RegistrantId::from_label("a"), Amount::new(20))
            .unwrap();

        let mut json: serde_json::Value = serde_json::to_value(&ledger).unwrap();
        json["held"] = serde_json::Value::from(25u64);
        let tampered: InMemoryLedger = serde_json::from_value(json).unwrap();

        let err = ConservationAudit::verify(&tampered).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ConservationViolated {
                held: Amount::new(25),
                recorded: Amount::new(20),
            }
        );
    }
}
