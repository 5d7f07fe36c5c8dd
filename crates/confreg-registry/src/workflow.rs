use confreg_gate::{AccessGuard, Privilege};
use confreg_ledger::{InMemoryLedger, LedgerReader, LedgerWriter, Posting, PostingKind};
use confreg_types::{Amount, NotificationKind, RegistrantId};

use crate::call::CallContext;
use crate::error::RegistryError;
use crate::notify::{Notification, NotificationLog};
use crate::payout::Payout;
use crate::quota::QuotaPolicy;

/// Everything a registry owns: the operator guard, the quota, the payment
/// book, and the audit trail.
///
/// Mutated only through [`TicketWorkflow`] and [`QuotaPolicy::change`].
pub struct RegistryState {
    pub(crate) guard: AccessGuard,
    pub(crate) quota: QuotaPolicy,
    pub(crate) ledger: InMemoryLedger,
    pub(crate) log: NotificationLog,
}

impl RegistryState {
    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    pub fn quota(&self) -> &QuotaPolicy {
        &self.quota
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    pub fn log(&self) -> &NotificationLog {
        &self.log
    }
}

/// Purchase and refund as validated, all-or-nothing transitions.
///
/// Each transition is split into a pure `plan_*` step over a borrowed state
/// and a `commit_*` step that applies the plan. Dry runs call only the
/// plan step, so a dry run and a commit can never disagree on validation.
pub struct TicketWorkflow;

impl TicketWorkflow {
    /// Validate a ticket purchase paid with the call's attached value.
    pub fn plan_purchase(
        state: &RegistryState,
        call: &CallContext,
    ) -> Result<Posting, RegistryError> {
        let posting = state.ledger.plan_credit(&call.caller, call.value)?;
        state.quota.admit(posting.count_before(), posting.count_after())?;
        Ok(posting)
    }

    /// Validate an exact-amount refund of `registrant`.
    ///
    /// The operator check runs before anything else is inspected.
    pub fn plan_refund(
        state: &RegistryState,
        call: &CallContext,
        registrant: &RegistrantId,
        amount: Amount,
    ) -> Result<Posting, RegistryError> {
        state.guard.authorize(&call.caller, Privilege::RefundTicket)?;
        if !call.value.is_zero() {
            return Err(RegistryError::ValueNotAccepted);
        }
        Ok(state.ledger.plan_settle(registrant, amount)?)
    }

    /// Apply a planned purchase and emit its `Deposit` notification.
    ///
    /// A posting planned against an earlier state is rejected as stale.
    pub fn commit_purchase(
        state: &mut RegistryState,
        posting: &Posting,
    ) -> Result<Notification, RegistryError> {
        debug_assert_eq!(posting.kind(), PostingKind::Credit);
        state.ledger.apply(posting)?;
        Ok(state
            .log
            .emit(NotificationKind::Deposit, posting.registrant(), posting.amount()))
    }

    /// Pay out a planned refund, then apply it and emit its `Refund`
    /// notification. A stale posting or a payout failure leaves the state
    /// untouched and moves no value.
    pub fn commit_refund(
        state: &mut RegistryState,
        posting: &Posting,
        payout: &dyn Payout,
    ) -> Result<Notification, RegistryError> {
        debug_assert_eq!(posting.kind(), PostingKind::Settle);
        state.ledger.check_current(posting)?;
        payout.transfer(&posting.registrant(), posting.amount())?;
        state.ledger.apply(posting)?;
        Ok(state
            .log
            .emit(NotificationKind::Refund, posting.registrant(), posting.amount()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payout::{PayoutError, RecordingPayout};
    use confreg_ledger::{CountingPolicy, LedgerError};
    use confreg_types::Quota;

    struct DecliningPayout;

    impl Payout for DecliningPayout {
        fn transfer(&self, recipient: &RegistrantId, amount: Amount) -> Result<(), PayoutError> {
            Err(PayoutError::Declined {
                recipient: *recipient,
                amount,
                reason: "account closed".into(),
            })
        }
    }

    fn organizer() -> RegistrantId {
        RegistrantId::from_label("organizer")
    }

    fn alice() -> RegistrantId {
        RegistrantId::from_label("alice")
    }

    fn state(quota: u64) -> RegistryState {
        RegistryState {
            guard: AccessGuard::new(organizer()),
            quota: QuotaPolicy::new(Quota::new(quota), true),
            ledger: InMemoryLedger::new(CountingPolicy::default()),
            log: NotificationLog::new(16),
        }
    }

    fn purchase(state: &mut RegistryState, who: RegistrantId, value: u64) -> Notification {
        let call = CallContext::paying(who, Amount::new(value));
        let posting = TicketWorkflow::plan_purchase(state, &call).unwrap();
        TicketWorkflow::commit_purchase(state, &posting).unwrap()
    }

    #[test]
    fn purchase_plan_then_commit() {
        let mut state = state(500);
        let notification = purchase(&mut state, alice(), 20);

        assert_eq!(notification.kind, NotificationKind::Deposit);
        assert_eq!(notification.registrant, alice());
        assert_eq!(state.ledger.amount_paid(&alice()), Amount::new(20));
        assert_eq!(state.ledger.count(), 1);
    }

    #[test]
    fn purchase_without_value_is_rejected() {
        let state = state(500);
        let err = TicketWorkflow::plan_purchase(&state, &CallContext::new(alice())).unwrap_err();
        assert!(matches!(err, RegistryError::Ledger(LedgerError::ZeroDeposit)));
    }

    #[test]
    fn purchase_past_quota_is_rejected() {
        let mut state = state(1);
        purchase(&mut state, alice(), 20);

        let call = CallContext::paying(RegistrantId::from_label("bob"), Amount::new(20));
        let err = TicketWorkflow::plan_purchase(&state, &call).unwrap_err();
        assert!(matches!(err, RegistryError::QuotaExceeded { count: 1, .. }));
    }

    #[test]
    fn refund_checks_operator_before_amount() {
        let mut state = state(500);
        purchase(&mut state, alice(), 20);

        // Wrong caller and wrong amount: the caller check wins.
        let err = TicketWorkflow::plan_refund(
            &state,
            &CallContext::new(alice()),
            &alice(),
            Amount::new(10),
        )
        .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn refund_rejects_attached_value() {
        let mut state = state(500);
        purchase(&mut state, alice(), 20);

        let err = TicketWorkflow::plan_refund(
            &state,
            &CallContext::paying(organizer(), Amount::new(1)),
            &alice(),
            Amount::new(20),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::ValueNotAccepted));
    }

    #[test]
    fn refund_pays_out_then_clears_record() {
        let mut state = state(500);
        purchase(&mut state, alice(), 20);
        let payout = RecordingPayout::new();

        let posting = TicketWorkflow::plan_refund(
            &state,
            &CallContext::new(organizer()),
            &alice(),
            Amount::new(20),
        )
        .unwrap();
        let notification = TicketWorkflow::commit_refund(&mut state, &posting, &payout).unwrap();

        assert_eq!(notification.kind, NotificationKind::Refund);
        assert_eq!(notification.seq, 2);
        assert_eq!(payout.total().unwrap(), Amount::new(20));
        assert_eq!(state.ledger.amount_paid(&alice()), Amount::ZERO);
        assert_eq!(state.ledger.balance(), Amount::ZERO);
    }

    #[test]
    fn declined_payout_leaves_state_untouched() {
        let mut state = state(500);
        purchase(&mut state, alice(), 20);
        let ledger_before = state.ledger.clone();

        let posting = TicketWorkflow::plan_refund(
            &state,
            &CallContext::new(organizer()),
            &alice(),
            Amount::new(20),
        )
        .unwrap();
        let err = TicketWorkflow::commit_refund(&mut state, &posting, &DecliningPayout).unwrap_err();

        assert!(matches!(err, RegistryError::Payout(PayoutError::Declined { .. })));
        assert_eq!(state.ledger, ledger_before);
        assert_eq!(state.log.last_seq(), 1);
    }

    #[test]
    fn stale_purchase_is_not_committed() {
        let mut state = state(500);
        let bob = RegistrantId::from_label("bob");
        let first = TicketWorkflow::plan_purchase(
            &state,
            &CallContext::paying(alice(), Amount::new(20)),
        )
        .unwrap();
        let second =
            TicketWorkflow::plan_purchase(&state, &CallContext::paying(bob, Amount::new(5)))
                .unwrap();

        TicketWorkflow::commit_purchase(&mut state, &first).unwrap();
        let err = TicketWorkflow::commit_purchase(&mut state, &second).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Ledger(LedgerError::StalePosting { .. })
        ));
        assert_eq!(state.ledger.balance(), Amount::new(20));
        assert_eq!(state.ledger.amount_paid(&bob), Amount::ZERO);
        assert_eq!(state.log.last_seq(), 1);
    }

    #[test]
    fn stale_refund_moves_no_value() {
        let mut state = state(500);
        purchase(&mut state, alice(), 20);
        let payout = RecordingPayout::new();

        let posting = TicketWorkflow::plan_refund(
            &state,
            &CallContext::new(organizer()),
            &alice(),
            Amount::new(20),
        )
        .unwrap();
        purchase(&mut state, alice(), 5);

        let err = TicketWorkflow::commit_refund(&mut state, &posting, &payout).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Ledger(LedgerError::StalePosting { .. })
        ));
        assert!(payout.transfers().is_empty());
        assert_eq!(state.ledger.amount_paid(&alice()), Amount::new(25));
        assert_eq!(state.ledger.balance(), Amount::new(25));
    }
}
