use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use confreg_gate::{AccessGuard, Privilege};
use confreg_ledger::{AuditReport, ConservationAudit, InMemoryLedger, LedgerReader};
use confreg_types::{Amount, Quota, RegistrantId};

use crate::call::CallContext;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::notify::{Notification, NotificationFilter, NotificationLog, NotificationStream};
use crate::payout::{NoopPayout, Payout};
use crate::quota::QuotaPolicy;
use crate::snapshot::RegistrySnapshot;
use crate::workflow::{RegistryState, TicketWorkflow};

/// A deployed conference registry.
///
/// All state sits behind a single `RwLock`: mutations take the write guard
/// for their whole validate, pay out, apply, and emit sequence, so no caller
/// ever observes a partially applied operation.
pub struct ConferenceRegistry {
    operator: RegistrantId,
    state: RwLock<RegistryState>,
    payout: Arc<dyn Payout>,
}

impl ConferenceRegistry {
    /// Deploy a fresh registry. `operator` is the deployer and can never be
    /// changed afterwards.
    pub fn deploy(operator: RegistrantId, config: &RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let state = RegistryState {
            guard: AccessGuard::new(operator),
            quota: QuotaPolicy::new(config.quota, config.enforce_quota),
            ledger: InMemoryLedger::new(config.counting),
            log: NotificationLog::new(config.notification_capacity),
        };

        tracing::info!(
            %operator,
            quota = %config.quota,
            enforce_quota = config.enforce_quota,
            "registry deployed"
        );
        Ok(Self {
            operator,
            state: RwLock::new(state),
            payout: Arc::new(NoopPayout),
        })
    }

    /// Rebuild a registry from a snapshot, verifying its invariants.
    pub fn restore(snapshot: RegistrySnapshot, payout: Arc<dyn Payout>) -> RegistryResult<Self> {
        let state = snapshot.into_state()?;
        let operator = state.guard.operator();

        tracing::info!(
            %operator,
            balance = %state.ledger.balance(),
            registrants = state.ledger.count(),
            notifications = state.log.last_seq(),
            "registry restored"
        );
        Ok(Self {
            operator,
            state: RwLock::new(state),
            payout,
        })
    }

    /// Replace the payout backend used for refunds.
    pub fn with_payout(mut self, payout: Arc<dyn Payout>) -> Self {
        self.payout = payout;
        self
    }

    // ---- Reads ----

    /// The operator fixed at deployment.
    pub fn organizer(&self) -> RegistrantId {
        self.operator
    }

    pub fn quota(&self) -> RegistryResult<Quota> {
        Ok(self.read()?.quota.limit())
    }

    pub fn num_registrants(&self) -> RegistryResult<u64> {
        Ok(self.read()?.ledger.count())
    }

    /// Recorded payment for `registrant`; zero if it never paid.
    pub fn registrants_paid(&self, registrant: &RegistrantId) -> RegistryResult<Amount> {
        Ok(self.read()?.ledger.amount_paid(registrant))
    }

    pub fn get_balance(&self) -> RegistryResult<Amount> {
        Ok(self.read()?.ledger.balance())
    }

    /// Identities with a non-zero recorded payment.
    pub fn registrants(&self) -> RegistryResult<Vec<(RegistrantId, Amount)>> {
        Ok(self.read()?.ledger.registrants())
    }

    pub fn notifications(&self) -> RegistryResult<Vec<Notification>> {
        Ok(self.read()?.log.entries().to_vec())
    }

    pub fn notifications_since(&self, after: u64) -> RegistryResult<Vec<Notification>> {
        Ok(self.read()?.log.since(after))
    }

    /// Re-derive the held balance from recorded payments.
    pub fn audit(&self) -> RegistryResult<AuditReport> {
        Ok(ConservationAudit::audit(&self.read()?.ledger)?)
    }

    pub fn snapshot(&self) -> RegistryResult<RegistrySnapshot> {
        Ok(RegistrySnapshot::capture(&*self.read()?))
    }

    // ---- Ticket workflow ----

    /// Buy a ticket with the call's attached value. Returns `true` on
    /// success and emits one `Deposit` notification.
    pub fn buy_ticket(&self, call: &CallContext) -> RegistryResult<bool> {
        let mut state = self.write()?;
        let posting = TicketWorkflow::plan_purchase(&state, call).inspect_err(|e| {
            tracing::debug!(caller = %call.caller, value = %call.value, error = %e, "purchase rejected");
        })?;
        TicketWorkflow::commit_purchase(&mut state, &posting)?;
        Ok(true)
    }

    /// Dry run of [`Self::buy_ticket`]: the value it would return, with
    /// nothing committed and nothing emitted.
    pub fn probe_buy_ticket(&self, call: &CallContext) -> RegistryResult<bool> {
        let state = self.read()?;
        TicketWorkflow::plan_purchase(&state, call)?;
        Ok(true)
    }

    /// Refund `registrant` exactly `amount`. Operator only; `amount` must
    /// equal the registrant's full recorded payment.
    pub fn refund_ticket(
        &self,
        call: &CallContext,
        registrant: &RegistrantId,
        amount: Amount,
    ) -> RegistryResult<()> {
        let mut state = self.write()?;
        let posting = TicketWorkflow::plan_refund(&state, call, registrant, amount).inspect_err(
            |e| {
                tracing::debug!(caller = %call.caller, %registrant, %amount, error = %e, "refund rejected");
            },
        )?;
        TicketWorkflow::commit_refund(&mut state, &posting, self.payout.as_ref())?;
        Ok(())
    }

    /// Dry run of [`Self::refund_ticket`]. The payout backend is not called.
    pub fn probe_refund_ticket(
        &self,
        call: &CallContext,
        registrant: &RegistrantId,
        amount: Amount,
    ) -> RegistryResult<()> {
        let state = self.read()?;
        TicketWorkflow::plan_refund(&state, call, registrant, amount)?;
        Ok(())
    }

    /// Set a new quota. Operator only.
    pub fn change_quota(&self, call: &CallContext, new_quota: Quota) -> RegistryResult<()> {
        let mut state = self.write()?;
        let grant = state.guard.authorize(&call.caller, Privilege::ChangeQuota)?;
        if !call.value.is_zero() {
            return Err(RegistryError::ValueNotAccepted);
        }

        let previous = state.quota.change(&grant, new_quota)?;
        tracing::debug!(%previous, current = %new_quota, "quota changed");
        Ok(())
    }

    /// Subscribe to live notifications matching `filter`.
    pub fn subscribe(&self, filter: NotificationFilter) -> RegistryResult<NotificationStream> {
        Ok(self.write()?.log.subscribe(filter))
    }

    fn read(&self) -> RegistryResult<RwLockReadGuard<'_, RegistryState>> {
        self.state
            .read()
            .map_err(|_| RegistryError::Poisoned("registry read lock poisoned"))
    }

    fn write(&self) -> RegistryResult<RwLockWriteGuard<'_, RegistryState>> {
        self.state
            .write()
            .map_err(|_| RegistryError::Poisoned("registry write lock poisoned"))
    }
}
