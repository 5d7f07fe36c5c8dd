use confreg_types::{Amount, RegistrantId, TypeError};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("deposit must be a positive amount")]
    ZeroDeposit,

    #[error("partial refund rejected for {registrant}: requested {requested}, recorded {recorded}")]
    PartialRefundRejected {
        registrant: RegistrantId,
        requested: Amount,
        recorded: Amount,
    },

    #[error("nothing to refund: {0} has no recorded payment")]
    NothingToRefund(RegistrantId),

    #[error("conservation violated: held balance {held}, recorded payments {recorded}")]
    ConservationViolated { held: Amount, recorded: Amount },

    #[error("stale posting for {registrant}: the book changed after it was planned")]
    StalePosting { registrant: RegistrantId },

    #[error("registrant count overflow")]
    CountOverflow,

    #[error("amount error: {0}")]
    Amount(#[from] TypeError),
}
