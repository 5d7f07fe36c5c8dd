//! Conference registry.
//!
//! A ticket-registration ledger for a capacity-limited event. Purchasers
//! deposit value, the registry tracks what each has paid, a single operator
//! fixed at deployment controls the registrant quota and issues exact-amount
//! refunds.
//!
//! Every mutating operation runs under one write lock and is two-phase: a
//! plan is computed against the locked state, then applied whole. A
//! rejected call leaves the state untouched and emits nothing.
//!
//! ```
//! use confreg_registry::{CallContext, ConferenceRegistry, RegistryConfig};
//! use confreg_types::{Amount, RegistrantId};
//!
//! let organizer = RegistrantId::from_label("organizer");
//! let alice = RegistrantId::from_label("alice");
//! let registry = ConferenceRegistry::deploy(organizer, &RegistryConfig::default()).unwrap();
//!
//! assert!(registry.buy_ticket(&CallContext::paying(alice, Amount::new(20))).unwrap());
//! assert_eq!(registry.registrants_paid(&alice).unwrap(), Amount::new(20));
//!
//! registry
//!     .refund_ticket(&CallContext::new(organizer), &alice, Amount::new(20))
//!     .unwrap();
//! assert_eq!(registry.get_balance().unwrap(), Amount::ZERO);
//! ```

pub mod call;
pub mod config;
pub mod error;
pub mod notify;
pub mod payout;
pub mod quota;
pub mod registry;
pub mod snapshot;
pub mod workflow;

pub use call::CallContext;
pub use config::RegistryConfig;
pub use error::{RegistryError, RegistryResult};
pub use notify::{Notification, NotificationFilter, NotificationLog, NotificationStream};
pub use payout::{NoopPayout, Payout, PayoutError, RecordingPayout, Transfer};
pub use quota::QuotaPolicy;
pub use registry::ConferenceRegistry;
pub use snapshot::RegistrySnapshot;
pub use workflow::{RegistryState, TicketWorkflow};

// Re-export key types
pub use confreg_gate::{AccessGuard, GateError, Grant, Privilege};
pub use confreg_ledger::{AuditReport, CountingMode, CountingPolicy, LedgerError, Posting};
pub use confreg_types::{Amount, NotificationKind, Quota, RegistrantId};
