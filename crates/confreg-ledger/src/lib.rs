//! Payment ledger for the conference registry.
//!
//! This crate provides:
//! - `LedgerReader` / `LedgerWriter` trait boundaries
//! - `InMemoryLedger`, the per-registrant payment book
//! - `CountingPolicy`, which decides how the registrant count moves
//! - Two-phase postings: a pure plan computed against the current book,
//!   then an infallible apply
//! - Conservation audit (`held balance == sum of recorded payments`)

pub mod counting;
pub mod error;
pub mod memory;
pub mod posting;
pub mod traits;
pub mod validation;

pub use counting::{CountingMode, CountingPolicy};
pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use posting::{Posting, PostingKind};
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{AuditReport, ConservationAudit};
