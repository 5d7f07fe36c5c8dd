//! Foundation types for the conference registry.
//!
//! Every other registry crate depends on `confreg-types`.
//!
//! # Key Types
//!
//! - [`RegistrantId`]: Identity of a purchaser or the operator, derived with BLAKE3
//! - [`Amount`]: Value in the smallest currency unit, with checked arithmetic
//! - [`Quota`]: Maximum registrant count
//! - [`NotificationId`]: UUID v7 notification identifier
//! - [`NotificationKind`]: `Deposit` or `Refund`

pub mod amount;
pub mod error;
pub mod identity;
pub mod notice;

pub use amount::{Amount, Quota};
pub use error::TypeError;
pub use identity::{IdentityMaterial, RegistrantId};
pub use notice::{NotificationId, NotificationKind};
