//! Access guard for the conference registry.
//!
//! Privileged operations (quota changes and refunds) may only be invoked by
//! the operator fixed at deployment. The guard is evaluated as the first
//! precondition of every privileged operation, before any state is read
//! for mutation. A successful check yields a [`Grant`], which the guarded
//! operation takes in place of a raw caller identity.

pub mod error;
pub mod guard;

pub use error::GateError;
pub use guard::{AccessGuard, Grant, Privilege};
