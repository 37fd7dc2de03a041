//! Custodia Common Types
//!
//! This crate contains shared types used across the Custodia ledger,
//! including identifiers, the error taxonomy, and audit event definitions.

pub mod error;
pub mod event;
pub mod identifiers;

pub use error::*;
pub use event::*;
pub use identifiers::*;

/// The smallest indivisible unit of value.
///
/// All balances and transfer amounts are expressed in whole units; there is
/// no fractional representation and no currency dimension.
pub type Units = u128;
