//! Custodia Ledger Engine
//!
//! A custodial balance ledger with a two-tier permission model: a single
//! owner and a mutable set of owner-delegated withdrawal agents. The engine
//! owns the balance table, the agent set, and the owner identity, and
//! enforces balance conservation, authorization gating, and atomic rollback
//! of failed withdrawals.

pub mod journal;
pub mod ledger;
pub mod role;
pub mod transfer;

pub use journal::EventJournal;
pub use ledger::Ledger;
pub use role::CallerRole;
pub use transfer::{DeadlineSink, ImmediateSettlement, TransferError, TransferSink};
