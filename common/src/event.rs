//! Audit event definitions.
//!
//! Events are append-only, ordered records a host may subscribe to or
//! persist; the ledger never reads them back for any decision.

use crate::{Address, Units};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An observable state change in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Value was credited to an account.
    Deposit { account: Address, amount: Units },
    /// Value was debited from an account and pushed to it externally.
    Withdrawal { account: Address, amount: Units },
    /// The owner granted withdrawal rights to an agent.
    AgentAuthorized { agent: Address },
    /// The owner revoked withdrawal rights from an agent.
    AgentDeauthorized { agent: Address },
}

impl LedgerEvent {
    /// Short name for logging and filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::Deposit { .. } => "deposit",
            LedgerEvent::Withdrawal { .. } => "withdrawal",
            LedgerEvent::AgentAuthorized { .. } => "agent_authorized",
            LedgerEvent::AgentDeauthorized { .. } => "agent_deauthorized",
        }
    }
}

/// A committed event with its position in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Journal sequence number, starting at 0 and strictly increasing.
    pub seq: u64,
    /// When the event was committed.
    pub at: DateTime<Utc>,
    /// The event itself.
    pub event: LedgerEvent,
}

impl EventRecord {
    /// Create a record at the given sequence position.
    pub fn new(seq: u64, event: LedgerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq,
            at: Utc::now(),
            event,
        }
    }
}
