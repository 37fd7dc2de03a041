//! Append-only event journal.

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use custodia_common::{EventRecord, LedgerEvent};

/// Capacity of the live subscription channel.
///
/// Slow subscribers may miss records on the channel; the stored log is the
/// source of truth and can be replayed from any sequence number.
const BROADCAST_CAPACITY: usize = 1024;

/// Append-only, ordered record of ledger events.
///
/// Records carry strictly increasing sequence numbers assigned at append
/// time. The journal is write-once: records are never mutated or removed.
pub struct EventJournal {
    records: RwLock<Vec<EventRecord>>,
    live_tx: broadcast::Sender<EventRecord>,
}

impl EventJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        let (live_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            records: RwLock::new(Vec::new()),
            live_tx,
        }
    }

    /// Append an event, assigning it the next sequence number.
    pub fn append(&self, event: LedgerEvent) -> EventRecord {
        let mut records = self.records.write();
        let record = EventRecord::new(records.len() as u64, event);
        records.push(record.clone());
        drop(records);

        debug!(seq = record.seq, kind = record.event.kind(), "Event appended");

        // No subscribers is fine; the stored log still has the record.
        let _ = self.live_tx.send(record.clone());

        record
    }

    /// Subscribe to records appended after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.live_tx.subscribe()
    }

    /// Snapshot of all records from the given sequence number onward.
    pub fn snapshot_from(&self, seq: u64) -> Vec<EventRecord> {
        let records = self.records.read();
        records
            .get(seq as usize..)
            .map(|tail| tail.to_vec())
            .unwrap_or_default()
    }

    /// Snapshot of the full log.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.records.read().clone()
    }

    /// Number of records committed so far.
    pub fn len(&self) -> u64 {
        self.records.read().len() as u64
    }

    /// Check if the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new()
    }
}
