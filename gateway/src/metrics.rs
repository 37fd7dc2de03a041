//! Metrics collection for gateway monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Gateway metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total deposits accepted.
    pub deposits_total: AtomicU64,
    /// Total withdrawals settled.
    pub withdrawals_total: AtomicU64,
    /// Withdrawals that failed at the transfer sink.
    pub withdrawals_failed: AtomicU64,
    /// Calls rejected by the core for any reason.
    pub calls_rejected: AtomicU64,
    /// Requests rejected at the transport layer (bad key, bad shape).
    pub requests_rejected: AtomicU64,
}

/// Point-in-time counter values for the metrics endpoint.
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub deposits_total: u64,
    pub withdrawals_total: u64,
    pub withdrawals_failed: u64,
    pub calls_rejected: u64,
    pub requests_rejected: u64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted deposit.
    pub fn deposit_accepted(&self) {
        self.deposits_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a settled withdrawal.
    pub fn withdrawal_settled(&self) {
        self.withdrawals_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a withdrawal that failed at the sink.
    pub fn withdrawal_failed(&self) {
        self.withdrawals_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call the core rejected.
    pub fn call_rejected(&self) {
        self.calls_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transport-level rejection.
    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            deposits_total: self.deposits_total.load(Ordering::Relaxed),
            withdrawals_total: self.withdrawals_total.load(Ordering::Relaxed),
            withdrawals_failed: self.withdrawals_failed.load(Ordering::Relaxed),
            calls_rejected: self.calls_rejected.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
        }
    }
}
