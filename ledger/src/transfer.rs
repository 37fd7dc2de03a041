//! Outbound value-transfer capability.
//!
//! The ledger treats settlement as an opaque effectful dependency: during a
//! withdrawal it hands the sink an address and an amount, awaits the
//! outcome, and commits or rolls back accordingly. The sink is never
//! retried by the ledger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use custodia_common::{Address, Units};

/// Failure reported by a transfer sink.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransferError(pub String);

impl TransferError {
    /// Create a new transfer error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Trait for outbound value-transfer collaborators.
#[async_trait]
pub trait TransferSink: Send + Sync {
    /// Get the sink name.
    fn name(&self) -> &str;

    /// Push `amount` units to `to`.
    ///
    /// Must resolve to a definite outcome before returning; there is no
    /// fire-and-forget path.
    async fn transfer(&self, to: &Address, amount: Units) -> Result<(), TransferError>;
}

/// Sink that settles instantly and always succeeds.
///
/// Used by in-process deployments where the balance table itself is the
/// settlement medium, and as the default wiring for local runs.
pub struct ImmediateSettlement;

#[async_trait]
impl TransferSink for ImmediateSettlement {
    fn name(&self) -> &str {
        "immediate"
    }

    async fn transfer(&self, to: &Address, amount: Units) -> Result<(), TransferError> {
        debug!(to = %to, amount = %amount, "Immediate settlement");
        Ok(())
    }
}

/// Decorator that imposes a host deadline on an inner sink.
///
/// A timeout is reported as a transfer failure, never as success, so the
/// caller rolls back exactly as it would for an explicit rejection.
pub struct DeadlineSink<S> {
    inner: Arc<S>,
    deadline: Duration,
}

impl<S: TransferSink> DeadlineSink<S> {
    /// Wrap a sink with a deadline.
    pub fn new(inner: Arc<S>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl<S: TransferSink> TransferSink for DeadlineSink<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn transfer(&self, to: &Address, amount: Units) -> Result<(), TransferError> {
        match tokio::time::timeout(self.deadline, self.inner.transfer(to, amount)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransferError::new(format!(
                "transfer via {} exceeded deadline of {:?}",
                self.inner.name(),
                self.deadline
            ))),
        }
    }
}
