//! Error types for Custodia ledger operations.

use crate::{Address, Units};
use thiserror::Error;

/// Main error type for ledger operations.
///
/// Every failure is terminal for the current call: nothing is retried
/// internally, and no partial mutation is observable after an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller lacks the role required by the operation.
    #[error("caller {caller} is not permitted to {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    /// Null identity or non-positive amount.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Withdrawal exceeds the recorded balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Units, available: Units },

    /// The outbound value-transfer collaborator reported failure or timed out.
    #[error("transfer failed: {0}")]
    TransferFailed(String),
}

impl LedgerError {
    /// Get a stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::Unauthorized { .. } => "UNAUTHORIZED",
            LedgerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::TransferFailed(_) => "TRANSFER_FAILED",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LedgerError::Unauthorized {
            caller: Address::new("MALLORY"),
            action: "withdraw",
        };
        assert_eq!(err.error_code(), "UNAUTHORIZED");

        let err = LedgerError::InsufficientBalance {
            requested: 1000,
            available: 60,
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert_eq!(
            err.to_string(),
            "insufficient balance: requested 1000, available 60"
        );
    }
}
