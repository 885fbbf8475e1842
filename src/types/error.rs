//! Error types for the rewards ledger
//!
//! This module defines all error types that can occur during ledger
//! operations. Every failure is a typed result returned to the caller;
//! no operation is ever fatal to the process.
//!
//! # Error Categories
//!
//! - **Validation errors**: invalid amounts, unknown rewards (not retried)
//! - **Business-rule rejections**: insufficient balance or points (not
//!   retried automatically)
//! - **External dependency failures**: gateway declined or timed out (safe
//!   to retry the whole call, no local state changed)
//! - **Transient contention**: concurrent modification after exhausting
//!   internal retries (retryable by the caller)
//! - **I/O and parsing errors**: file and CSV problems on the replay path

use crate::types::{AccountId, RewardId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the rewards ledger
///
/// Each variant includes enough context to diagnose the failure from an
/// operator log line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Deposit amount below the allowed minimum
    ///
    /// Input validation failure; not retried.
    #[error("Invalid amount {amount}: minimum deposit is {minimum}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// The configured minimum
        minimum: Decimal,
    },

    /// Pending balance below the investable minimum
    ///
    /// Business-rule rejection; the caller must deposit more funds first.
    #[error("Insufficient balance for account {account}: pending {balance}, minimum investable {required}")]
    InsufficientBalance {
        /// Account id
        account: AccountId,
        /// Current pending balance
        balance: Decimal,
        /// Minimum required to invest
        required: Decimal,
    },

    /// Point total below the reward's cost
    ///
    /// Business-rule rejection; the caller must earn more points first.
    #[error("Insufficient points for account {account}: have {points}, reward costs {required}")]
    InsufficientPoints {
        /// Account id
        account: AccountId,
        /// Current point total
        points: u64,
        /// Cost of the requested reward
        required: u64,
    },

    /// Reward id not present in the catalog
    ///
    /// Bad reference; not retried.
    #[error("Unknown reward {reward}")]
    UnknownReward {
        /// The unknown reward id
        reward: RewardId,
    },

    /// Investment gateway declined, errored, or timed out
    ///
    /// The gateway is consulted before any local mutation, so this failure
    /// leaves the account untouched and the whole call is safe to retry.
    #[error("Investment gateway failure: {reason}")]
    GatewayFailure {
        /// Description of the gateway outcome
        reason: String,
    },

    /// Optimistic-concurrency retries exhausted
    ///
    /// Transient contention on one account; surfaced to the caller as a
    /// retryable error after the internal retry budget is spent.
    #[error("Concurrent modification of account {account} persisted across {attempts} attempts")]
    ConcurrentModification {
        /// Account id
        account: AccountId,
        /// Number of attempts made
        attempts: u32,
    },

    /// Account does not exist
    ///
    /// Only read operations fail this way; mutations create the account
    /// lazily on first reference.
    #[error("Account {account} not found")]
    NotFound {
        /// Account id
        account: AccountId,
    },

    /// Arithmetic overflow would occur
    ///
    /// The mutation is rejected to keep the account's numeric state intact.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account id
        account: AccountId,
    },

    /// Transaction log rejected an append
    ///
    /// The paired account mutation already committed; the record is queued
    /// and re-appended by the reconciliation pass.
    #[error("Transaction log unavailable: {message}")]
    LogUnavailable {
        /// Description of the storage failure
        message: String,
    },

    /// CSV parsing error on the replay path
    ///
    /// Recoverable; the malformed record is skipped and replay continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// I/O error while reading input or writing output
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper constructors for the variants built in more than one place

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, minimum: Decimal) -> Self {
        LedgerError::InvalidAmount { amount, minimum }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(account: &str, balance: Decimal, required: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            account: account.to_string(),
            balance,
            required,
        }
    }

    /// Create an InsufficientPoints error
    pub fn insufficient_points(account: &str, points: u64, required: u64) -> Self {
        LedgerError::InsufficientPoints {
            account: account.to_string(),
            points,
            required,
        }
    }

    /// Create a GatewayFailure error
    pub fn gateway_failure(reason: impl Into<String>) -> Self {
        LedgerError::GatewayFailure {
            reason: reason.into(),
        }
    }

    /// Create a ConcurrentModification error
    pub fn concurrent_modification(account: &str, attempts: u32) -> Self {
        LedgerError::ConcurrentModification {
            account: account.to_string(),
            attempts,
        }
    }

    /// Create a NotFound error
    pub fn not_found(account: &str) -> Self {
        LedgerError::NotFound {
            account: account.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::invalid_amount(
        LedgerError::InvalidAmount { amount: Decimal::new(50, 2), minimum: Decimal::ONE },
        "Invalid amount 0.50: minimum deposit is 1"
    )]
    #[case::insufficient_balance(
        LedgerError::insufficient_balance("acct-1", Decimal::new(1999, 2), Decimal::new(20, 0)),
        "Insufficient balance for account acct-1: pending 19.99, minimum investable 20"
    )]
    #[case::insufficient_points(
        LedgerError::insufficient_points("acct-1", 2, 50),
        "Insufficient points for account acct-1: have 2, reward costs 50"
    )]
    #[case::unknown_reward(
        LedgerError::UnknownReward { reward: 99 },
        "Unknown reward 99"
    )]
    #[case::gateway_failure(
        LedgerError::gateway_failure("declined by processor"),
        "Investment gateway failure: declined by processor"
    )]
    #[case::concurrent_modification(
        LedgerError::concurrent_modification("acct-1", 5),
        "Concurrent modification of account acct-1 persisted across 5 attempts"
    )]
    #[case::not_found(
        LedgerError::not_found("acct-9"),
        "Account acct-9 not found"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
