//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and the verified identity handoff
//! - `transaction`: Transaction records and operation inputs
//! - `reward`: Reward catalog entries
//! - `error`: Error types for the ledger

pub mod account;
pub mod error;
pub mod reward;
pub mod transaction;

pub use account::{Account, AccountId, AccountIdentity};
pub use error::LedgerError;
pub use reward::{Reward, RewardId};
pub use transaction::{
    OperationKind, OperationRecord, RequestId, Transaction, TransactionKind, TransactionStatus,
};
