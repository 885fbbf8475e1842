//! Core business logic module
//!
//! This module contains the ledger's core components:
//! - `traits` - Storage abstractions (account store, transaction log)
//! - `account_store` - In-memory versioned store with compare-and-swap
//! - `transaction_log` - In-memory append-only audit log
//! - `idempotency` - Request-id replay cache
//! - `ledger` - Ledger service orchestration
//! - `replay` - Batch replay with account-based partitioning

pub mod account_store;
pub mod idempotency;
pub mod ledger;
pub mod replay;
pub mod traits;
pub mod transaction_log;

pub use account_store::InMemoryAccountStore;
pub use idempotency::IdempotencyCache;
pub use ledger::{InvestOutcome, LedgerService};
pub use replay::{partition_by_account, ReplayOutcome, ReplayRunner};
pub use traits::{AccountStore, StoreError, TransactionLog};
pub use transaction_log::InMemoryTransactionLog;
