//! Rewards Ledger Library
//! # Overview
//!
//! This library provides an account ledger for a deposit-invest-redeem
//! rewards system: money deposited into a pending balance can be converted
//! into an investment that earns loyalty points, and points can be spent
//! on catalog rewards. Every mutation is recorded as an immutable
//! transaction, and the numeric invariants (no negative balances, no lost
//! updates, no double redemption) hold under concurrent access.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, Reward, errors)
//! - [`config`] - Runtime limits and operational knobs
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Ledger service orchestration
//!   - [`core::account_store`] - Versioned account storage with compare-and-swap
//!   - [`core::transaction_log`] - Append-only audit log
//!   - [`core::idempotency`] - Request-id replay cache
//!   - [`core::replay`] - Batch replay with account-based partitioning
//! - [`gateway`] - Investment gateway abstraction (external collaborator)
//! - [`catalog`] - Read-only reward catalog (external collaborator)
//! - [`cli`] - CLI argument parsing
//! - [`io`] - CSV input parsing and account output
//!
//! # Operations
//!
//! The ledger service exposes five operations:
//!
//! - **Deposit**: Add funds to an account's pending balance
//! - **Invest**: Convert the whole pending balance into an investment,
//!   earning one point per full ten currency units (gateway-authorized)
//! - **Redeem**: Spend points on a catalog reward
//! - **GetAccount** / **ListTransactions**: Read-only snapshots
//!
//! # Concurrency
//!
//! All mutations go through a single conditional-write primitive on the
//! account store. Writers read a versioned snapshot, compute the next
//! state, and commit only if the version is unchanged, retrying from a
//! fresh read on conflict. This serializes operations per account without
//! holding any lock across the (potentially slow) gateway call.

// Module declarations
pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod gateway;
pub mod io;
pub mod types;

pub use crate::core::{
    AccountStore, InMemoryAccountStore, InMemoryTransactionLog, InvestOutcome, LedgerService,
    ReplayRunner, TransactionLog,
};
pub use catalog::RewardCatalog;
pub use config::LedgerConfig;
pub use gateway::{AutoApproveGateway, InvestmentGateway};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, AccountIdentity, LedgerError, OperationRecord, RequestId, Reward,
    RewardId, Transaction, TransactionKind, TransactionStatus,
};
