//! Core traits for account storage and the transaction log
//!
//! These abstractions decouple the ledger service from the storage
//! backend. The in-memory implementations in this crate are the reference
//! ones; a durable backend only needs to honor the same contracts.

use crate::types::{Account, AccountId, AccountIdentity, LedgerError, Transaction};

/// Failure of a conditional store write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The stored version no longer matches the expected one
    ///
    /// Nothing was written; the caller should re-read and retry.
    VersionConflict {
        /// The version currently stored
        current: u64,
    },

    /// No account exists under the given id
    NotFound,
}

/// Durable keyed storage for account records
///
/// The only mutation primitive is `compare_and_swap`: every higher-level
/// operation reads the current `(account, version)` pair, computes the new
/// state, and submits the write conditioned on the version being unchanged.
/// The naive read-compute-write-back pattern is deliberately impossible to
/// express through this contract, which is what rules out lost updates
/// between concurrent writers.
pub trait AccountStore: Send + Sync {
    /// Fetch an account snapshot by id
    fn get(&self, id: &str) -> Option<Account>;

    /// Get the account for an identity, creating it on first reference
    ///
    /// Idempotent: an existing account is returned unchanged, whatever
    /// email the identity carries now. A new account starts with zeroed
    /// balances and version 0.
    fn create_if_absent(&self, identity: &AccountIdentity) -> Account;

    /// Conditionally apply a mutation to an account
    ///
    /// The mutation runs against a copy of the stored account only if the
    /// stored version still equals `expected_version`; the result is
    /// persisted with `version + 1` and returned. On a version mismatch
    /// nothing is written and `VersionConflict` is returned.
    ///
    /// The mutation must be pure: it computes the next state and nothing
    /// else, because it may be re-invoked on a retry after a conflict.
    fn compare_and_swap<F>(
        &self,
        id: &str,
        expected_version: u64,
        mutation: F,
    ) -> Result<Account, StoreError>
    where
        F: FnOnce(&mut Account);

    /// Snapshot all accounts (for output and reconciliation)
    fn accounts(&self) -> Vec<Account>;
}

/// Append-only store of immutable transaction records
pub trait TransactionLog: Send + Sync {
    /// Append one transaction record
    ///
    /// Fails only on storage unavailability and never writes a partial
    /// record. Appending a transaction id that is already present is a
    /// no-op success, so a repair pass can retry an append whose
    /// acknowledgment was lost.
    fn append(&self, transaction: Transaction) -> Result<(), LedgerError>;

    /// All transactions for an account, ordered by timestamp ascending
    ///
    /// The returned sequence is finite and each call restarts from the
    /// beginning.
    fn list_by_account(&self, account_id: &AccountId) -> Vec<Transaction>;
}
