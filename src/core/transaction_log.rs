//! In-memory append-only transaction log
//!
//! Reference implementation of the [`TransactionLog`] contract. Records
//! are grouped per account and returned in timestamp order; each record is
//! immutable once appended.

use crate::core::traits::TransactionLog;
use crate::types::{AccountId, LedgerError, Transaction};
use dashmap::DashMap;

/// Thread-safe per-account transaction history
#[derive(Debug, Default)]
pub struct InMemoryTransactionLog {
    /// Transactions grouped by owning account, in append order
    transactions: DashMap<AccountId, Vec<Transaction>>,
}

impl InMemoryTransactionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
        }
    }

    /// Total number of records across all accounts
    pub fn len(&self) -> usize {
        self.transactions.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether the log holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransactionLog for InMemoryTransactionLog {
    fn append(&self, transaction: Transaction) -> Result<(), LedgerError> {
        let mut entries = self
            .transactions
            .entry(transaction.account_id.clone())
            .or_default();

        // Re-appending the same transaction id is a repair retry whose
        // original write already landed; acknowledge without duplicating.
        if entries.iter().any(|existing| existing.id == transaction.id) {
            return Ok(());
        }

        entries.push(transaction);
        Ok(())
    }

    fn list_by_account(&self, account_id: &AccountId) -> Vec<Transaction> {
        let mut records = self
            .transactions
            .get(account_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        records.sort_by_key(|tx| tx.timestamp);
        records
    }
}
