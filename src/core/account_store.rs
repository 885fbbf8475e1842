//! In-memory versioned account store
//!
//! This module provides `InMemoryAccountStore`, the reference
//! implementation of the [`AccountStore`] contract backed by `DashMap`.
//!
//! # Design
//!
//! `DashMap` gives fine-grained per-entry locking, so operations on
//! different accounts never contend with each other. The version check and
//! the write inside `compare_and_swap` happen under a single entry lock,
//! which makes the check-then-write pair atomic for one account while the
//! lock itself is held only for the duration of the local mutation, never
//! across anything slow.

use crate::core::traits::{AccountStore, StoreError};
use crate::types::{Account, AccountIdentity};
use dashmap::DashMap;

/// Thread-safe versioned account storage
///
/// Multiple threads can safely operate on different accounts concurrently;
/// writes to the same account serialize on its entry lock, and the version
/// condition turns a stale write into a clean `VersionConflict` instead of
/// a lost update.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    /// Account records keyed by account id
    accounts: DashMap<String, Account>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, id: &str) -> Option<Account> {
        self.accounts.get(id).map(|entry| entry.value().clone())
    }

    fn create_if_absent(&self, identity: &AccountIdentity) -> Account {
        self.accounts
            .entry(identity.account_id.clone())
            .or_insert_with(|| Account::new(identity))
            .clone()
    }

    fn compare_and_swap<F>(
        &self,
        id: &str,
        expected_version: u64,
        mutation: F,
    ) -> Result<Account, StoreError>
    where
        F: FnOnce(&mut Account),
    {
        let mut entry = self.accounts.get_mut(id).ok_or(StoreError::NotFound)?;
        let stored = entry.value_mut();

        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                current: stored.version,
            });
        }

        let mut next = stored.clone();
        mutation(&mut next);
        next.version = stored.version + 1;
        *stored = next.clone();

        Ok(next)
    }

    fn accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn identity(id: &str) -> AccountIdentity {
        AccountIdentity::new(id, format!("{}@example.com", id))
    }

    #[test]
    fn test_get_missing_account_returns_none() {
        let store = InMemoryAccountStore::new();
        assert!(store.get("acct-1").is_none());
    }

    #[test]
    fn test_create_if_absent_creates_zeroed_account() {
        let store = InMemoryAccountStore::new();

        let account = store.create_if_absent(&identity("acct-1"));

        assert_eq!(account.id, "acct-1");
        assert_eq!(account.pending_balance, Decimal::ZERO);
        assert_eq!(account.points, 0);
        assert_eq!(account.version, 0);
    }

    #[test]
    fn test_create_if_absent_is_idempotent() {
        let store = InMemoryAccountStore::new();

        store.create_if_absent(&identity("acct-1"));
        store
            .compare_and_swap("acct-1", 0, |account| {
                account.pending_balance = Decimal::from(10);
            })
            .unwrap();

        // A second reference, even with a different email, returns the
        // existing record unchanged.
        let again = store.create_if_absent(&AccountIdentity::new("acct-1", "other@example.com"));

        assert_eq!(again.email, "acct-1@example.com");
        assert_eq!(again.pending_balance, Decimal::from(10));
        assert_eq!(again.version, 1);
    }

    #[test]
    fn test_compare_and_swap_bumps_version() {
        let store = InMemoryAccountStore::new();
        store.create_if_absent(&identity("acct-1"));

        let updated = store
            .compare_and_swap("acct-1", 0, |account| {
                account.pending_balance = Decimal::from(15);
            })
            .unwrap();

        assert_eq!(updated.pending_balance, Decimal::from(15));
        assert_eq!(updated.version, 1);
        assert_eq!(store.get("acct-1").unwrap().version, 1);
    }

    #[test]
    fn test_compare_and_swap_stale_version_conflicts_without_side_effects() {
        let store = InMemoryAccountStore::new();
        store.create_if_absent(&identity("acct-1"));

        store
            .compare_and_swap("acct-1", 0, |account| {
                account.pending_balance = Decimal::from(15);
            })
            .unwrap();

        // A writer still holding version 0 must be rejected untouched.
        let result = store.compare_and_swap("acct-1", 0, |account| {
            account.pending_balance = Decimal::from(999);
        });

        assert_eq!(result, Err(StoreError::VersionConflict { current: 1 }));
        assert_eq!(store.get("acct-1").unwrap().pending_balance, Decimal::from(15));
    }

    #[test]
    fn test_compare_and_swap_missing_account() {
        let store = InMemoryAccountStore::new();

        let result = store.compare_and_swap("acct-9", 0, |_| {});

        assert_eq!(result, Err(StoreError::NotFound));
    }

    #[test]
    fn test_concurrent_cas_retry_loops_lose_no_updates() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryAccountStore::new());
        store.create_if_absent(&identity("acct-1"));

        let mut handles = vec![];
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    loop {
                        let current = store.get("acct-1").unwrap();
                        let next = current.pending_balance + Decimal::ONE;
                        match store.compare_and_swap("acct-1", current.version, |account| {
                            account.pending_balance = next;
                        }) {
                            Ok(_) => break,
                            Err(StoreError::VersionConflict { .. }) => continue,
                            Err(other) => panic!("unexpected store error: {:?}", other),
                        }
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let account = store.get("acct-1").unwrap();
        assert_eq!(account.pending_balance, Decimal::from(800));
        assert_eq!(account.version, 800);
    }

    #[test]
    fn test_accounts_snapshot() {
        let store = InMemoryAccountStore::new();
        store.create_if_absent(&identity("acct-1"));
        store.create_if_absent(&identity("acct-2"));

        let accounts = store.accounts();
        assert_eq!(accounts.len(), 2);
    }
}
