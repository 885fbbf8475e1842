//! Account-related types for the rewards ledger
//!
//! This module defines the Account structure holding the monetary state
//! of a single account, plus the verified identity handed over by the
//! external authentication collaborator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque stable account identifier
///
/// Issued by the external identity collaborator (already verified).
/// The ledger treats it as an opaque key.
pub type AccountId = String;

/// Verified identity supplied by the caller on every mutating operation
///
/// The authentication collaborator verifies the user and hands the ledger
/// an account id plus contact email. There is no ambient "current user"
/// state anywhere in this crate; every call carries its identity explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    /// Verified account identifier
    pub account_id: AccountId,

    /// Contact email, used only when the account is first created
    pub email: String,
}

impl AccountIdentity {
    /// Create a verified identity from an account id and email
    pub fn new(account_id: impl Into<AccountId>, email: impl Into<String>) -> Self {
        AccountIdentity {
            account_id: account_id.into(),
            email: email.into(),
        }
    }
}

/// Account state
///
/// Represents the current monetary state of an account: the deposited
/// balance not yet converted into an investment, and the loyalty points
/// earned by past investments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Opaque stable identifier from the identity collaborator
    pub id: AccountId,

    /// Contact email, immutable after creation
    pub email: String,

    /// Deposited currency not yet converted into an investment
    ///
    /// Never negative. Grows on deposit, reset to zero on a successful
    /// investment.
    pub pending_balance: Decimal,

    /// Loyalty points earned on investment, spent on redemption
    ///
    /// Never negative.
    pub points: u64,

    /// Optimistic-concurrency version
    ///
    /// Incremented by the store on every committed mutation. A writer that
    /// read version `n` may only commit if the stored version is still `n`.
    pub version: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zeroed balances and version 0
    pub fn new(identity: &AccountIdentity) -> Self {
        Account {
            id: identity.account_id.clone(),
            email: identity.email.clone(),
            pending_balance: Decimal::ZERO,
            points: 0,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_zeroed() {
        let identity = AccountIdentity::new("acct-1", "user@example.com");
        let account = Account::new(&identity);

        assert_eq!(account.id, "acct-1");
        assert_eq!(account.email, "user@example.com");
        assert_eq!(account.pending_balance, Decimal::ZERO);
        assert_eq!(account.points, 0);
        assert_eq!(account.version, 0);
    }
}
