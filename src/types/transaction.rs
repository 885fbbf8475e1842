//! Transaction-related types for the rewards ledger
//!
//! This module defines the immutable transaction record written for every
//! committed mutation, plus the operation records used as input when
//! replaying a batch of ledger operations.

use crate::types::{AccountId, RewardId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied idempotency key
///
/// A retried request carrying the same identifier returns the originally
/// committed result instead of re-applying the mutation.
pub type RequestId = Uuid;

/// Kind of a committed ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Currency added to the pending balance
    Deposit,

    /// Pending balance converted into an investment, earning points
    Investment,

    /// Points spent on a catalog reward
    Redemption,
}

/// Terminal status of a transaction record
///
/// There is no persisted in-flight state: a record is written only at the
/// moment its account mutation commits. `Failed` exists in the record
/// layout for reconciliation tooling but is never produced by the service,
/// which writes no record at all for rejected or aborted operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Failed,
}

/// Immutable audit record of one committed ledger operation
///
/// Transactions are never updated or deleted. The account's balance and
/// points can in principle be reconstructed by folding its transactions,
/// which is what reconciliation and the property tests rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, generated at creation
    pub id: Uuid,

    /// Owning account
    pub account_id: AccountId,

    /// Operation kind
    pub kind: TransactionKind,

    /// Currency amount moved (zero for redemptions)
    pub amount: Decimal,

    /// Signed change in points
    ///
    /// Positive for investments, negative for redemptions, zero for deposits.
    pub points_delta: i64,

    /// Terminal status
    pub status: TransactionStatus,

    /// Creation time
    pub timestamp: DateTime<Utc>,

    /// Redeemed reward, present only for redemptions
    pub reward_id: Option<RewardId>,
}

impl Transaction {
    /// Record for a committed deposit
    pub fn deposit(account_id: &str, amount: Decimal) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            kind: TransactionKind::Deposit,
            amount,
            points_delta: 0,
            status: TransactionStatus::Completed,
            timestamp: Utc::now(),
            reward_id: None,
        }
    }

    /// Record for a committed investment
    ///
    /// `amount` is the pre-investment pending balance; `points_earned` is
    /// the floor-divided point award.
    pub fn investment(account_id: &str, amount: Decimal, points_earned: u64) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            kind: TransactionKind::Investment,
            amount,
            points_delta: points_earned as i64,
            status: TransactionStatus::Completed,
            timestamp: Utc::now(),
            reward_id: None,
        }
    }

    /// Record for a committed redemption
    pub fn redemption(account_id: &str, reward_id: RewardId, cost: u64) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            kind: TransactionKind::Redemption,
            amount: Decimal::ZERO,
            points_delta: -(cost as i64),
            status: TransactionStatus::Completed,
            timestamp: Utc::now(),
            reward_id: Some(reward_id),
        }
    }
}

/// Kind of an input operation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Deposit,
    Invest,
    Redeem,
}

/// Input operation record for batch replay
///
/// Represents a single ledger operation as read from an input file. The
/// amount is only meaningful for deposits and the reward only for
/// redemptions; the conversion layer enforces their presence.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// The operation to perform
    pub kind: OperationKind,

    /// Target account id
    pub account_id: AccountId,

    /// Contact email for lazy account creation
    pub email: String,

    /// Deposit amount; `None` for invest and redeem
    pub amount: Option<Decimal>,

    /// Reward to redeem; `None` for deposit and invest
    pub reward_id: Option<RewardId>,

    /// Idempotency key for the operation
    pub request_id: RequestId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_record_has_no_points_delta() {
        let tx = Transaction::deposit("acct-1", Decimal::new(1500, 2));

        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.amount, Decimal::new(1500, 2));
        assert_eq!(tx.points_delta, 0);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.reward_id, None);
    }

    #[test]
    fn test_investment_record_carries_points_earned() {
        let tx = Transaction::investment("acct-1", Decimal::new(2500, 2), 2);

        assert_eq!(tx.kind, TransactionKind::Investment);
        assert_eq!(tx.amount, Decimal::new(2500, 2));
        assert_eq!(tx.points_delta, 2);
        assert_eq!(tx.reward_id, None);
    }

    #[test]
    fn test_redemption_record_negates_cost() {
        let tx = Transaction::redemption("acct-1", 3, 150);

        assert_eq!(tx.kind, TransactionKind::Redemption);
        assert_eq!(tx.amount, Decimal::ZERO);
        assert_eq!(tx.points_delta, -150);
        assert_eq!(tx.reward_id, Some(3));
    }

    #[test]
    fn test_transaction_ids_are_unique() {
        let a = Transaction::deposit("acct-1", Decimal::ONE);
        let b = Transaction::deposit("acct-1", Decimal::ONE);
        assert_ne!(a.id, b.id);
    }
}
