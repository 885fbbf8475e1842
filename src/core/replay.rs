//! Batch replay of operation records with account-based partitioning
//!
//! Replays a batch of ledger operations through the service. Records are
//! partitioned by account id so that different accounts proceed
//! concurrently while each account's records keep their original order.
//!
//! # Guarantees
//!
//! - Each record is applied exactly once and appears in exactly one
//!   partition
//! - Records for one account are applied in input order
//! - A failed record is captured in its outcome and does not stop the rest
//!   of the batch

use crate::core::ledger::LedgerService;
use crate::core::traits::{AccountStore, TransactionLog};
use crate::gateway::InvestmentGateway;
use crate::types::{
    Account, AccountId, AccountIdentity, LedgerError, OperationKind, OperationRecord,
};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::warn;

/// Result of replaying a single operation record
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// The record that was replayed
    pub record: OperationRecord,

    /// Updated account on success, typed failure otherwise
    pub result: Result<Account, LedgerError>,
}

/// Replays operation batches against a ledger service
pub struct ReplayRunner<S, L, G> {
    service: LedgerService<S, L, G>,
    max_concurrent: usize,
}

impl<S, L, G> Clone for ReplayRunner<S, L, G> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            max_concurrent: self.max_concurrent,
        }
    }
}

impl<S, L, G> ReplayRunner<S, L, G>
where
    S: AccountStore,
    L: TransactionLog,
    G: InvestmentGateway,
{
    /// Create a runner that replays up to `max_concurrent` accounts at once
    pub fn new(service: LedgerService<S, L, G>, max_concurrent: usize) -> Self {
        Self {
            service,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Replay a batch of records
    ///
    /// Outcomes are returned grouped per account in application order; the
    /// order of accounts relative to each other is not specified.
    pub async fn run(&self, records: Vec<OperationRecord>) -> Vec<ReplayOutcome> {
        let partitions = partition_by_account(records);

        let grouped: Vec<Vec<ReplayOutcome>> = stream::iter(partitions.into_values().map(|ops| {
            let service = self.service.clone();
            async move { replay_account(service, ops).await }
        }))
        .buffer_unordered(self.max_concurrent)
        .collect()
        .await;

        grouped.into_iter().flatten().collect()
    }
}

/// Partition a batch by account id, preserving per-account record order
pub fn partition_by_account(
    records: Vec<OperationRecord>,
) -> HashMap<AccountId, Vec<OperationRecord>> {
    let mut partitions: HashMap<AccountId, Vec<OperationRecord>> = HashMap::new();

    for record in records {
        partitions
            .entry(record.account_id.clone())
            .or_default()
            .push(record);
    }

    partitions
}

/// Apply one account's records sequentially
async fn replay_account<S, L, G>(
    service: LedgerService<S, L, G>,
    records: Vec<OperationRecord>,
) -> Vec<ReplayOutcome>
where
    S: AccountStore,
    L: TransactionLog,
    G: InvestmentGateway,
{
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
        let identity = AccountIdentity::new(record.account_id.clone(), record.email.clone());

        let result = match record.kind {
            OperationKind::Deposit => match record.amount {
                Some(amount) => service.deposit(&identity, amount, record.request_id).await,
                None => Err(LedgerError::ParseError {
                    line: None,
                    message: "deposit record is missing an amount".to_string(),
                }),
            },
            OperationKind::Invest => service
                .invest(&identity, record.request_id)
                .await
                .map(|outcome| outcome.account),
            OperationKind::Redeem => match record.reward_id {
                Some(reward) => service.redeem(&identity, reward, record.request_id).await,
                None => Err(LedgerError::ParseError {
                    line: None,
                    message: "redeem record is missing a reward id".to_string(),
                }),
            },
        };

        if let Err(err) = &result {
            warn!(account = %record.account_id, kind = ?record.kind, %err, "operation rejected during replay");
        }

        outcomes.push(ReplayOutcome { record, result });
    }

    outcomes
}
