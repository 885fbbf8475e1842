//! Ledger service orchestration
//!
//! This module provides the `LedgerService`, the only component that
//! writes to the account store or the transaction log. Every operation is
//! one atomic read-validate-write cycle:
//!
//! 1. Read the current `(account, version)` snapshot (creating the account
//!    on first reference).
//! 2. Validate preconditions and compute the next state.
//! 3. Submit the write conditioned on the version being unchanged; retry
//!    from a fresh read on conflict, up to a bounded attempt budget.
//! 4. On commit, append the paired transaction record and cache the result
//!    under the caller's request id.
//!
//! For investments the external gateway is consulted between steps 2 and 3,
//! strictly before any local mutation and with no lock held while awaiting
//! it. A gateway decline, error, or timeout aborts the operation with the
//! account untouched.

use crate::catalog::RewardCatalog;
use crate::config::LedgerConfig;
use crate::core::idempotency::{Committed, IdempotencyCache};
use crate::core::traits::{AccountStore, StoreError, TransactionLog};
use crate::gateway::InvestmentGateway;
use crate::types::{
    Account, AccountIdentity, LedgerError, RequestId, RewardId, Transaction,
};
use dashmap::DashMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Result of a successful investment
#[derive(Debug, Clone, PartialEq)]
pub struct InvestOutcome {
    /// Account state after the commit
    pub account: Account,

    /// Points awarded for this investment
    pub points_earned: u64,
}

/// Orchestrates every balance and point mutation
///
/// The service is cheap to clone (all state is behind `Arc`) and safe to
/// share across concurrent request handlers. Operations on different
/// accounts proceed independently; operations on the same account are
/// serialized by the store's conditional-write contract.
pub struct LedgerService<S, L, G> {
    store: Arc<S>,
    log: Arc<L>,
    gateway: Arc<G>,
    catalog: Arc<RewardCatalog>,
    config: LedgerConfig,
    idempotency: Arc<IdempotencyCache>,

    /// Transactions whose log append failed after the account write
    /// committed, awaiting the reconciliation pass
    pending_appends: Arc<DashMap<Uuid, Transaction>>,
}

impl<S, L, G> Clone for LedgerService<S, L, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            log: Arc::clone(&self.log),
            gateway: Arc::clone(&self.gateway),
            catalog: Arc::clone(&self.catalog),
            config: self.config.clone(),
            idempotency: Arc::clone(&self.idempotency),
            pending_appends: Arc::clone(&self.pending_appends),
        }
    }
}

impl<S, L, G> LedgerService<S, L, G>
where
    S: AccountStore,
    L: TransactionLog,
    G: InvestmentGateway,
{
    /// Create a ledger service over the given collaborators
    pub fn new(store: S, log: L, gateway: G, catalog: RewardCatalog, config: LedgerConfig) -> Self {
        let idempotency = IdempotencyCache::new(config.idempotency_retention());
        Self {
            store: Arc::new(store),
            log: Arc::new(log),
            gateway: Arc::new(gateway),
            catalog: Arc::new(catalog),
            config,
            idempotency: Arc::new(idempotency),
            pending_appends: Arc::new(DashMap::new()),
        }
    }

    /// Fetch an account snapshot
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account exists under the id.
    pub fn get_account(&self, account_id: &str) -> Result<Account, LedgerError> {
        self.store
            .get(account_id)
            .ok_or_else(|| LedgerError::not_found(account_id))
    }

    /// List an account's transactions, oldest first
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account exists under the id.
    pub fn list_transactions(&self, account_id: &str) -> Result<Vec<Transaction>, LedgerError> {
        if self.store.get(account_id).is_none() {
            return Err(LedgerError::not_found(account_id));
        }
        Ok(self.log.list_by_account(&account_id.to_string()))
    }

    /// Snapshot all accounts
    pub fn accounts(&self) -> Vec<Account> {
        self.store.accounts()
    }

    /// Add funds to the pending balance
    ///
    /// Creates the account lazily on first reference. The new balance is
    /// the old balance plus `amount`; a `deposit` transaction records the
    /// movement.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount` is below the configured minimum
    /// - `ConcurrentModification` if the retry budget is exhausted
    pub async fn deposit(
        &self,
        identity: &AccountIdentity,
        amount: Decimal,
        request_id: RequestId,
    ) -> Result<Account, LedgerError> {
        if amount < self.config.min_deposit {
            return Err(LedgerError::invalid_amount(amount, self.config.min_deposit));
        }

        if let Some(hit) = self.idempotency.get(&request_id) {
            debug!(account = %identity.account_id, request = %request_id, "replaying cached result");
            return Ok(hit.account);
        }

        let account_id = identity.account_id.as_str();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let current = self.store.create_if_absent(identity);
            let new_balance = current
                .pending_balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", account_id))?;

            match self
                .store
                .compare_and_swap(account_id, current.version, |account| {
                    account.pending_balance = new_balance;
                }) {
                Ok(updated) => {
                    info!(
                        account = %account_id,
                        %amount,
                        balance = %updated.pending_balance,
                        "deposit committed"
                    );
                    let transaction = Transaction::deposit(account_id, amount);
                    self.commit(request_id, &updated, transaction);
                    return Ok(updated);
                }
                Err(StoreError::VersionConflict { current: stored }) => {
                    if attempts >= self.config.cas_max_attempts {
                        return Err(LedgerError::concurrent_modification(account_id, attempts));
                    }
                    debug!(
                        account = %account_id,
                        attempt = attempts,
                        stored_version = stored,
                        "version conflict on deposit, retrying from fresh read"
                    );
                }
                Err(StoreError::NotFound) => {
                    return Err(LedgerError::not_found(account_id));
                }
            }
        }
    }

    /// Convert the whole pending balance into an investment
    ///
    /// The gateway authorizes the transfer of the balance read at the start
    /// of the attempt; the conditional write then guarantees the committed
    /// amount is exactly the authorized one. A conflict re-reads and
    /// re-authorizes, since the balance may have changed underneath.
    ///
    /// # Errors
    ///
    /// - `InsufficientBalance` if the balance is below the investable minimum
    /// - `GatewayFailure` if the gateway declines, errors, or times out
    ///   (account untouched in all three cases)
    /// - `ConcurrentModification` if the retry budget is exhausted
    pub async fn invest(
        &self,
        identity: &AccountIdentity,
        request_id: RequestId,
    ) -> Result<InvestOutcome, LedgerError> {
        if let Some(hit) = self.idempotency.get(&request_id) {
            debug!(account = %identity.account_id, request = %request_id, "replaying cached result");
            let points_earned = hit.transaction.points_delta.max(0) as u64;
            return Ok(InvestOutcome {
                account: hit.account,
                points_earned,
            });
        }

        let account_id = identity.account_id.as_str();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let current = self.store.create_if_absent(identity);
            if current.pending_balance < self.config.min_invest_balance {
                return Err(LedgerError::insufficient_balance(
                    account_id,
                    current.pending_balance,
                    self.config.min_invest_balance,
                ));
            }
            let invest_amount = current.pending_balance;

            // The gateway only gates the decision; it moves no funds. It is
            // consulted before any local mutation so an abort here leaves
            // nothing to roll back.
            match timeout(
                self.config.gateway_timeout(),
                self.gateway.authorize(&identity.account_id, invest_amount),
            )
            .await
            {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(account = %account_id, amount = %invest_amount, %err, "gateway rejected investment");
                    return Err(LedgerError::gateway_failure(err.to_string()));
                }
                Err(_) => {
                    warn!(account = %account_id, amount = %invest_amount, "gateway authorization timed out");
                    return Err(LedgerError::gateway_failure("authorization timed out"));
                }
            }

            let points_earned = self.earned_points(account_id, invest_amount)?;
            let new_points = current
                .points
                .checked_add(points_earned)
                .ok_or_else(|| LedgerError::arithmetic_overflow("invest", account_id))?;

            match self
                .store
                .compare_and_swap(account_id, current.version, |account| {
                    account.pending_balance = Decimal::ZERO;
                    account.points = new_points;
                }) {
                Ok(updated) => {
                    info!(
                        account = %account_id,
                        amount = %invest_amount,
                        points = points_earned,
                        "investment committed"
                    );
                    let transaction =
                        Transaction::investment(account_id, invest_amount, points_earned);
                    self.commit(request_id, &updated, transaction);
                    return Ok(InvestOutcome {
                        account: updated,
                        points_earned,
                    });
                }
                Err(StoreError::VersionConflict { current: stored }) => {
                    if attempts >= self.config.cas_max_attempts {
                        return Err(LedgerError::concurrent_modification(account_id, attempts));
                    }
                    debug!(
                        account = %account_id,
                        attempt = attempts,
                        stored_version = stored,
                        "version conflict on invest, re-reading and re-authorizing"
                    );
                }
                Err(StoreError::NotFound) => {
                    return Err(LedgerError::not_found(account_id));
                }
            }
        }
    }

    /// Spend points on a catalog reward
    ///
    /// Under contention the precondition is re-evaluated against the fresh
    /// state on every attempt, so two redemptions that are individually
    /// affordable but jointly unaffordable resolve with exactly one winner.
    ///
    /// # Errors
    ///
    /// - `UnknownReward` if the id is not in the catalog
    /// - `InsufficientPoints` if the account cannot afford the reward
    /// - `ConcurrentModification` if the retry budget is exhausted
    pub async fn redeem(
        &self,
        identity: &AccountIdentity,
        reward_id: RewardId,
        request_id: RequestId,
    ) -> Result<Account, LedgerError> {
        let reward = self
            .catalog
            .get(reward_id)
            .ok_or(LedgerError::UnknownReward { reward: reward_id })?
            .clone();

        if let Some(hit) = self.idempotency.get(&request_id) {
            debug!(account = %identity.account_id, request = %request_id, "replaying cached result");
            return Ok(hit.account);
        }

        let account_id = identity.account_id.as_str();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let current = self.store.create_if_absent(identity);
            if current.points < reward.cost {
                return Err(LedgerError::insufficient_points(
                    account_id,
                    current.points,
                    reward.cost,
                ));
            }
            let new_points = current.points - reward.cost;

            match self
                .store
                .compare_and_swap(account_id, current.version, |account| {
                    account.points = new_points;
                }) {
                Ok(updated) => {
                    info!(
                        account = %account_id,
                        reward = reward_id,
                        cost = reward.cost,
                        points = updated.points,
                        "redemption committed"
                    );
                    let transaction = Transaction::redemption(account_id, reward_id, reward.cost);
                    self.commit(request_id, &updated, transaction);
                    return Ok(updated);
                }
                Err(StoreError::VersionConflict { current: stored }) => {
                    if attempts >= self.config.cas_max_attempts {
                        return Err(LedgerError::concurrent_modification(account_id, attempts));
                    }
                    debug!(
                        account = %account_id,
                        attempt = attempts,
                        stored_version = stored,
                        "version conflict on redeem, retrying from fresh read"
                    );
                }
                Err(StoreError::NotFound) => {
                    return Err(LedgerError::not_found(account_id));
                }
            }
        }
    }

    /// Retry log appends that failed after their account write committed
    ///
    /// Each pending record is re-appended with its original transaction id;
    /// the log treats a duplicate id as an acknowledged no-op, so repeated
    /// repair passes are safe. Returns the number of records still pending.
    pub fn reconcile(&self) -> usize {
        let pending: Vec<Uuid> = self.pending_appends.iter().map(|e| *e.key()).collect();

        for id in pending {
            if let Some((_, transaction)) = self.pending_appends.remove(&id) {
                if let Err(err) = self.log.append(transaction.clone()) {
                    warn!(transaction = %id, %err, "reconciliation append failed, keeping record queued");
                    self.pending_appends.insert(id, transaction);
                } else {
                    info!(transaction = %id, "reconciliation append succeeded");
                }
            }
        }

        self.pending_appends.len()
    }

    /// Number of transactions awaiting reconciliation
    pub fn pending_reconciliation(&self) -> usize {
        self.pending_appends.len()
    }

    /// Finish a committed mutation: append the audit record and cache the
    /// outcome for idempotent replay
    ///
    /// A failed append never rolls back the committed account write; the
    /// record is queued for the reconciliation pass instead.
    fn commit(&self, request_id: RequestId, account: &Account, transaction: Transaction) {
        if let Err(err) = self.log.append(transaction.clone()) {
            error!(
                account = %transaction.account_id,
                transaction = %transaction.id,
                %err,
                "log append failed after committed account write, queued for reconciliation"
            );
            self.pending_appends
                .insert(transaction.id, transaction.clone());
        }

        self.idempotency.record(
            request_id,
            Committed {
                account: account.clone(),
                transaction,
            },
        );
    }

    /// Points awarded for investing `amount`, using floor division
    fn earned_points(&self, account_id: &str, amount: Decimal) -> Result<u64, LedgerError> {
        let divisor = Decimal::from(self.config.currency_per_point);
        amount
            .checked_div(divisor)
            .and_then(|quotient| quotient.floor().to_u64())
            .ok_or_else(|| LedgerError::arithmetic_overflow("invest", account_id))
    }
}
