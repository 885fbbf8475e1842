//! Idempotency-key replay cache
//!
//! Every mutating ledger call carries a caller-supplied request id. The
//! result of a committed operation is retained under that id for a bounded
//! window, so a retry after a crash or network timeout returns the original
//! outcome instead of re-applying the mutation.
//!
//! Only committed outcomes are cached. A rejected request had no side
//! effects, so replaying it simply re-evaluates the preconditions.

use crate::types::{Account, RequestId, Transaction};
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Outcome of a committed ledger operation, as replayed to retries
#[derive(Debug, Clone)]
pub struct Committed {
    /// Account state as of the commit
    pub account: Account,

    /// The transaction record written for the commit
    pub transaction: Transaction,
}

/// Entry pairing a committed outcome with its insertion time
#[derive(Debug, Clone)]
struct CacheEntry {
    committed: Committed,
    stored_at: Instant,
}

/// Bounded-retention cache of committed results keyed by request id
#[derive(Debug)]
pub struct IdempotencyCache {
    entries: DashMap<RequestId, CacheEntry>,
    retention: Duration,
}

impl IdempotencyCache {
    /// Create a cache that retains results for the given window
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            retention,
        }
    }

    /// Look up the committed result for a request id, if still retained
    pub fn get(&self, request_id: &RequestId) -> Option<Committed> {
        let entry = self.entries.get(request_id)?;
        if entry.stored_at.elapsed() > self.retention {
            drop(entry);
            self.entries.remove(request_id);
            return None;
        }
        Some(entry.committed.clone())
    }

    /// Record a committed result under its request id
    ///
    /// Expired entries are pruned opportunistically on each insert, which
    /// keeps the cache bounded without a dedicated sweeper task.
    pub fn record(&self, request_id: RequestId, committed: Committed) {
        let retention = self.retention;
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() <= retention);

        self.entries.insert(
            request_id,
            CacheEntry {
                committed,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
