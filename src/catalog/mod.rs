//! Read-only reward catalog
//!
//! The catalog is an external collaborator from the ledger's point of view:
//! a fixed list of `{id, name, cost, description}` entries queried by id.
//! A built-in default set ships with the crate; deployments can replace it
//! with a CSV file at startup.

use crate::types::{LedgerError, Reward, RewardId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Immutable reward catalog, keyed by reward id
#[derive(Debug, Clone)]
pub struct RewardCatalog {
    rewards: HashMap<RewardId, Reward>,
}

/// CSV row shape for catalog files
///
/// Columns: id, name, cost, description
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: RewardId,
    name: String,
    cost: u64,
    description: String,
}

impl RewardCatalog {
    /// Build a catalog from a list of rewards
    ///
    /// Later entries with a duplicate id replace earlier ones.
    pub fn new(rewards: impl IntoIterator<Item = Reward>) -> Self {
        RewardCatalog {
            rewards: rewards.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Load a catalog from a CSV file with columns id, name, cost, description
    pub fn from_csv_path(path: &Path) -> Result<Self, LedgerError> {
        let mut reader = csv::Reader::from_path(path).map_err(LedgerError::from)?;
        let mut rewards = Vec::new();

        for row in reader.deserialize() {
            let row: CatalogRow = row?;
            rewards.push(Reward {
                id: row.id,
                name: row.name,
                cost: row.cost,
                description: row.description,
            });
        }

        Ok(Self::new(rewards))
    }

    /// Look up a reward by id
    pub fn get(&self, id: RewardId) -> Option<&Reward> {
        self.rewards.get(&id)
    }

    /// Number of rewards in the catalog
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

impl Default for RewardCatalog {
    /// The built-in reward set
    fn default() -> Self {
        let reward = |id, name: &str, cost, description: &str| Reward {
            id,
            name: name.to_string(),
            cost,
            description: description.to_string(),
        };

        Self::new([
            reward(1, "Coffee Gift Card", 50, "$5 Starbucks Gift Card"),
            reward(2, "Movie Ticket", 100, "Free movie ticket"),
            reward(3, "Pizza Voucher", 150, "$10 Pizza Hut voucher"),
            reward(4, "Amazon Gift Card", 200, "$20 Amazon Gift Card"),
            reward(5, "Gas Card", 250, "$25 Shell Gas Card"),
            reward(6, "Restaurant Meal", 300, "$30 Restaurant voucher"),
        ])
    }
}
