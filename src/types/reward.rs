//! Reward catalog entry types

use serde::{Deserialize, Serialize};

/// Reward identifier within the catalog
pub type RewardId = u32;

/// A redeemable reward from the external catalog
///
/// The catalog is read-only from the ledger's perspective; entries are
/// looked up by id when a redemption is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Catalog identifier
    pub id: RewardId,

    /// Display name
    pub name: String,

    /// Point cost of redeeming this reward
    pub cost: u64,

    /// Human-readable description
    pub description: String,
}
