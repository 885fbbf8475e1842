//! Runtime configuration for the ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ledger configuration
///
/// All business limits and operational knobs live here so tests can tighten
/// or relax them without touching the service code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Minimum accepted deposit amount
    pub min_deposit: Decimal,

    /// Minimum pending balance required to invest
    pub min_invest_balance: Decimal,

    /// Currency units per loyalty point
    ///
    /// Points are awarded as floor(invested amount / this divisor);
    /// fractional remainders are discarded, not carried forward.
    pub currency_per_point: u32,

    /// Maximum optimistic-concurrency attempts per operation
    ///
    /// Exhausting the budget surfaces `ConcurrentModification` to the caller.
    pub cas_max_attempts: u32,

    /// Deadline for the investment gateway authorization call
    pub gateway_timeout_ms: u64,

    /// Retention window for idempotency-key results
    pub idempotency_retention_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_deposit: Decimal::ONE,
            min_invest_balance: Decimal::from(20),
            currency_per_point: 10,
            cas_max_attempts: 5,
            gateway_timeout_ms: 5_000,
            idempotency_retention_secs: 3_600,
        }
    }
}

impl LedgerConfig {
    /// Gateway deadline as a `Duration`
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }

    /// Idempotency retention window as a `Duration`
    pub fn idempotency_retention(&self) -> Duration {
        Duration::from_secs(self.idempotency_retention_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = LedgerConfig::default();

        assert_eq!(config.min_deposit, Decimal::ONE);
        assert_eq!(config.min_invest_balance, Decimal::from(20));
        assert_eq!(config.currency_per_point, 10);
        assert_eq!(config.cas_max_attempts, 5);
    }
}
