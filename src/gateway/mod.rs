//! Investment gateway abstraction
//!
//! The gateway is the external service that confirms whether a pending
//! balance may be converted into an investment. It gates the decision but
//! never moves funds itself, and it never reports partial state: a call
//! either confirms or fails.
//!
//! The ledger consults the gateway strictly before touching any local
//! state, so a decline, error, timeout, or cancellation while awaiting the
//! gateway leaves the account exactly as it was.

use crate::types::AccountId;
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure reported by the investment gateway
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The gateway evaluated the transfer and declined it
    #[error("declined: {reason}")]
    Declined {
        /// Reason given by the gateway
        reason: String,
    },

    /// The gateway could not be reached or errored internally
    #[error("unavailable: {message}")]
    Unavailable {
        /// Description of the outage
        message: String,
    },
}

/// External service that authorizes investment transfers
///
/// Implementations may block or take non-trivial time; the ledger applies
/// its own deadline around the call and holds no lock while awaiting it.
#[async_trait]
pub trait InvestmentGateway: Send + Sync {
    /// Ask the gateway to authorize transferring `amount` for `account_id`
    ///
    /// Returns `Ok(())` on confirmation. Any error means the transfer must
    /// not proceed.
    async fn authorize(&self, account_id: &AccountId, amount: Decimal)
        -> Result<(), GatewayError>;
}

/// Gateway that confirms every transfer
///
/// Stands in for the real payment processor in local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct AutoApproveGateway;

#[async_trait]
impl InvestmentGateway for AutoApproveGateway {
    async fn authorize(
        &self,
        _account_id: &AccountId,
        _amount: Decimal,
    ) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Gateway that declines every transfer
///
/// Useful for exercising the abort path.
#[derive(Debug, Clone)]
pub struct DecliningGateway {
    reason: String,
}

impl DecliningGateway {
    /// Create a gateway that declines with the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        DecliningGateway {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl InvestmentGateway for DecliningGateway {
    async fn authorize(
        &self,
        _account_id: &AccountId,
        _amount: Decimal,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::Declined {
            reason: self.reason.clone(),
        })
    }
}
