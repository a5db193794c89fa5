//! Error types for the oakhaven-agents crate.
//!
//! Agent-level operations never panic; every fallible path returns
//! [`AgentError`], which converts to the wire-level [`RejectionDetails`]
//! the gateway sends back in an `action_result` or `error` message.

use oakhaven_types::{RejectionDetails, RejectionReason};

/// Errors raised while validating or applying a resident action.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A precondition named by [`RejectionReason`] was not met.
    #[error("{reason:?}: {message}")]
    Rejected {
        /// The machine-readable rejection code.
        reason: RejectionReason,
        /// Human-readable explanation for logs and the client.
        message: String,
    },

    /// The underlying ledger rejected a wallet operation.
    #[error(transparent)]
    Ledger(#[from] oakhaven_ledger::LedgerError),
}

impl AgentError {
    /// Build a [`Self::Rejected`] from a reason and a `message`.
    pub fn rejected(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self::Rejected {
            reason,
            message: message.into(),
        }
    }

    /// Convert to the wire-level rejection payload sent in `action_result`.
    #[must_use]
    pub fn into_details(self) -> RejectionDetails {
        match self {
            Self::Rejected { reason, message } => RejectionDetails { reason, message },
            Self::Ledger(err) => RejectionDetails {
                reason: RejectionReason::InsufficientFunds,
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_round_trips_into_details() {
        let err = AgentError::rejected(RejectionReason::OutOfStock, "no stock remaining");
        let details = err.into_details();
        assert_eq!(details.reason, RejectionReason::OutOfStock);
        assert_eq!(details.message, "no stock remaining");
    }
}
