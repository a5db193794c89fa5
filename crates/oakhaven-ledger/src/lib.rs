//! Wallet bookkeeping for the Oakhaven colony simulation.
//!
//! Every currency movement between residents (and the abstracted "world"
//! sources/sinks: shop till, bank, arrest bounty, cleaning fee) is tracked
//! through this ledger. The ledger never panics; it returns errors, and it
//! never lets a resident's wallet go negative.
//!
//! # Architecture
//!
//! - [`transaction`] -- [`TransactionBuilder`] for validated entry construction.
//! - [`ledger`] -- The [`Ledger`] struct: append-only log plus wallet application.
//! - [`conservation`] -- Conservation law verification for resident-to-resident trades.
//!
//! # Conservation law
//!
//! A `Trade` entry moves currency from one resident to another: the amount
//! debited from the source must equal the amount credited to the
//! destination by construction, since both sides share a single `amount`
//! field. `Wage`, `Ubi`, and `ArrestBounty` entries are source flows (money
//! enters the economy from an abstracted payer); `Purchase` and
//! `CleaningFee` are sink flows (money leaves to the shop till or the
//! world). [`conservation::verify_conservation`] checks that the sum of
//! `Trade` amounts debited equals the sum credited within a tick.
//!
//! # Usage
//!
//! ```
//! use oakhaven_ledger::{Ledger, TransactionBuilder};
//! use oakhaven_ledger::ConservationResult;
//! use oakhaven_types::{LedgerEntryType, ResidentId};
//!
//! let mut ledger = Ledger::new();
//! let alice = ResidentId::new();
//! let bob = ResidentId::new();
//!
//! // World pays alice UBI.
//! ledger.record_ubi(100, alice, 50).ok();
//!
//! // Alice pays bob for a trade.
//! ledger.record_trade(100, alice, bob, 20).ok();
//!
//! assert_eq!(ledger.verify_conservation(100), ConservationResult::Balanced);
//! ```

pub mod conservation;
pub mod ledger;
pub mod transaction;

pub use conservation::ConservationResult;
pub use ledger::Ledger;
pub use transaction::TransactionBuilder;

use oakhaven_types::ResidentId;

/// Errors that can occur when recording or applying ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("ledger entry amount must be non-zero")]
    ZeroAmount,

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Applying this entry would take a resident's wallet below zero.
    #[error("insufficient funds: resident {resident} has {balance}, needs {amount}")]
    InsufficientFunds {
        /// The resident whose wallet would go negative.
        resident: ResidentId,
        /// Current wallet balance.
        balance: u64,
        /// The amount that was attempted to be debited.
        amount: u64,
    },
}

/// A conservation law violation detected during tick verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The world-seconds tick where the anomaly was detected.
    pub world_seconds: u64,
    /// Net imbalance across all trade entries in the tick; zero when
    /// balanced.
    pub net_imbalance: i64,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
