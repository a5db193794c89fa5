//! Transaction builder and validation for the central ledger.
//!
//! Provides a [`TransactionBuilder`] that enforces the shape contract for
//! each [`LedgerEntryType`]: which side (`from`, `to`) is a resident versus
//! the abstracted world sink/source. Builders validate inputs before
//! producing a [`LedgerEntry`].

use chrono::{DateTime, Utc};
use oakhaven_types::{LedgerEntryType, ResidentId};
use uuid::Uuid;

use crate::LedgerError;

/// A single append-only ledger record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: Uuid,
    /// World-seconds timestamp this entry was recorded at.
    pub world_seconds: u64,
    /// The category of transfer.
    pub entry_type: LedgerEntryType,
    /// Source resident, or `None` for a world source (wage, UBI, bounty).
    pub from: Option<ResidentId>,
    /// Destination resident, or `None` for a world sink (purchase, fee).
    pub to: Option<ResidentId>,
    /// Currency units moved.
    pub amount: u64,
    /// Human-readable reason.
    pub reason: String,
    /// Optional reference to a related entity (job, trade, offense).
    pub reference_id: Option<Uuid>,
    /// Real-world timestamp when the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// # Examples
///
/// ```
/// use oakhaven_ledger::TransactionBuilder;
/// use oakhaven_types::{LedgerEntryType, ResidentId};
///
/// let entry = TransactionBuilder::new(100, LedgerEntryType::Ubi)
///     .to(ResidentId::new())
///     .amount(50)
///     .reason("UBI".to_owned())
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    world_seconds: u64,
    entry_type: LedgerEntryType,
    from: Option<ResidentId>,
    to: Option<ResidentId>,
    amount: Option<u64>,
    reason: Option<String>,
    reference_id: Option<Uuid>,
}

impl TransactionBuilder {
    /// Start building a ledger entry for the given tick and entry type.
    #[must_use]
    pub const fn new(world_seconds: u64, entry_type: LedgerEntryType) -> Self {
        Self {
            world_seconds,
            entry_type,
            from: None,
            to: None,
            amount: None,
            reason: None,
            reference_id: None,
        }
    }

    /// Set the source resident (debit side).
    #[must_use]
    pub const fn from(mut self, resident: ResidentId) -> Self {
        self.from = Some(resident);
        self
    }

    /// Set the destination resident (credit side).
    #[must_use]
    pub const fn to(mut self, resident: ResidentId) -> Self {
        self.to = Some(resident);
        self
    }

    /// Set the amount of currency moved.
    #[must_use]
    pub const fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the human-readable reason for the transfer.
    #[must_use]
    pub fn reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Set an optional reference ID linking to a related entity.
    #[must_use]
    pub const fn reference_id(mut self, id: Uuid) -> Self {
        self.reference_id = Some(id);
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] if the amount is zero or unset,
    /// [`LedgerError::MissingField`] if the reason is unset, or if a
    /// required resident side is missing for this [`LedgerEntryType`].
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let amount = self.amount.unwrap_or(0);
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let reason = self.reason.ok_or(LedgerError::MissingField("reason"))?;

        let (needs_from, needs_to) = expected_shape(self.entry_type);
        if needs_from && self.from.is_none() {
            return Err(LedgerError::MissingField("from"));
        }
        if needs_to && self.to.is_none() {
            return Err(LedgerError::MissingField("to"));
        }

        Ok(LedgerEntry {
            id: Uuid::now_v7(),
            world_seconds: self.world_seconds,
            entry_type: self.entry_type,
            from: self.from,
            to: self.to,
            amount,
            reason,
            reference_id: self.reference_id,
            created_at: Utc::now(),
        })
    }
}

/// Whether an entry type requires a resident on the `from` and/or `to`
/// side. The other side is the abstracted world sink/source.
const fn expected_shape(entry_type: LedgerEntryType) -> (bool, bool) {
    match entry_type {
        LedgerEntryType::Purchase | LedgerEntryType::CleaningFee => (true, false),
        LedgerEntryType::Wage | LedgerEntryType::Ubi | LedgerEntryType::ArrestBounty => {
            (false, true)
        }
        LedgerEntryType::Trade => (true, true),
    }
}
