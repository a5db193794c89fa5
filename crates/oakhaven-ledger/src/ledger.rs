//! The central ledger: an append-only log of all currency transfers.
//!
//! The [`Ledger`] struct is the in-memory representation of the ledger for
//! the current simulation run. It holds all [`LedgerEntry`] values and
//! provides methods for recording transactions, applying them against a
//! resident's wallet, and verifying the conservation law.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Wallet-applying**: [`Ledger::apply`] is the single place a wallet
//!   balance changes; it refuses to take a wallet below zero.
//! - **Integer currency**: amounts are `u64` currency units, never `Decimal`.

use oakhaven_types::{LedgerEntryType, ResidentId};
use uuid::Uuid;

use crate::conservation::{verify_conservation, ConservationResult};
use crate::transaction::{LedgerEntry, TransactionBuilder};
use crate::LedgerError;

/// The central ledger tracking all currency transfers in the simulation.
#[derive(Debug, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a pre-built [`LedgerEntry`] (e.g. loaded from the database).
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Apply an entry's effect to a resident's wallet.
    ///
    /// Debits `amount` from `wallet` if this resident is the `from` side,
    /// credits `amount` if they are the `to` side. Refuses a debit that
    /// would take the wallet below zero.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] if the resident is the
    /// debited side and their wallet balance is less than the entry amount.
    pub fn apply(
        entry: &LedgerEntry,
        resident: ResidentId,
        wallet: &mut u64,
    ) -> Result<(), LedgerError> {
        if entry.from == Some(resident) {
            if *wallet < entry.amount {
                return Err(LedgerError::InsufficientFunds {
                    resident,
                    balance: *wallet,
                    amount: entry.amount,
                });
            }
            *wallet -= entry.amount;
        }
        if entry.to == Some(resident) {
            *wallet = wallet.saturating_add(entry.amount);
        }
        Ok(())
    }

    /// Record a shop purchase (resident to shop till).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_purchase(
        &mut self,
        world_seconds: u64,
        buyer: ResidentId,
        amount: u64,
        item: &str,
    ) -> Result<&LedgerEntry, LedgerError> {
        let entry = TransactionBuilder::new(world_seconds, LedgerEntryType::Purchase)
            .from(buyer)
            .amount(amount)
            .reason(format!("PURCHASE:{item}"))
            .build()?;
        self.entries.push(entry);
        self.last()
    }

    /// Record a wage payment on shift completion (world to resident).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_wage(
        &mut self,
        world_seconds: u64,
        resident: ResidentId,
        amount: u64,
        job_id: Uuid,
    ) -> Result<&LedgerEntry, LedgerError> {
        let entry = TransactionBuilder::new(world_seconds, LedgerEntryType::Wage)
            .to(resident)
            .amount(amount)
            .reason("WAGE".to_owned())
            .reference_id(job_id)
            .build()?;
        self.entries.push(entry);
        self.last()
    }

    /// Record a universal basic income payout (world to resident).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_ubi(
        &mut self,
        world_seconds: u64,
        resident: ResidentId,
        amount: u64,
    ) -> Result<&LedgerEntry, LedgerError> {
        let entry = TransactionBuilder::new(world_seconds, LedgerEntryType::Ubi)
            .to(resident)
            .amount(amount)
            .reason("UBI".to_owned())
            .build()?;
        self.entries.push(entry);
        self.last()
    }

    /// Record a resident-to-resident trade.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_trade(
        &mut self,
        world_seconds: u64,
        from: ResidentId,
        to: ResidentId,
        amount: u64,
    ) -> Result<&LedgerEntry, LedgerError> {
        let entry = TransactionBuilder::new(world_seconds, LedgerEntryType::Trade)
            .from(from)
            .to(to)
            .amount(amount)
            .reason("TRADE".to_owned())
            .build()?;
        self.entries.push(entry);
        self.last()
    }

    /// Record a bladder-accident cleaning fee (resident to world).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_cleaning_fee(
        &mut self,
        world_seconds: u64,
        resident: ResidentId,
        amount: u64,
    ) -> Result<&LedgerEntry, LedgerError> {
        let entry = TransactionBuilder::new(world_seconds, LedgerEntryType::CleaningFee)
            .from(resident)
            .amount(amount)
            .reason("CLEANING_FEE".to_owned())
            .build()?;
        self.entries.push(entry);
        self.last()
    }

    /// Record an arrest bounty paid to the arresting officer (world to
    /// officer).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_arrest_bounty(
        &mut self,
        world_seconds: u64,
        officer: ResidentId,
        amount: u64,
        suspect: Uuid,
    ) -> Result<&LedgerEntry, LedgerError> {
        let entry = TransactionBuilder::new(world_seconds, LedgerEntryType::ArrestBounty)
            .to(officer)
            .amount(amount)
            .reason("ARREST_BOUNTY".to_owned())
            .reference_id(suspect)
            .build()?;
        self.entries.push(entry);
        self.last()
    }

    fn last(&self) -> Result<&LedgerEntry, LedgerError> {
        self.entries
            .last()
            .ok_or(LedgerError::MissingField("entries"))
    }

    /// Verify the conservation law for a given world-seconds tick.
    #[must_use]
    pub fn verify_conservation(&self, world_seconds: u64) -> ConservationResult {
        verify_conservation(world_seconds, &self.entries)
    }

    /// Return all entries for a given world-seconds tick.
    #[must_use]
    pub fn entries_for_tick(&self, world_seconds: u64) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.world_seconds == world_seconds)
            .collect()
    }

    /// Return all entries, in insertion order.
    #[must_use]
    pub fn all_entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Calculate the net wallet change for a resident across all entries.
    #[must_use]
    pub fn resident_net_change(&self, resident: ResidentId) -> i64 {
        let mut net: i64 = 0;
        for entry in &self.entries {
            let amount = i64::try_from(entry.amount).unwrap_or(i64::MAX);
            if entry.to == Some(resident) {
                net = net.saturating_add(amount);
            }
            if entry.from == Some(resident) {
                net = net.saturating_sub(amount);
            }
        }
        net
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
    }

    #[test]
    fn record_trade_appends_entry() {
        let mut ledger = Ledger::new();
        let alice = ResidentId::new();
        let bob = ResidentId::new();
        let result = ledger.record_trade(10, alice, bob, 20);
        assert!(result.is_ok());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn trade_balances_conservation() {
        let mut ledger = Ledger::new();
        let alice = ResidentId::new();
        let bob = ResidentId::new();
        ledger.record_trade(10, alice, bob, 20).expect("ok");
        assert_eq!(
            ledger.verify_conservation(10),
            ConservationResult::Balanced
        );
    }

    #[test]
    fn apply_debits_and_credits_wallet() {
        let mut ledger = Ledger::new();
        let alice = ResidentId::new();
        let bob = ResidentId::new();
        let entry = ledger
            .record_trade(10, alice, bob, 20)
            .expect("ok")
            .clone();

        let mut alice_wallet = 50u64;
        Ledger::apply(&entry, alice, &mut alice_wallet).expect("debit ok");
        assert_eq!(alice_wallet, 30);

        let mut bob_wallet = 0u64;
        Ledger::apply(&entry, bob, &mut bob_wallet).expect("credit ok");
        assert_eq!(bob_wallet, 20);
    }

    #[test]
    fn apply_refuses_insufficient_funds() {
        let mut ledger = Ledger::new();
        let alice = ResidentId::new();
        let bob = ResidentId::new();
        let entry = ledger
            .record_trade(10, alice, bob, 100)
            .expect("ok")
            .clone();

        let mut alice_wallet = 5u64;
        let result = Ledger::apply(&entry, alice, &mut alice_wallet);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(alice_wallet, 5, "wallet unchanged on refusal");
    }

    #[test]
    fn ubi_credits_without_debit() {
        let mut ledger = Ledger::new();
        let alice = ResidentId::new();
        let entry = ledger.record_ubi(10, alice, 50).expect("ok").clone();
        let mut wallet = 0u64;
        Ledger::apply(&entry, alice, &mut wallet).expect("credit ok");
        assert_eq!(wallet, 50);
        assert_eq!(ledger.resident_net_change(alice), 50);
    }

    #[test]
    fn entries_for_tick_filters_correctly() {
        let mut ledger = Ledger::new();
        let alice = ResidentId::new();
        let bob = ResidentId::new();
        ledger.record_trade(1, alice, bob, 5).expect("ok");
        ledger.record_trade(2, bob, alice, 3).expect("ok");
        assert_eq!(ledger.entries_for_tick(1).len(), 1);
        assert_eq!(ledger.entries_for_tick(2).len(), 1);
        assert_eq!(ledger.entries_for_tick(3).len(), 0);
    }
}
