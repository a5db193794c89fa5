//! Conservation law verification for the central ledger.
//!
//! `Trade` entries move currency between two residents without creating or
//! destroying it; every `Trade` entry's amount is debited from one
//! resident and credited to another in equal measure, so the net flow of
//! `Trade` entries within a tick is guaranteed to be zero by construction.
//! This check exists as defense-in-depth against data corruption.
//!
//! `Wage`, `Ubi`, and `ArrestBounty` are source flows (currency enters from
//! an abstracted payer); `Purchase` and `CleaningFee` are sink flows
//! (currency leaves to the shop till or the world). These are excluded
//! from the balance check, as they are expected to be asymmetric.

use oakhaven_types::LedgerEntryType;

use crate::transaction::LedgerEntry;
use crate::LedgerAnomaly;

/// The result of a conservation check for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// The ledger is balanced for this tick.
    Balanced,
    /// The tick's trade entries do not net to zero.
    Anomaly(LedgerAnomaly),
}

/// Verify that all `Trade` entries in a tick net to zero flow.
///
/// Each well-formed `Trade` entry debits and credits the same amount, so
/// this passes by construction for valid entries; it exists to catch
/// corruption (e.g. entries mutated after insertion, or merged from an
/// inconsistent source).
pub fn verify_conservation(world_seconds: u64, entries: &[LedgerEntry]) -> ConservationResult {
    let mut net: i64 = 0;

    for entry in entries {
        if entry.world_seconds != world_seconds || entry.entry_type != LedgerEntryType::Trade {
            continue;
        }
        let amount = i64::try_from(entry.amount).unwrap_or(i64::MAX);
        if entry.from.is_some() {
            net = net.saturating_sub(amount);
        }
        if entry.to.is_some() {
            net = net.saturating_add(amount);
        }
    }

    if net == 0 {
        ConservationResult::Balanced
    } else {
        ConservationResult::Anomaly(LedgerAnomaly {
            world_seconds,
            net_imbalance: net,
            message: format!(
                "ledger anomaly at world-second {world_seconds}: trade entries net to {net} instead of 0"
            ),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::ResidentId;
    use uuid::Uuid;

    use super::*;

    fn make_entry(
        world_seconds: u64,
        entry_type: LedgerEntryType,
        from: Option<ResidentId>,
        to: Option<ResidentId>,
        amount: u64,
    ) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::now_v7(),
            world_seconds,
            entry_type,
            from,
            to,
            amount,
            reason: format!("{entry_type:?}"),
            reference_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_tick_is_balanced() {
        assert_eq!(
            verify_conservation(1, &[]),
            ConservationResult::Balanced
        );
    }

    #[test]
    fn single_trade_is_balanced() {
        let entries = vec![make_entry(
            1,
            LedgerEntryType::Trade,
            Some(ResidentId::new()),
            Some(ResidentId::new()),
            10,
        )];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn ubi_alone_is_balanced() {
        // Ubi is a source flow, excluded from the trade balance check.
        let entries = vec![make_entry(1, LedgerEntryType::Ubi, None, Some(ResidentId::new()), 50)];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn entries_from_other_ticks_are_ignored() {
        let entries = vec![make_entry(
            2,
            LedgerEntryType::Trade,
            Some(ResidentId::new()),
            None,
            99,
        )];
        assert_eq!(verify_conservation(1, &entries), ConservationResult::Balanced);
    }

    #[test]
    fn malformed_trade_missing_credit_is_an_anomaly() {
        // Simulates data corruption: a trade entry missing its `to` side.
        let entries = vec![make_entry(
            1,
            LedgerEntryType::Trade,
            Some(ResidentId::new()),
            None,
            10,
        )];
        let result = verify_conservation(1, &entries);
        assert!(matches!(result, ConservationResult::Anomaly(_)));
    }
}
