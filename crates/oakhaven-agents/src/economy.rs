//! Shop purchase, UBI collection, and item consumption (§4.6).

use oakhaven_ledger::Ledger;
use oakhaven_types::{ItemType, LedgerEntryType, RejectionReason, Resident};

use crate::error::AgentError;
use crate::inventory;
use crate::shop::ShopRegistry;

/// Restore applied by eating or drinking an item, `(hunger, thirst)`.
const fn restore_for(item_type: ItemType) -> Option<(u32, u32)> {
    match item_type {
        ItemType::Bread | ItemType::WildBerries => Some((35, 0)),
        ItemType::WaterFlask => Some((0, 35)),
        ItemType::SleepingBag => None,
    }
}

/// Buy one unit of `item_type` from the shop for `resident`.
///
/// Requires the resident to be inside the shop building (checked by the
/// caller via `current_building`), hold the full price, and the item to be
/// in stock.
pub fn buy(
    resident: &mut Resident,
    shop: &mut ShopRegistry,
    ledger: &mut Ledger,
    world_seconds: u64,
    item_type: ItemType,
) -> Result<(), AgentError> {
    let Some(listing) = shop.listing(item_type) else {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "no such item"));
    };
    if listing.stock == 0 {
        return Err(AgentError::rejected(RejectionReason::OutOfStock, "out of stock"));
    }
    if resident.wallet < listing.price {
        return Err(AgentError::rejected(
            RejectionReason::InsufficientFunds,
            "insufficient funds",
        ));
    }

    let price = shop.buy(item_type).ok_or_else(|| {
        AgentError::rejected(RejectionReason::OutOfStock, "out of stock")
    })?;
    let entry = ledger
        .record_purchase(world_seconds, resident.id, price, &format!("{item_type:?}"))?
        .clone();
    Ledger::apply(&entry, resident.id, &mut resident.wallet)?;
    inventory::add_item(&mut resident.inventory, item_type, 1);
    Ok(())
}

/// The 24 game-hour UBI cooldown, in world-seconds.
const UBI_COOLDOWN_WORLD_SECONDS: u64 = 24 * 60 * 60;

/// World-seconds timestamp of the most recent UBI credit to `resident`, by
/// scanning the ledger rather than storing a dedicated timestamp field.
fn last_ubi_collection(ledger: &Ledger, resident: oakhaven_types::ResidentId) -> Option<u64> {
    ledger
        .all_entries()
        .iter()
        .filter(|entry| entry.entry_type == LedgerEntryType::Ubi && entry.to == Some(resident))
        .map(|entry| entry.world_seconds)
        .max()
}

/// Collect UBI for `resident`, provided the cooldown since their last
/// collection has elapsed.
pub fn collect_ubi(
    resident: &mut Resident,
    ledger: &mut Ledger,
    world_seconds: u64,
    amount: u64,
) -> Result<(), AgentError> {
    if let Some(last) = last_ubi_collection(ledger, resident.id) {
        if world_seconds.saturating_sub(last) < UBI_COOLDOWN_WORLD_SECONDS {
            return Err(AgentError::rejected(RejectionReason::TooSoon, "UBI cooldown has not elapsed"));
        }
    }
    let entry = ledger.record_ubi(world_seconds, resident.id, amount)?.clone();
    Ledger::apply(&entry, resident.id, &mut resident.wallet)?;
    Ok(())
}

/// Consume one unit of `item_type` from `resident`'s inventory (`eat`/
/// `drink`), applying its hunger/thirst restore.
pub fn consume(resident: &mut Resident, item_type: ItemType) -> Result<(), AgentError> {
    let Some((hunger, thirst)) = restore_for(item_type) else {
        return Err(AgentError::rejected(RejectionReason::InvalidParams, "item is not consumable"));
    };
    inventory::remove_item(&mut resident.inventory, item_type, 1)?;
    resident.needs.hunger = resident.needs.hunger.saturating_add(hunger).min(100);
    resident.needs.thirst = resident.needs.thirst.saturating_add(thirst).min(100);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use oakhaven_types::{Custody, LifecycleStatus, Needs, Position, ResidentId, ResidentKind, ResidentTransient, SpeedMode};

    use super::*;
    use crate::shop::ShopListing;

    fn resident(wallet: u64) -> Resident {
        Resident {
            id: ResidentId::new(),
            passport_no: "OC-0000001".to_owned(),
            display_name: "Test".to_owned(),
            kind: ResidentKind::Agent,
            status: LifecycleStatus::Alive,
            position: Position::new(0.0, 0.0),
            facing_degrees: 0,
            velocity: Position::new(0.0, 0.0),
            speed_mode: SpeedMode::Stopped,
            sleeping: false,
            needs: Needs { hunger: 10, thirst: 10, ..Needs::full() },
            wallet,
            inventory: Vec::new(),
            employment: None,
            current_building: None,
            webhook_url: None,
            bio: None,
            custody: Custody::default(),
            transient: ResidentTransient::default(),
            registered_at: Utc::now(),
        }
    }

    fn shop() -> ShopRegistry {
        ShopRegistry::new(vec![ShopListing {
            item_type: ItemType::Bread,
            price: 5,
            stock: 1,
            default_stock: 10,
        }])
    }

    #[test]
    fn buy_debits_wallet_and_adds_the_item() {
        let mut r = resident(10);
        let mut shop = shop();
        let mut ledger = Ledger::new();
        buy(&mut r, &mut shop, &mut ledger, 0, ItemType::Bread).unwrap();
        assert_eq!(r.wallet, 5);
        assert_eq!(inventory::quantity_of(&r.inventory, ItemType::Bread), 1);
    }

    #[test]
    fn buy_rejects_insufficient_funds() {
        let mut r = resident(2);
        let mut shop = shop();
        let mut ledger = Ledger::new();
        let err = buy(&mut r, &mut shop, &mut ledger, 0, ItemType::Bread).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::InsufficientFunds);
    }

    #[test]
    fn buy_rejects_when_out_of_stock() {
        let mut r = resident(100);
        let mut shop = shop();
        let mut ledger = Ledger::new();
        buy(&mut r, &mut shop, &mut ledger, 0, ItemType::Bread).unwrap();
        let err = buy(&mut r, &mut shop, &mut ledger, 0, ItemType::Bread).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::OutOfStock);
    }

    #[test]
    fn collect_ubi_credits_wallet_on_first_collection() {
        let mut r = resident(0);
        let mut ledger = Ledger::new();
        collect_ubi(&mut r, &mut ledger, 0, 20).unwrap();
        assert_eq!(r.wallet, 20);
    }

    #[test]
    fn collect_ubi_rejects_within_the_cooldown() {
        let mut r = resident(0);
        let mut ledger = Ledger::new();
        collect_ubi(&mut r, &mut ledger, 0, 20).unwrap();
        let err = collect_ubi(&mut r, &mut ledger, 10, 20).unwrap_err();
        assert_eq!(err.into_details().reason, RejectionReason::TooSoon);
    }

    #[test]
    fn collect_ubi_succeeds_again_after_the_cooldown() {
        let mut r = resident(0);
        let mut ledger = Ledger::new();
        collect_ubi(&mut r, &mut ledger, 0, 20).unwrap();
        collect_ubi(&mut r, &mut ledger, UBI_COOLDOWN_WORLD_SECONDS, 20).unwrap();
        assert_eq!(r.wallet, 40);
    }

    #[test]
    fn consume_restores_needs_and_decrements_inventory() {
        let mut r = resident(0);
        inventory::add_item(&mut r.inventory, ItemType::Bread, 1);
        consume(&mut r, ItemType::Bread).unwrap();
        assert_eq!(r.needs.hunger, 45);
        assert!(r.inventory.is_empty());
    }
}
