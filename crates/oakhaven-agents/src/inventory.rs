//! Inventory operations on a resident's item stacks.
//!
//! Items stack by [`ItemType`] in a `Vec<InventoryItem>` rather than a map,
//! matching the wire representation in [`oakhaven_types::structs::Resident`].
//! A slot is removed entirely once its quantity reaches zero.

use oakhaven_types::{InventoryItem, ItemType, RejectionReason};

use crate::error::AgentError;

/// How many units of `item_type` the inventory currently holds.
#[must_use]
pub fn quantity_of(inventory: &[InventoryItem], item_type: ItemType) -> u32 {
    inventory
        .iter()
        .find(|item| item.item_type == item_type)
        .map_or(0, |item| item.quantity)
}

/// Whether the inventory holds at least `amount` of `item_type`.
#[must_use]
pub fn has_item(inventory: &[InventoryItem], item_type: ItemType, amount: u32) -> bool {
    quantity_of(inventory, item_type) >= amount
}

/// Add `amount` units of `item_type`, stacking onto an existing slot or
/// creating a new one. Stackable items carry a `-1` durability sentinel.
pub fn add_item(inventory: &mut Vec<InventoryItem>, item_type: ItemType, amount: u32) {
    if amount == 0 {
        return;
    }
    if let Some(slot) = inventory.iter_mut().find(|item| item.item_type == item_type) {
        slot.quantity = slot.quantity.saturating_add(amount);
    } else {
        inventory.push(InventoryItem {
            item_type,
            quantity: amount,
            durability: -1,
        });
    }
}

/// Remove `amount` units of `item_type`, dropping the slot entirely once it
/// reaches zero.
///
/// Fails with [`RejectionReason::OutOfStock`] if the resident does not hold
/// enough of the item; there is no dedicated "insufficient quantity" reason
/// in the wire protocol, so this shares `OutOfStock` with shop depletion.
pub fn remove_item(
    inventory: &mut Vec<InventoryItem>,
    item_type: ItemType,
    amount: u32,
) -> Result<(), AgentError> {
    let Some(index) = inventory.iter().position(|item| item.item_type == item_type) else {
        return Err(AgentError::rejected(
            RejectionReason::OutOfStock,
            format!("no {item_type:?} held"),
        ));
    };
    let held = inventory
        .get(index)
        .map(|item| item.quantity)
        .unwrap_or_default();
    if held < amount {
        return Err(AgentError::rejected(
            RejectionReason::OutOfStock,
            format!("only {held} of {item_type:?} held, wanted {amount}"),
        ));
    }
    let remaining = held.saturating_sub(amount);
    if remaining == 0 {
        inventory.remove(index);
    } else if let Some(slot) = inventory.get_mut(index) {
        slot.quantity = remaining;
    }
    Ok(())
}
