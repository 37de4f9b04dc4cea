//! Ownership and equip checks for the harvesting tool.
//!
//! There is no explicit purchase/upgrade/equip state. Each behaviour asks
//! these functions about the live inventory every tick and derives what is
//! left to do, so a sequence interrupted by combat or death resumes from
//! wherever the inventory says it is.

use berryfarmer_types::{EquipSlot, EquippedItem, InventoryItem, ItemId};

use crate::error::FarmerError;

/// All stacks of one item kind and their combined quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStacks {
    /// Matching stacks in inventory order.
    pub stacks: Vec<InventoryItem>,
    /// Sum of the stack quantities.
    pub total: u32,
}

/// Find every stack of `item_id`.
pub fn find_item(inventory: &[InventoryItem], item_id: ItemId) -> ItemStacks {
    let stacks: Vec<InventoryItem> = inventory
        .iter()
        .filter(|item| item.item_id == item_id)
        .copied()
        .collect();
    let total = stacks
        .iter()
        .fold(0_u32, |sum, item| sum.saturating_add(item.quantity));
    ItemStacks { stacks, total }
}

/// The highest-upgraded owned copy of `item_id`.
///
/// The host's inventory already lists worn pieces, so this ranks every
/// owned copy exactly once. When nothing is owned the result depends on
/// whether buying is allowed: `Ok(None)` if it is, otherwise the
/// configuration fault [`FarmerError::ToolNotOwned`], since later
/// behaviours assume the tool exists once purchasing is out of the picture.
pub fn best_owned(
    inventory: &[InventoryItem],
    item_id: ItemId,
    auto_purchase: bool,
) -> Result<Option<InventoryItem>, FarmerError> {
    let best = inventory
        .iter()
        .filter(|item| item.item_id == item_id)
        .copied()
        .reduce(|best, item| {
            if item.upgrade_level > best.upgrade_level {
                item
            } else {
                best
            }
        });

    if best.is_none() && !auto_purchase {
        return Err(FarmerError::ToolNotOwned { item_id });
    }
    Ok(best)
}

/// Whether the primary-weapon slot holds `item` (same kind, same level).
pub fn is_equipped(equipment: &[EquippedItem], item: &InventoryItem) -> bool {
    equipment
        .iter()
        .find(|worn| worn.slot == EquipSlot::PrimaryWeapon)
        .is_some_and(|worn| worn.item_id == item.item_id && worn.upgrade_level == item.upgrade_level)
}
