//! The player's economy: gold, experience, level and item inventory.
//!
//! Fields are private. Every mutation goes through a method that keeps
//! gold and inventory quantities non-negative and queues a `LedgerNotice`
//! for the UI. The economy domain drains the queue into events each frame.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ItemId, STARTER_SEED_ID, STARTER_SEED_QUANTITY, STARTING_GOLD, XP_PER_LEVEL};

/// Outbound notification produced by a ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerNotice {
    GoldChanged(u64),
    XpChanged(u64),
    LevelUp(u32),
    InventoryChanged { item_id: ItemId, quantity: u32 },
}

#[derive(Resource, Debug, Clone)]
pub struct EconomyLedger {
    gold: u64,
    xp: u64,
    level: u32,
    inventory: BTreeMap<ItemId, u32>,
    notices: Vec<LedgerNotice>,
}

impl Default for EconomyLedger {
    fn default() -> Self {
        Self::new(STARTING_GOLD, [(STARTER_SEED_ID.to_string(), STARTER_SEED_QUANTITY)])
    }
}

/// Plain-value form of the ledger used by the save file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub gold: u64,
    pub xp: u64,
    pub level: u32,
    /// Sorted by item id.
    pub inventory: Vec<(ItemId, u32)>,
}

impl EconomyLedger {
    pub fn new(gold: u64, starter_items: impl IntoIterator<Item = (ItemId, u32)>) -> Self {
        Self {
            gold,
            xp: 0,
            level: 1,
            inventory: starter_items.into_iter().collect(),
            notices: Vec::new(),
        }
    }

    pub fn gold(&self) -> u64 {
        self.gold
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// XP needed to leave the current level.
    pub fn xp_to_next_level(&self) -> u64 {
        self.level as u64 * XP_PER_LEVEL
    }

    // --- Gold ---

    /// Deduct `amount` if affordable. All or nothing.
    pub fn try_spend(&mut self, amount: u64) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        self.notices.push(LedgerNotice::GoldChanged(self.gold));
        true
    }

    pub fn add_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
        self.notices.push(LedgerNotice::GoldChanged(self.gold));
    }

    // --- XP & level ---

    /// Credit xp and level up as many times as it pays for.
    ///
    /// Each level-up consumes `level * XP_PER_LEVEL` xp; the remainder carries
    /// into the new level. The level stops at `u32::MAX`.
    pub fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
        loop {
            let required = self.xp_to_next_level();
            if self.xp < required || self.level == u32::MAX {
                break;
            }
            self.xp -= required;
            self.level += 1;
            self.notices.push(LedgerNotice::LevelUp(self.level));
        }
        self.notices.push(LedgerNotice::XpChanged(self.xp));
    }

    // --- Inventory ---

    /// 0 for items never seen.
    pub fn inventory_quantity(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    pub fn inventory(&self) -> impl Iterator<Item = (&ItemId, u32)> + '_ {
        self.inventory.iter().map(|(id, qty)| (id, *qty))
    }

    pub fn add_to_inventory(&mut self, item_id: &str, amount: u32) {
        let entry = self.inventory.entry(item_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
        let quantity = *entry;
        self.notices.push(LedgerNotice::InventoryChanged {
            item_id: item_id.to_string(),
            quantity,
        });
    }

    /// Remove `amount` if at least that many are held. All or nothing.
    pub fn try_remove_from_inventory(&mut self, item_id: &str, amount: u32) -> bool {
        let current = self.inventory_quantity(item_id);
        if current < amount {
            return false;
        }
        let quantity = current - amount;
        self.inventory.insert(item_id.to_string(), quantity);
        self.notices.push(LedgerNotice::InventoryChanged {
            item_id: item_id.to_string(),
            quantity,
        });
        true
    }

    // --- Notices ---

    pub fn take_notices(&mut self) -> Vec<LedgerNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn has_pending_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    // --- Persistence ---

    pub fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            gold: self.gold,
            xp: self.xp,
            level: self.level,
            inventory: self
                .inventory
                .iter()
                .map(|(id, qty)| (id.clone(), *qty))
                .collect(),
        }
    }

    /// Overwrite every field with the snapshot's values, then announce the
    /// new gold and xp so observers resynchronize.
    pub fn restore(&mut self, snapshot: LedgerSnapshot) {
        self.gold = snapshot.gold;
        self.xp = snapshot.xp;
        self.level = snapshot.level;
        self.inventory = snapshot.inventory.into_iter().collect();
        self.notices.push(LedgerNotice::GoldChanged(self.gold));
        self.notices.push(LedgerNotice::XpChanged(self.xp));
    }
}
