use bevy::prelude::*;
use crate::shared::*;

/// Drains the ledger's pending notices and re-sends them as events, in the
/// order the ledger queued them.
pub fn publish_ledger_notices(
    mut ledger: ResMut<EconomyLedger>,
    mut gold_events: EventWriter<GoldChangedEvent>,
    mut xp_events: EventWriter<XpChangedEvent>,
    mut level_events: EventWriter<LevelUpEvent>,
    mut inventory_events: EventWriter<InventoryChangedEvent>,
) {
    // Checked through Deref so an idle frame does not mark the ledger changed.
    if !ledger.has_pending_notices() {
        return;
    }
    for notice in ledger.take_notices() {
        match notice {
            LedgerNotice::GoldChanged(gold) => {
                debug!("[Economy] Balance: {}", format_gold(gold));
                gold_events.send(GoldChangedEvent { gold });
            }
            LedgerNotice::XpChanged(xp) => {
                xp_events.send(XpChangedEvent { xp });
            }
            LedgerNotice::LevelUp(level) => {
                info!("[Economy] Reached level {}!", level);
                level_events.send(LevelUpEvent { level });
            }
            LedgerNotice::InventoryChanged { item_id, quantity } => {
                inventory_events.send(InventoryChangedEvent { item_id, quantity });
            }
        }
    }
}

/// Format a gold amount as a display string (e.g. "1,234g").
pub fn format_gold(amount: u64) -> String {
    let s = amount.to_string();
    let mut result = String::new();
    let digits: Vec<char> = s.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }
    result.push('g');
    result
}
