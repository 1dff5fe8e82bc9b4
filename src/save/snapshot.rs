//! Save file layout and the conversion between it and live resources.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::SaveError;
use crate::shared::*;

pub const SAVE_VERSION: u32 = 1;

/// Everything written to storage.
///
/// Plots are stored as `(position, plot)` pairs because JSON object keys
/// must be strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub version: u32,
    pub ledger: LedgerSnapshot,
    pub plots: Vec<(GridPosition, PlotSnapshot)>,
    /// Older saves carry no orders; a fresh board is generated for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<OrderBookSnapshot>,
    pub saved_at_ms: u64,
}

pub fn capture(
    ledger: &EconomyLedger,
    farm_state: &FarmState,
    order_book: &OrderBook,
    now_ms: u64,
) -> FarmSnapshot {
    FarmSnapshot {
        version: SAVE_VERSION,
        ledger: ledger.to_snapshot(),
        plots: farm_state
            .plots()
            .map(|plot| (plot.position(), plot.to_snapshot()))
            .collect(),
        orders: Some(order_book.to_snapshot()),
        saved_at_ms: now_ms,
    }
}

/// Overwrite live state with `snapshot`.
///
/// Every plot is emptied first, then the saved ones are put back. Saved
/// positions that are not on the current grid are dropped. Growth is left
/// for the next tick to reconcile.
pub fn restore(
    snapshot: FarmSnapshot,
    ledger: &mut EconomyLedger,
    farm_state: &mut FarmState,
    order_book: &mut OrderBook,
) {
    if snapshot.version != SAVE_VERSION {
        warn!(
            "[Save] Save has version {} but current version is {}. Attempting to load anyway.",
            snapshot.version, SAVE_VERSION
        );
    }

    ledger.restore(snapshot.ledger);

    farm_state.clear_all();
    for (position, plot) in snapshot.plots {
        match farm_state.get_mut(position) {
            Some(target) => target.restore(plot),
            None => debug!("[Save] Dropping saved plot {} outside the farm grid", position),
        }
    }

    if let Some(orders) = snapshot.orders {
        order_book.restore(orders);
    }
}

pub fn encode(snapshot: &FarmSnapshot) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn decode(text: &str) -> Result<FarmSnapshot, SaveError> {
    let snapshot: FarmSnapshot = serde_json::from_str(text)?;
    if let Some(orders) = &snapshot.orders {
        if !orders.ids_in_range() {
            return Err(SaveError::Invalid(format!(
                "order ids must stay below {}",
                OrderId::MAX
            )));
        }
    }
    Ok(snapshot)
}
