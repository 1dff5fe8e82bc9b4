//! Harvest system: player collects ripe crops.

use bevy::prelude::*;
use crate::shared::*;

/// Harvest the plot at `position` into the ledger.
pub fn harvest(
    farm_state: &mut FarmState,
    ledger: &mut EconomyLedger,
    crop_registry: &CropRegistry,
    position: GridPosition,
) -> Result<HarvestYield, ActionRejected> {
    farm_state
        .get_mut(position)
        .ok_or(ActionRejected::UnknownPlot(position))?
        .harvest(crop_registry, ledger)
}

pub fn handle_harvest_requests(
    mut harvest_events: EventReader<HarvestRequestEvent>,
    mut farm_state: ResMut<FarmState>,
    mut ledger: ResMut<EconomyLedger>,
    mut result_events: EventWriter<ActionResultEvent>,
    mut plot_events: EventWriter<PlotStateChangedEvent>,
    crop_registry: Res<CropRegistry>,
) {
    for event in harvest_events.read() {
        let result = match harvest(&mut farm_state, &mut ledger, &crop_registry, event.position) {
            Ok(harvest) => {
                debug!(
                    "[Farming] Harvested {} x{} at {} (+{} xp)",
                    harvest.item_id, harvest.quantity, event.position, harvest.xp_awarded
                );
                plot_events.send(PlotStateChangedEvent {
                    position: event.position,
                    state: PlotState::Empty,
                });
                Ok(ActionSuccess::Harvested {
                    position: event.position,
                    harvest,
                })
            }
            Err(reason) => {
                debug!("[Farming] Nothing to harvest at {}: {}", event.position, reason);
                Err(reason)
            }
        };
        result_events.send(ActionResultEvent { result });
    }
}
