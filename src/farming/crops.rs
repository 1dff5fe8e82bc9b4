//! Crop planting and growth-stage management.

use bevy::prelude::*;
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Refresh `FarmClock` from the OS unless it is being driven manually.
pub fn sample_clock(mut clock: ResMut<FarmClock>) {
    if clock.source == ClockSource::System {
        clock.now_ms = epoch_millis();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

/// Plant `crop_id` at `position`, paying the seed cost from the ledger.
///
/// Rejections are checked in this order: unknown plot, unknown crop, crop
/// still locked at the player's level, plot not empty, not enough gold.
/// A rejected call changes nothing.
pub fn plant(
    farm_state: &mut FarmState,
    ledger: &mut EconomyLedger,
    crop_registry: &CropRegistry,
    position: GridPosition,
    crop_id: &str,
    now_ms: u64,
) -> Result<(), ActionRejected> {
    let plot = farm_state
        .get_mut(position)
        .ok_or(ActionRejected::UnknownPlot(position))?;
    let def = crop_registry
        .get(crop_id)
        .ok_or_else(|| ActionRejected::UnknownCrop(crop_id.to_string()))?;

    if def.unlock_level > ledger.level() {
        return Err(ActionRejected::CropLocked {
            crop_id: def.id.clone(),
            required: def.unlock_level,
        });
    }

    plot.plant(def, ledger, now_ms)
}

/// Listen for PlantRequestEvent and answer each with an ActionResultEvent.
pub fn handle_plant_requests(
    mut plant_events: EventReader<PlantRequestEvent>,
    mut farm_state: ResMut<FarmState>,
    mut ledger: ResMut<EconomyLedger>,
    mut result_events: EventWriter<ActionResultEvent>,
    mut plot_events: EventWriter<PlotStateChangedEvent>,
    crop_registry: Res<CropRegistry>,
    clock: Res<FarmClock>,
) {
    for event in plant_events.read() {
        let result = plant(
            &mut farm_state,
            &mut ledger,
            &crop_registry,
            event.position,
            &event.crop_id,
            clock.now_ms,
        );

        let result = match result {
            Ok(()) => {
                debug!("[Farming] Planted {} at {}", event.crop_id, event.position);
                plot_events.send(PlotStateChangedEvent {
                    position: event.position,
                    state: PlotState::Planted,
                });
                Ok(ActionSuccess::Planted {
                    position: event.position,
                    crop_id: event.crop_id.clone(),
                })
            }
            Err(reason) => {
                info!("[Farming] Cannot plant {} at {}: {}", event.crop_id, event.position, reason);
                Err(reason)
            }
        };
        result_events.send(ActionResultEvent { result });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth
// ─────────────────────────────────────────────────────────────────────────────

/// Reconcile every growing plot with the current wall-clock time.
///
/// Runs every frame. Because growth only depends on `now` and the planting
/// time, plots restored from a save catch up on their first tick.
pub fn tick_plots(
    mut farm_state: ResMut<FarmState>,
    mut plot_events: EventWriter<PlotStateChangedEvent>,
    crop_registry: Res<CropRegistry>,
    clock: Res<FarmClock>,
) {
    let now_ms = clock.now_ms;
    for plot in farm_state.plots_mut() {
        if let Some(state) = plot.tick(&crop_registry, now_ms) {
            plot_events.send(PlotStateChangedEvent {
                position: plot.position(),
                state,
            });
        }
    }
}
