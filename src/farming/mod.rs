//! Farming domain: farm grid setup, planting, wall-clock growth, harvest.
//!
//! Communicates with other domains exclusively through crate::shared events/resources.

use bevy::prelude::*;
use crate::config::FarmConfig;
use crate::shared::*;

pub mod crops;
pub mod harvest;

pub use crops::plant;
pub use harvest::harvest;

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app
            // ------------------------------------------------------------------
            // Grid creation: once, before any save is restored into it
            // ------------------------------------------------------------------
            .add_systems(
                OnEnter(GameState::Playing),
                setup_farm_grid.in_set(SetupSet::Grid),
            )
            // ------------------------------------------------------------------
            // Clock sampling: every frame, before anything reads it
            // ------------------------------------------------------------------
            .add_systems(First, crops::sample_clock)
            // ------------------------------------------------------------------
            // Systems that run during Playing
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    crops::handle_plant_requests,
                    harvest::handle_harvest_requests,
                )
                    .chain()
                    .in_set(FrameSet::Actions)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                crops::tick_plots
                    .in_set(FrameSet::Growth)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Lays out one empty plot per grid cell. Leaves an existing grid alone so a
/// second trip through `OnEnter(Playing)` does not wipe the farm.
pub fn setup_farm_grid(config: Res<FarmConfig>, mut farm_state: ResMut<FarmState>) {
    if !farm_state.is_empty() {
        return;
    }
    *farm_state = FarmState::with_grid(config.grid_width, config.grid_height);
    info!(
        "[Farming] Farm grid ready: {}x{} ({} plots)",
        config.grid_width,
        config.grid_height,
        farm_state.len()
    );
}
