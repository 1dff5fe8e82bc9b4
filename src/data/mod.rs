//! Data layer: populates the crop catalog at startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills the CropRegistry
//! from the hard-coded game-design data, then transitions the game into
//! GameState::Playing.
//!
//! The catalog is read-only after this point. No domain writes to it.

pub mod crops;

use bevy::prelude::*;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    mut crop_registry: ResMut<CropRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating registries…");

    crops::populate_crops(&mut crop_registry);
    info!("  Crops loaded: {}", crop_registry.crops.len());

    if crop_registry.get(BASE_CROP_ID).is_none() {
        warn!("  Base crop '{}' missing; order generation will have nothing to fall back on", BASE_CROP_ID);
    }

    next_state.set(GameState::Playing);
}
