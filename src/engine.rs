//! Top-level plugin: shared resources, events, set ordering and every domain
//! plugin. Both the binary and embedders add just this.

use bevy::prelude::*;

use crate::config::FarmConfig;
use crate::shared::*;
use crate::{data, economy, farming, save};

pub struct HayfieldPlugin;

impl Plugin for HayfieldPlugin {
    fn build(&self, app: &mut App) {
        // Config must exist before the domain plugins read it at build time.
        if !app.world().contains_resource::<FarmConfig>() {
            app.insert_resource(FarmConfig::default());
        }
        let starting_ledger = app.world().resource::<FarmConfig>().starting_ledger();

        app
            // Game state
            .init_state::<GameState>()
            // Shared resources
            .insert_resource(starting_ledger)
            .init_resource::<FarmClock>()
            .init_resource::<FarmState>()
            .init_resource::<CropRegistry>()
            .init_resource::<OrderBook>()
            // Action requests
            .add_event::<PlantRequestEvent>()
            .add_event::<HarvestRequestEvent>()
            .add_event::<FulfillOrderRequestEvent>()
            .add_event::<ActionResultEvent>()
            // Notifications
            .add_event::<GoldChangedEvent>()
            .add_event::<XpChangedEvent>()
            .add_event::<LevelUpEvent>()
            .add_event::<InventoryChangedEvent>()
            .add_event::<PlotStateChangedEvent>()
            // Ordering
            .configure_sets(
                OnEnter(GameState::Playing),
                (SetupSet::Grid, SetupSet::Restore, SetupSet::Orders).chain(),
            )
            .configure_sets(
                Update,
                (FrameSet::Actions, FrameSet::Growth, FrameSet::Publish).chain(),
            )
            // Domain plugins
            .add_plugins(farming::FarmingPlugin)
            .add_plugins(economy::EconomyPlugin)
            .add_plugins(save::SavePlugin)
            // Data loading
            .add_plugins(data::DataPlugin);
    }
}
