use bevy::prelude::*;
use std::time::Duration;
use thiserror::Error;

use crate::config::FarmConfig;
use crate::shared::*;

pub mod snapshot;
pub mod store;

pub use snapshot::{capture, decode, encode, restore, FarmSnapshot, SAVE_VERSION};
#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
pub use store::{MemoryStore, SaveStore};

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

/// Why a save could not be read or written. Never fatal: a bad read means
/// "start fresh", a bad write is reported and the game keeps running.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    /// Parsed, but the values cannot be loaded safely.
    #[error("save data is invalid: {0}")]
    Invalid(String),
    #[error("save i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save storage unavailable: {0}")]
    Storage(String),
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Ask for a save at the end of this frame.
#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent;

/// Sent by SavePlugin after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// The backend every save and restore goes through.
#[derive(Resource)]
pub struct SaveStorage {
    store: Box<dyn SaveStore>,
}

impl SaveStorage {
    pub fn new(store: impl SaveStore) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// File on native targets, localStorage in the browser.
    pub fn from_config(config: &FarmConfig) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let store = FileStore::new(config.save_path.clone());
        #[cfg(target_arch = "wasm32")]
        let store = LocalStorageStore::new(config.storage_key.clone());
        Self::new(store)
    }

    pub fn store(&self) -> &dyn SaveStore {
        self.store.as_ref()
    }

    /// `Ok(None)` if nothing has been saved yet.
    pub fn load(&self) -> Result<Option<FarmSnapshot>, SaveError> {
        match self.store.read()? {
            Some(text) => Ok(Some(decode(&text)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, snapshot: &FarmSnapshot) -> Result<(), SaveError> {
        self.store.write(&encode(snapshot)?)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct AutosaveTimer(pub Timer);

impl AutosaveTimer {
    /// `None` for lengths a `Duration` cannot hold (negative, NaN, infinite).
    pub fn from_seconds(secs: f32) -> Option<Self> {
        let interval = Duration::try_from_secs_f32(secs).ok()?;
        Some(Self(Timer::new(interval, TimerMode::Repeating)))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<FarmConfig>()
            .cloned()
            .unwrap_or_default();

        // A storage inserted before this plugin (tests, embedders) wins.
        if !app.world().contains_resource::<SaveStorage>() {
            app.insert_resource(SaveStorage::from_config(&config));
        }

        app.add_event::<SaveRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_systems(
                OnEnter(GameState::Playing),
                restore_from_storage.in_set(SetupSet::Restore),
            )
            .add_systems(
                Update,
                handle_save_requests
                    .in_set(FrameSet::Publish)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Last,
                save_on_exit.run_if(in_state(GameState::Playing)),
            );

        let autosave = if config.autosave_secs > 0.0 {
            AutosaveTimer::from_seconds(config.autosave_secs)
        } else {
            None
        };
        if let Some(timer) = autosave {
            app.insert_resource(timer)
                .add_systems(
                    Update,
                    tick_autosave
                        .before(handle_save_requests)
                        .in_set(FrameSet::Publish)
                        .run_if(in_state(GameState::Playing)),
                );
        } else {
            info!("[Save] Autosave disabled");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Load whatever was saved last time. Missing or unreadable data leaves the
/// fresh defaults in place.
pub fn restore_from_storage(
    storage: Res<SaveStorage>,
    mut ledger: ResMut<EconomyLedger>,
    mut farm_state: ResMut<FarmState>,
    mut order_book: ResMut<OrderBook>,
    mut plot_events: EventWriter<PlotStateChangedEvent>,
) {
    let location = storage.store().describe();
    let snapshot = match storage.load() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            info!("[Save] No save found at {}; starting a new farm", location);
            return;
        }
        Err(e) => {
            warn!("[Save] Ignoring save at {}: {}. Starting a new farm.", location, e);
            return;
        }
    };

    let saved_at_ms = snapshot.saved_at_ms;
    restore(snapshot, &mut ledger, &mut farm_state, &mut order_book);

    for plot in farm_state.plots() {
        if plot.state() != PlotState::Empty {
            plot_events.send(PlotStateChangedEvent {
                position: plot.position(),
                state: plot.state(),
            });
        }
    }
    info!(
        "[Save] Restored farm from {} (saved at {} ms): {}g, level {}, {} orders",
        location,
        saved_at_ms,
        ledger.gold(),
        ledger.level(),
        order_book.len()
    );
}

fn tick_autosave(
    time: Res<Time>,
    mut timer: ResMut<AutosaveTimer>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        debug!("[Save] Autosave");
        save_writer.send(SaveRequestEvent);
    }
}

/// Requests arriving in the same frame are coalesced into one write.
pub fn handle_save_requests(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    storage: Res<SaveStorage>,
    ledger: Res<EconomyLedger>,
    farm_state: Res<FarmState>,
    order_book: Res<OrderBook>,
    clock: Res<FarmClock>,
) {
    if save_events.read().count() == 0 {
        return;
    }

    let snapshot = capture(&ledger, &farm_state, &order_book, clock.now_ms);
    match storage.save(&snapshot) {
        Ok(()) => {
            debug!("[Save] Saved to {}", storage.store().describe());
            complete_events.send(SaveCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("[Save] Save to {} FAILED: {}", storage.store().describe(), e);
            complete_events.send(SaveCompleteEvent {
                success: false,
                error_message: Some(e.to_string()),
            });
        }
    }
}

/// Final save when the app is shutting down.
fn save_on_exit(
    mut exit_events: EventReader<AppExit>,
    storage: Res<SaveStorage>,
    ledger: Res<EconomyLedger>,
    farm_state: Res<FarmState>,
    order_book: Res<OrderBook>,
    clock: Res<FarmClock>,
) {
    if exit_events.read().count() == 0 {
        return;
    }
    let snapshot = capture(&ledger, &farm_state, &order_book, clock.now_ms);
    match storage.save(&snapshot) {
        Ok(()) => info!("[Save] Saved on exit to {}", storage.store().describe()),
        Err(e) => warn!("[Save] Save on exit FAILED: {}", e),
    }
}
