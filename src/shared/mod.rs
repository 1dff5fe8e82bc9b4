//! Shared components, resources, events, and states for Hayfield.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

mod farm;
mod ledger;
mod orders;

pub use farm::{FarmState, FieldPlot, PlotSnapshot};
pub use ledger::{EconomyLedger, LedgerNotice, LedgerSnapshot};
pub use orders::{Order, OrderBook, OrderBookSnapshot, OrderRequirement};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Ordering of the one-shot systems that run on entering `Playing`.
/// The grid must exist before a save is restored into it, and the order
/// book is only topped up once the restored player level is known.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SetupSet {
    Grid,
    Restore,
    Orders,
}

/// Ordering of the per-frame systems while `Playing`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Player actions: plant, harvest, fulfill.
    Actions,
    /// Growth reconciliation against the wall clock.
    Growth,
    /// Ledger notices become events; autosave.
    Publish,
}

// ═══════════════════════════════════════════════════════════════════════
// IDS & GRID
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every item type in the game.
/// Harvested crops use their crop id as item id.
pub type ItemId = String;
pub type CropId = String;
pub type OrderId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CLOCK
// ═══════════════════════════════════════════════════════════════════════

/// Milliseconds since the Unix epoch, read from the OS.
#[cfg(not(target_arch = "wasm32"))]
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `SystemTime` is unavailable in the browser; ask JavaScript instead.
#[cfg(target_arch = "wasm32")]
pub fn epoch_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Sampled from the OS once per frame.
    #[default]
    System,
    /// Only moves when someone writes `now_ms` (tests, replays).
    Manual,
}

/// Wall-clock time as seen by the farm for the current frame.
///
/// Growth is computed from this value alone, so every system in a frame
/// agrees on what "now" is.
#[derive(Resource, Debug, Clone)]
pub struct FarmClock {
    pub now_ms: u64,
    pub source: ClockSource,
}

impl Default for FarmClock {
    fn default() -> Self {
        Self {
            now_ms: epoch_millis(),
            source: ClockSource::System,
        }
    }
}

impl FarmClock {
    pub fn manual(now_ms: u64) -> Self {
        Self {
            now_ms,
            source: ClockSource::Manual,
        }
    }

    pub fn advance(&mut self, delta_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(delta_ms);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CROP CATALOG: loaded from data
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDef {
    pub id: CropId,
    pub name: String,
    pub seed_cost: u64,
    pub grow_duration_ms: u64,
    /// Time from planting to the sprout stage.
    pub half_grow_duration_ms: u64,
    pub xp_reward: u64,
    pub sell_price: u64,
    pub harvest_yield: u32,
    pub unlock_level: u32,
}

impl CropDef {
    pub fn is_valid(&self) -> bool {
        self.half_grow_duration_ms < self.grow_duration_ms && self.unlock_level >= 1
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CropRegistry {
    pub crops: HashMap<CropId, CropDef>,
}

impl CropRegistry {
    pub fn get(&self, id: &str) -> Option<&CropDef> {
        self.crops.get(id)
    }

    /// Crops unlocked at `level`, sorted by unlock level then id so that a
    /// seeded rng always sees the same sequence.
    pub fn unlocked_at(&self, level: u32) -> Vec<&CropDef> {
        let mut allowed: Vec<&CropDef> = self
            .crops
            .values()
            .filter(|c| c.unlock_level <= level)
            .collect();
        allowed.sort_by(|a, b| a.unlock_level.cmp(&b.unlock_level).then(a.id.cmp(&b.id)));
        allowed
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARMING
// ═══════════════════════════════════════════════════════════════════════

/// Growth state of a single plot. The derive order is the growth order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum PlotState {
    #[default]
    Empty,
    Planted,
    Growing,
    Ready,
}

// ═══════════════════════════════════════════════════════════════════════
// ACTION RESULTS
// ═══════════════════════════════════════════════════════════════════════

/// Expected, user-facing refusals. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("not enough gold")]
    InsufficientFunds,
    #[error("crop is not ready to harvest")]
    NotReady,
    #[error("not enough items to fulfill the order")]
    InsufficientInventory,
    #[error("no order with id {0}")]
    NoSuchOrder(OrderId),
    #[error("no plot at {0}")]
    UnknownPlot(GridPosition),
    #[error("unknown crop '{0}'")]
    UnknownCrop(CropId),
    #[error("plot {0} is already planted")]
    PlotOccupied(GridPosition),
    #[error("{crop_id} unlocks at level {required}")]
    CropLocked { crop_id: CropId, required: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestYield {
    pub item_id: ItemId,
    pub quantity: u32,
    pub xp_awarded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReward {
    pub gold: u64,
    pub xp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSuccess {
    Planted { position: GridPosition, crop_id: CropId },
    Harvested { position: GridPosition, harvest: HarvestYield },
    OrderFulfilled { order_id: OrderId, reward: OrderReward },
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: action requests (sent by the UI layer)
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct PlantRequestEvent {
    pub position: GridPosition,
    pub crop_id: CropId,
}

#[derive(Event, Debug, Clone)]
pub struct HarvestRequestEvent {
    pub position: GridPosition,
}

#[derive(Event, Debug, Clone)]
pub struct FulfillOrderRequestEvent {
    pub order_id: OrderId,
}

/// One per request event, in request order.
#[derive(Event, Debug, Clone)]
pub struct ActionResultEvent {
    pub result: Result<ActionSuccess, ActionRejected>,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: notifications (read by the UI layer)
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct GoldChangedEvent {
    pub gold: u64,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct XpChangedEvent {
    pub xp: u64,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct LevelUpEvent {
    pub level: u32,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct InventoryChangedEvent {
    pub item_id: ItemId,
    pub quantity: u32,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct PlotStateChangedEvent {
    pub position: GridPosition,
    pub state: PlotState,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const STARTING_GOLD: u64 = 100;
pub const STARTER_SEED_ID: &str = "wheat_seed";
pub const STARTER_SEED_QUANTITY: u32 = 5;

/// Always unlocked; used when nothing else is.
pub const BASE_CROP_ID: &str = "wheat";

pub const XP_PER_LEVEL: u64 = 100;
pub const MAX_ORDERS: usize = 3;

pub const FARM_WIDTH: i32 = 8;
pub const FARM_HEIGHT: i32 = 8;

pub const AUTOSAVE_INTERVAL_SECS: f32 = 10.0;
