//! Runtime configuration, read once at startup from a RON file.
//!
//! The file is optional. Any field left out falls back to its default, and a
//! file that fails to parse is reported and ignored.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::*;

pub const DEFAULT_CONFIG_PATH: &str = "hayfield.ron";
pub const CONFIG_PATH_ENV: &str = "HAYFIELD_CONFIG";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    pub starting_gold: u64,
    pub starter_items: Vec<(ItemId, u32)>,
    pub autosave_secs: f32,
    /// Save file on native targets.
    pub save_path: PathBuf,
    /// localStorage key in the browser.
    pub storage_key: String,
    /// Headless runner only: quit (and save) after this many seconds.
    pub session_secs: Option<f32>,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            grid_width: FARM_WIDTH,
            grid_height: FARM_HEIGHT,
            starting_gold: STARTING_GOLD,
            starter_items: vec![(STARTER_SEED_ID.to_string(), STARTER_SEED_QUANTITY)],
            autosave_secs: AUTOSAVE_INTERVAL_SECS,
            save_path: PathBuf::from("saves").join("farm.json"),
            storage_key: String::from("hayfield_save_v1"),
            session_secs: None,
        }
    }
}

impl FarmConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Read `path`, or fall back to defaults if it is missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                info!("[Config] No config at {}; using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_ron_str(&text) {
            Ok(config) => {
                info!("[Config] Loaded {}", path.display());
                config.validated()
            }
            Err(e) => {
                warn!("[Config] Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace timer lengths that cannot become a `Duration` with their
    /// defaults. `autosave_secs <= 0` stays as is and turns autosave off.
    pub fn validated(mut self) -> Self {
        let autosave_ok = self.autosave_secs <= 0.0
            || Duration::try_from_secs_f32(self.autosave_secs).is_ok();
        if !autosave_ok {
            warn!(
                "[Config] autosave_secs {} is not a usable interval; using {}",
                self.autosave_secs, AUTOSAVE_INTERVAL_SECS
            );
            self.autosave_secs = AUTOSAVE_INTERVAL_SECS;
        }
        if let Some(secs) = self.session_secs {
            if Duration::try_from_secs_f32(secs).is_err() {
                warn!("[Config] session_secs {} is not a usable length; running until stopped", secs);
                self.session_secs = None;
            }
        }
        self
    }

    /// `$HAYFIELD_CONFIG` if set, otherwise `hayfield.ron` in the working directory.
    pub fn load_from_env() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_or_default(&path)
    }

    pub fn starting_ledger(&self) -> EconomyLedger {
        EconomyLedger::new(self.starting_gold, self.starter_items.iter().cloned())
    }
}
