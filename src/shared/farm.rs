//! Field plots and the farm grid that holds them.
//!
//! A plot's growth is a pure function of `now` and the time it was planted:
//! `tick` can be called any number of times, or once after a long gap, and
//! lands on the same state. Nothing here schedules anything.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    ActionRejected, CropDef, CropId, CropRegistry, EconomyLedger, GridPosition, HarvestYield,
    PlotState,
};

/// Serialized form of one plot: `(state, crop_id, planted_at_ms)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlotSnapshot {
    pub state: PlotState,
    pub crop_id: Option<CropId>,
    pub planted_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlot {
    position: GridPosition,
    state: PlotState,
    crop_id: Option<CropId>,
    /// Only meaningful while `state != Empty`.
    planted_at_ms: u64,
}

impl FieldPlot {
    pub fn new(position: GridPosition) -> Self {
        Self {
            position,
            state: PlotState::Empty,
            crop_id: None,
            planted_at_ms: 0,
        }
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn state(&self) -> PlotState {
        self.state
    }

    pub fn crop_id(&self) -> Option<&str> {
        self.crop_id.as_deref()
    }

    pub fn planted_at_ms(&self) -> Option<u64> {
        (self.state != PlotState::Empty).then_some(self.planted_at_ms)
    }

    /// Pay for the seed and start growing `def` at `now_ms`.
    pub fn plant(
        &mut self,
        def: &CropDef,
        ledger: &mut EconomyLedger,
        now_ms: u64,
    ) -> Result<(), ActionRejected> {
        if self.state != PlotState::Empty {
            return Err(ActionRejected::PlotOccupied(self.position));
        }
        if !ledger.try_spend(def.seed_cost) {
            return Err(ActionRejected::InsufficientFunds);
        }
        self.state = PlotState::Planted;
        self.crop_id = Some(def.id.clone());
        self.planted_at_ms = now_ms;
        Ok(())
    }

    /// Reconcile the growth stage with `now_ms`. Returns the new state if it
    /// changed.
    pub fn tick(&mut self, registry: &CropRegistry, now_ms: u64) -> Option<PlotState> {
        if !matches!(self.state, PlotState::Planted | PlotState::Growing) {
            return None;
        }
        let def = registry.get(self.crop_id.as_deref()?)?;
        let elapsed = now_ms.saturating_sub(self.planted_at_ms);

        let next = if elapsed >= def.grow_duration_ms {
            PlotState::Ready
        } else if elapsed >= def.half_grow_duration_ms && self.state == PlotState::Planted {
            PlotState::Growing
        } else {
            return None;
        };
        self.state = next;
        Some(next)
    }

    /// Collect a ripe crop into the ledger and clear the plot.
    pub fn harvest(
        &mut self,
        registry: &CropRegistry,
        ledger: &mut EconomyLedger,
    ) -> Result<HarvestYield, ActionRejected> {
        if self.state != PlotState::Ready {
            return Err(ActionRejected::NotReady);
        }
        let crop_id = self.crop_id.clone().unwrap_or_default();
        let def = registry
            .get(&crop_id)
            .ok_or_else(|| ActionRejected::UnknownCrop(crop_id.clone()))?;

        ledger.add_to_inventory(&def.id, def.harvest_yield);
        ledger.add_xp(def.xp_reward);
        self.clear();

        Ok(HarvestYield {
            item_id: def.id.clone(),
            quantity: def.harvest_yield,
            xp_awarded: def.xp_reward,
        })
    }

    pub fn clear(&mut self) {
        self.state = PlotState::Empty;
        self.crop_id = None;
        self.planted_at_ms = 0;
    }

    pub fn to_snapshot(&self) -> PlotSnapshot {
        PlotSnapshot {
            state: self.state,
            crop_id: self.crop_id.clone(),
            planted_at_ms: self.planted_at_ms,
        }
    }

    /// Take the saved values as-is. Growth is not recomputed here; the next
    /// `tick` catches up on any time that passed while the game was closed.
    pub fn restore(&mut self, snapshot: PlotSnapshot) {
        if snapshot.state == PlotState::Empty {
            self.clear();
            return;
        }
        self.state = snapshot.state;
        self.crop_id = snapshot.crop_id;
        self.planted_at_ms = snapshot.planted_at_ms;
    }
}

/// Every plot on the farm, keyed by grid position.
#[derive(Resource, Debug, Clone, Default)]
pub struct FarmState {
    plots: BTreeMap<GridPosition, FieldPlot>,
}

impl FarmState {
    pub fn with_grid(width: i32, height: i32) -> Self {
        let plots = (0..width)
            .flat_map(|x| (0..height).map(move |y| GridPosition::new(x, y)))
            .map(|pos| (pos, FieldPlot::new(pos)))
            .collect();
        Self { plots }
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    pub fn get(&self, position: GridPosition) -> Option<&FieldPlot> {
        self.plots.get(&position)
    }

    pub fn get_mut(&mut self, position: GridPosition) -> Option<&mut FieldPlot> {
        self.plots.get_mut(&position)
    }

    pub fn plots(&self) -> impl Iterator<Item = &FieldPlot> + '_ {
        self.plots.values()
    }

    pub fn plots_mut(&mut self) -> impl Iterator<Item = &mut FieldPlot> + '_ {
        self.plots.values_mut()
    }

    pub fn count_in_state(&self, state: PlotState) -> usize {
        self.plots.values().filter(|p| p.state() == state).count()
    }

    pub fn clear_all(&mut self) {
        for plot in self.plots.values_mut() {
            plot.clear();
        }
    }
}
