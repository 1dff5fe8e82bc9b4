//! Economy domain: order board, order delivery, ledger notifications.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.
//! No other domain module is imported here.

use bevy::prelude::*;
use crate::shared::*;

pub mod gold;
pub mod orders;

pub use orders::{fill_order_book, fulfill_order, generate_order};

use gold::publish_ledger_notices;
use orders::{fill_order_book_on_start, handle_fulfill_requests};

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        // ── Systems: entering Playing ──────────────────────────────────────
        app.add_systems(
            OnEnter(GameState::Playing),
            fill_order_book_on_start.in_set(SetupSet::Orders),
        );

        // ── Systems: Playing state ─────────────────────────────────────────
        app.add_systems(
            Update,
            handle_fulfill_requests
                .in_set(FrameSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );

        // Notices are published in every state so restore notices queued
        // during OnEnter still reach observers.
        app.add_systems(Update, publish_ledger_notices.in_set(FrameSet::Publish));

        info!("[Economy] EconomyPlugin registered.");
    }
}
