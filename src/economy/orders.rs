//! Order board: random delivery orders and their fulfillment.
//!
//! The board always holds `MAX_ORDERS` orders once the game is running.
//! Fulfilling one swaps the requested crops for gold and xp and immediately
//! posts a replacement.

use bevy::prelude::*;
use rand::Rng;
use std::collections::BTreeMap;

use crate::shared::*;

/// Order bonus over the crops' plain sell value.
const BONUS_MIN: f64 = 1.2;
const BONUS_MAX: f64 = 1.5;
const MAX_ITEMS_PER_ORDER: usize = 3;
const MIN_QUANTITY: u32 = 2;

/// Largest quantity a single requirement can ask for at `player_level`.
fn max_quantity(player_level: u32) -> u32 {
    4 + player_level / 2
}

// ─────────────────────────────────────────────────────────────────────────────
// Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Post one new order suited to `player_level`.
///
/// Picks 1-3 distinct unlocked crops, asks for 2..=4+level/2 of each, and
/// pays the summed sell value and xp times a random 1.2-1.5 bonus, rounded
/// up. Returns `None` only if the catalog has no usable crop at all.
pub fn generate_order(
    book: &mut OrderBook,
    crop_registry: &CropRegistry,
    player_level: u32,
    rng: &mut impl Rng,
) -> Option<OrderId> {
    let mut allowed = crop_registry.unlocked_at(player_level);
    if allowed.is_empty() {
        allowed.extend(crop_registry.get(BASE_CROP_ID));
    }
    if allowed.is_empty() {
        warn!("[Orders] No crops available for level {}; order board stays short", player_level);
        return None;
    }

    let num_items = rng.gen_range(1..=allowed.len().min(MAX_ITEMS_PER_ORDER));
    let mut requirements: Vec<OrderRequirement> = Vec::with_capacity(num_items);
    let mut total_value: u64 = 0;
    let mut total_xp: u64 = 0;

    while requirements.len() < num_items {
        let crop = allowed[rng.gen_range(0..allowed.len())];
        if requirements.iter().any(|r| r.item_id == crop.id) {
            continue;
        }
        let quantity = rng.gen_range(MIN_QUANTITY..=max_quantity(player_level));
        total_value += crop.sell_price * quantity as u64;
        total_xp += crop.xp_reward * quantity as u64;
        requirements.push(OrderRequirement {
            item_id: crop.id.clone(),
            quantity,
        });
    }

    let bonus: f64 = rng.gen_range(BONUS_MIN..=BONUS_MAX);
    let reward_gold = (total_value as f64 * bonus).ceil() as u64;
    let reward_xp = (total_xp as f64 * bonus).ceil() as u64;

    let id = book.post(requirements, reward_gold, reward_xp);
    debug!("[Orders] Posted order {} ({}g, {} xp)", id, reward_gold, reward_xp);
    Some(id)
}

/// Top the board up to `MAX_ORDERS`. Returns how many orders were posted.
pub fn fill_order_book(
    book: &mut OrderBook,
    crop_registry: &CropRegistry,
    player_level: u32,
    rng: &mut impl Rng,
) -> usize {
    let mut posted = 0;
    while book.len() < MAX_ORDERS {
        if generate_order(book, crop_registry, player_level, rng).is_none() {
            break;
        }
        posted += 1;
    }
    posted
}

// ─────────────────────────────────────────────────────────────────────────────
// Fulfillment
// ─────────────────────────────────────────────────────────────────────────────

/// Deliver the crops for `order_id`.
///
/// Either everything happens (items removed, gold and xp paid, order
/// replaced) or, on rejection, nothing does.
pub fn fulfill_order(
    book: &mut OrderBook,
    ledger: &mut EconomyLedger,
    crop_registry: &CropRegistry,
    order_id: OrderId,
    rng: &mut impl Rng,
) -> Result<OrderReward, ActionRejected> {
    let order = book
        .get(order_id)
        .cloned()
        .ok_or(ActionRejected::NoSuchOrder(order_id))?;

    // Per-item totals: a requirement list may name the same item twice.
    let mut needed: BTreeMap<&str, u32> = BTreeMap::new();
    for req in &order.requirements {
        let total = needed.entry(req.item_id.as_str()).or_insert(0);
        *total = total.saturating_add(req.quantity);
    }

    let has_enough = needed
        .iter()
        .all(|(item_id, quantity)| ledger.inventory_quantity(item_id) >= *quantity);
    if !has_enough {
        return Err(ActionRejected::InsufficientInventory);
    }

    for req in &order.requirements {
        let removed = ledger.try_remove_from_inventory(&req.item_id, req.quantity);
        debug_assert!(removed, "sufficiency was checked against the same ledger");
    }
    ledger.add_gold(order.reward_gold);
    ledger.add_xp(order.reward_xp);

    book.remove(order_id);
    generate_order(book, crop_registry, ledger.level(), rng);

    Ok(OrderReward {
        gold: order.reward_gold,
        xp: order.reward_xp,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Runs on entering Playing, after any save has been restored, so orders are
/// generated for the player's real level.
pub fn fill_order_book_on_start(
    mut book: ResMut<OrderBook>,
    ledger: Res<EconomyLedger>,
    crop_registry: Res<CropRegistry>,
) {
    let mut rng = rand::thread_rng();
    let posted = fill_order_book(&mut book, &crop_registry, ledger.level(), &mut rng);
    info!("[Orders] Order board ready: {} orders ({} new)", book.len(), posted);
}

pub fn handle_fulfill_requests(
    mut fulfill_events: EventReader<FulfillOrderRequestEvent>,
    mut book: ResMut<OrderBook>,
    mut ledger: ResMut<EconomyLedger>,
    mut result_events: EventWriter<ActionResultEvent>,
    crop_registry: Res<CropRegistry>,
) {
    let mut rng = rand::thread_rng();
    for event in fulfill_events.read() {
        let result = match fulfill_order(
            &mut book,
            &mut ledger,
            &crop_registry,
            event.order_id,
            &mut rng,
        ) {
            Ok(reward) => {
                info!(
                    "[Orders] Order {} delivered: +{}g, +{} xp",
                    event.order_id, reward.gold, reward.xp
                );
                Ok(ActionSuccess::OrderFulfilled {
                    order_id: event.order_id,
                    reward,
                })
            }
            Err(reason) => {
                info!("[Orders] Cannot deliver order {}: {}", event.order_id, reason);
                Err(reason)
            }
        };
        result_events.send(ActionResultEvent { result });
    }
}
