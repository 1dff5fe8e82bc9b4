//! Headless integration tests for Hayfield.
//!
//! These tests exercise the engine's ECS wiring without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, drive it with request
//! events and a manual clock, and verify that the core loops (planting,
//! growth, harvest, orders, save/restore) work end to end.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use hayfield::config::FarmConfig;
use hayfield::save::{MemoryStore, SaveCompleteEvent, SaveRequestEvent, SaveStorage};
use hayfield::shared::*;
use hayfield::HayfieldPlugin;

const T0: u64 = 1_700_000_000_000;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the full engine on `MinimalPlugins`, with an in-memory save slot
/// and a clock that only moves when a test moves it.
fn build_test_app(store: MemoryStore, now_ms: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    // Autosave is exercised by its own test.
    app.insert_resource(FarmConfig {
        autosave_secs: 0.0,
        ..FarmConfig::default()
    })
    .insert_resource(SaveStorage::new(store))
    .insert_resource(FarmClock::manual(now_ms));

    app.add_plugins(HayfieldPlugin);
    app
}

/// Ticks through Loading into Playing.
fn boot(app: &mut App) {
    app.update(); // enter Loading, populate registries
    app.update(); // apply NextState(Playing)
    let state = app.world().resource::<State<GameState>>();
    assert_eq!(state.get(), &GameState::Playing, "Expected to reach Playing after loading data");
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

fn results(app: &mut App) -> Vec<Result<ActionSuccess, ActionRejected>> {
    drain::<ActionResultEvent>(app)
        .into_iter()
        .map(|e| e.result)
        .collect()
}

fn plot_state(app: &App, position: GridPosition) -> Option<PlotState> {
    app.world()
        .resource::<FarmState>()
        .get(position)
        .map(|p| p.state())
}

fn advance_clock(app: &mut App, delta_ms: u64) {
    app.world_mut().resource_mut::<FarmClock>().advance(delta_ms);
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_reaches_playing_with_fresh_farm() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);

    assert_eq!(app.world().resource::<CropRegistry>().crops.len(), 5);

    let farm = app.world().resource::<FarmState>();
    assert_eq!(farm.len(), 64);
    assert_eq!(farm.count_in_state(PlotState::Empty), 64);

    let ledger = app.world().resource::<EconomyLedger>();
    assert_eq!(ledger.gold(), 100);
    assert_eq!(ledger.level(), 1);
    assert_eq!(ledger.inventory_quantity("wheat_seed"), 5);

    assert_eq!(app.world().resource::<OrderBook>().len(), MAX_ORDERS);
}

#[test]
fn test_extra_updates_do_not_regenerate_orders() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);
    let before = app.world().resource::<OrderBook>().to_snapshot();

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(app.world().resource::<OrderBook>().to_snapshot(), before);
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting, growth, harvest
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_wheat_lifecycle_through_events() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);
    drain::<GoldChangedEvent>(&mut app);
    let plot = GridPosition::new(1, 0);

    app.world_mut().send_event(PlantRequestEvent {
        position: plot,
        crop_id: "wheat".into(),
    });
    app.update();

    assert_eq!(
        results(&mut app),
        vec![Ok(ActionSuccess::Planted { position: plot, crop_id: "wheat".into() })]
    );
    assert_eq!(drain::<GoldChangedEvent>(&mut app), vec![GoldChangedEvent { gold: 99 }]);
    assert_eq!(plot_state(&app, plot), Some(PlotState::Planted));
    assert_eq!(
        drain::<PlotStateChangedEvent>(&mut app),
        vec![PlotStateChangedEvent { position: plot, state: PlotState::Planted }]
    );

    advance_clock(&mut app, 2_500);
    app.update();
    assert_eq!(plot_state(&app, plot), Some(PlotState::Growing));
    assert_eq!(
        drain::<PlotStateChangedEvent>(&mut app),
        vec![PlotStateChangedEvent { position: plot, state: PlotState::Growing }]
    );

    advance_clock(&mut app, 2_500);
    app.update();
    assert_eq!(plot_state(&app, plot), Some(PlotState::Ready));

    app.world_mut().send_event(HarvestRequestEvent { position: plot });
    app.update();

    match results(&mut app).as_slice() {
        [Ok(ActionSuccess::Harvested { harvest, .. })] => {
            assert_eq!(harvest.item_id, "wheat");
            assert_eq!(harvest.quantity, 2);
        }
        other => panic!("unexpected results: {:?}", other),
    }
    let ledger = app.world().resource::<EconomyLedger>();
    assert_eq!(ledger.inventory_quantity("wheat"), 2);
    assert_eq!(ledger.xp(), 10);
    assert_eq!(plot_state(&app, plot), Some(PlotState::Empty));
    assert_eq!(
        drain::<InventoryChangedEvent>(&mut app),
        vec![InventoryChangedEvent { item_id: "wheat".into(), quantity: 2 }]
    );
}

#[test]
fn test_rejected_requests_are_reported_in_order() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);
    let plot = GridPosition::new(0, 0);

    app.world_mut().send_event(PlantRequestEvent { position: plot, crop_id: "wheat".into() });
    app.world_mut().send_event(PlantRequestEvent { position: plot, crop_id: "wheat".into() });
    app.world_mut().send_event(PlantRequestEvent {
        position: GridPosition::new(0, 1),
        crop_id: "tomato".into(),
    });
    app.world_mut().send_event(HarvestRequestEvent { position: plot });
    app.update();

    assert_eq!(
        results(&mut app),
        vec![
            Ok(ActionSuccess::Planted { position: plot, crop_id: "wheat".into() }),
            Err(ActionRejected::PlotOccupied(plot)),
            Err(ActionRejected::CropLocked { crop_id: "tomato".into(), required: 4 }),
            Err(ActionRejected::NotReady),
        ]
    );
    assert_eq!(app.world().resource::<EconomyLedger>().gold(), 99);
}

#[test]
fn test_time_going_backwards_does_not_regress_growth() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);
    let plot = GridPosition::new(2, 2);

    app.world_mut().send_event(PlantRequestEvent { position: plot, crop_id: "wheat".into() });
    app.update();
    advance_clock(&mut app, 3_000);
    app.update();
    assert_eq!(plot_state(&app, plot), Some(PlotState::Growing));

    app.world_mut().resource_mut::<FarmClock>().now_ms = T0 - 10_000;
    app.update();
    assert_eq!(plot_state(&app, plot), Some(PlotState::Growing));
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders & level-ups
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fulfill_order_through_events_keeps_board_full() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);

    let order = app.world().resource::<OrderBook>().orders()[0].clone();
    {
        let mut ledger = app.world_mut().resource_mut::<EconomyLedger>();
        for req in &order.requirements {
            ledger.add_to_inventory(&req.item_id, req.quantity);
        }
    }

    app.world_mut().send_event(FulfillOrderRequestEvent { order_id: order.id });
    app.update();

    assert_eq!(
        results(&mut app),
        vec![Ok(ActionSuccess::OrderFulfilled {
            order_id: order.id,
            reward: OrderReward { gold: order.reward_gold, xp: order.reward_xp },
        })]
    );
    let book = app.world().resource::<OrderBook>();
    assert_eq!(book.len(), MAX_ORDERS);
    assert!(book.get(order.id).is_none());
    assert_eq!(
        app.world().resource::<EconomyLedger>().gold(),
        100 + order.reward_gold
    );
}

#[test]
fn test_fulfill_without_crops_is_rejected_and_harmless() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);
    let before = app.world().resource::<OrderBook>().to_snapshot();
    let order_id = before.orders[0].id;

    app.world_mut().send_event(FulfillOrderRequestEvent { order_id });
    app.world_mut().send_event(FulfillOrderRequestEvent { order_id: 9_999 });
    app.update();

    assert_eq!(
        results(&mut app),
        vec![
            Err(ActionRejected::InsufficientInventory),
            Err(ActionRejected::NoSuchOrder(9_999)),
        ]
    );
    assert_eq!(app.world().resource::<OrderBook>().to_snapshot(), before);
    assert_eq!(app.world().resource::<EconomyLedger>().gold(), 100);
}

#[test]
fn test_level_up_is_published() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);
    drain::<XpChangedEvent>(&mut app);

    app.world_mut().resource_mut::<EconomyLedger>().add_xp(250);
    app.update();

    assert_eq!(drain::<LevelUpEvent>(&mut app), vec![LevelUpEvent { level: 2 }]);
    assert_eq!(drain::<XpChangedEvent>(&mut app), vec![XpChangedEvent { xp: 150 }]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Save / restore
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_save_and_restore_with_offline_growth() {
    let store = MemoryStore::new();
    let plot = GridPosition::new(3, 4);

    let mut first = build_test_app(store.clone(), T0);
    boot(&mut first);
    first.world_mut().send_event(PlantRequestEvent { position: plot, crop_id: "wheat".into() });
    first.update();
    first.world_mut().send_event(SaveRequestEvent);
    first.update();

    let complete = drain::<SaveCompleteEvent>(&mut first);
    assert_eq!(complete.len(), 1);
    assert!(complete[0].success);
    assert!(store.contents().is_some());
    let saved_orders = first.world().resource::<OrderBook>().to_snapshot();

    // Reopen a minute later.
    let mut second = build_test_app(store, T0 + 60_000);
    boot(&mut second);

    assert_eq!(plot_state(&second, plot), Some(PlotState::Ready));
    assert_eq!(second.world().resource::<EconomyLedger>().gold(), 99);
    assert_eq!(second.world().resource::<OrderBook>().to_snapshot(), saved_orders);
}

#[test]
fn test_corrupt_save_starts_fresh() {
    let mut app = build_test_app(MemoryStore::with_data("{ definitely not a save"), T0);
    boot(&mut app);

    let ledger = app.world().resource::<EconomyLedger>();
    assert_eq!(ledger.gold(), 100);
    assert_eq!(ledger.inventory_quantity("wheat_seed"), 5);
    assert_eq!(app.world().resource::<OrderBook>().len(), MAX_ORDERS);
}

#[test]
fn test_failing_storage_is_reported_and_game_continues() {
    let mut app = build_test_app(MemoryStore::failing(), T0);
    boot(&mut app);

    app.world_mut().send_event(SaveRequestEvent);
    app.update();

    let complete = drain::<SaveCompleteEvent>(&mut app);
    assert_eq!(complete.len(), 1);
    assert!(!complete[0].success);
    assert!(complete[0].error_message.is_some());

    app.world_mut().send_event(PlantRequestEvent {
        position: GridPosition::new(0, 0),
        crop_id: "wheat".into(),
    });
    app.update();
    assert_eq!(app.world().resource::<EconomyLedger>().gold(), 99);
}

#[test]
fn test_save_requests_in_one_frame_are_coalesced() {
    let mut app = build_test_app(MemoryStore::new(), T0);
    boot(&mut app);

    app.world_mut().send_event(SaveRequestEvent);
    app.world_mut().send_event(SaveRequestEvent);
    app.update();

    assert_eq!(drain::<SaveCompleteEvent>(&mut app).len(), 1);
}

#[test]
fn test_autosave_fires_on_interval() {
    let store = MemoryStore::new();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    // Virtual time clamps each frame to 250 ms, so step by exactly that.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)));
    app.insert_resource(FarmConfig {
        autosave_secs: 1.0,
        ..FarmConfig::default()
    })
    .insert_resource(SaveStorage::new(store.clone()))
    .insert_resource(FarmClock::manual(T0));
    app.add_plugins(HayfieldPlugin);
    boot(&mut app);
    assert!(store.contents().is_none(), "no autosave before the interval");

    for _ in 0..8 {
        app.update();
    }
    assert!(store.contents().is_some(), "autosave should have written by now");
}

#[test]
fn test_save_with_exhausted_order_ids_starts_fresh() {
    let text = format!(
        r#"{{
            "version": 1,
            "ledger": {{ "gold": 9999, "xp": 0, "level": 4, "inventory": [] }},
            "plots": [],
            "orders": {{
                "orders": [{{ "id": {}, "requirements": [{{ "item_id": "wheat", "quantity": 1 }}], "reward_gold": 5, "reward_xp": 5 }}],
                "next_id": 3
            }},
            "saved_at_ms": {}
        }}"#,
        u64::MAX,
        T0
    );
    let mut app = build_test_app(MemoryStore::with_data(text), T0);
    boot(&mut app);

    let ledger = app.world().resource::<EconomyLedger>();
    assert_eq!(ledger.gold(), STARTING_GOLD);
    assert_eq!(ledger.level(), 1);

    let book = app.world().resource::<OrderBook>();
    assert_eq!(book.len(), MAX_ORDERS);
    assert!(book.orders().iter().all(|o| o.id < u64::MAX));
}

#[test]
fn test_app_exit_saves() {
    let store = MemoryStore::new();
    let mut app = build_test_app(store.clone(), T0);
    boot(&mut app);

    app.world_mut().send_event(AppExit::Success);
    app.update();

    let text = store.contents().expect("exit should save");
    let snapshot = hayfield::save::decode(&text).unwrap();
    assert_eq!(snapshot.saved_at_ms, T0);
    assert_eq!(snapshot.plots.len(), 64);
}
