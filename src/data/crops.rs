use bevy::prelude::*;
use crate::shared::*;

/// Populate the CropRegistry with all crop definitions.
///
/// Timings are real milliseconds, not game days:
///   wheat (5s), carrot (6s), corn (8s), tomato (10s), strawberry (12s)
///
/// Every crop sprouts at exactly half its grow time. Unlock levels step by
/// one so a new crop (and new order requirements) appears at each of the
/// first five levels.
pub fn populate_crops(registry: &mut CropRegistry) {
    let crops: Vec<CropDef> = vec![
        CropDef {
            id: "wheat".into(),
            name: "Wheat".into(),
            seed_cost: 1,
            grow_duration_ms: 5_000,
            half_grow_duration_ms: 2_500,
            xp_reward: 10,
            sell_price: 3,
            harvest_yield: 2,
            unlock_level: 1,
        },
        CropDef {
            id: "corn".into(),
            name: "Corn".into(),
            seed_cost: 2,
            grow_duration_ms: 8_000,
            half_grow_duration_ms: 4_000,
            xp_reward: 15,
            sell_price: 5,
            harvest_yield: 2,
            unlock_level: 2,
        },
        CropDef {
            id: "carrot".into(),
            name: "Carrot".into(),
            seed_cost: 2,
            grow_duration_ms: 6_000,
            half_grow_duration_ms: 3_000,
            xp_reward: 12,
            sell_price: 4,
            harvest_yield: 3,
            unlock_level: 3,
        },
        CropDef {
            id: "tomato".into(),
            name: "Tomato".into(),
            seed_cost: 3,
            grow_duration_ms: 10_000,
            half_grow_duration_ms: 5_000,
            xp_reward: 20,
            sell_price: 7,
            harvest_yield: 2,
            unlock_level: 4,
        },
        CropDef {
            id: "strawberry".into(),
            name: "Strawberry".into(),
            seed_cost: 4,
            grow_duration_ms: 12_000,
            half_grow_duration_ms: 6_000,
            xp_reward: 25,
            sell_price: 9,
            harvest_yield: 3,
            unlock_level: 5,
        },
    ];

    for crop in crops {
        if !crop.is_valid() {
            warn!(
                "[Data] Skipping crop '{}': sprout at {}ms must come before ripe at {}ms, unlock level {} must be >= 1",
                crop.id, crop.half_grow_duration_ms, crop.grow_duration_ms, crop.unlock_level
            );
            continue;
        }
        registry.crops.insert(crop.id.clone(), crop);
    }
}
