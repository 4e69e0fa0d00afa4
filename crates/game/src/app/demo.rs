use super::sim::{
    load_level, AssetCatalog, Level, ObjectKind, SpriteBox, BONUS_CAPACITY, ENEMY_CAPACITY,
};

// Tileset ids used by the demo map.
// 0 empty, 1 floor, 2 wall, 3 ladder, 4 spikes, 5 energy bonus, 6 drop
// through, 7 slippery floor, 8 ceiling, 9 collected-bonus face.
const DEMO_LEVEL_JSON: &str = r#"{
    "number": 1,
    "width": 24,
    "height": 13,
    "scroll_limit_x": 24,
    "altitude_zero": 0,
    "music": 1,
    "player": { "x": 40, "y": 192, "hp": 16 },
    "tileset": [
        { "horiz": 0, "floor": 0, "ceil": 0 },
        { "horiz": 0, "floor": 1, "ceil": 1, "animation": [1, 1, 1] },
        { "horiz": 1, "floor": 1, "ceil": 1, "animation": [2, 2, 2] },
        { "horiz": 0, "floor": 6, "ceil": 2, "animation": [3, 3, 3] },
        { "horiz": 0, "floor": 10, "ceil": 0, "animation": [4, 5, 6] },
        { "horiz": 0, "floor": 7, "ceil": 0, "animation": [7, 8, 7] },
        { "horiz": 0, "floor": 5, "ceil": 0, "animation": [9, 9, 9] },
        { "horiz": 0, "floor": 3, "ceil": 0, "animation": [10, 10, 10] },
        { "horiz": 0, "floor": 0, "ceil": 1, "animation": [11, 11, 11] },
        { "horiz": 0, "floor": 0, "ceil": 0, "animation": [12, 12, 12] }
    ],
    "map": [
        [2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,1,1,1,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,6,6,0,0,0,0,3,0,0,0,1,4,5,1,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [2,0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,7,7,7,0,2],
        [2,0,0,0,0,0,0,0,0,0,3,0,0,0,0,0,0,0,0,0,0,0,0,2],
        [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1]
    ],
    "enemies": [
        {
            "kind": 0, "sprite": 101, "x": 260, "y": 192,
            "speed_x": 1, "range_x": 60, "power": 60, "walk_speed": 1
        },
        {
            "kind": 2, "sprite": 106, "x": 340, "y": 128,
            "range_x": 120, "delay": 40, "direction": 0
        }
    ],
    "objects": [
        { "sprite": 39, "x": 120, "y": 176 }
    ],
    "elevators": [
        {
            "sprite": 30, "x": 200, "y": 120,
            "speed_x": 0, "speed_y": 1, "range": 32
        }
    ],
    "bonuses": [
        { "x": 16, "y": 8, "bonus_tile": 254, "replace_tile": 9 }
    ]
}"#;

const DEMO_SPRITE_COUNT: usize = 356;
const DEMO_OBJECT_KIND_COUNT: usize = 71;
const PLAYER_ACTION_COUNT: usize = 30;

/// Stand-in for the sprite-asset provider: uniform collision boxes with a
/// few meaningful object kinds (the ball bounces, the springs carry).
pub fn demo_assets() -> AssetCatalog {
    let sprite_boxes = vec![
        SpriteBox {
            width: 16,
            height: 16,
            coll_width: 16,
            coll_height: 16,
            ref_width: 8,
            ref_height: 16,
        };
        DEMO_SPRITE_COUNT
    ];

    let mut object_kinds = vec![
        ObjectKind {
            max_fall_speed: 15,
            support: true,
            bounce: false,
            gravity: true,
            drop_to_bottom: false,
            no_damage: false,
        };
        DEMO_OBJECT_KIND_COUNT
    ];
    object_kinds[9].bounce = true; // ball
    object_kinds[24].bounce = true; // springs
    object_kinds[25].bounce = true;
    object_kinds[26].no_damage = true; // cage
    object_kinds[27].no_damage = true;

    let player_animations = (0..PLAYER_ACTION_COUNT)
        .map(|action| vec![action as i16, -2])
        .collect();

    // One patrol segment, then an attack segment whose first two entries
    // carry the projectile payload (sprite offset, muzzle rise).
    let enemy_animations = vec![
        0, 1, -4, // patrol loop
        5, 8, 0x2000 | 2, -2, // attack: payload, payload, trigger frame
    ];

    AssetCatalog {
        sprite_boxes,
        object_kinds,
        player_animations,
        enemy_animations,
        finale_hero_animation: vec![343, 344, -4],
        finale_partner_animation: vec![337, 338, -4],
        finale_smoke_animation: vec![339, 340, -4],
    }
}

pub fn build_demo_level() -> Result<Level, String> {
    let level = load_level(DEMO_LEVEL_JSON, demo_assets())?;
    debug_assert!(level.enemies.len() == ENEMY_CAPACITY);
    debug_assert!(level.bonuses.len() == BONUS_CAPACITY);
    Ok(level)
}
