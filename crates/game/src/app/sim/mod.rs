use engine::{
    AbortRequested, AudioEvent, AudioSink, InputSnapshot, Renderer, SpriteInstance, StatusView,
    TileInstance, UiGateway, UiSignal,
};
use serde::Deserialize;
use tracing::{debug, info};

pub const SCREEN_WIDTH_TILES: i16 = 20;
pub const SCREEN_HEIGHT_TILES: i16 = 12;
pub const OBJECT_CAPACITY: usize = 40;
pub const ENEMY_CAPACITY: usize = 50;
pub const ELEVATOR_CAPACITY: usize = 10;
pub const TRASH_CAPACITY: usize = 4;
pub const BONUS_CAPACITY: usize = 100;
pub const MAX_ENERGY: u8 = 16;

// Anti-snag window around tile boundaries for the foot test, in pixels.
const TEST_ZONE: i16 = 4;
// Max speeds in whole pixels per tick; the 1/16 speeds cap at these * 16.
const MAX_SPEED_X: i16 = 4;
const MAX_SPEED_Y: i16 = 12;
const MAP_LIMIT_Y: i16 = -1;
const MAX_DEAD_FALL_SPEED: i16 = 20;
// How far a thrown sprite may leave the screen before it is dropped.
const THROW_SLACK_X: i16 = 40;
const THROW_SLACK_Y: i16 = 20;
const PICKUP_REACH: i16 = 20;
const SHOCK_MOMENTUM_THRESHOLD: u8 = 10;
const BOSS_INVULNERABLE_TICKS: u8 = 10;
const CARPET_FLY_TICKS: u8 = 200;

// Sprite numbering: the player owns 0..30, objects start at 30, enemies at
// 101. These bases also offset the animation-stream payload bytes.
const FIRST_OBJECT_SPRITE: i16 = 30;
const FIRST_ENEMY_SPRITE: i16 = 101;

const SPRITE_REST: i16 = 0;
const SPRITE_CRAWL_IDLE: i16 = 6;
const SPRITE_FREE_FALL: i16 = 10;
const SPRITE_CLIMB_TOP: i16 = 12;
const SPRITE_LADDER_SLIDE: i16 = 14;
const SPRITE_HIT_FALL: i16 = 15;
const SPRITE_CARRY_FALL: i16 = 21;
const SPRITE_CLIMB_CARRY_A: i16 = 23;
const SPRITE_CLIMB_CARRY_B: i16 = 24;
const SPRITE_PAUSE: i16 = 29;

const OBJ_BALL: i16 = FIRST_OBJECT_SPRITE + 9;
const OBJ_IMPACT: i16 = FIRST_OBJECT_SPRITE + 15;
const OBJ_SMOKE_FIRST: i16 = FIRST_OBJECT_SPRITE + 16;
const OBJ_SMOKE_LAST: i16 = FIRST_OBJECT_SPRITE + 19;
const OBJ_CARPET_FOLDED: i16 = FIRST_OBJECT_SPRITE + 19;
const OBJ_CARPET_OPEN: i16 = FIRST_OBJECT_SPRITE + 20;
const OBJ_CARPET_FLY_A: i16 = FIRST_OBJECT_SPRITE + 21;
const OBJ_CARPET_FLY_B: i16 = FIRST_OBJECT_SPRITE + 22;
const OBJ_SPRING_SMALL: i16 = FIRST_OBJECT_SPRITE + 24;
const OBJ_SPRING_BIG: i16 = FIRST_OBJECT_SPRITE + 25;
const OBJ_CAGE_A: i16 = FIRST_OBJECT_SPRITE + 26;
const OBJ_CAGE_B: i16 = FIRST_OBJECT_SPRITE + 27;
const SPRITE_IRON_BALL: i16 = 73;
const FINALE_THE_SPRITE: i16 = 335;
const FINALE_END_SPRITE: i16 = 336;
const FINALE_PARTNER_SPRITE: i16 = 337;
const FINALE_HERO_SPRITE: i16 = 343;
const FINALE_COUPLE_SPRITE: i16 = 346;
const FINALE_HEART_SPRITE: i16 = 355;
const SPRITE_SCOOTER: i16 = 83;
const SPRITE_SKATEBOARD: i16 = 94;
const SPRITE_PERISCOPE_HEAD: i16 = 178;
const FIREBALL_SPRITE_FIRST: i16 = FIRST_ENEMY_SPRITE + 53;
const FIREBALL_SPRITE_LAST: i16 = FIRST_ENEMY_SPRITE + 55;

// Animation stream encoding: bit 0x2000 carries the action trigger, the low
// byte carries the sprite offset, and this sentinel hides the enemy.
const ANIM_HIDDEN_SENTINEL: i16 = 0x55AA;
const ANIM_TRIGGER_BIT: i16 = 0x2000;

// Player action codes. Carrying adds CARRY_SHIFT, the silent-walk unlock
// adds SILENT_SHIFT to rest/walk.
const ACTION_REST: u8 = 0;
const ACTION_WALK: u8 = 1;
const ACTION_JUMP: u8 = 2;
const ACTION_CRAWL: u8 = 3;
const ACTION_SLIDE: u8 = 4;
const ACTION_KNEESTAND: u8 = 5;
const ACTION_CLIMB: u8 = 6;
const ACTION_GRAB: u8 = 7;
const ACTION_THROW: u8 = 8;
const ACTION_HEADACHE: u8 = 11;
const ACTION_HIT: u8 = 12;
const ACTION_HIT_BURN: u8 = 13;
const SILENT_SHIFT: u8 = 9;
const CARRY_SHIFT: u8 = 16;

fn sub_to_zero(value: &mut u8) {
    *value = value.saturating_sub(1);
}

include!("types.rs");
include!("level_def.rs");
include!("level.rs");
include!("sprites.rs");
include!("player.rs");
include!("enemies.rs");
include!("objects.rs");
include!("elevators.rs");
include!("scroll.rs");
include!("render.rs");
include!("tick.rs");

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
