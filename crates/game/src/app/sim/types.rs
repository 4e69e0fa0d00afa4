#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizFlag {
    None,
    Wall,
    Bonus,
    Deadly,
    Code,
    Padlock,
    FinalCode,
}

impl HorizFlag {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Wall,
            2 => Self::Bonus,
            3 => Self::Deadly,
            4 => Self::Code,
            5 => Self::Padlock,
            6 => Self::FinalCode,
            _ => return None,
        })
    }

    /// Wall-like tiles stop horizontal movement and carry landing objects.
    fn blocks(self) -> bool {
        matches!(self, Self::Wall | Self::Deadly | Self::Padlock)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorFlag {
    None,
    Solid,
    SemiSlippery,
    Slippery,
    VerySlippery,
    DropThrough,
    Ladder,
    Bonus,
    Water,
    Fire,
    Spikes,
    Code,
    Padlock,
    FinalCode,
}

impl FloorFlag {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Solid,
            2 => Self::SemiSlippery,
            3 => Self::Slippery,
            4 => Self::VerySlippery,
            5 => Self::DropThrough,
            6 => Self::Ladder,
            7 => Self::Bonus,
            8 => Self::Water,
            9 => Self::Fire,
            10 => Self::Spikes,
            11 => Self::Code,
            12 => Self::Padlock,
            13 => Self::FinalCode,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeilFlag {
    None,
    Ceiling,
    Ladder,
    Padlock,
    Deadly,
}

impl CeilFlag {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Ceiling,
            2 => Self::Ladder,
            3 => Self::Padlock,
            4 => Self::Deadly,
            _ => return None,
        })
    }
}

/// One tile kind: a 3-frame animation cycle plus its collision semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub animation: [u8; 3],
    pub horiz: HorizFlag,
    pub floor: FloorFlag,
    pub ceil: CeilFlag,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            animation: [0; 3],
            horiz: HorizFlag::None,
            floor: FloorFlag::None,
            ceil: CeilFlag::None,
        }
    }
}

/// Immutable per-species collision box metadata, indexed by sprite number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteBox {
    pub width: u8,
    pub height: u8,
    pub coll_width: u8,
    pub coll_height: u8,
    pub ref_width: u8,
    pub ref_height: u8,
}

/// Immutable per-object-species physics flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectKind {
    pub max_fall_speed: u8,
    pub support: bool,
    pub bounce: bool,
    pub gravity: bool,
    pub drop_to_bottom: bool,
    pub no_damage: bool,
}

/// Read-only catalogue handed over by the asset provider.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    pub sprite_boxes: Vec<SpriteBox>,
    pub object_kinds: Vec<ObjectKind>,
    /// One signed-offset frame stream per player action code.
    pub player_animations: Vec<Vec<i16>>,
    /// Shared signed-offset stream for every enemy species.
    pub enemy_animations: Vec<i16>,
    /// End-sequence streams.
    pub finale_hero_animation: Vec<i16>,
    pub finale_partner_animation: Vec<i16>,
    pub finale_smoke_animation: Vec<i16>,
}

impl AssetCatalog {
    pub fn sprite_box(&self, number: i16) -> SpriteBox {
        usize::try_from(number)
            .ok()
            .and_then(|index| self.sprite_boxes.get(index))
            .copied()
            .unwrap_or_default()
    }

    /// Out-of-range species indices fall back to entry 0.
    pub fn object_kind(&self, sprite_number: i16) -> ObjectKind {
        let index = usize::try_from(sprite_number - FIRST_OBJECT_SPRITE)
            .ok()
            .filter(|index| *index < self.object_kinds.len())
            .unwrap_or(0);
        self.object_kinds.get(index).copied().unwrap_or_default()
    }

    fn stream(&self, stream: AnimStream) -> &[i16] {
        match stream {
            AnimStream::PlayerAction(action) => self
                .player_animations
                .get(action as usize)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            AnimStream::Enemy => &self.enemy_animations,
            AnimStream::FinaleHero => &self.finale_hero_animation,
            AnimStream::FinalePartner => &self.finale_partner_animation,
            AnimStream::FinaleSmoke => &self.finale_smoke_animation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimStream {
    PlayerAction(u8),
    Enemy,
    FinaleHero,
    FinalePartner,
    FinaleSmoke,
}

/// Index-based cursor over a signed-offset frame stream. Negative entries
/// encode a jump back toward the loop start. Two decodings of that jump are
/// in circulation and shipped animation data may rely on either, so both
/// are kept as separate methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationCursor {
    pub stream: AnimStream,
    pub index: usize,
}

impl AnimationCursor {
    pub fn new(stream: AnimStream) -> Self {
        Self { stream, index: 0 }
    }

    pub fn at(stream: AnimStream, index: usize) -> Self {
        Self { stream, index }
    }

    /// Current entry; out-of-range indices read as a neutral 0.
    pub fn entry(&self, assets: &AssetCatalog) -> i16 {
        assets
            .stream(self.stream)
            .get(self.index)
            .copied()
            .unwrap_or(0)
    }

    /// Entry at a relative offset, used by projectile spawns that look
    /// behind the cursor for speed and height payloads.
    pub fn entry_at(&self, assets: &AssetCatalog, offset: i32) -> i16 {
        let index = self.index as i32 + offset;
        usize::try_from(index)
            .ok()
            .and_then(|index| assets.stream(self.stream).get(index).copied())
            .unwrap_or(0)
    }

    pub fn advance(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    pub fn step_back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    fn shift(&mut self, delta: i32) {
        let index = self.index as i32 + delta;
        self.index = usize::try_from(index).unwrap_or(0);
    }

    /// Enemy-style loop-back: apply each negative entry in turn until a
    /// frame entry is reached.
    pub fn rewind_while_negative(&mut self, assets: &AssetCatalog) {
        let mut guard = 0;
        while self.entry(assets) < 0 && guard < 0x100 {
            let entry = self.entry(assets);
            self.shift(entry as i32);
            guard += 1;
        }
    }

    /// Single-step variant of the loop-back, applied after advancing.
    pub fn jump_if_negative(&mut self, assets: &AssetCatalog) {
        let entry = self.entry(assets);
        if entry < 0 {
            self.shift(entry as i32);
        }
    }

    /// Player-style loop-back: one jump of half the encoded offset.
    pub fn jump_back_half_if_negative(&mut self, assets: &AssetCatalog) {
        let entry = self.entry(assets);
        if entry < 0 {
            self.shift((entry / 2) as i32);
        }
    }

    /// Move past the current segment terminator onto the next sequence.
    pub fn seek_next_segment(&mut self, assets: &AssetCatalog) {
        let len = assets.stream(self.stream).len();
        loop {
            self.index = self.index.saturating_add(1);
            if self.index >= len || self.entry(assets) < 0 {
                break;
            }
        }
        self.index = self.index.saturating_add(1);
    }

    /// Back up across the previous segment terminator.
    pub fn seek_prev_segment(&mut self, assets: &AssetCatalog) {
        loop {
            if self.index == 0 {
                return;
            }
            self.index -= 1;
            if self.entry(assets) < 0 {
                break;
            }
        }
        self.index = self.index.saturating_sub(1);
    }
}

/// What a loaded spring pushes back down when it releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rider {
    Player,
    Object(usize),
}

/// The common positioned, animated, collidable unit shared by the player,
/// enemies, objects, elevators and projectiles. A disabled sprite takes part
/// in no collision or draw pass; its pool slot is free for reuse.
#[derive(Debug, Clone, Copy)]
pub struct Sprite {
    pub x: i16,
    pub y: i16,
    pub speed_x: i16,
    pub speed_y: i16,
    pub number: i16,
    pub sbox: SpriteBox,
    pub enabled: bool,
    pub visible: bool,
    pub flipped: bool,
    pub flash: bool,
    pub invisible: bool,
    pub drop_to_bottom: bool,
    pub killing: bool,
    pub spring_load: u8,
    pub rider: Option<Rider>,
    pub animation: Option<AnimationCursor>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            speed_x: 0,
            speed_y: 0,
            number: 0,
            sbox: SpriteBox::default(),
            enabled: false,
            visible: false,
            flipped: false,
            flash: false,
            invisible: false,
            drop_to_bottom: false,
            killing: false,
            spring_load: 0,
            rider: None,
            animation: None,
        }
    }
}

impl Sprite {
    pub fn clear(&mut self) {
        *self = Sprite::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Player {
    pub sprite: Sprite,
    /// Carried or thrown sprite, also reused for impact and smoke effects.
    pub sprite2: Sprite,
    /// Only used by the end sequence.
    pub sprite3: Sprite,
    pub hp: u8,
    pub init_x: i16,
    pub init_y: i16,
    pub init_hp: u8,
    pub cage_x: i16,
    pub cage_y: i16,
    /// Floor slipperiness under the feet, 0 (full grip) to 3.
    pub slippery: u8,
    pub x_axis: i8,
    pub y_axis: i8,
    pub action_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyBehavior {
    /// Types 0 and 1: bounce between +-range_x around a center.
    Patrol,
    /// Type 2: scan, wind up, fire a projectile on the stream trigger.
    StationaryShooter,
    /// Types 3 and 4: patrol, then leap up at the player.
    Leap,
    /// Types 5 and 6: patrol, then dive vertically at the player.
    Hover,
    /// Type 7: wait, gravity-walk toward the player, strike when close.
    StalkAndStrike,
    /// Types 8 and 14: gravity-walk only while far off screen.
    RoamWhenHidden { immortal: bool },
    /// Type 9: walk and periodically pop its head up.
    PopUp,
    /// Type 10: alert stance when near, charge when nearer.
    AlertThenCharge,
    /// Type 11: walk and shoot.
    WalkAndShoot,
    /// Type 12: vertically bouncing fireball, immortal.
    BouncingFireball,
    /// Type 13: jump-arc bouncer.
    ArcBounce,
    /// Types 15 and 16: no movement.
    Passive { immortal: bool },
    /// Type 17: timed drop attack spawning a falling object, immortal.
    TimedDrop,
    /// Type 18: guard an area, return to post when the player leaves.
    AreaGuard,
}

impl Default for EnemyBehavior {
    fn default() -> Self {
        Self::Passive { immortal: false }
    }
}

impl EnemyBehavior {
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0 | 1 => Self::Patrol,
            2 => Self::StationaryShooter,
            3 | 4 => Self::Leap,
            5 | 6 => Self::Hover,
            7 => Self::StalkAndStrike,
            8 => Self::RoamWhenHidden { immortal: false },
            9 => Self::PopUp,
            10 => Self::AlertThenCharge,
            11 => Self::WalkAndShoot,
            12 => Self::BouncingFireball,
            13 => Self::ArcBounce,
            14 => Self::RoamWhenHidden { immortal: true },
            15 => Self::Passive { immortal: true },
            16 => Self::Passive { immortal: false },
            17 => Self::TimedDrop,
            18 => Self::AreaGuard,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyInit {
    pub enabled: bool,
    pub sprite: i16,
    pub flipped: bool,
    pub x: i16,
    pub y: i16,
    pub speed_x: i16,
    pub speed_y: i16,
}

// Dying bitmask: bit 0 marks the falling-dead animation, bit 1 marks the
// enemy for removal once off screen.
pub const DYING_FALL: u8 = 0x01;
pub const DYING_REMOVE: u8 = 0x02;

#[derive(Debug, Clone, Default)]
pub struct Enemy {
    pub sprite: Sprite,
    pub behavior: EnemyBehavior,
    pub dying: u8,
    pub phase: u8,
    pub power: i16,
    pub center_x: i16,
    pub range_x: i16,
    pub range_y: i16,
    /// Attack delay in ticks; several behaviors reuse it to remember the
    /// sprite's resting Y position.
    pub delay: i16,
    pub direction: u8,
    pub counter: u8,
    pub walk_speed: i16,
    pub carry_sprite: Option<i16>,
    pub dead_sprite: Option<i16>,
    pub boss: bool,
    pub trigger: bool,
    pub visible: bool,
    pub init: EnemyInit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectInit {
    pub enabled: bool,
    pub sprite: i16,
    pub flash: bool,
    pub visible: bool,
    pub flipped: bool,
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, Default)]
pub struct Object {
    pub sprite: Sprite,
    /// Consecutive ticks of sustained fall; resets on any support contact.
    pub momentum: u8,
    pub kind: ObjectKind,
    pub init: ObjectInit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ElevatorInit {
    pub enabled: bool,
    pub sprite: i16,
    pub flash: bool,
    pub visible: bool,
    pub flipped: bool,
    pub x: i16,
    pub y: i16,
    pub speed_x: i16,
    pub speed_y: i16,
}

#[derive(Debug, Clone, Default)]
pub struct Elevator {
    pub enabled: bool,
    pub sprite: Sprite,
    pub counter: u16,
    pub range: u16,
    pub init: ElevatorInit,
}

/// Maps a tile coordinate to its replacement once collected. The entry is
/// not removed on consumption; replacing the tile face is what makes the
/// pickup single-shot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bonus {
    pub exists: bool,
    pub bonus_tile: u8,
    pub replace_tile: u8,
    pub x: u8,
    pub y: u8,
}

/// Every per-tick flag and timer of the simulation, consolidated in one
/// place and threaded into each component call.
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    /// Countdown to a level restart. 2 means instant death, 10 a death with
    /// animation time; the restart fires when it reaches 1.
    pub reset_timer: u8,
    pub lose_life: bool,
    pub game_over: bool,
    pub new_level: bool,
    /// While non-zero the energy bar is shown.
    pub energy_bar_timer: u8,
    pub moving_x: bool,
    pub moving_y: bool,
    /// Headache stun after something lands on the player.
    pub headache_timer: u8,
    /// Knockback after an enemy hit.
    pub hit_timer: u8,
    /// Next hit shows the burn pose instead of the plain one.
    pub burning: bool,
    pub on_ladder: bool,
    /// Low ceiling forces kneestanding.
    pub forced_crouch: bool,
    /// 6 while airborne, counted down on solid ground. Must be 0 to jump.
    pub fall_flag: u8,
    /// Upward acceleration budget while jumping, capped at 3.
    pub jump_ticks: u8,
    pub last_action: u8,
    pub action: u8,
    /// Ticks of silent walking left after a crouch-jump unlock.
    pub stealth_timer: u8,
    /// A thrown sprite is in flight.
    pub throw_in_flight: bool,
    pub drop_ready: bool,
    pub carrying: bool,
    pub grab_latch: bool,
    /// Ticks since the action last changed.
    pub action_timer: u8,
    pub invulnerability_timer: u8,
    pub carpet_fly_timer: u8,
    pub carpet_state: u8,
    /// While non-zero the player falls through drop-through floors.
    pub drop_through_timer: u8,
    /// Object physics only runs while non-zero; movement rearms it.
    pub gravity_timer: u8,
    pub smoke_timer: u8,
    /// Per-tick foot test result: bit 0 free fall, 2 landed, 0xFF skipped.
    pub fall_test: u8,
    pub grounded: bool,
    pub tiles_dirty: bool,
    pub loop_cycle: u8,
    pub tile_cycle: u8,
    pub frame_counter: u16,
    pub popup_cycle: u8,
    /// Lifetime of the impact sprite shown when a throw connects.
    pub impact_timer: u8,
    pub boss_alive: bool,
    pub boss_lives: u8,
    pub god_mode: bool,
    pub noclip: bool,
    /// Facing: 1 right, 0 idle, -1 left.
    pub facing: i8,
}

#[derive(Debug, Clone, Default)]
pub struct Camera {
    /// Screen origin in tiles.
    pub tile_x: i16,
    pub tile_y: i16,
    pub scroll_x: bool,
    pub scroll_y: bool,
    pub scroll_y_target: i16,
    /// Sub-tile remainder for smooth horizontal rendering.
    pub px_offset: i16,
    /// The camera will not pass this tile column until the player does.
    pub limit_x: i16,
    pub limit_breached: bool,
    /// The camera will not scroll below this row until the player does.
    pub altitude_zero: i16,
    pub no_scroll: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    Death,
    GameOver,
    LevelFinished,
}
