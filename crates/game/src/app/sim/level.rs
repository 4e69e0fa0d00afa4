/// Static per-level map. Lookups clamp to the map edges so border probes
/// from entities partway off the level read the nearest real tile.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    width: i16,
    height: i16,
    tileset: Vec<Tile>,
    map: Vec<u8>,
}

impl TileGrid {
    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    fn tile(&self, tile_y: i16, tile_x: i16) -> Tile {
        let y = tile_y.clamp(0, self.height - 1) as usize;
        let x = tile_x.clamp(0, self.width - 1) as usize;
        let id = self.map[y * self.width as usize + x] as usize;
        self.tileset.get(id).copied().unwrap_or_default()
    }

    pub fn tile_id(&self, tile_y: i16, tile_x: i16) -> u8 {
        let y = tile_y.clamp(0, self.height - 1) as usize;
        let x = tile_x.clamp(0, self.width - 1) as usize;
        self.map[y * self.width as usize + x]
    }

    pub fn horiz_flag(&self, tile_y: i16, tile_x: i16) -> HorizFlag {
        self.tile(tile_y, tile_x).horiz
    }

    pub fn floor_flag(&self, tile_y: i16, tile_x: i16) -> FloorFlag {
        self.tile(tile_y, tile_x).floor
    }

    pub fn ceil_flag(&self, tile_y: i16, tile_x: i16) -> CeilFlag {
        self.tile(tile_y, tile_x).ceil
    }

    pub fn animation_frame(&self, tile_y: i16, tile_x: i16, cycle: u8) -> u8 {
        let tile = self.tile(tile_y, tile_x);
        tile.animation[(cycle % 3) as usize]
    }

    pub fn set_tile(&mut self, tile_y: i16, tile_x: i16, id: u8) {
        if (0..self.height).contains(&tile_y) && (0..self.width).contains(&tile_x) {
            let index = tile_y as usize * self.width as usize + tile_x as usize;
            self.map[index] = id;
        }
    }
}

/// The whole mutable world of one level: tile grid, entity pools and the
/// run counters. Reset and repopulated from the init data on every restart.
#[derive(Debug, Clone)]
pub struct Level {
    pub number: u16,
    pub is_finish: bool,
    pub has_cage: bool,
    pub music: u8,
    pub boss_power: u8,
    pub grid: TileGrid,
    pub assets: AssetCatalog,
    pub scroll_limit_x: i16,
    pub altitude_zero: i16,
    pub no_scroll: bool,
    pub finish_x: i16,
    pub finish_y: i16,
    pub player: Player,
    pub objects: Vec<Object>,
    pub enemies: Vec<Enemy>,
    pub bonuses: Vec<Bonus>,
    pub elevators: Vec<Elevator>,
    pub trash: Vec<Sprite>,
    pub bonus_collected: u32,
    pub extra_bonus: i16,
    pub lives: i16,
    pub tick_count: u64,
}

impl Level {
    pub fn from_definition(
        definition: LevelDefinition,
        assets: AssetCatalog,
    ) -> LevelLoadResult<Self> {
        definition.validate()?;

        let grid = TileGrid {
            width: definition.width,
            height: definition.height,
            tileset: definition
                .tileset
                .iter()
                .map(|tile| Tile {
                    animation: tile.animation,
                    // validate() vouched for every flag code
                    horiz: HorizFlag::from_code(tile.horiz).unwrap_or(HorizFlag::None),
                    floor: FloorFlag::from_code(tile.floor).unwrap_or(FloorFlag::None),
                    ceil: CeilFlag::from_code(tile.ceil).unwrap_or(CeilFlag::None),
                })
                .collect(),
            map: definition.map.iter().flatten().copied().collect(),
        };

        let mut enemies = vec![Enemy::default(); ENEMY_CAPACITY];
        for (slot, def) in enemies.iter_mut().zip(&definition.enemies) {
            slot.behavior = EnemyBehavior::from_code(def.kind).unwrap_or_default();
            slot.power = def.power;
            slot.center_x = def.center_x.unwrap_or(def.x);
            slot.range_x = def.range_x;
            slot.range_y = def.range_y;
            slot.delay = def.delay;
            slot.direction = def.direction;
            slot.walk_speed = def.walk_speed;
            slot.init = EnemyInit {
                enabled: true,
                sprite: def.sprite,
                flipped: def.flipped,
                x: def.x,
                y: def.y,
                speed_x: def.speed_x,
                speed_y: def.speed_y,
            };
        }

        let mut objects = vec![Object::default(); OBJECT_CAPACITY];
        for (slot, def) in objects.iter_mut().zip(&definition.objects) {
            slot.init = ObjectInit {
                enabled: true,
                sprite: def.sprite,
                flash: def.flash,
                visible: def.visible,
                flipped: def.flipped,
                x: def.x,
                y: def.y,
            };
        }

        let mut elevators = vec![Elevator::default(); ELEVATOR_CAPACITY];
        for (slot, def) in elevators.iter_mut().zip(&definition.elevators) {
            slot.range = def.range;
            slot.init = ElevatorInit {
                enabled: true,
                sprite: def.sprite,
                flash: false,
                visible: def.visible,
                flipped: false,
                x: def.x,
                y: def.y,
                speed_x: def.speed_x,
                speed_y: def.speed_y,
            };
        }

        let mut bonuses = vec![Bonus::default(); BONUS_CAPACITY];
        for (slot, def) in bonuses.iter_mut().zip(&definition.bonuses) {
            *slot = Bonus {
                exists: true,
                bonus_tile: def.bonus_tile,
                replace_tile: def.replace_tile,
                x: def.x,
                y: def.y,
            };
        }

        let player = Player {
            init_x: definition.player.x,
            init_y: definition.player.y,
            init_hp: definition.player.hp.min(MAX_ENERGY),
            ..Player::default()
        };

        Ok(Self {
            number: definition.number,
            is_finish: definition.is_finish,
            has_cage: definition.has_cage,
            music: definition.music,
            boss_power: definition.boss_power,
            grid,
            assets,
            scroll_limit_x: definition.scroll_limit_x,
            altitude_zero: definition.altitude_zero,
            no_scroll: definition.no_scroll,
            finish_x: definition.finish_x,
            finish_y: definition.finish_y,
            player,
            objects,
            enemies,
            bonuses,
            elevators,
            trash: vec![Sprite::default(); TRASH_CAPACITY],
            bonus_collected: 0,
            extra_bonus: 0,
            lives: 3,
            tick_count: 0,
        })
    }
}

impl SimulationState {
    /// Per-(re)start flag reset. The dev toggles survive restarts.
    fn reset(&mut self) {
        let god_mode = self.god_mode;
        let noclip = self.noclip;
        *self = SimulationState::default();
        self.god_mode = god_mode;
        self.noclip = noclip;
        self.gravity_timer = 4;
    }
}

/// Full level (re)start: flags, scroll state, then every pool from its init
/// data.
pub fn clear_level_state(level: &mut Level, state: &mut SimulationState, camera: &mut Camera) {
    state.reset();

    camera.scroll_x = false;
    camera.scroll_y = false;
    camera.scroll_y_target = 0;
    camera.px_offset = 0;
    camera.limit_x = level.scroll_limit_x;
    camera.altitude_zero = level.altitude_zero;
    camera.no_scroll = level.no_scroll;

    set_all_sprites(level);
    set_enemy_animations(level, state);

    camera.tile_x = ((level.player.sprite.x >> 4) - SCREEN_WIDTH_TILES / 2)
        .clamp(0, level.grid.width() - SCREEN_WIDTH_TILES);
    camera.tile_y = ((level.player.sprite.y >> 4) - SCREEN_HEIGHT_TILES / 2)
        .clamp(0, level.grid.height() - SCREEN_HEIGHT_TILES);

    info!(
        level = level.number,
        lives = level.lives,
        hp = level.player.hp,
        "level_state_reset"
    );
}

fn set_all_sprites(level: &mut Level) {
    for trash in &mut level.trash {
        trash.clear();
    }

    for index in 0..level.enemies.len() {
        let enemy = &mut level.enemies[index];
        enemy.sprite.clear();
        enemy.dying = 0;
        enemy.carry_sprite = None;
        enemy.dead_sprite = None;
        enemy.phase = 0;
        enemy.counter = 0;
        enemy.trigger = false;
        enemy.visible = false;
        if enemy.init.enabled {
            let init = enemy.init;
            update_enemy_sprite(&level.assets, &mut level.enemies[index], init.sprite, true);
            let enemy = &mut level.enemies[index];
            enemy.sprite.flipped = init.flipped;
            enemy.sprite.x = init.x;
            enemy.sprite.y = init.y;
            enemy.sprite.speed_x = init.speed_x;
            enemy.sprite.speed_y = init.speed_y;
        }
    }

    for elevator in &mut level.elevators {
        elevator.sprite.clear();
        elevator.enabled = false;
        if elevator.init.enabled {
            update_sprite(&level.assets, &mut elevator.sprite, elevator.init.sprite, true);
            elevator.enabled = true;
            elevator.sprite.visible = elevator.init.visible;
            elevator.sprite.flash = elevator.init.flash;
            elevator.sprite.flipped = elevator.init.flipped;
            elevator.sprite.x = elevator.init.x;
            elevator.sprite.y = elevator.init.y;
            elevator.counter = 0;
            elevator.sprite.speed_x = elevator.init.speed_x;
            elevator.sprite.speed_y = elevator.init.speed_y;
        }
    }

    let cage_x = level.player.cage_x;
    let cage_y = level.player.cage_y;
    for index in 0..level.objects.len() {
        let object = &mut level.objects[index];
        object.sprite.clear();
        object.momentum = 0;
        if object.init.enabled {
            let init = object.init;
            update_object_sprite(&level.assets, &mut level.objects[index], init.sprite, true);
            let object = &mut level.objects[index];
            object.sprite.visible = init.visible;
            object.sprite.flash = init.flash;
            object.sprite.flipped = init.flipped;
            object.sprite.x = init.x;
            object.sprite.y = init.y;
            // The cage respawns at the last checkpoint it was carried past.
            if cage_y != 0
                && (object.sprite.number == OBJ_CAGE_A || object.sprite.number == OBJ_CAGE_B)
            {
                object.sprite.x = cage_x;
                object.sprite.y = cage_y;
            }
        }
    }

    level.player.sprite.clear();
    level.player.sprite2.clear();
    level.player.sprite3.clear();
    level.player.sprite.x = level.player.init_x;
    level.player.sprite.y = level.player.init_y;
    level.player.hp = level.player.init_hp;
    level.player.slippery = 0;
    update_sprite(&level.assets, &mut level.player.sprite, SPRITE_REST, true);
}

/// Points every live enemy's cursor at the stream segment matching its init
/// sprite and rearms the boss counters.
fn set_enemy_animations(level: &mut Level, state: &mut SimulationState) {
    state.boss_alive = false;
    for enemy in &mut level.enemies {
        if !enemy.init.enabled {
            continue;
        }
        let wanted = enemy.sprite.number - FIRST_ENEMY_SPRITE;
        let index = level
            .assets
            .enemy_animations
            .iter()
            .position(|entry| *entry == wanted)
            .unwrap_or(0);
        enemy.sprite.animation = Some(AnimationCursor::at(AnimStream::Enemy, index));
        if enemy.boss {
            state.boss_alive = true;
        }
    }
    state.boss_lives = level.boss_power;
}
