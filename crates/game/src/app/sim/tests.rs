use super::*;
use engine::{InputAction, NullAudio, NullRenderer, NullUi};

fn test_assets() -> AssetCatalog {
    let sprite_boxes = vec![
        SpriteBox {
            width: 16,
            height: 16,
            coll_width: 16,
            coll_height: 16,
            ref_width: 8,
            ref_height: 16,
        };
        356
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
        71
    ];
    object_kinds[9].bounce = true;
    object_kinds[24].bounce = true;
    object_kinds[25].bounce = true;
    AssetCatalog {
        sprite_boxes,
        object_kinds,
        player_animations: (0..30).map(|action| vec![action as i16, -2]).collect(),
        enemy_animations: vec![0, 1, -4, 5, 8, 0x2000 | 2, -2],
        finale_hero_animation: vec![343, -2],
        finale_partner_animation: vec![337, -2],
        finale_smoke_animation: vec![339, -2],
    }
}

/// A flat 24x13 test room: solid floor on the bottom row, everything else
/// open. Tileset entry 1 is plain floor, 2 is a wall tile, 3 a bonus floor,
/// 4 a very slippery floor, 5 spikes.
fn test_definition() -> LevelDefinition {
    let width = 24usize;
    let height = 13usize;
    let mut map = vec![vec![0u8; width]; height];
    for column in 0..width {
        map[height - 1][column] = 1;
    }
    LevelDefinition {
        number: 1,
        is_finish: false,
        has_cage: false,
        music: 0,
        boss_power: 3,
        width: width as i16,
        height: height as i16,
        scroll_limit_x: width as i16,
        altitude_zero: 0,
        no_scroll: false,
        finish_x: 0,
        finish_y: 0,
        player: PlayerDef {
            x: 160,
            y: 192,
            hp: 16,
        },
        tileset: vec![
            TileDef {
                animation: [0; 3],
                horiz: 0,
                floor: 0,
                ceil: 0,
            },
            TileDef {
                animation: [1; 3],
                horiz: 0,
                floor: 1,
                ceil: 1,
            },
            TileDef {
                animation: [2; 3],
                horiz: 1,
                floor: 1,
                ceil: 1,
            },
            TileDef {
                animation: [3; 3],
                horiz: 0,
                floor: 7,
                ceil: 0,
            },
            TileDef {
                animation: [4; 3],
                horiz: 0,
                floor: 4,
                ceil: 0,
            },
            TileDef {
                animation: [5; 3],
                horiz: 0,
                floor: 10,
                ceil: 0,
            },
        ],
        map,
        enemies: Vec::new(),
        objects: Vec::new(),
        elevators: Vec::new(),
        bonuses: Vec::new(),
    }
}

fn test_level() -> Level {
    Level::from_definition(test_definition(), test_assets()).expect("test level")
}

fn test_sim() -> Simulation {
    Simulation::new(test_level())
}

fn fresh_state(level: &mut Level) -> (SimulationState, Camera) {
    let mut state = SimulationState::default();
    let mut camera = Camera::default();
    clear_level_state(level, &mut state, &mut camera);
    (state, camera)
}

#[derive(Default)]
struct RecordingAudio {
    events: Vec<AudioEvent>,
}

impl AudioSink for RecordingAudio {
    fn play_event(&mut self, event: AudioEvent) {
        self.events.push(event);
    }

    fn select_song(&mut self, _song: u8) {}
}

fn enemy_at(level: &mut Level, slot: usize, behavior: EnemyBehavior, x: i16, y: i16) {
    let enemy = &mut level.enemies[slot];
    enemy.behavior = behavior;
    enemy.sprite.x = x;
    enemy.sprite.y = y;
    enemy.sprite.enabled = true;
    enemy.sprite.sbox = SpriteBox {
        width: 16,
        height: 16,
        coll_width: 16,
        coll_height: 16,
        ref_width: 8,
        ref_height: 16,
    };
    enemy.visible = true;
    enemy.init.x = x;
    enemy.init.y = y;
}

#[test]
fn tile_flag_lookup_is_idempotent_and_clamped() {
    let level = test_level();
    let first = level.grid.floor_flag(12, 3);
    let second = level.grid.floor_flag(12, 3);
    assert_eq!(first, FloorFlag::Solid);
    assert_eq!(first, second);

    // out-of-range probes clamp to the nearest real tile
    assert_eq!(level.grid.floor_flag(100, 3), FloorFlag::Solid);
    assert_eq!(level.grid.floor_flag(-5, -5), level.grid.floor_flag(0, 0));
}

#[test]
fn update_sprite_round_trips_number_and_box() {
    let assets = test_assets();
    let mut sprite = Sprite::default();
    update_sprite(&assets, &mut sprite, 42, true);

    assert_eq!(sprite.number, 42);
    assert!(sprite.enabled);
    assert_eq!(sprite.sbox, assets.sprite_box(42));
}

#[test]
fn disabling_a_sprite_never_rewrites_the_catalog() {
    let mut level = test_level();
    let boxes_before = level.assets.sprite_boxes.clone();
    update_sprite(&level.assets, &mut level.player.sprite, 7, true);
    level.player.sprite.enabled = false;
    assert_eq!(level.assets.sprite_boxes, boxes_before);
}

#[test]
fn out_of_range_sprite_number_falls_back_to_default_box() {
    let assets = test_assets();
    assert_eq!(assets.sprite_box(5000), SpriteBox::default());
    assert_eq!(assets.sprite_box(-3), SpriteBox::default());
}

#[test]
fn player_cannot_walk_past_eight_pixels_from_the_left_edge() {
    let mut sim = test_sim();
    sim.level.player.sprite.x = 40;
    let mut audio = NullAudio;
    let mut ui = NullUi;
    let mut renderer = NullRenderer::default();
    let input = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);

    for _ in 0..200 {
        let mut collaborators = Collaborators {
            renderer: &mut renderer,
            audio: &mut audio,
            ui: &mut ui,
        };
        let status = sim
            .tick(&input, &mut collaborators)
            .expect("tick should not abort");
        assert_eq!(status, TickStatus::Running);
    }
    assert_eq!(sim.level.player.sprite.x, 8);
}

#[test]
fn quit_aborts_the_tick() {
    let mut sim = test_sim();
    let mut audio = NullAudio;
    let mut ui = NullUi;
    let mut renderer = NullRenderer::default();
    let mut collaborators = Collaborators {
        renderer: &mut renderer,
        audio: &mut audio,
        ui: &mut ui,
    };
    let input = InputSnapshot::empty().with_quit_requested(true);
    assert_eq!(sim.tick(&input, &mut collaborators), Err(AbortRequested));
}

#[test]
fn energy_loss_at_one_hp_triggers_life_loss() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    level.player.hp = 1;
    level.lives = 2;

    dec_energy(&mut level, &mut state);

    assert_eq!(level.player.hp, 0);
    assert_eq!(state.reset_timer, 10);
    assert_eq!(state.energy_bar_timer, 0);
    assert!(state.lose_life);
    assert!(!state.game_over);
}

#[test]
fn energy_loss_with_no_lives_left_is_game_over() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    level.player.hp = 1;
    level.lives = 0;

    dec_energy(&mut level, &mut state);

    assert!(state.game_over);
    assert!(!state.lose_life);
}

#[test]
fn energy_gain_at_full_health_converts_to_extra_bonus() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    level.player.hp = MAX_ENERGY;

    inc_energy(&mut level, &mut state);

    assert_eq!(level.player.hp, MAX_ENERGY);
    assert_eq!(level.extra_bonus, 1);
}

#[test]
fn falling_object_shocks_only_with_enough_momentum() {
    for (momentum, expect_hit) in [(9u8, false), (10u8, true)] {
        let mut level = test_level();
        let (mut state, _camera) = fresh_state(&mut level);
        let mut audio = RecordingAudio::default();

        level.objects[0].sprite.enabled = true;
        level.objects[0].sprite.x = level.player.sprite.x;
        level.objects[0].sprite.y = level.player.sprite.y - 4;
        level.objects[0].sprite.sbox = level.assets.sprite_box(39);
        level.objects[0].sprite.killing = true;
        level.objects[0].momentum = momentum;
        let hp_before = level.player.hp;

        shock(&mut level, &mut state, &mut audio, 0);

        if expect_hit {
            assert_eq!(state.headache_timer, 24);
            assert_eq!(level.player.hp, hp_before - 1);
            assert_eq!(audio.events, vec![AudioEvent::PlayerHeadImpact]);
        } else {
            assert_eq!(state.headache_timer, 0);
            assert_eq!(level.player.hp, hp_before);
            assert!(audio.events.is_empty());
        }
    }
}

#[test]
fn shooter_never_leaves_scan_phase_outside_the_vertical_band() {
    let mut level = test_level();
    let (mut state, camera) = fresh_state(&mut level);
    enemy_at(&mut level, 0, EnemyBehavior::StationaryShooter, 200, 176);
    level.enemies[0].range_x = 300;
    level.player.sprite.x = 240;
    level.player.sprite.y = 176 + 25; // one pixel outside the 24 px band

    for _ in 0..100 {
        level.enemies[0].visible = true;
        move_enemies(&mut level, &mut state, &camera);
        assert_eq!(level.enemies[0].phase, 0);
    }

    // at exactly 24 the windup starts
    level.player.sprite.y = 176 + 24;
    level.enemies[0].visible = true;
    move_enemies(&mut level, &mut state, &camera);
    assert_eq!(level.enemies[0].phase, 30);
}

#[test]
fn disabled_enemy_is_skipped_by_dispatch_and_collision() {
    let mut level = test_level();
    let (mut state, camera) = fresh_state(&mut level);
    let mut audio = RecordingAudio::default();
    enemy_at(&mut level, 0, EnemyBehavior::Patrol, 160, 176);
    level.enemies[0].power = 40;
    level.enemies[0].sprite.speed_x = 2;
    level.enemies[0].sprite.enabled = false;
    level.player.sprite.x = 160;
    level.player.sprite.y = 176;
    let x_before = level.enemies[0].sprite.x;
    let phase_before = level.enemies[0].phase;

    move_enemies(&mut level, &mut state, &camera);
    resolve_enemy_collisions(&mut level, &mut state, &camera, &mut audio);

    assert_eq!(level.enemies[0].sprite.x, x_before);
    assert_eq!(level.enemies[0].phase, phase_before);
    assert!(audio.events.is_empty());
    assert_eq!(state.hit_timer, 0);
}

#[test]
fn enemy_contact_knocks_the_player_back() {
    let mut level = test_level();
    let (mut state, camera) = fresh_state(&mut level);
    let mut audio = RecordingAudio::default();
    enemy_at(&mut level, 0, EnemyBehavior::Patrol, 162, 176);
    level.enemies[0].power = 40;
    level.player.sprite.x = 160;
    level.player.sprite.y = 176;
    // camera window contains both
    let hp_before = level.player.hp;

    resolve_enemy_collisions(&mut level, &mut state, &camera, &mut audio);

    assert_eq!(state.hit_timer, 24);
    assert_eq!(level.player.hp, hp_before - 2);
    assert_eq!(level.player.sprite.speed_x, -40);
    assert_eq!(level.player.sprite.speed_y, -8 * 16);
    assert_eq!(audio.events, vec![AudioEvent::HitPlayer]);
}

#[test]
fn boss_takes_hits_through_the_invulnerability_window() {
    let mut level = test_level();
    let (mut state, camera) = fresh_state(&mut level);
    let mut audio = RecordingAudio::default();
    enemy_at(&mut level, 0, EnemyBehavior::Patrol, 180, 176);
    level.enemies[0].boss = true;
    state.boss_lives = 2;
    state.god_mode = true; // keep the touch reaction out of the way

    // a thrown sprite overlaps the boss
    state.throw_in_flight = true;
    level.player.sprite2.enabled = true;
    level.player.sprite2.x = 180;
    level.player.sprite2.y = 176;
    level.player.sprite2.sbox = level.assets.sprite_box(39);

    resolve_enemy_collisions(&mut level, &mut state, &camera, &mut audio);
    assert_eq!(state.boss_lives, 1);
    assert_eq!(state.invulnerability_timer, BOSS_INVULNERABLE_TICKS);
    assert_eq!(level.enemies[0].dying, 0);
    assert!(level.enemies[0].sprite.flash);

    // second hit inside the window does nothing
    state.throw_in_flight = true;
    level.player.sprite2.enabled = true;
    resolve_enemy_collisions(&mut level, &mut state, &camera, &mut audio);
    assert_eq!(state.boss_lives, 1);

    // after the window expires the boss can be finished
    state.invulnerability_timer = 0;
    state.throw_in_flight = true;
    level.player.sprite2.enabled = true;
    resolve_enemy_collisions(&mut level, &mut state, &camera, &mut audio);
    assert_eq!(state.boss_lives, 0);
    assert!(!state.boss_alive);
    assert_eq!(level.enemies[0].dying & DYING_REMOVE, DYING_REMOVE);
}

#[test]
fn hidden_sentinel_hides_the_enemy_without_advancing() {
    let mut assets = test_assets();
    assets.enemy_animations = vec![ANIM_HIDDEN_SENTINEL, -1];
    let mut enemy = Enemy {
        sprite: Sprite {
            enabled: true,
            animation: Some(AnimationCursor::at(AnimStream::Enemy, 0)),
            number: 101,
            ..Sprite::default()
        },
        ..Enemy::default()
    };

    advance_enemy_animation(&assets, &mut enemy);

    assert!(enemy.sprite.invisible);
    assert!(!enemy.trigger);
    assert_eq!(enemy.sprite.number, 101);
    assert_eq!(
        enemy.sprite.animation,
        Some(AnimationCursor::at(AnimStream::Enemy, 0))
    );
}

#[test]
fn invisible_enemy_does_not_touch_the_player() {
    let mut level = test_level();
    let (mut state, camera) = fresh_state(&mut level);
    let mut audio = RecordingAudio::default();
    // the enemy's cursor sits on a hidden sentinel
    level.assets.enemy_animations = vec![ANIM_HIDDEN_SENTINEL, -1];
    enemy_at(&mut level, 0, EnemyBehavior::Patrol, 160, 176);
    level.enemies[0].power = 40;
    level.enemies[0].sprite.animation = Some(AnimationCursor::at(AnimStream::Enemy, 0));
    level.player.sprite.x = 160;
    level.player.sprite.y = 176;

    resolve_enemy_collisions(&mut level, &mut state, &camera, &mut audio);

    assert!(level.enemies[0].sprite.invisible);
    assert_eq!(state.hit_timer, 0);
    assert!(audio.events.is_empty());
}

#[test]
fn both_loop_back_decodings_are_preserved() {
    let mut assets = test_assets();
    assets.enemy_animations = vec![7, 9, -3];
    assets.player_animations = vec![vec![7, 9, -3]];

    // enemy style applies the full negative offset; from index 2 it lands
    // below zero and clamps to the stream start
    let mut enemy_cursor = AnimationCursor::at(AnimStream::Enemy, 2);
    enemy_cursor.rewind_while_negative(&assets);
    assert_eq!(enemy_cursor.index, 0);
    assert_eq!(enemy_cursor.entry(&assets), 7);

    // player style applies half the offset once: -3/2 truncates to -1, so
    // the two decodings diverge on odd offsets
    let mut player_cursor = AnimationCursor::at(AnimStream::PlayerAction(0), 2);
    player_cursor.jump_back_half_if_negative(&assets);
    assert_eq!(player_cursor.index, 1);
    assert_eq!(player_cursor.entry(&assets), 9);
}

#[test]
fn segment_seeking_crosses_terminators() {
    let assets = test_assets(); // [0, 1, -4, 5, 8, trigger, -2]
    let mut cursor = AnimationCursor::at(AnimStream::Enemy, 0);
    cursor.seek_next_segment(&assets);
    assert_eq!(cursor.index, 3);

    cursor.seek_prev_segment(&assets);
    assert_eq!(cursor.index, 1);
}

#[test]
fn bonus_tile_is_consumed_exactly_once() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    let mut audio = RecordingAudio::default();
    let mut ui = NullUi;
    // put a bonus floor tile at (7, 5) backed by a bonus entry
    level.grid.set_tile(7, 5, 3);
    level.bonuses[0] = Bonus {
        exists: true,
        bonus_tile: 254,
        replace_tile: 0,
        x: 5,
        y: 7,
    };
    level.player.hp = 10;

    for _ in 0..2 {
        let floor = level.grid.floor_flag(7, 5);
        let floor_above = level.grid.floor_flag(6, 5);
        block_yyprg(
            &mut level,
            &mut state,
            &mut audio,
            &mut ui,
            floor,
            floor_above,
            7,
            5,
        )
        .expect("no abort in bonus handling");
    }

    assert_eq!(level.bonus_collected, 1);
    assert_eq!(level.player.hp, 11);
    assert_eq!(level.grid.tile_id(7, 5), 0);
    assert_eq!(audio.events, vec![AudioEvent::CollectBonus]);
}

#[test]
fn checkpoint_stores_respawn_and_cage_positions() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    let mut audio = RecordingAudio::default();
    level.bonuses[0] = Bonus {
        exists: true,
        bonus_tile: 10,
        replace_tile: 0,
        x: 6,
        y: 8,
    };
    level.player.sprite.x = 100;
    level.player.sprite.y = 140;
    level.player.sprite2.number = OBJ_CAGE_A;

    case_secu(&mut level, &mut state, &mut audio, 8, 6);

    assert_eq!(level.player.init_x, 100);
    assert_eq!(level.player.init_y, 140);
    assert_eq!(level.player.cage_x, 100);
    assert_eq!(level.player.cage_y, 140);
    assert_eq!(audio.events, vec![AudioEvent::CollectWaypoint]);
}

#[test]
fn trash_pool_exhaustion_skips_the_shot() {
    let mut level = test_level();
    for slot in &mut level.trash {
        slot.enabled = true;
    }
    assert_eq!(find_trash(&level.trash), None);

    level.trash[2].enabled = false;
    assert_eq!(find_trash(&level.trash), Some(2));
}

#[test]
fn force_pose_uses_the_first_free_object_slot() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    for object in &mut level.objects {
        object.sprite.enabled = true;
    }
    level.objects[3].sprite.enabled = false;
    level.objects[5].sprite.enabled = false;
    state.carrying = true;
    level.player.sprite2.enabled = true;
    level.player.sprite2.number = 39;
    level.player.sprite2.x = 80;
    level.player.sprite2.y = 96;

    let slot = force_pose(&mut level, &mut state);

    assert_eq!(slot, Some(3));
    assert!(level.objects[3].sprite.enabled);
    assert_eq!(level.objects[3].sprite.x, 80);
    assert_eq!(level.objects[3].momentum, 0);
    assert!(!state.carrying);
    assert!(!level.player.sprite2.enabled);
}

#[test]
fn force_pose_with_a_full_pool_keeps_carrying() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    for object in &mut level.objects {
        object.sprite.enabled = true;
    }
    state.carrying = true;
    level.player.sprite2.enabled = true;
    level.player.sprite2.number = 39;

    assert_eq!(force_pose(&mut level, &mut state), None);
    assert!(state.carrying);
    assert!(level.player.sprite2.enabled);
}

#[test]
fn support_query_prefers_the_lowest_pool_slot() {
    let mut level = test_level();
    for slot in [4usize, 9usize] {
        level.objects[slot].sprite.enabled = true;
        level.objects[slot].sprite.x = 160;
        level.objects[slot].sprite.y = 180;
        level.objects[slot].sprite.sbox = level.assets.sprite_box(39);
        level.objects[slot].kind = level.assets.object_kind(39);
    }

    let support = find_support(&level.objects, 160, 172, level.assets.sprite_box(0), None);
    assert_eq!(support, Some(4));
}

#[test]
fn elevator_reverses_both_speeds_at_range() {
    let mut level = test_level();
    let camera = Camera::default();
    level.elevators[0].enabled = true;
    level.elevators[0].range = 3;
    level.elevators[0].sprite.enabled = true;
    level.elevators[0].sprite.x = 100;
    level.elevators[0].sprite.y = 100;
    level.elevators[0].sprite.speed_x = 2;
    level.elevators[0].sprite.speed_y = 1;

    for _ in 0..3 {
        move_elevators(&mut level, &camera);
    }

    assert_eq!(level.elevators[0].counter, 0);
    assert_eq!(level.elevators[0].sprite.speed_x, -2);
    assert_eq!(level.elevators[0].sprite.speed_y, -1);
    assert_eq!(level.elevators[0].sprite.x, 106);
    assert_eq!(level.elevators[0].sprite.y, 103);
}

#[test]
fn offscreen_elevator_turns_invisible_but_stays_enabled() {
    let mut level = test_level();
    let camera = Camera::default();
    level.elevators[0].enabled = true;
    level.elevators[0].range = 100;
    level.elevators[0].sprite.enabled = true;
    level.elevators[0].sprite.x = 2000;
    level.elevators[0].sprite.y = 100;

    move_elevators(&mut level, &camera);

    assert!(level.elevators[0].enabled);
    assert!(level.elevators[0].sprite.invisible);
}

#[test]
fn scroll_limit_breach_and_unbreach() {
    // wide room so the un-breach camera position is reachable
    let mut definition = test_definition();
    definition.width = 64;
    definition.scroll_limit_x = 40;
    definition.map = vec![vec![0u8; 64]; 13];
    for column in 0..64 {
        definition.map[12][column] = 1;
    }
    let mut level = Level::from_definition(definition, test_assets()).expect("wide level");
    let (mut state, mut camera) = fresh_state(&mut level);

    // crossing the limit column breaches it
    level.player.sprite.x = 41 * 16;
    scroll(&level, &mut state, &mut camera);
    assert!(camera.limit_breached);

    // retreating a full screen to the left re-arms it
    level.player.sprite.x = 16;
    level.player.sprite.flipped = true;
    scroll(&level, &mut state, &mut camera);
    assert!(!camera.limit_breached);
}

#[test]
fn camera_moves_at_most_one_tile_per_tick() {
    let mut level = test_level();
    let (mut state, mut camera) = fresh_state(&mut level);
    camera.tile_x = 0;
    level.player.sprite.x = 300;

    let before = camera.tile_x;
    scroll(&level, &mut state, &mut camera);
    assert!((camera.tile_x - before).abs() <= 1);
}

#[test]
fn loaded_big_spring_releases_and_pushes_the_rider_down() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    state.gravity_timer = 1;
    state.frame_counter = 2; // even tick
    level.objects[0].sprite.enabled = true;
    level.objects[0].sprite.visible = true;
    level.objects[0].sprite.number = OBJ_SPRING_BIG;
    level.objects[0].sprite.spring_load = 0x02;
    level.objects[0].sprite.rider = Some(Rider::Player);
    let player_y = level.player.sprite.y;

    animate_sprites(&mut level, &mut state);

    assert_eq!(level.objects[0].sprite.number, OBJ_SPRING_SMALL);
    assert_eq!(level.player.sprite.y, player_y + 5);
    assert_eq!(state.gravity_timer, 3);
}

#[test]
fn thrown_carpet_unfolds_in_two_steps() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    state.frame_counter = 4; // multiple of four
    level.objects[0].sprite.enabled = true;
    level.objects[0].sprite.visible = true;
    level.objects[0].sprite.x = 160;
    level.objects[0].sprite.y = 80;
    level.objects[0].sprite.speed_y = 32;
    level.objects[0].sprite.speed_x = 64;
    let assets = level.assets.clone();
    update_object_sprite(&assets, &mut level.objects[0], OBJ_CARPET_FOLDED, false);
    let mut audio = NullAudio;

    move_objects(&mut level, &mut state, &mut audio);
    assert_eq!(level.objects[0].sprite.number, OBJ_CARPET_OPEN);
    assert_eq!(state.carpet_state, 1);
    assert_eq!(state.carpet_fly_timer, CARPET_FLY_TICKS);

    state.frame_counter = 8;
    level.objects[0].sprite.speed_y = 32;
    move_objects(&mut level, &mut state, &mut audio);
    assert_eq!(level.objects[0].sprite.number, OBJ_CARPET_FLY_A);
}

#[test]
fn falling_object_comes_to_rest_on_the_floor() {
    let mut level = test_level();
    let (mut state, _camera) = fresh_state(&mut level);
    let mut audio = NullAudio;
    let assets = level.assets.clone();
    level.objects[0].sprite.enabled = true;
    level.objects[0].sprite.visible = true;
    update_object_sprite(&assets, &mut level.objects[0], 40, false);
    level.objects[0].sprite.x = 160;
    level.objects[0].sprite.y = 150;
    level.objects[0].sprite.speed_y = 16;

    for _ in 0..64 {
        state.gravity_timer = 4;
        move_objects(&mut level, &mut state, &mut audio);
    }

    // resting on a tile row, fall spent
    assert_eq!(level.objects[0].sprite.speed_y, 0);
    assert_eq!(level.objects[0].sprite.y & 0x0F, 0);
    assert!(level.objects[0].sprite.y <= level.grid.height() << 4);
}

#[test]
fn level_definition_rejects_bad_shapes() {
    let mut definition = test_definition();
    definition.map.pop();
    let error = Level::from_definition(definition, test_assets()).expect_err("row count");
    assert!(error.contains("rows"), "unexpected error: {error}");

    let mut definition = test_definition();
    definition.tileset[1].floor = 99;
    let error = Level::from_definition(definition, test_assets()).expect_err("flag code");
    assert!(error.contains("floor flag"), "unexpected error: {error}");

    let mut definition = test_definition();
    definition.map[0][0] = 200;
    let error = Level::from_definition(definition, test_assets()).expect_err("tile id");
    assert!(error.contains("tileset entry"), "unexpected error: {error}");
}

#[test]
fn level_json_errors_carry_the_field_path() {
    let error = load_level(r#"{ "number": "one" }"#, test_assets()).expect_err("bad json");
    assert!(error.contains("number"), "unexpected error: {error}");
}

#[test]
fn silent_walk_unlocks_after_a_crouch_jump() {
    let mut sim = test_sim();
    let mut audio = NullAudio;
    let mut ui = NullUi;
    let mut renderer = NullRenderer::default();

    // hold the crouch until it registers
    let crouch = InputSnapshot::empty().with_action_down(InputAction::MoveDown, true);
    for _ in 0..5 {
        let mut collaborators = Collaborators {
            renderer: &mut renderer,
            audio: &mut audio,
            ui: &mut ui,
        };
        sim.tick(&crouch, &mut collaborators).expect("tick");
    }
    assert_eq!(sim.state.last_action, ACTION_KNEESTAND);

    let jump = InputSnapshot::empty().with_action_down(InputAction::MoveUp, true);
    let mut collaborators = Collaborators {
        renderer: &mut renderer,
        audio: &mut audio,
        ui: &mut ui,
    };
    sim.tick(&jump, &mut collaborators).expect("tick");
    assert!(sim.state.stealth_timer > 90);
}

#[test]
fn kneestand_held_long_enough_arms_the_drop_through() {
    let mut sim = test_sim();
    let mut audio = NullAudio;
    let mut ui = NullUi;
    let mut renderer = NullRenderer::default();
    let crouch = InputSnapshot::empty().with_action_down(InputAction::MoveDown, true);

    let mut armed = false;
    for _ in 0..30 {
        let mut collaborators = Collaborators {
            renderer: &mut renderer,
            audio: &mut audio,
            ui: &mut ui,
        };
        sim.tick(&crouch, &mut collaborators).expect("tick");
        if sim.state.drop_through_timer != 0 {
            armed = true;
            break;
        }
    }
    assert!(armed, "drop-through never armed");
}

#[test]
fn walking_onto_slippery_floor_records_the_grip_level() {
    let mut level = test_level();
    // swap the floor under the player for the very slippery tile; the foot
    // test can probe the neighbour column too, so cover both
    let tile_x = level.player.init_x >> 4;
    level.grid.set_tile(12, tile_x - 1, 4);
    level.grid.set_tile(12, tile_x, 4);
    let mut sim = Simulation::new(level);
    let mut audio = NullAudio;
    let mut ui = NullUi;
    let mut renderer = NullRenderer::default();

    let mut collaborators = Collaborators {
        renderer: &mut renderer,
        audio: &mut audio,
        ui: &mut ui,
    };
    sim.tick(&InputSnapshot::empty(), &mut collaborators)
        .expect("tick");

    assert_eq!(sim.level.player.slippery, 3);
}

#[test]
fn spikes_kill_unless_god_mode() {
    for god_mode in [false, true] {
        let mut level = test_level();
        let tile_x = level.player.init_x >> 4;
        level.grid.set_tile(12, tile_x - 1, 5);
        level.grid.set_tile(12, tile_x, 5);
        let mut sim = Simulation::new(level);
        sim.state.god_mode = god_mode;
        let mut audio = NullAudio;
        let mut ui = NullUi;
        let mut renderer = NullRenderer::default();

        let mut collaborators = Collaborators {
            renderer: &mut renderer,
            audio: &mut audio,
            ui: &mut ui,
        };
        sim.tick(&InputSnapshot::empty(), &mut collaborators)
            .expect("tick");

        if god_mode {
            assert_eq!(sim.state.reset_timer, 0);
        } else {
            assert!(sim.state.reset_timer > 0);
            assert!(sim.state.lose_life);
        }
    }
}

#[test]
fn falling_out_of_the_level_is_instant_death() {
    let mut sim = test_sim();
    sim.level.player.sprite.y = (sim.level.grid.height() + 2) << 4;
    let mut audio = NullAudio;
    let mut ui = NullUi;
    let mut renderer = NullRenderer::default();

    let mut collaborators = Collaborators {
        renderer: &mut renderer,
        audio: &mut audio,
        ui: &mut ui,
    };
    sim.tick(&InputSnapshot::empty(), &mut collaborators)
        .expect("tick");

    assert!(sim.state.lose_life || sim.state.game_over);
}

#[test]
fn respawn_restores_pools_and_spends_a_life() {
    let mut sim = test_sim();
    let lives_before = sim.level.lives;
    sim.level.player.hp = 3;
    sim.level.player.sprite.x = 300;
    sim.state.carrying = true;

    sim.respawn();

    assert_eq!(sim.level.lives, lives_before - 1);
    assert_eq!(sim.level.player.hp, sim.level.player.init_hp);
    assert_eq!(sim.level.player.sprite.x, sim.level.player.init_x);
    assert!(!sim.state.carrying);
    assert_eq!(sim.state.gravity_timer, 4);
}

#[test]
fn draw_lists_cover_the_camera_window() {
    let sim = test_sim();
    let (tiles, sprites) = sim.build_draw_lists();

    assert!(!tiles.is_empty());
    // the player is always in the visible set
    assert!(sprites
        .iter()
        .any(|sprite| sprite.number == sim.level.player.sprite.number));
    for tile in &tiles {
        assert!(tile.screen_x >= -16);
        assert!(tile.screen_y >= 0);
    }
}

#[test]
fn tick_counter_advances_and_wraps_frame_counter() {
    let mut sim = test_sim();
    sim.state.frame_counter = 0x0FFF;
    let mut audio = NullAudio;
    let mut ui = NullUi;
    let mut renderer = NullRenderer::default();

    let mut collaborators = Collaborators {
        renderer: &mut renderer,
        audio: &mut audio,
        ui: &mut ui,
    };
    sim.tick(&InputSnapshot::empty(), &mut collaborators)
        .expect("tick");

    assert_eq!(sim.level.tick_count, 1);
    assert_eq!(sim.state.frame_counter, 0);
}
