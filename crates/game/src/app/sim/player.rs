/// Per-tick player update: read input, derive the action code, run the
/// action handler, integrate movement, resolve collisions, position the
/// carried or thrown sprite, then count the timers down.
pub fn move_player(
    level: &mut Level,
    state: &mut SimulationState,
    camera: &Camera,
    input: &InputSnapshot,
    audio: &mut dyn AudioSink,
    ui: &mut dyn UiGateway,
) -> Result<(), AbortRequested> {
    if input.quit_requested() {
        return Err(AbortRequested);
    }
    if input.lose_life_pressed() && state.reset_timer == 0 {
        state.reset_timer = 2;
        return Ok(());
    }
    if input.display_energy_pressed() {
        state.energy_bar_timer = 50;
    }
    if input.status_page_pressed() {
        ui.view_status(StatusView {
            level_number: level.number,
            lives: level.lives,
            extra_bonus: level.extra_bonus,
            bonus_collected: level.bonus_collected,
            hp: level.player.hp,
        })?;
    }

    level.player.x_axis = input.x_axis();
    level.player.y_axis = input.y_axis();
    level.player.action_pressed = input.action_down();

    state.moving_x = level.player.x_axis != 0;
    state.moving_y = level.player.y_axis != 0;
    if state.noclip {
        level.player.sprite.speed_x = level.player.x_axis as i16 * 100;
        level.player.sprite.speed_y = level.player.y_axis as i16 * 100;
        level.player.sprite.x += level.player.sprite.speed_x >> 4;
        level.player.sprite.y += level.player.sprite.speed_y >> 4;
        return Ok(());
    }

    // Derive the action code. Hit and headache override everything, then
    // ladder, jump, crouch, walk, rest, with grab/throw layered on top.
    let mut action;
    if state.headache_timer != 0 {
        action = ACTION_HEADACHE;
    } else if state.hit_timer != 0 {
        action = if state.burning {
            ACTION_HIT_BURN
        } else {
            ACTION_HIT
        };
    } else {
        state.burning = false;
        if state.on_ladder {
            action = ACTION_CLIMB;
        } else if !state.forced_crouch && level.player.y_axis < 0 && state.fall_flag == 0 {
            action = ACTION_JUMP;
            if state.last_action == ACTION_KNEESTAND {
                // jump straight out of a kneestand unlocks silent walking
                state.stealth_timer = 100;
            }
        } else if state.forced_crouch || (state.fall_flag != 6 && level.player.y_axis > 0) {
            if state.moving_x {
                action = ACTION_CRAWL;
            } else {
                action = ACTION_KNEESTAND;
            }
        } else if state.moving_x {
            action = ACTION_WALK;
        } else {
            action = ACTION_REST;
        }
        if level.player.action_pressed && !state.forced_crouch {
            if !state.throw_in_flight {
                if action == ACTION_CRAWL || action == ACTION_KNEESTAND {
                    state.drop_ready = false;
                    action = ACTION_GRAB;
                } else if state.carrying && state.drop_ready {
                    action = ACTION_THROW;
                }
            }
        } else {
            state.drop_ready = true;
            state.grab_latch = false;
        }
    }
    if state.carrying {
        action += CARRY_SHIFT;
    }

    let new_facing = if state.headache_timer != 0 || state.hit_timer != 0 {
        if state.facing < 0 {
            -1
        } else {
            0
        }
    } else if level.player.x_axis != 0 {
        level.player.x_axis
    } else if state.facing == -1 {
        -1
    } else if action == ACTION_REST {
        0
    } else {
        1
    };

    if state.facing != new_facing {
        state.facing = new_facing;
        state.action_timer = 1;
    } else {
        if (action == ACTION_REST || action == ACTION_WALK) && state.stealth_timer != 0 {
            action += SILENT_SHIFT;
        }
        if action != state.last_action {
            state.action_timer = 1;
        } else if state.action_timer < 0xFF {
            state.action_timer += 1;
        }
    }
    state.action = action;
    action_prg(level, state, audio, action);

    // Move in X only while the result stays 8 px inside the level edges.
    let new_x = level.player.sprite.x + (level.player.sprite.speed_x >> 4);
    if (level.player.sprite.speed_x < 0 && new_x >= 8)
        || (level.player.sprite.speed_x > 0 && new_x <= (level.grid.width() << 4) - 8)
    {
        level.player.sprite.x = new_x;
    }
    level.player.sprite.y += level.player.sprite.speed_y >> 4;

    brk_collision(level, state, audio, ui)?;

    if state.throw_in_flight {
        // The thrown sprite flies until it leaves the level or strays too
        // far outside the screen.
        let new_x = (level.player.sprite2.speed_x >> 4) + level.player.sprite2.x;
        if new_x < (level.grid.width() << 4)
            && new_x >= 0
            && new_x >= (camera.tile_x << 4) - THROW_SLACK_X
            && new_x <= (camera.tile_x << 4) + (SCREEN_WIDTH_TILES << 4) + THROW_SLACK_X
        {
            level.player.sprite2.x = new_x;
            let new_y = (level.player.sprite2.speed_y >> 4) + level.player.sprite2.y;
            if new_y < (level.grid.height() << 4)
                && new_y >= 0
                && new_y >= (camera.tile_y << 4) - THROW_SLACK_Y
                && new_y <= (camera.tile_y << 4) + (SCREEN_HEIGHT_TILES << 4) + THROW_SLACK_Y
            {
                level.player.sprite2.y = new_y;
            } else {
                level.player.sprite2.enabled = false;
                state.throw_in_flight = false;
            }
        } else {
            level.player.sprite2.enabled = false;
            state.throw_in_flight = false;
        }
    } else if state.carrying {
        // Pin the carried sprite to the player's pose and facing.
        let last = state.last_action;
        if !state.on_ladder && (last == CARRY_SHIFT + 5 || last == CARRY_SHIFT + 7) {
            level.player.sprite2.y = level.player.sprite.y - 4;
            if level.player.sprite.flipped {
                level.player.sprite2.x = level.player.sprite.x - 10;
            } else {
                level.player.sprite2.x = level.player.sprite.x + 12;
            }
        } else if level.player.sprite.number == SPRITE_LADDER_SLIDE
            || ((last & 0x0F) != 7 && (last & 0x0F) != 8)
        {
            level.player.sprite2.x = level.player.sprite.x + 2;
            if level.player.sprite.number == SPRITE_CLIMB_CARRY_A
                || level.player.sprite.number == SPRITE_CLIMB_CARRY_B
            {
                level.player.sprite2.x -= 10;
                if level.player.sprite.flipped {
                    level.player.sprite2.x += 18;
                }
            }
            level.player.sprite2.y =
                level.player.sprite.y - level.player.sprite.sbox.coll_height as i16 + 1;
        }
    }
    if state.impact_timer != 0 {
        state.impact_timer -= 1;
        if state.impact_timer == 0 {
            level.player.sprite2.enabled = false;
        }
    }

    sub_to_zero(&mut state.invulnerability_timer);
    sub_to_zero(&mut state.reset_timer);
    sub_to_zero(&mut state.carpet_fly_timer);
    sub_to_zero(&mut state.drop_through_timer);
    sub_to_zero(&mut state.gravity_timer);
    sub_to_zero(&mut state.stealth_timer);
    sub_to_zero(&mut state.hit_timer);
    if level.player.sprite.speed_y == 0 {
        sub_to_zero(&mut state.headache_timer);
    }
    if level.player.sprite.speed_x == 0 && level.player.sprite.speed_y == 0 {
        state.hit_timer = 0;
    }
    sub_to_zero(&mut state.smoke_timer);
    if state.smoke_timer != 0 && state.smoke_timer & 0x03 == 0 {
        let next = level.player.sprite2.number + 1;
        update_sprite(&level.assets, &mut level.player.sprite2, next, false);
        if level.player.sprite2.number == OBJ_SMOKE_LAST {
            level.player.sprite2.enabled = false;
            state.smoke_timer = 0;
        }
    }
    Ok(())
}

/// Life loss bookkeeping: starts the restart countdown and hides the bar.
pub fn dec_life(level: &mut Level, state: &mut SimulationState) {
    state.reset_timer = 10;
    state.energy_bar_timer = 0;
    if level.lives == 0 {
        state.game_over = true;
    } else {
        state.lose_life = true;
    }
}

/// Instant kill (spikes, water, flames, falling out of the level). The
/// short countdown distinguishes it from running out of energy.
fn case_dead_im(level: &mut Level, state: &mut SimulationState) {
    dec_life(level, state);
    state.reset_timer = 2;
}

pub fn inc_energy(level: &mut Level, state: &mut SimulationState) {
    state.energy_bar_timer = 50;
    if level.player.hp == MAX_ENERGY {
        level.extra_bonus += 1;
    } else {
        level.player.hp += 1;
    }
}

pub fn dec_energy(level: &mut Level, state: &mut SimulationState) {
    state.energy_bar_timer = 50;
    if state.reset_timer == 0 {
        if level.player.hp > 0 {
            level.player.hp -= 1;
        }
        if level.player.hp == 0 {
            dec_life(level, state);
        }
    }
}

/// Collision against tiles, elevators and support objects, in that strict
/// priority order.
fn brk_collision(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    ui: &mut dyn UiGateway,
) -> Result<(), AbortRequested> {
    let mut tile_x = level.player.sprite.x >> 4;
    let tile_y = (level.player.sprite.y >> 4) - 1;
    let init_y = tile_y;

    if level.player.sprite.y > (level.grid.height() + 1) << 4 && !state.noclip {
        case_dead_im(level, state);
    }

    // Vertical test under the feet, with the anti-snag window: when the
    // sub-pixel X offset sits within TEST_ZONE of a boundary the adjacent
    // tile is probed as well.
    state.fall_test = 0;
    let mut coll_test = level.player.sprite.x & 0x0F;
    if coll_test < TEST_ZONE {
        coll_test += 256;
        tile_x -= 1;
    }
    coll_test -= TEST_ZONE;

    let left_tile_x = tile_x;
    take_blk_and_ytest(level, state, audio, ui, tile_y, tile_x)?;
    if state.fall_test == 1 {
        coll_test += TEST_ZONE * 2;
        if coll_test > 15 {
            tile_x += 1;
        }
        if tile_x != left_tile_x {
            take_blk_and_ytest(level, state, audio, ui, tile_y, tile_x)?;
        }
        if state.fall_test == 1 {
            if state.drop_through_timer == 0 && state.headache_timer == 0 {
                collision_with_elevators(level, state);
                if state.fall_test == 1 {
                    collision_with_objects(level, state, audio);
                    if state.fall_test == 1 {
                        free_fall(level, state);
                    } else {
                        level.player.slippery = 0;
                    }
                }
            } else {
                free_fall(level, state);
            }
        }
    }

    // Horizontal test across the player's height, probing ahead of the
    // movement direction.
    let mut change_x = TEST_ZONE + MAX_SPEED_X;
    if level.player.sprite.speed_x < 0 {
        change_x = -change_x;
    } else if level.player.sprite.speed_x == 0 {
        change_x = 0;
    }

    let mut height = level.player.sprite.sbox.coll_height as i16;
    if level.player.sprite.y > MAP_LIMIT_Y + 1 && init_y >= 0 && init_y < level.grid.height() {
        let tile_x = (level.player.sprite.x + change_x) >> 4;
        let mut tile_y = init_y;
        let mut first = true;
        loop {
            let hflag = level.grid.horiz_flag(tile_y, tile_x);
            if first {
                block_xxprg(level, state, audio, ui, hflag, tile_y, tile_x)?;
                first = false;
            } else if hflag == HorizFlag::Code || hflag == HorizFlag::Bonus {
                block_xxprg(level, state, audio, ui, hflag, tile_y, tile_x)?;
            }
            if tile_y == 0 {
                return Ok(());
            }
            tile_y -= 1;
            height -= 16;
            if height <= 0 {
                break;
            }
        }
    }
    Ok(())
}

/// One foot-column probe: floor handling below, then the ceiling above, then
/// the unstick nudge when standing inside a hard tile.
fn take_blk_and_ytest(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    ui: &mut dyn UiGateway,
    tile_y: i16,
    tile_x: i16,
) -> Result<(), AbortRequested> {
    state.grounded = false;
    state.forced_crouch = false;
    state.on_ladder = false;

    let mut tile_y = tile_y;
    if level.player.sprite.y <= MAP_LIMIT_Y || tile_y < -1 {
        free_fall(level, state);
        state.fall_test = 0xFF;
        return Ok(());
    }
    if tile_y + 1 >= level.grid.height() {
        free_fall(level, state);
        state.fall_test = 0xFF;
        return Ok(());
    }
    if tile_y == -1 {
        // jumping above the level top still lands in the right column
        tile_y = 0;
    }
    let floor = level.grid.floor_flag(tile_y + 1, tile_x);
    let floor_above = level.grid.floor_flag(tile_y, tile_x);

    if state.last_action & 0x0F != ACTION_JUMP {
        block_yyprg(level, state, audio, ui, floor, floor_above, tile_y + 1, tile_x)?;
    }
    if tile_y < 1 || level.player.sprite.speed_y > 0 {
        return Ok(());
    }

    let cflag = level.grid.ceil_flag(tile_y - 1, tile_x);
    block_yyprgd(level, state, audio, cflag, tile_y - 1, tile_x);

    let horiz = level.grid.horiz_flag(tile_y, tile_x);
    if horiz.blocks() && level.player.sprite.y > MAP_LIMIT_Y + 1 {
        // Standing inside a hard tile: nudge out toward the free side.
        let change: i16 = if level.player.sprite.speed_x > 0 { -1 } else { 1 };
        let mut tile_x = tile_x + change;
        if level.grid.horiz_flag(tile_y, tile_x) == HorizFlag::None {
            level.player.sprite.x += change << 1;
        } else {
            let change = -change;
            tile_x += change + change;
            if level.grid.horiz_flag(tile_y, tile_x) == HorizFlag::None {
                level.player.sprite.x += change << 1;
            }
        }
    }
    Ok(())
}

fn block_yyprgd(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    cflag: CeilFlag,
    tile_y: i16,
    tile_x: i16,
) {
    match cflag {
        CeilFlag::None => {}

        CeilFlag::Ceiling | CeilFlag::Deadly => {
            if cflag == CeilFlag::Deadly && !state.god_mode {
                case_dead_im(level, state);
            } else if level.player.sprite.speed_y != 0 {
                level.player.sprite.speed_y = 0;
                level.player.sprite.y = (level.player.sprite.y & !0x0F) + 16;
                state.jump_ticks = 0xFF;
            } else if level.player.sprite.number != SPRITE_FREE_FALL
                && level.player.sprite.number != SPRITE_CARRY_FALL
                && state.fall_flag != 6
            {
                state.forced_crouch = true;
                if state.carrying {
                    // No headroom while carrying: set the load down, and
                    // shove it clear of any wall it got parked inside.
                    if let Some(index) = force_pose(level, state) {
                        let tile_x = level.objects[index].sprite.x >> 4;
                        let tile_y = level.objects[index].sprite.y >> 4;
                        if level.grid.horiz_flag(tile_y, tile_x).blocks() {
                            if level.grid.horiz_flag(tile_y, tile_x - 1).blocks() {
                                level.objects[index].sprite.x += 16;
                            } else {
                                level.objects[index].sprite.x -= 16;
                            }
                        }
                    }
                }
            }
        }

        CeilFlag::Ladder => {
            if level.player.sprite.speed_y < 0 && level.player.sprite.speed_x == 0 {
                state.jump_ticks = 10;
                state.on_ladder = true;
            }
        }

        CeilFlag::Padlock => {
            case_secu(level, state, audio, tile_y, tile_x);
        }
    }
}

fn block_xxprg(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    ui: &mut dyn UiGateway,
    hflag: HorizFlag,
    tile_y: i16,
    tile_x: i16,
) -> Result<(), AbortRequested> {
    match hflag {
        HorizFlag::None => {}
        HorizFlag::Wall => block_x(level, state),
        HorizFlag::Bonus => {
            case_bonus(level, state, audio, tile_y, tile_x);
        }
        HorizFlag::Deadly => {
            if !state.god_mode {
                case_dead_im(level, state);
            } else {
                block_x(level, state);
            }
        }
        HorizFlag::Code => case_pass(level, state, audio, ui, level.number as u8, tile_y, tile_x)?,
        HorizFlag::Padlock => case_secu(level, state, audio, tile_y, tile_x),
        HorizFlag::FinalCode => case_pass(level, state, audio, ui, 14 - 1, tile_y, tile_x)?,
    }
    Ok(())
}

/// Hit a wall: undo the X move. A knockback that hits a wall converts into
/// the headache stun.
fn block_x(level: &mut Level, state: &mut SimulationState) {
    level.player.sprite.x -= level.player.sprite.speed_x >> 4;
    level.player.sprite.speed_x = 0;
    if state.hit_timer != 0 && state.fall_flag != 6 {
        state.headache_timer = 20;
        state.hit_timer = 0;
    }
}

/// Converts the carried sprite back into a pool object at its current spot.
/// With no free slot the carried sprite is simply kept.
pub fn force_pose(level: &mut Level, state: &mut SimulationState) -> Option<usize> {
    if !level.player.sprite2.enabled || !state.carrying {
        return None;
    }
    let Some(index) = level
        .objects
        .iter()
        .position(|object| !object.sprite.enabled)
    else {
        debug!("object pool exhausted, carried sprite kept in hand");
        return None;
    };
    let number = level.player.sprite2.number;
    update_object_sprite(&level.assets, &mut level.objects[index], number, true);
    level.player.sprite2.enabled = false;
    let object = &mut level.objects[index];
    object.sprite.killing = false;
    object.sprite.drop_to_bottom = number >= FIRST_ENEMY_SPRITE;
    object.sprite.x = level.player.sprite2.x;
    object.sprite.y = level.player.sprite2.y;
    object.momentum = 0;
    object.sprite.speed_y = 0;
    object.sprite.speed_x = 0;
    object.sprite.spring_load = 0;
    object.sprite.rider = None;
    state.grab_latch = true;
    state.gravity_timer = 4;
    state.carrying = false;
    Some(index)
}

/// Nothing under the player: free fall with air control.
fn free_fall(level: &mut Level, state: &mut SimulationState) {
    state.fall_flag = 6;
    if state.hit_timer != 0 {
        return;
    }
    x_acceleration(&mut level.player, state, MAX_SPEED_X * 16);
    y_acceleration(&mut level.player, MAX_SPEED_Y * 16);
    let sprite_number = if state.headache_timer != 0 {
        SPRITE_HIT_FALL
    } else if !state.carrying {
        SPRITE_FREE_FALL
    } else {
        SPRITE_CARRY_FALL
    };
    update_sprite(&level.assets, &mut level.player.sprite, sprite_number, true);
    level.player.sprite.flipped = state.facing < 0;
}

fn x_acceleration(player: &mut Player, state: &SimulationState, max_speed: i16) {
    let change_x = if state.moving_x {
        ((state.facing as i16) << 4) >> player.slippery
    } else {
        0
    };

    if player.sprite.speed_x + change_x >= max_speed {
        player.sprite.speed_x = max_speed;
    } else if player.sprite.speed_x + change_x <= -max_speed {
        player.sprite.speed_x = -max_speed;
    } else {
        player.sprite.speed_x += change_x;
    }
}

fn y_acceleration(player: &mut Player, max_speed: i16) {
    if player.sprite.speed_y + 16 < max_speed {
        player.sprite.speed_y += 16;
    } else {
        player.sprite.speed_y = max_speed;
    }
}

fn y_acceleration_neg(player: &mut Player, max_speed: i16) {
    let max_speed = -max_speed;
    let mut speed = player.sprite.speed_y - 32;
    if speed >= max_speed {
        speed = max_speed;
    }
    player.sprite.speed_y = speed;
}

fn deceleration(player: &mut Player) {
    let friction = (3 * 4) >> player.slippery;
    let speed = if player.sprite.speed_x < 0 {
        (player.sprite.speed_x + friction).min(0)
    } else {
        (player.sprite.speed_x - friction).max(0)
    };
    player.sprite.speed_x = speed;
}

/// Floor flag dispatch for the tile under the feet.
fn block_yyprg(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    ui: &mut dyn UiGateway,
    floor: FloorFlag,
    floor_above: FloorFlag,
    tile_y: i16,
    tile_x: i16,
) -> Result<(), AbortRequested> {
    match floor {
        FloorFlag::None => fall_through(state),

        FloorFlag::Solid => land(level, state),

        FloorFlag::SemiSlippery => {
            land(level, state);
            level.player.slippery = 1;
        }
        FloorFlag::Slippery => {
            land(level, state);
            level.player.slippery = 2;
        }
        FloorFlag::VerySlippery => {
            land(level, state);
            level.player.slippery = 3;
        }

        FloorFlag::DropThrough => {
            level.player.slippery = 0;
            if state.drop_through_timer == 0 {
                land(level, state);
            } else {
                fall_through(state);
            }
        }

        FloorFlag::Ladder => {
            if state.headache_timer != 0 {
                fall_through(state);
                return Ok(());
            }
            let order = state.last_action & 0x0F;
            if order == ACTION_WALK
                || order == ACTION_CRAWL
                || order == ACTION_GRAB
                || order == ACTION_THROW
            {
                land(level, state);
                return Ok(());
            }
            if order == ACTION_KNEESTAND {
                fall_through(state);
                update_sprite(
                    &level.assets,
                    &mut level.player.sprite,
                    SPRITE_LADDER_SLIDE,
                    true,
                );
                level.player.sprite.y += 8;
            }
            if floor_above != FloorFlag::Ladder {
                if order == ACTION_REST {
                    land(level, state);
                    return Ok(());
                }
                if level.player.y_axis < 0 && order == ACTION_CLIMB {
                    land(level, state);
                    return Ok(());
                }
            }

            sub_to_zero(&mut state.fall_flag);
            state.jump_ticks = 0;
            state.fall_test = 2;
            state.on_ladder = true;
        }

        FloorFlag::Bonus => {
            case_bonus(level, state, audio, tile_y, tile_x);
        }

        FloorFlag::Water | FloorFlag::Fire | FloorFlag::Spikes => {
            if !state.god_mode {
                case_dead_im(level, state);
            } else {
                land(level, state);
            }
        }

        FloorFlag::Code => case_pass(level, state, audio, ui, level.number as u8, tile_y, tile_x)?,
        FloorFlag::Padlock => case_secu(level, state, audio, tile_y, tile_x),
        FloorFlag::FinalCode => case_pass(level, state, audio, ui, 14 - 1, tile_y, tile_x)?,
    }
    Ok(())
}

fn fall_through(state: &mut SimulationState) {
    state.fall_test |= 0x01;
}

/// Solid footing: snap to the tile row and stop falling, unless the player
/// is on the way up.
fn land(level: &mut Level, state: &mut SimulationState) {
    state.grounded = true;
    level.player.slippery = 0;
    if level.player.sprite.speed_y < 0 {
        state.fall_test |= 0x01;
        return;
    }
    level.player.sprite.y &= !0x0F;
    level.player.sprite.speed_y = 0;
    sub_to_zero(&mut state.fall_flag);
    state.jump_ticks = 0;
    state.fall_test = 2;
}

/// Consumes the bonus entry registered at this tile coordinate, if any.
/// Energy tiles (>= 253) also feed the counters. The list entry stays; the
/// tile face swap is what makes this single-shot.
fn case_bonus(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    tile_y: i16,
    tile_x: i16,
) -> bool {
    let Some(index) = level
        .bonuses
        .iter()
        .position(|bonus| bonus.x as i16 == tile_x && bonus.y as i16 == tile_y)
    else {
        return false;
    };
    if level.bonuses[index].bonus_tile >= 255 - 2 {
        level.bonus_collected += 1;
        audio.play_event(AudioEvent::CollectBonus);
        inc_energy(level, state);
    }
    let replace = level.bonuses[index].replace_tile;
    level.grid.set_tile(tile_y, tile_x, replace);
    state.gravity_timer = 4;
    state.tiles_dirty = true;
    true
}

/// Code lamp: open the password screen through the gateway.
fn case_pass(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    ui: &mut dyn UiGateway,
    level_index: u8,
    tile_y: i16,
    tile_x: i16,
) -> Result<(), AbortRequested> {
    audio.play_event(AudioEvent::CollectLamp);
    if case_bonus(level, state, audio, tile_y, tile_x) {
        ui.view_password(level_index)?;
    }
    Ok(())
}

/// Padlock checkpoint: remember where to respawn, and where the cage was.
fn case_secu(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    tile_y: i16,
    tile_x: i16,
) {
    audio.play_event(AudioEvent::CollectWaypoint);
    if case_bonus(level, state, audio, tile_y, tile_x) {
        level.player.init_x = level.player.sprite.x;
        level.player.init_y = level.player.sprite.y;
        if level.player.sprite2.number == OBJ_CAGE_A || level.player.sprite2.number == OBJ_CAGE_B {
            level.player.cage_x = level.player.sprite.x;
            level.player.cage_y = level.player.sprite.y;
        }
    }
}

fn add_carry(state: &SimulationState) -> u8 {
    if state.carrying {
        CARRY_SHIFT
    } else {
        0
    }
}

fn new_form(player: &mut Player, state: &mut SimulationState, action: u8) {
    if state.last_action != action || player.sprite.animation.is_none() {
        state.last_action = action;
        player.sprite.animation = Some(AnimationCursor::new(AnimStream::PlayerAction(action)));
    }
}

fn get_image(assets: &AssetCatalog, player: &mut Player, state: &SimulationState) {
    let Some(mut cursor) = player.sprite.animation else {
        return;
    };
    cursor.jump_back_half_if_negative(assets);
    let frame = cursor.entry(assets);
    update_sprite(assets, &mut player.sprite, frame, true);
    player.sprite.flipped = state.facing < 0;
    cursor.advance();
    player.sprite.animation = Some(cursor);
}

/// Per-action movement handler.
fn action_prg(level: &mut Level, state: &mut SimulationState, audio: &mut dyn AudioSink, action: u8) {
    match action {
        0 | 9 | 16 => {
            // rest: decelerate, slide pose while still moving
            state.last_action = action;
            deceleration(&mut level.player);
            let anim_action = if level.player.sprite.speed_x.abs() >= 16
                && level.player.sprite.flipped == (level.player.sprite.speed_x < 0)
            {
                ACTION_SLIDE + add_carry(state)
            } else {
                action
            };
            let cursor = AnimationCursor::new(AnimStream::PlayerAction(anim_action));
            let frame = cursor.entry(&level.assets);
            level.player.sprite.animation = Some(cursor);
            update_sprite(&level.assets, &mut level.player.sprite, frame, true);
            level.player.sprite.flipped = state.facing < 0;
        }

        1 | 17 | 19 => {
            // walk
            x_acceleration(&mut level.player, state, MAX_SPEED_X * 16);
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
        }

        2 | 18 => {
            // jump: a short upward acceleration burst
            if state.jump_ticks >= 3 {
                state.fall_flag = 6;
            } else {
                state.jump_ticks += 1;
                y_acceleration_neg(&mut level.player, MAX_SPEED_Y * 16 / 4);
                x_acceleration(&mut level.player, state, MAX_SPEED_X * 16);
                new_form(&mut level.player, state, action);
                get_image(&level.assets, &mut level.player, state);
            }
        }

        3 => {
            // crawl
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
            x_acceleration(&mut level.player, state, MAX_SPEED_X * 16 / 2);
            if level.player.sprite.speed_x.abs() < 2 * 16 {
                update_sprite(
                    &level.assets,
                    &mut level.player.sprite,
                    SPRITE_CRAWL_IDLE,
                    true,
                );
                level.player.sprite.flipped = state.facing < 0;
            }
        }

        4 | 14 | 15 | 20 | 25 | 26 => {}

        5 => {
            // kneestand; holding it long enough arms the drop-through
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
            deceleration(&mut level.player);
            if state.action_timer == 15 {
                state.drop_through_timer = 6;
                level.player.sprite.speed_y = 0;
            }
        }

        6 | 22 => {
            // ladder climb
            if state.moving_x {
                x_acceleration(&mut level.player, state, MAX_SPEED_X * 16);
            } else {
                deceleration(&mut level.player);
            }
            if state.action_timer <= 1 {
                let number = if state.carrying {
                    SPRITE_CLIMB_CARRY_A
                } else {
                    SPRITE_CLIMB_TOP
                };
                update_sprite(&level.assets, &mut level.player.sprite, number, true);
            }
            if state.moving_y {
                new_form(&mut level.player, state, ACTION_CLIMB + add_carry(state));
                get_image(&level.assets, &mut level.player, state);
                // center on the ladder column, searching one tile each way
                level.player.sprite.x = (level.player.sprite.x & !0x0F) + 8;
                let tile_x = level.player.sprite.x >> 4;
                let tile_y = (level.player.sprite.y & !0x0F) >> 4;
                if level.grid.floor_flag(tile_y, tile_x) != FloorFlag::Ladder {
                    if level.grid.floor_flag(tile_y, tile_x - 1) == FloorFlag::Ladder {
                        level.player.sprite.x -= 16;
                    } else if level.grid.floor_flag(tile_y, tile_x + 1) == FloorFlag::Ladder {
                        level.player.sprite.x += 16;
                    }
                }
                if level.player.y_axis >= 0 {
                    level.player.sprite.speed_y = 4 * 16;
                } else {
                    level.player.sprite.speed_y = -(4 * 16);
                }
            } else {
                level.player.sprite.speed_y = 0;
            }
        }

        7 | 23 => {
            // grab: set a carried load down, or pick one up
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
            deceleration(&mut level.player);
            if !state.grab_latch {
                if state.action_timer == 1 && state.carrying {
                    // setting the load down inside a floor pushes it out
                    if let Some(index) = force_pose(level, state) {
                        let tile_x = level.objects[index].sprite.x >> 4;
                        let tile_y = level.objects[index].sprite.y >> 4;
                        let fflag = level.grid.floor_flag(tile_y, tile_x);
                        if fflag != FloorFlag::None && fflag != FloorFlag::Water {
                            let fflag = level.grid.floor_flag(tile_y, tile_x + 1);
                            if fflag != FloorFlag::None && fflag != FloorFlag::Water {
                                level.objects[index].sprite.speed_x = 16 * 3;
                            } else {
                                level.objects[index].sprite.speed_x = -(16 * 3);
                            }
                        }
                    }
                } else if !state.carrying {
                    try_pickup_object(level, state, audio);
                    if !state.carrying {
                        try_pickup_enemy(level, state, audio);
                    }
                }
            }
            state.grab_latch = true;
        }

        8 | 24 => {
            // throw, forward or straight up
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
            deceleration(&mut level.player);
            if state.carrying {
                let speed_x;
                let speed_y;
                if level.player.y_axis >= 0 {
                    speed_x = if level.player.sprite.flipped {
                        -(0x0E * 16)
                    } else {
                        0x0E * 16
                    };
                    speed_y = 0;
                    level.player.sprite2.y = level.player.sprite.y - 16;
                } else {
                    speed_x = 0;
                    speed_y = -(0x0A * 16);
                }
                if speed_y != 0 {
                    if let Some(index) = force_pose(level, state) {
                        level.objects[index].sprite.speed_y = speed_y;
                        level.objects[index].sprite.speed_x = speed_x - (speed_x >> 2);
                    }
                } else {
                    let number = level.player.sprite2.number;
                    let gravity_bound =
                        number < FIRST_ENEMY_SPRITE && level.assets.object_kind(number).gravity;
                    if gravity_bound {
                        if let Some(index) = force_pose(level, state) {
                            level.objects[index].sprite.speed_y = speed_y;
                            level.objects[index].sprite.speed_x = speed_x - (speed_x >> 2);
                        }
                    } else {
                        state.throw_in_flight = true;
                        level.player.sprite2.speed_x = speed_x;
                        level.player.sprite2.speed_y = speed_y;
                        audio.play_event(AudioEvent::PlayerThrow);
                    }
                }
                update_sprite(
                    &level.assets,
                    &mut level.player.sprite,
                    SPRITE_FREE_FALL,
                    true,
                );
                level.player.sprite.flipped = state.facing < 0;
                state.carrying = false;
            }
        }

        10 => {
            // silent walk, slightly slower
            x_acceleration(&mut level.player, state, (MAX_SPEED_X - 1) * 16);
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
        }

        11 => {
            // headache stun
            level.player.sprite.speed_x = 0;
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
        }

        12 | 13 | 28 | 29 => {
            // knocked back
            y_acceleration(&mut level.player, MAX_SPEED_Y * 16);
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
        }

        21 => {
            // kneestand while carrying
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
            deceleration(&mut level.player);
        }

        27 => {
            // headache while carrying drops the load first
            force_pose(level, state);
            level.player.sprite.speed_x = 0;
            new_form(&mut level.player, state, action);
            get_image(&level.assets, &mut level.player, state);
        }

        _ => {}
    }
}

fn try_pickup_object(level: &mut Level, state: &mut SimulationState, audio: &mut dyn AudioSink) {
    for index in 0..level.objects.len() {
        let object = &level.objects[index];
        if !object.sprite.enabled
            || (level.player.sprite.y - object.sprite.y).abs() >= PICKUP_REACH
        {
            continue;
        }
        let mut diff_x = level.player.sprite.x - object.sprite.x;
        if !level.player.sprite.flipped {
            diff_x = -diff_x;
        }
        if diff_x >= PICKUP_REACH {
            continue;
        }
        if object.sprite.x > level.player.sprite.x {
            if object.sprite.x > level.player.sprite.x + 32 {
                continue;
            }
        } else if object.sprite.x + (object.sprite.sbox.coll_width as i16) < level.player.sprite.x {
            continue;
        }
        if object.sprite.y < level.player.sprite.y {
            if object.sprite.y <= level.player.sprite.y - 10 {
                continue;
            }
        } else if object.sprite.y - object.sprite.sbox.coll_height as i16 + 1
            >= level.player.sprite.y
        {
            continue;
        }

        audio.play_event(AudioEvent::PlayerPickup);
        state.smoke_timer = 0;
        level.objects[index].sprite.speed_y = 0;
        level.objects[index].sprite.speed_x = 0;
        state.gravity_timer = 4;
        let source = level.objects[index].sprite;
        copy_sprite(&level.assets, &mut level.player.sprite2, &source);
        level.objects[index].sprite.enabled = false;
        state.carrying = true;
        state.impact_timer = 0;
        if level.player.sprite2.number == OBJ_CARPET_FOLDED {
            state.carpet_state = 0;
        }
        level.player.sprite2.y = level.player.sprite.y - 4;
        if level.player.sprite.flipped {
            level.player.sprite2.x = level.player.sprite.x - 10;
        } else {
            level.player.sprite2.x = level.player.sprite.x + 12;
        }
        return;
    }
}

fn try_pickup_enemy(level: &mut Level, state: &mut SimulationState, audio: &mut dyn AudioSink) {
    for index in 0..level.enemies.len() {
        let enemy = &level.enemies[index];
        if !enemy.sprite.enabled || (level.player.sprite.y - enemy.sprite.y).abs() >= PICKUP_REACH {
            continue;
        }
        let mut diff_x = level.player.sprite.x - enemy.sprite.x;
        if !level.player.sprite.flipped {
            diff_x = -diff_x;
        }
        if diff_x >= PICKUP_REACH {
            continue;
        }
        let Some(carry_sprite) = enemy.carry_sprite else {
            continue;
        };
        if enemy.sprite.x > level.player.sprite.x {
            if enemy.sprite.x > level.player.sprite.x + 32 {
                continue;
            }
        } else if enemy.sprite.x + (enemy.sprite.sbox.coll_width as i16) < level.player.sprite.x {
            continue;
        }
        if enemy.sprite.y < level.player.sprite.y {
            if enemy.sprite.y <= level.player.sprite.y - 10 {
                continue;
            }
        } else if enemy.sprite.y - enemy.sprite.sbox.coll_height as i16 - 1 >= level.player.sprite.y
        {
            continue;
        }
        if enemy.sprite.number >= FIRST_ENEMY_SPRITE {
            // only grabbable from behind
            let mut diff_x = level.player.sprite.x - enemy.sprite.x;
            if enemy.sprite.flipped {
                diff_x = -diff_x;
            }
            if diff_x < 0 {
                continue;
            }
        }

        audio.play_event(AudioEvent::PlayerPickupEnemy);
        state.smoke_timer = 0;
        level.enemies[index].sprite.speed_y = 0;
        level.enemies[index].sprite.speed_x = 0;
        state.gravity_timer = 4;
        level.player.sprite2.flipped = level.enemies[index].sprite.flipped;
        level.player.sprite2.flash = level.enemies[index].sprite.flash;
        level.player.sprite2.visible = level.enemies[index].sprite.visible;
        update_sprite(&level.assets, &mut level.player.sprite2, carry_sprite, false);
        level.enemies[index].sprite.enabled = false;
        state.carrying = true;
        state.impact_timer = 0;
        level.player.sprite2.y = level.player.sprite.y - 4;
        if level.player.sprite.flipped {
            level.player.sprite2.x = level.player.sprite.x - 10;
        } else {
            level.player.sprite2.x = level.player.sprite.x + 12;
        }
        return;
    }
}

/// Player versus elevators: ride the first platform under the feet.
fn collision_with_elevators(level: &mut Level, state: &mut SimulationState) {
    if level.player.sprite.speed_y < 0 || state.drop_through_timer != 0 {
        return;
    }
    let player_box = level.assets.sprite_box(SPRITE_REST);
    for index in 0..level.elevators.len() {
        let elevator = &level.elevators[index];
        if !elevator.enabled
            || !elevator.sprite.visible
            || (elevator.sprite.x - level.player.sprite.x).abs() >= 64
            || (elevator.sprite.y - level.player.sprite.y).abs() >= 16
        {
            continue;
        }

        let player_left = level.player.sprite.x - player_box.ref_width as i16;
        if player_left < elevator.sprite.x {
            if player_left + player_box.coll_width as i16 <= elevator.sprite.x {
                continue;
            }
        } else if player_left >= elevator.sprite.x + elevator.sprite.sbox.coll_width as i16 {
            continue;
        }

        if level.player.sprite.y - 6 < elevator.sprite.y {
            if level.player.sprite.y - 6 + 8 <= elevator.sprite.y {
                continue;
            }
        } else if level.player.sprite.y - 6 >= elevator.sprite.y + elevator.sprite.sbox.coll_height as i16
        {
            continue;
        }

        // stepping on a platform cancels an armed drop-through
        if state.action_timer == 14 {
            state.action_timer = 16;
        }

        level.player.sprite.y = elevator.sprite.y;
        level.player.sprite.speed_y = 0;
        sub_to_zero(&mut state.fall_flag);
        state.jump_ticks = 0;
        state.fall_test = 2;

        level.player.sprite.x += elevator.sprite.speed_x;
        if elevator.sprite.speed_y > 0 {
            level.player.sprite.y += elevator.sprite.speed_y;
        }
        return;
    }
}

/// Player versus support objects: land on it, wake carpets and boards,
/// bounce off bouncy ones.
fn collision_with_objects(level: &mut Level, state: &mut SimulationState, audio: &mut dyn AudioSink) {
    if level.player.sprite.speed_y < 0 {
        return;
    }
    let player_box = level.assets.sprite_box(SPRITE_REST);
    let Some(index) = find_support(
        &level.objects,
        level.player.sprite.x,
        level.player.sprite.y,
        player_box,
        None,
    ) else {
        return;
    };

    let object = &mut level.objects[index];
    level.player.sprite.y = object.sprite.y - object.sprite.sbox.coll_height as i16;

    if object.sprite.number == OBJ_SPRING_SMALL || object.sprite.number == OBJ_SPRING_BIG {
        object.sprite.spring_load |= 0x02;
        object.sprite.rider = Some(Rider::Player);
    }

    if object.sprite.number == OBJ_CARPET_FLY_A || object.sprite.number == OBJ_CARPET_FLY_B {
        // stepping on the carpet launches it in the facing direction
        object.sprite.speed_x = if level.player.sprite.flipped {
            -(6 * 16)
        } else {
            6 * 16
        };
        object.sprite.flipped = level.player.sprite.flipped;
        state.gravity_timer = 4;
        state.carpet_state = 0;
    } else if state.action_timer > 10
        && state.last_action & 0x0F == ACTION_REST
        && level.player.sprite.speed_y == 0
        && (object.sprite.number == SPRITE_SCOOTER || object.sprite.number == SPRITE_SKATEBOARD)
    {
        object.sprite.speed_x = if level.player.sprite.flipped {
            -(16 * 3)
        } else {
            16 * 3
        };
        object.sprite.flipped = level.player.sprite.flipped;
        state.gravity_timer = 4;
    }

    if object.sprite.speed_x < 0 {
        level.player.sprite.speed_x = object.sprite.speed_x;
    } else if object.sprite.speed_x > 0 {
        level.player.sprite.speed_x = object.sprite.speed_x + 16;
    }

    if state.drop_through_timer == 0
        && level.player.sprite.speed_y > 16 * 3
        && object.kind.bounce
    {
        // bounce, steered by the vertical axis
        if level.player.y_axis > 0 {
            level.player.sprite.speed_y = 0;
        } else {
            if level.player.y_axis < 0 {
                level.player.sprite.speed_y += 16 * 3;
            } else {
                level.player.sprite.speed_y -= 16;
            }
            level.player.sprite.speed_y = -level.player.sprite.speed_y;
            if level.player.sprite.speed_y > 0 {
                level.player.sprite.speed_y = 0;
            }
        }
        state.action_timer = 0;

        if object.sprite.speed_y == 0 {
            audio.play_event(AudioEvent::BallBounce);
            object.sprite.speed_y = -level.player.sprite.speed_y;
            object.sprite.y -= object.sprite.speed_y >> 4;
            state.gravity_timer = 4;
        }
    } else {
        if object.sprite.speed_y != 0 {
            level.player.sprite.speed_y = object.sprite.speed_y;
        } else {
            level.player.sprite.speed_y = 0;
        }
        sub_to_zero(&mut state.fall_flag);
        state.jump_ticks = 0;
        state.fall_test = 2;
    }
}
