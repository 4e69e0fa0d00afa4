fn up_animation(assets: &AssetCatalog, sprite: &mut Sprite) {
    if let Some(mut cursor) = sprite.animation {
        cursor.seek_next_segment(assets);
        sprite.animation = Some(cursor);
    }
}

fn down_animation(assets: &AssetCatalog, sprite: &mut Sprite) {
    if let Some(mut cursor) = sprite.animation {
        cursor.seek_prev_segment(assets);
        sprite.animation = Some(cursor);
    }
}

/// Walks the enemy's signed-offset stream: resolve the loop point, read the
/// hidden sentinel and the trigger bit, bind the encoded sprite, then step
/// the cursor one entry (with a single loop-back if it lands on a jump).
pub fn advance_enemy_animation(assets: &AssetCatalog, enemy: &mut Enemy) {
    enemy.sprite.invisible = false;
    if enemy.dying & (DYING_FALL | DYING_REMOVE) != 0 {
        enemy.sprite.visible = false;
        enemy.visible = true;
        return;
    }
    enemy.trigger = false;
    let Some(mut cursor) = enemy.sprite.animation else {
        return;
    };
    cursor.rewind_while_negative(assets);
    if cursor.entry(assets) == ANIM_HIDDEN_SENTINEL {
        // hidden this frame; the stored cursor deliberately stays put
        enemy.sprite.invisible = true;
        return;
    }
    enemy.trigger = (cursor.entry(assets) & ANIM_TRIGGER_BIT) != 0;
    let number = (cursor.entry(assets) & 0x00FF) + FIRST_ENEMY_SPRITE;
    update_enemy_sprite(assets, enemy, number, true);
    enemy.sprite.flipped = enemy.sprite.speed_x < 0;
    cursor.advance();
    cursor.jump_if_negative(assets);
    enemy.sprite.animation = Some(cursor);
    enemy.visible = true;
}

/// Death movement. With a dead sprite the enemy swaps to it and goes inert;
/// otherwise it plays the falling-dead arc, dragging the impact sprite with
/// it while that effect is alive.
fn fall_dead(level: &mut Level, state: &mut SimulationState, index: usize) {
    if level.enemies[index].dying & DYING_FALL != 0 || level.enemies[index].dead_sprite.is_none() {
        let enemy = &mut level.enemies[index];
        if enemy.dying & DYING_FALL == 0 {
            enemy.dying |= DYING_FALL;
            enemy.sprite.speed_y = -10;
            enemy.phase = 0;
        }
        if enemy.phase != 0xFF {
            let dy = enemy.sprite.speed_y;
            enemy.sprite.y += dy;
            if enemy.sprite.speed_y < MAX_DEAD_FALL_SPEED {
                enemy.sprite.speed_y += 1;
            }
            if state.impact_timer != 0 {
                level.player.sprite2.y += dy;
            }
        }
    } else {
        let dead_sprite = level.enemies[index].dead_sprite.unwrap_or(0);
        level.enemies[index].dying |= DYING_FALL;
        update_enemy_sprite(&level.assets, &mut level.enemies[index], dead_sprite, false);
        let enemy = &mut level.enemies[index];
        enemy.sprite.flash = false;
        enemy.sprite.visible = false;
        enemy.sprite.speed_y = 0;
        enemy.phase = 0xFF;
    }
}

/// Returns true when the enemy is dying and its special movement consumed
/// the tick.
fn dying_consumes_tick(level: &mut Level, state: &mut SimulationState, index: usize) -> bool {
    if level.enemies[index].dying != 0 {
        fall_dead(level, state, index);
        true
    } else {
        false
    }
}

/// Per-enemy behavior dispatch, one pass per enabled slot per tick.
pub fn move_enemies(level: &mut Level, state: &mut SimulationState, camera: &Camera) {
    for index in 0..level.enemies.len() {
        if !level.enemies[index].sprite.enabled {
            continue;
        }
        match level.enemies[index].behavior {
            EnemyBehavior::Patrol => patrol(level, state, index),
            EnemyBehavior::StationaryShooter => stationary_shooter(level, state, index),
            EnemyBehavior::Leap => leap(level, state, index),
            EnemyBehavior::Hover => hover(level, state, index),
            EnemyBehavior::StalkAndStrike => stalk_and_strike(level, state, camera, index),
            EnemyBehavior::RoamWhenHidden { immortal } => {
                roam_when_hidden(level, state, camera, index, immortal)
            }
            EnemyBehavior::PopUp => pop_up(level, state, camera, index),
            EnemyBehavior::AlertThenCharge => alert_then_charge(level, state, camera, index),
            EnemyBehavior::WalkAndShoot => walk_and_shoot(level, state, camera, index),
            EnemyBehavior::BouncingFireball => bouncing_fireball(level, index),
            EnemyBehavior::ArcBounce => arc_bounce(level, state, index),
            EnemyBehavior::Passive { immortal } => {
                if immortal {
                    level.enemies[index].dying = 0;
                } else if level.enemies[index].dying != 0 {
                    fall_dead(level, state, index);
                }
            }
            EnemyBehavior::TimedDrop => timed_drop(level, state, index),
            EnemyBehavior::AreaGuard => area_guard(level, state, index),
        }
    }
}

/// Reverses the patrol direction once the sprite strays past range_x.
fn patrol_step(enemy: &mut Enemy) {
    enemy.sprite.x -= enemy.sprite.speed_x;
    if (enemy.sprite.x - enemy.center_x).abs() > enemy.range_x {
        if enemy.sprite.x >= enemy.center_x {
            enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
        } else {
            enemy.sprite.speed_x = -enemy.sprite.speed_x.abs();
        }
    }
}

fn patrol(level: &mut Level, state: &mut SimulationState, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    patrol_step(&mut level.enemies[index]);
}

fn stationary_shooter(level: &mut Level, state: &mut SimulationState, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let enemy = &mut level.enemies[index];
    if !enemy.visible {
        return;
    }
    // speed_x only carries the facing here: negative flips toward the player
    if enemy.direction == 0 {
        enemy.sprite.speed_x = 0;
        if enemy.sprite.x < player_x {
            enemy.sprite.speed_x = -1;
        }
    } else if enemy.direction == 2 {
        enemy.sprite.speed_x = -1;
    } else {
        enemy.sprite.speed_x = 0;
    }
    if enemy.phase == 0 {
        // scanning the horizon
        sub_to_zero(&mut enemy.counter);
        if enemy.counter != 0 {
            return;
        }
        if (player_y - enemy.sprite.y).abs() > 24 {
            return;
        }
        if enemy.range_x < (player_x - enemy.sprite.x).abs() {
            return;
        }
        if enemy.direction != 0 {
            if enemy.direction == 2 {
                if enemy.sprite.x > player_x {
                    return;
                }
            } else if player_x > enemy.sprite.x {
                return;
            }
        }
        enemy.phase = 30;
        up_animation(&level.assets, &mut level.enemies[index].sprite);
    } else {
        enemy.phase -= 1;
        if !enemy.trigger {
            return;
        }
        if let Some(mut cursor) = enemy.sprite.animation {
            cursor.index = cursor.index.saturating_add(2);
            enemy.sprite.animation = Some(cursor);
        }
        let delay = enemy.delay;
        if let Some(trash_index) = find_trash(&level.trash) {
            put_bullet(level, index, trash_index);
            level.enemies[index].counter = delay as u8;
        }
        level.enemies[index].phase = 0;
    }
}

fn leap(level: &mut Level, state: &mut SimulationState, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let assets = &level.assets;
    let enemy = &mut level.enemies[index];
    match enemy.phase {
        0 => {
            patrol_step(enemy);
            if !enemy.visible {
                return;
            }
            if enemy.sprite.y < player_y || enemy.sprite.y >= player_y + 256 {
                return;
            }
            if enemy.range_y < enemy.sprite.y - player_y {
                return;
            }
            // only leap when facing the player
            if enemy.sprite.x > player_x {
                if enemy.sprite.flipped {
                    return;
                }
            } else if !enemy.sprite.flipped {
                return;
            }
            if (enemy.sprite.x - player_x).abs() >= 48 {
                return;
            }
            if (player_x - enemy.center_x).abs() > enemy.range_x {
                return;
            }
            enemy.phase = 1;
            // smallest launch speed whose arc reaches the player's height
            enemy.sprite.speed_y = 0;
            let mut climb = 0;
            loop {
                enemy.sprite.speed_y += 1;
                climb += enemy.sprite.speed_y;
                if enemy.sprite.y - player_y <= climb {
                    break;
                }
            }
            enemy.sprite.speed_y = -enemy.sprite.speed_y;
            enemy.delay = enemy.sprite.y;
            up_animation(assets, &mut enemy.sprite);
        }
        1 => {
            if !enemy.visible {
                return;
            }
            enemy.sprite.x -= enemy.sprite.speed_x << 2;
            enemy.sprite.y += enemy.sprite.speed_y;
            if enemy.sprite.speed_y + 1 < 0 {
                enemy.sprite.speed_y += 1;
                if enemy.sprite.y > enemy.delay - enemy.range_y {
                    return;
                }
            }
            up_animation(assets, &mut enemy.sprite);
            enemy.phase = 2;
            enemy.sprite.speed_y = 0;
            if enemy.sprite.x <= enemy.center_x {
                enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
            } else {
                enemy.sprite.speed_x = -enemy.sprite.speed_x.abs();
            }
        }
        _ => {
            if !enemy.visible {
                return;
            }
            enemy.sprite.x -= enemy.sprite.speed_x;
            enemy.sprite.y += enemy.sprite.speed_y;
            enemy.sprite.speed_y += 1;
            if enemy.sprite.y < enemy.delay {
                return;
            }
            enemy.sprite.y = enemy.delay;
            enemy.sprite.x -= enemy.sprite.speed_x;
            enemy.phase = 0;
            down_animation(assets, &mut enemy.sprite);
            down_animation(assets, &mut enemy.sprite);
        }
    }
}

fn hover(level: &mut Level, state: &mut SimulationState, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let assets = &level.assets;
    let enemy = &mut level.enemies[index];
    patrol_step(enemy);
    if !enemy.visible {
        return;
    }
    match enemy.phase {
        0 => {
            if (enemy.sprite.y - player_y).abs() > enemy.range_y {
                return;
            }
            if (enemy.sprite.x - player_x).abs() > 40 {
                return;
            }
            enemy.delay = enemy.sprite.y;
            enemy.sprite.speed_y = if enemy.sprite.y < player_y { 2 } else { -2 };
            enemy.phase = 1;
            up_animation(assets, &mut enemy.sprite);
        }
        1 => {
            // dive
            enemy.sprite.y += enemy.sprite.speed_y;
            if (enemy.sprite.y as i32 - enemy.delay as i32).abs() < enemy.range_y as i32 {
                return;
            }
            enemy.sprite.speed_y = -enemy.sprite.speed_y;
            up_animation(assets, &mut enemy.sprite);
            enemy.phase = 2;
        }
        _ => {
            // back up to resting height
            enemy.sprite.y += enemy.sprite.speed_y;
            if enemy.sprite.y != enemy.delay {
                return;
            }
            down_animation(assets, &mut enemy.sprite);
            down_animation(assets, &mut enemy.sprite);
            enemy.phase = 0;
        }
    }
}

/// Shared gravity walk for the stalkers: fall to the floor, steer toward
/// the player on landing, reverse off walls and the level edge. Returns
/// true while still falling.
fn gravity_walk_step(grid: &TileGrid, player_x: i16, enemy: &mut Enemy) -> bool {
    if grid.floor_flag(enemy.sprite.y >> 4, enemy.sprite.x >> 4) == FloorFlag::None {
        if enemy.sprite.speed_y < 16 {
            enemy.sprite.speed_y += 1;
        }
        enemy.sprite.y += enemy.sprite.speed_y;
        return true;
    }
    if enemy.sprite.speed_y != 0 {
        if enemy.sprite.x > player_x {
            enemy.sprite.speed_x = enemy.walk_speed;
        } else {
            enemy.sprite.speed_x = -enemy.walk_speed;
        }
    }
    enemy.sprite.speed_y = 0;
    enemy.sprite.y &= !0x0F;
    let probe = if enemy.sprite.speed_x > 0 { -1 } else { 1 };
    let hflag = grid.horiz_flag((enemy.sprite.y >> 4) - 1, (enemy.sprite.x >> 4) + probe);
    if hflag.blocks() {
        enemy.sprite.speed_x = -enemy.sprite.speed_x;
    }
    enemy.sprite.x -= enemy.sprite.speed_x;
    if enemy.sprite.x < 0 {
        enemy.sprite.speed_x = -enemy.sprite.speed_x;
        enemy.sprite.x -= enemy.sprite.speed_x;
    }
    false
}

fn steer_toward_player(enemy: &mut Enemy, player_x: i16) {
    if enemy.sprite.x > player_x {
        enemy.sprite.speed_x = enemy.walk_speed;
    } else {
        enemy.sprite.speed_x = -enemy.walk_speed;
    }
}

/// The spawn window test gating respawns, in screen tiles from the camera
/// origin; Y is an inclusive bound, X an exclusive one (they differ per
/// behavior).
fn spawn_point_on_screen(enemy: &Enemy, camera: &Camera, window_y: i16, window_x: i16) -> bool {
    let spawn_tile_y = (enemy.init.y >> 4) - camera.tile_y;
    let spawn_tile_x = (enemy.init.x >> 4) - camera.tile_x;
    spawn_tile_y <= window_y && spawn_tile_y >= 0 && spawn_tile_x < window_x && spawn_tile_x >= 0
}

fn stalk_and_strike(level: &mut Level, state: &mut SimulationState, camera: &Camera, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let enemy = &mut level.enemies[index];
    match enemy.phase {
        0 => {
            if enemy.sprite.y > player_y {
                return;
            }
            if enemy.range_x < (enemy.sprite.x - player_x).abs() {
                return;
            }
            if (enemy.sprite.y - player_y).abs() > 200 {
                return;
            }
            enemy.phase = 1;
            up_animation(&level.assets, &mut level.enemies[index].sprite);
            steer_toward_player(&mut level.enemies[index], player_x);
        }
        1 => {
            if gravity_walk_step(&level.grid, player_x, enemy) {
                return;
            }
            if (player_x - enemy.sprite.x).abs() > 320 * 2 {
                enemy.phase = 2;
                return;
            }
            if (player_y - enemy.sprite.y).abs() >= 200 * 2 {
                enemy.phase = 2;
                return;
            }
            if (player_x - enemy.sprite.x).abs() > enemy.sprite.sbox.width as i16 + 6 {
                return;
            }
            if (player_y - enemy.sprite.y).abs() > 8 {
                return;
            }
            enemy.phase = 3;
            up_animation(&level.assets, &mut level.enemies[index].sprite);
        }
        2 => {
            if spawn_point_on_screen(enemy, camera, 13, 21) {
                return;
            }
            enemy.sprite.y = enemy.init.y;
            enemy.sprite.x = enemy.init.x;
            enemy.phase = 0;
            down_animation(&level.assets, &mut level.enemies[index].sprite);
        }
        _ => {
            // striking; keep walking underneath the swing
            if enemy.trigger {
                enemy.phase = 1;
                return;
            }
            if gravity_walk_step(&level.grid, player_x, enemy) {
                return;
            }
            if (player_x - enemy.sprite.x).abs() > 320 * 2 {
                enemy.phase = 2;
                return;
            }
            if (player_y - enemy.sprite.y).abs() >= 200 * 2 {
                enemy.phase = 2;
            }
        }
    }
}

fn roam_when_hidden(
    level: &mut Level,
    state: &mut SimulationState,
    camera: &Camera,
    index: usize,
    immortal: bool,
) {
    if immortal {
        level.enemies[index].dying = 0;
    } else if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let enemy = &mut level.enemies[index];
    match enemy.phase {
        0 => {
            if (enemy.sprite.x - player_x).abs() > 340 || (enemy.sprite.y - player_y).abs() >= 230 {
                enemy.phase = 1;
                up_animation(&level.assets, &mut level.enemies[index].sprite);
                steer_toward_player(&mut level.enemies[index], player_x);
            }
        }
        1 => {
            if gravity_walk_step(&level.grid, player_x, enemy) {
                return;
            }
            if (player_x - enemy.sprite.x).abs() < 320 * 2 {
                return;
            }
            enemy.phase = 2;
        }
        _ => {
            if spawn_point_on_screen(enemy, camera, 11, 19) {
                return;
            }
            enemy.sprite.y = enemy.init.y;
            enemy.sprite.x = enemy.init.x;
            enemy.phase = 0;
            down_animation(&level.assets, &mut level.enemies[index].sprite);
        }
    }
}

fn pop_up(level: &mut Level, state: &mut SimulationState, camera: &Camera, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    match level.enemies[index].phase {
        0 => {
            let enemy = &level.enemies[index];
            if enemy.range_x < (player_x - enemy.sprite.x).abs() {
                return;
            }
            if (player_y - enemy.sprite.y).abs() > 60 {
                return;
            }
            level.enemies[index].phase = 1;
            up_animation(&level.assets, &mut level.enemies[index].sprite);
            steer_toward_player(&mut level.enemies[index], player_x);
        }
        1 => {
            state.popup_cycle = state.popup_cycle.wrapping_add(1);
            if (state.popup_cycle & 0x04) == 0 && (state.frame_counter & 0x01FF) == 0 {
                up_animation(&level.assets, &mut level.enemies[index].sprite);
            }
            if (state.frame_counter & 0x007F) == 0 {
                level.enemies[index].phase = 3;
                up_animation(&level.assets, &mut level.enemies[index].sprite);
                pop_up_head(level, index, player_x);
                return;
            }
            let enemy = &mut level.enemies[index];
            if level.grid.floor_flag(enemy.sprite.y >> 4, enemy.sprite.x >> 4) == FloorFlag::None {
                enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
                if enemy.init.x > enemy.sprite.x {
                    enemy.sprite.speed_x = -enemy.sprite.speed_x;
                }
            }
            enemy.sprite.y &= !0x0F;
            let probe = if enemy.sprite.speed_x > 0 { -1 } else { 1 };
            let hflag = level
                .grid
                .horiz_flag((enemy.sprite.y >> 4) - 1, (enemy.sprite.x >> 4) + probe);
            if hflag.blocks() {
                enemy.sprite.speed_x = -enemy.sprite.speed_x;
            }
            enemy.sprite.x -= enemy.sprite.speed_x;
            if enemy.sprite.x < 0 {
                enemy.sprite.speed_x = -enemy.sprite.speed_x;
                enemy.sprite.x -= enemy.sprite.speed_x;
            }
            if (player_x - enemy.sprite.x).abs() < 320 * 4 {
                return;
            }
            enemy.phase = 2;
        }
        2 => {
            if spawn_point_on_screen(&level.enemies[index], camera, 12, 25) {
                return;
            }
            let enemy = &mut level.enemies[index];
            enemy.sprite.y = enemy.init.y;
            enemy.sprite.x = enemy.init.x;
            enemy.phase = 0;
            down_animation(&level.assets, &mut level.enemies[index].sprite);
        }
        _ => pop_up_head(level, index, player_x),
    }
}

/// Withdraw the raised head: off screen it snaps back through the stream,
/// on screen it waits for the trigger frame.
fn pop_up_head(level: &mut Level, index: usize, player_x: i16) {
    if !level.enemies[index].visible {
        up_animation(&level.assets, &mut level.enemies[index].sprite);
        if let Some(mut cursor) = level.enemies[index].sprite.animation {
            cursor.step_back();
            level.enemies[index].sprite.animation = Some(cursor);
        }
        advance_enemy_animation(&level.assets, &mut level.enemies[index]);
        steer_toward_player(&mut level.enemies[index], player_x);
        level.enemies[index].phase = 1;
    } else if level.enemies[index].trigger {
        steer_toward_player(&mut level.enemies[index], player_x);
        level.enemies[index].phase = 1;
    }
}

fn alert_then_charge(level: &mut Level, state: &mut SimulationState, camera: &Camera, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let phase = level.enemies[index].phase;
    match phase {
        0 | 1 => {
            if phase == 0 {
                // the activation tick falls straight through into the alert
                if state.stealth_timer != 0 {
                    return;
                }
                let enemy = &level.enemies[index];
                if enemy.range_x < (player_x - enemy.sprite.x).abs() {
                    return;
                }
                if (player_y - enemy.sprite.y).abs() > 26 {
                    return;
                }
                level.enemies[index].phase = 1;
                up_animation(&level.assets, &mut level.enemies[index].sprite);
                steer_toward_player(&mut level.enemies[index], player_x);
            }
            if state.stealth_timer != 0 {
                return;
            }
            let enemy = &level.enemies[index];
            if enemy.range_x < (player_x - enemy.sprite.x).abs() {
                down_animation(&level.assets, &mut level.enemies[index].sprite);
                level.enemies[index].phase = 0;
                return;
            }
            if enemy.range_x - 50 >= (player_x - enemy.sprite.x).abs()
                && (player_y - enemy.sprite.y).abs() <= 60
            {
                level.enemies[index].phase = 2;
                up_animation(&level.assets, &mut level.enemies[index].sprite);
            }
        }
        2 => {
            let enemy = &mut level.enemies[index];
            if level.grid.floor_flag(enemy.sprite.y >> 4, enemy.sprite.x >> 4) == FloorFlag::None {
                enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
                if enemy.init.x > enemy.sprite.x {
                    enemy.sprite.speed_x = -enemy.sprite.speed_x;
                }
            }
            enemy.sprite.y &= !0x0F;
            let probe = if enemy.sprite.speed_x > 0 { -1 } else { 1 };
            let hflag = level
                .grid
                .horiz_flag((enemy.sprite.y >> 4) - 1, (enemy.sprite.x >> 4) + probe);
            if hflag.blocks() {
                // charging off a wall turns back toward the post
                enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
                if enemy.init.x > enemy.sprite.x {
                    enemy.sprite.speed_x = -enemy.sprite.speed_x;
                }
            }
            enemy.sprite.x -= enemy.sprite.speed_x;
            if enemy.sprite.x < 0 {
                enemy.sprite.speed_x = -enemy.sprite.speed_x;
                enemy.sprite.x -= enemy.sprite.speed_x;
            }
            if (player_x - enemy.sprite.x).abs() >= 320 * 2 {
                enemy.phase = 3;
            }
        }
        _ => {
            if spawn_point_on_screen(&level.enemies[index], camera, 13, 21) {
                return;
            }
            let enemy = &mut level.enemies[index];
            enemy.sprite.y = enemy.init.y;
            enemy.sprite.x = enemy.init.x;
            down_animation(&level.assets, &mut level.enemies[index].sprite);
            down_animation(&level.assets, &mut level.enemies[index].sprite);
            level.enemies[index].phase = 0;
        }
    }
}

fn walk_and_shoot(level: &mut Level, state: &mut SimulationState, camera: &Camera, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    match level.enemies[index].phase {
        0 => {
            let enemy = &level.enemies[index];
            if enemy.range_x < (player_x - enemy.sprite.x).abs() {
                return;
            }
            if (player_y - enemy.sprite.y).abs() > 26 {
                return;
            }
            level.enemies[index].phase = 1;
            up_animation(&level.assets, &mut level.enemies[index].sprite);
            steer_toward_player(&mut level.enemies[index], player_x);
        }
        1 => {
            let enemy = &mut level.enemies[index];
            if level.grid.floor_flag(enemy.sprite.y >> 4, enemy.sprite.x >> 4) == FloorFlag::None {
                enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
                if enemy.init.x > enemy.sprite.x {
                    enemy.sprite.speed_x = -enemy.sprite.speed_x;
                }
            }
            enemy.sprite.y &= !0x0F;
            let hflag = level
                .grid
                .horiz_flag((enemy.sprite.y >> 4) - 1, enemy.sprite.x >> 4);
            if hflag.blocks() {
                enemy.sprite.speed_x = -enemy.sprite.speed_x;
            }
            enemy.sprite.x -= enemy.sprite.speed_x;
            if enemy.sprite.x < 0 {
                enemy.sprite.speed_x = -enemy.sprite.speed_x;
                enemy.sprite.x -= enemy.sprite.speed_x;
            }
            if (player_x - enemy.sprite.x).abs() >= 320 * 2 {
                enemy.phase = 2;
            }
            sub_to_zero(&mut enemy.counter);
            if enemy.counter != 0 {
                return;
            }
            if (player_x - enemy.sprite.x).abs() > 64 {
                return;
            }
            if (player_y - enemy.sprite.y).abs() > 20 {
                return;
            }
            steer_toward_player(enemy, player_x);
            enemy.phase = 3;
            up_animation(&level.assets, &mut level.enemies[index].sprite);
            level.enemies[index].counter = 20;
        }
        2 => {
            if !spawn_point_on_screen(&level.enemies[index], camera, 13, 21) {
                let enemy = &mut level.enemies[index];
                enemy.sprite.x = enemy.init.x;
                enemy.sprite.y = enemy.init.y;
                down_animation(&level.assets, &mut level.enemies[index].sprite);
                level.enemies[index].phase = 0;
            }
        }
        _ => {
            if !level.enemies[index].trigger {
                return;
            }
            if let Some(trash_index) = find_trash(&level.trash) {
                if let Some(mut cursor) = level.enemies[index].sprite.animation {
                    cursor.index = cursor.index.saturating_add(2);
                    level.enemies[index].sprite.animation = Some(cursor);
                }
                put_bullet(level, index, trash_index);
            }
            down_animation(&level.assets, &mut level.enemies[index].sprite);
            level.enemies[index].phase = 1;
        }
    }
}

fn bouncing_fireball(level: &mut Level, index: usize) {
    level.enemies[index].dying = 0; // immortal
    match level.enemies[index].phase {
        0 => {
            up_animation(&level.assets, &mut level.enemies[index].sprite);
            let enemy = &mut level.enemies[index];
            enemy.sprite.speed_y = enemy.range_y;
            enemy.init.y = enemy.sprite.y;
            enemy.phase = 1;
        }
        1 => {
            let enemy = &mut level.enemies[index];
            enemy.sprite.y -= enemy.sprite.speed_y;
            enemy.sprite.speed_y -= 1;
            if enemy.sprite.speed_y == 0 {
                enemy.phase = 2;
            }
        }
        2 => {
            let enemy = &mut level.enemies[index];
            enemy.sprite.y += enemy.sprite.speed_y;
            enemy.sprite.speed_y += 1;
            if enemy.sprite.y >= enemy.init.y {
                enemy.sprite.y = enemy.init.y;
                enemy.counter = enemy.delay as u8;
                enemy.phase = 3;
                down_animation(&level.assets, &mut level.enemies[index].sprite);
            }
        }
        _ => {
            let enemy = &mut level.enemies[index];
            enemy.counter = enemy.counter.wrapping_sub(1);
            if enemy.counter == 0 {
                enemy.phase = 0;
            }
        }
    }
}

fn arc_bounce(level: &mut Level, state: &mut SimulationState, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let assets = &level.assets;
    let enemy = &mut level.enemies[index];
    match enemy.phase {
        0 => {
            if player_x >= enemy.sprite.x {
                enemy.sprite.speed_x = -enemy.sprite.speed_x.abs();
            } else {
                enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
            }
            if (player_x - enemy.sprite.x).abs() <= enemy.range_x
                && (player_y - enemy.sprite.y).abs() <= 40
            {
                up_animation(assets, &mut enemy.sprite);
                enemy.phase = 1;
                enemy.sprite.speed_y = 10;
            }
        }
        1 => {
            enemy.sprite.x -= enemy.sprite.speed_x;
            enemy.sprite.y -= enemy.sprite.speed_y;
            enemy.sprite.speed_y -= 1;
            if enemy.sprite.speed_y == 0 {
                up_animation(assets, &mut enemy.sprite);
                enemy.phase = 2;
            }
        }
        2 => {
            enemy.sprite.x -= enemy.sprite.speed_x;
            enemy.sprite.y += enemy.sprite.speed_y;
            enemy.sprite.speed_y += 1;
            if enemy.sprite.speed_y > 10 {
                enemy.phase = 3;
                up_animation(assets, &mut enemy.sprite);
                enemy.counter = enemy.delay as u8;
            }
        }
        _ => {
            enemy.counter = enemy.counter.wrapping_sub(1);
            if enemy.counter == 0 {
                down_animation(assets, &mut enemy.sprite);
                down_animation(assets, &mut enemy.sprite);
                down_animation(assets, &mut enemy.sprite);
                enemy.phase = 0;
            }
        }
    }
}

fn timed_drop(level: &mut Level, state: &mut SimulationState, index: usize) {
    level.enemies[index].dying = 0; // immortal
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    {
        let enemy = &mut level.enemies[index];
        if (enemy.counter as i16) + 1 < enemy.delay {
            enemy.counter = enemy.counter.wrapping_add(1);
            return;
        }
        if enemy.range_x < (enemy.sprite.x - player_x).abs() {
            enemy.counter = 0;
            return;
        }
        if enemy.range_y < player_y - enemy.sprite.y {
            return;
        }
    }
    // attack: spawn a falling object from the first free slot past 0
    let Some(slot) = (1..level.objects.len()).find(|slot| !level.objects[*slot].sprite.enabled)
    else {
        level.enemies[index].counter = 0;
        debug!("object pool exhausted, drop attack skipped");
        return;
    };
    up_animation(&level.assets, &mut level.enemies[index].sprite);
    let number = level.enemies[index]
        .sprite
        .animation
        .map(|cursor| cursor.entry(&level.assets) & 0x1FFF)
        .unwrap_or(FIRST_OBJECT_SPRITE);
    let (enemy_x, enemy_y) = {
        let sprite = &level.enemies[index].sprite;
        (sprite.x, sprite.y)
    };
    update_object_sprite(&level.assets, &mut level.objects[slot], number, true);
    let object = &mut level.objects[slot];
    object.sprite.flipped = true;
    object.sprite.x = enemy_x;
    object.sprite.y = enemy_y;
    object.sprite.drop_to_bottom = true;
    object.sprite.killing = true;
    object.sprite.speed_y = 0;
    state.gravity_timer = 4;
    down_animation(&level.assets, &mut level.enemies[index].sprite);
    level.enemies[index].counter = 0;
}

fn area_guard(level: &mut Level, state: &mut SimulationState, index: usize) {
    if dying_consumes_tick(level, state, index) {
        return;
    }
    let player_x = level.player.sprite.x;
    let player_y = level.player.sprite.y;
    let enemy = &mut level.enemies[index];
    let outside = player_x < enemy.init.x - enemy.range_x
        || player_x > enemy.init.x + enemy.range_x
        || player_y < enemy.init.y - enemy.range_y
        || player_y > enemy.init.y + enemy.range_y;
    let (target_x, target_y) = if outside {
        (enemy.init.x, enemy.init.y)
    } else {
        (player_x, player_y)
    };
    if target_x != enemy.sprite.x {
        enemy.sprite.speed_x = enemy.sprite.speed_x.abs();
        if target_x > enemy.sprite.x {
            enemy.sprite.speed_x = -enemy.sprite.speed_x;
        }
        enemy.sprite.x -= enemy.sprite.speed_x;
    }
    if target_y != enemy.sprite.y {
        if target_y > enemy.sprite.y {
            enemy.sprite.y += enemy.sprite.speed_y;
        } else {
            enemy.sprite.y -= enemy.sprite.speed_y;
        }
    }
}

/// Per-tick enemy resolution: visibility against the camera window,
/// animation, then collisions with the player, moving objects and the
/// thrown sprite, including the boss hit accounting.
pub fn resolve_enemy_collisions(
    level: &mut Level,
    state: &mut SimulationState,
    camera: &Camera,
    audio: &mut dyn AudioSink,
) {
    for index in 0..level.enemies.len() {
        if !level.enemies[index].sprite.enabled {
            continue;
        }
        level.enemies[index].visible = false;
        let sprite = level.enemies[index].sprite;
        let off_screen = sprite.x + 32 < (camera.tile_x << 4)
            || sprite.x - 32 > (camera.tile_x << 4) + SCREEN_WIDTH_TILES * 16
            || sprite.y < (camera.tile_y << 4)
            || sprite.y - 32 > (camera.tile_y << 4) + SCREEN_HEIGHT_TILES * 16;
        if off_screen {
            if level.enemies[index].dying & (DYING_FALL | DYING_REMOVE) != 0 {
                // dying enemies disappear for good once off screen
                level.enemies[index].sprite.enabled = false;
            }
            continue;
        }
        level.enemies[index].visible = true;
        advance_enemy_animation(&level.assets, &mut level.enemies[index]);
        if level.enemies[index].dying & (DYING_FALL | DYING_REMOVE) != 0 {
            continue;
        }
        if state.hit_timer == 0 && !state.god_mode {
            if level.enemies[index].sprite.invisible {
                continue;
            }
            enemy_touch_player(level, state, audio, index);
        }

        // collision with a moving object
        let mut hit = 0u8;
        let mut hit_object = None;
        if state.gravity_timer != 0 {
            for object_index in 0..level.objects.len() {
                let object = &level.objects[object_index];
                if object.sprite.speed_x == 0 {
                    if object.sprite.speed_y == 0 {
                        continue;
                    }
                    if object.momentum < SHOCK_MOMENTUM_THRESHOLD {
                        continue;
                    }
                }
                if object.kind.no_damage {
                    continue;
                }
                if sprites_overlap(&level.enemies[index].sprite, &object.sprite) {
                    hit = 1;
                    hit_object = Some(object_index);
                    break;
                }
            }
        }
        if hit == 0
            && state.throw_in_flight
            && !state.carrying
            && level.player.sprite2.enabled
            && sprites_overlap(&level.enemies[index].sprite, &level.player.sprite2)
        {
            state.invulnerability_timer = 0;
            level.player.sprite2.enabled = false;
            see_choc(level, state);
            hit = 2;
        }
        if hit != 0 {
            if hit == 1 {
                if let Some(object_index) = hit_object {
                    // the impact reverses the object, except the iron ball
                    if level.objects[object_index].sprite.number != SPRITE_IRON_BALL {
                        level.objects[object_index].sprite.speed_x =
                            -level.objects[object_index].sprite.speed_x;
                    }
                }
            }
            audio.play_event(AudioEvent::HitEnemy);
            state.throw_in_flight = false;
            if level.enemies[index].boss {
                if state.invulnerability_timer != 0 {
                    continue;
                }
                state.invulnerability_timer = BOSS_INVULNERABLE_TICKS;
                level.enemies[index].sprite.flash = true;
                state.boss_lives = state.boss_lives.saturating_sub(1);
                if state.boss_lives != 0 {
                    continue;
                }
                state.boss_alive = false;
                info!(level = level.number, "boss_defeated");
            }
            level.enemies[index].dying |= DYING_REMOVE;
        }
    }
}

/// Contact between a live enemy and the player: knock the player back with
/// the enemy's power, flip the enemy, mark fireball burns.
fn enemy_touch_player(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    index: usize,
) {
    match level.enemies[index].behavior {
        EnemyBehavior::Passive { .. } | EnemyBehavior::TimedDrop => return,
        _ => {}
    }
    if !sprites_overlap(&level.enemies[index].sprite, &level.player.sprite) {
        return;
    }
    let enemy = &mut level.enemies[index];
    if enemy.behavior != EnemyBehavior::WalkAndShoot
        && enemy.sprite.number != SPRITE_PERISCOPE_HEAD
    {
        enemy.sprite.speed_x = -enemy.sprite.speed_x;
    }
    if (FIREBALL_SPRITE_FIRST..=FIREBALL_SPRITE_LAST).contains(&enemy.sprite.number) {
        state.burning = true;
    }
    let power = enemy.power;
    let enemy_x = enemy.sprite.x;
    if power != 0 {
        kick_ash(level, state, audio, enemy_x, power);
    }
}

/// Knockback from any hostile contact: two points of energy, hit stun, and
/// the carried load set down.
fn kick_ash(
    level: &mut Level,
    state: &mut SimulationState,
    audio: &mut dyn AudioSink,
    source_x: i16,
    power: i16,
) {
    audio.play_event(AudioEvent::HitPlayer);
    dec_energy(level, state);
    dec_energy(level, state);
    state.hit_timer = 24;
    state.headache_timer = 0;
    state.last_action = 0;
    level.player.sprite.speed_x = power;
    if level.player.sprite.x <= source_x {
        level.player.sprite.speed_x = -level.player.sprite.speed_x;
    }
    level.player.sprite.speed_y = -8 * 16;
    if state.carrying {
        force_pose(level, state);
    }
}

/// Shared overlap test between an enemy-side sprite and an offending
/// sprite (player, thrown sprite or projectile).
fn sprites_overlap(enemy_sprite: &Sprite, sprite: &Sprite) -> bool {
    if (sprite.x - enemy_sprite.x).abs() >= 64 {
        return false;
    }
    if (sprite.y - enemy_sprite.y).abs() >= 70 {
        return false;
    }

    if sprite.y < enemy_sprite.y {
        if sprite.y <= enemy_sprite.y - enemy_sprite.sbox.coll_height as i16 + 3 {
            return false;
        }
    } else if enemy_sprite.y <= sprite.y - sprite.sbox.coll_height as i16 + 3 {
        return false;
    }

    let enemy_left = enemy_sprite.x - enemy_sprite.sbox.ref_width as i16;
    let object_left = sprite.x - sprite.sbox.ref_width as i16;
    if enemy_left >= object_left {
        if object_left + ((sprite.sbox.coll_width as i16) >> 1) <= enemy_left {
            return false;
        }
    } else if enemy_left + ((enemy_sprite.sbox.coll_width as i16) >> 1) <= object_left {
        return false;
    }
    true
}

/// Shows the impact flash where a throw connected.
fn see_choc(level: &mut Level, state: &mut SimulationState) {
    update_sprite(&level.assets, &mut level.player.sprite2, OBJ_IMPACT, true);
    level.player.sprite2.speed_x = 0;
    level.player.sprite2.speed_y = 0;
    state.impact_timer = 5;
}

/// Moves enemy projectiles and collides them with the player.
pub fn move_trash(
    level: &mut Level,
    state: &mut SimulationState,
    camera: &Camera,
    audio: &mut dyn AudioSink,
) {
    for index in 0..level.trash.len() {
        if !level.trash[index].enabled {
            continue;
        }
        if level.trash[index].speed_x != 0 {
            level.trash[index].x += level.trash[index].speed_x >> 4;
            let mut tmp = (level.trash[index].x >> 4) - camera.tile_x;
            if tmp < 0 || tmp > SCREEN_WIDTH_TILES {
                level.trash[index].enabled = false;
                continue;
            }
            if tmp != 0 {
                // Known quirk, load-bearing: the Y update hides behind the
                // stale X-column check, and the cull below compares tiles
                // against a pixel count.
                level.trash[index].y += level.trash[index].speed_y >> 4;
                tmp = (level.trash[index].y >> 4) - camera.tile_y;
                if tmp < 0 || tmp > SCREEN_HEIGHT_TILES * 16 {
                    level.trash[index].enabled = false;
                    continue;
                }
            }
        }
        if !state.god_mode && sprites_overlap(&level.trash[index], &level.player.sprite) {
            level.trash[index].x -= level.trash[index].speed_x;
            let source_x = level.trash[index].x;
            kick_ash(level, state, audio, source_x, 70);
            level.trash[index].enabled = false;
        }
    }
}

/// First free projectile slot, if any. Exhaustion skips the shot.
fn find_trash(trash: &[Sprite]) -> Option<usize> {
    trash.iter().position(|slot| !slot.enabled)
}

/// Launches a projectile from the enemy's muzzle. Height and sprite come
/// from the payload entries just behind the animation cursor.
fn put_bullet(level: &mut Level, enemy_index: usize, trash_index: usize) {
    let (enemy_x, enemy_y, muzzle_rise, bullet_number) = {
        let enemy = &level.enemies[enemy_index];
        let cursor = enemy
            .sprite
            .animation
            .unwrap_or(AnimationCursor::new(AnimStream::Enemy));
        let rise = (cursor.entry_at(&level.assets, -1) & 0x00FF) as u8 as i8 as i16;
        let number = (cursor.entry_at(&level.assets, -2) & 0x1FFF) + FIRST_OBJECT_SPRITE;
        (enemy.sprite.x, enemy.sprite.y, rise, number)
    };
    let player_x = level.player.sprite.x;
    update_sprite(
        &level.assets,
        &mut level.trash[trash_index],
        bullet_number,
        true,
    );
    let bullet = &mut level.trash[trash_index];
    bullet.x = enemy_x;
    bullet.y = enemy_y - muzzle_rise;
    if enemy_x < player_x {
        bullet.speed_x = 16 * 11;
        bullet.flipped = true;
    } else {
        bullet.speed_x = -16 * 11;
        bullet.flipped = false;
    }
    bullet.speed_y = 0;
    bullet.x += bullet.speed_x >> 4;
}
