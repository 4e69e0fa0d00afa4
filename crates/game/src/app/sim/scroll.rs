// Sequential clamp: lower bound first, then upper, so an inverted range
// resolves to the upper bound instead of panicking.
fn clamp_scroll(x: i16, lower: i16, upper: i16) -> i16 {
    let mut x = x;
    if x < lower {
        x = lower;
    }
    if x > upper {
        x = upper;
    }
    x
}

/// Horizontal camera follow: aim 60 px ahead of the facing, clamped half a
/// screen from the edges, moving one tile per tick with the sub-tile
/// remainder kept for rendering. The scroll limit column holds the camera
/// back until the player crosses it.
fn x_adjust(level: &Level, camera: &mut Camera) {
    camera.scroll_x = true;

    let player_position = level.player.sprite.x;

    let right_limit = if player_position > camera.limit_x * 16 || camera.limit_breached {
        if !camera.limit_breached {
            info!(limit_x = camera.limit_x, "scroll_limit_breached");
        }
        camera.limit_breached = true;
        level.grid.width() * 16 - 160
    } else {
        camera.limit_x * 16 - 160
    };

    let left_camera_limit = clamp_scroll(player_position - 60, 160, right_limit);
    let right_camera_limit = clamp_scroll(player_position + 60, 160, right_limit);

    let camera_position = if level.player.sprite.flipped {
        left_camera_limit
    } else {
        right_camera_limit
    };

    // retreating a full screen left of the limit re-arms it
    if camera.limit_breached && camera_position < camera.limit_x * 16 - 160 {
        camera.limit_breached = false;
    }

    let camera_screen_px = camera_position - camera.tile_x * 16;
    let scroll_px_target = 160;
    let scroll_offset_x = scroll_px_target - camera_screen_px;
    let tile_offset_x = scroll_offset_x / 16;
    let px_offset_x = scroll_offset_x % 16;
    if tile_offset_x < 0 {
        camera.tile_x += 1;
        camera.px_offset = px_offset_x;
        camera.scroll_x = true;
    } else if tile_offset_x > 0 {
        camera.tile_x -= 1;
        camera.px_offset = px_offset_x;
        camera.scroll_x = true;
    } else {
        camera.px_offset = scroll_offset_x;
        camera.scroll_x = false;
    }
}

fn u_scroll(camera: &mut Camera) -> bool {
    if camera.tile_y == 0 {
        return true; // stop scrolling
    }
    camera.tile_y -= 1;
    false
}

fn d_scroll(level: &Level, camera: &mut Camera) -> bool {
    if camera.tile_y >= level.grid.height() - SCREEN_HEIGHT_TILES {
        return true; // stop scrolling
    }
    camera.tile_y += 1;
    false
}

/// Vertical camera follow. Triggers near the top and bottom thirds with an
/// asymmetric target row depending on whether the player is airborne, and
/// the altitude-zero row forces scrolling regardless of the player.
fn y_adjust(level: &Level, state: &SimulationState, camera: &mut Camera) {
    if level.player.sprite.speed_y == 0 {
        camera.scroll_y = false;
    }
    let player_screen_tile_y = (level.player.sprite.y >> 4) - camera.tile_y;
    if !camera.scroll_y {
        if level.player.sprite.speed_y == 0 && !state.on_ladder {
            if player_screen_tile_y >= SCREEN_HEIGHT_TILES - 1 {
                camera.scroll_y_target = SCREEN_HEIGHT_TILES - 2;
                camera.scroll_y = true;
            } else if player_screen_tile_y <= 2 {
                camera.scroll_y_target = SCREEN_HEIGHT_TILES - 3;
                camera.scroll_y = true;
            }
        } else if player_screen_tile_y >= SCREEN_HEIGHT_TILES - 2 {
            camera.scroll_y_target = 3;
            camera.scroll_y = true;
        } else if player_screen_tile_y <= 2 {
            camera.scroll_y_target = SCREEN_HEIGHT_TILES - 3;
            camera.scroll_y = true;
        }
    }

    let altitude_floor_px = (camera.altitude_zero + SCREEN_HEIGHT_TILES) << 4;
    if level.player.sprite.y <= altitude_floor_px && camera.tile_y > camera.altitude_zero + 1 {
        if u_scroll(camera) {
            camera.scroll_y = false;
        }
    } else if camera.tile_y > camera.altitude_zero - 5
        && camera.tile_y <= camera.altitude_zero
        && level.player.sprite.y + 7 * 16 > altitude_floor_px
    {
        if d_scroll(level, camera) {
            camera.scroll_y = false;
        }
    } else if camera.scroll_y {
        if camera.scroll_y_target == player_screen_tile_y {
            camera.scroll_y = false;
        } else if camera.scroll_y_target > player_screen_tile_y {
            if u_scroll(camera) {
                camera.scroll_y = false;
            }
        } else if level.player.sprite.y <= altitude_floor_px && camera.tile_y > camera.altitude_zero
        {
            camera.scroll_y = false;
        } else if d_scroll(level, camera) {
            camera.scroll_y = false;
        }
    }
}

/// Per-tick scroll pass; also drives the tile animation cycle.
pub fn scroll(level: &Level, state: &mut SimulationState, camera: &mut Camera) {
    state.loop_cycle += 1;
    if state.loop_cycle > 3 {
        state.loop_cycle = 0;
    }
    if state.loop_cycle == 0 {
        state.tile_cycle += 1;
        if state.tile_cycle > 2 {
            state.tile_cycle = 0;
        }
    }
    if !camera.no_scroll {
        x_adjust(level, camera);
        y_adjust(level, state, camera);
    }
}
