/// Searches the pool for a support-capable object under the subject. The
/// subject is described by its position and box so the player (tested with
/// its rest-pose box) and objects share the query. Pool order decides ties.
fn find_support(
    objects: &[Object],
    subject_x: i16,
    subject_y: i16,
    subject_box: SpriteBox,
    exclude: Option<usize>,
) -> Option<usize> {
    let subject_left = subject_x - ((subject_box.width as i16) >> 1);
    for (index, object) in objects.iter().enumerate() {
        if Some(index) == exclude || !object.sprite.enabled || !object.kind.support {
            continue;
        }
        // quirk kept: a center is compared against the subject's left edge
        if (object.sprite.x - subject_left).abs() > 64 {
            continue;
        }
        if (object.sprite.y - subject_y).abs() > 70 {
            continue;
        }
        let object_left = object.sprite.x - ((object.sprite.sbox.coll_width as i16) >> 1);
        if object_left > subject_left {
            if subject_left + subject_box.coll_width as i16 <= object_left {
                continue;
            }
        } else if object_left + object.sprite.sbox.coll_width as i16 <= subject_left {
            continue;
        }

        // the support must sit below the subject, within collision height
        if object.sprite.y - ((object.sprite.sbox.coll_height as i16) >> 3) >= subject_y
            && object.sprite.y - object.sprite.sbox.coll_height as i16 <= subject_y
        {
            return Some(index);
        }
    }
    None
}

fn object_pair(objects: &mut [Object], a: usize, b: usize) -> (&mut Object, &mut Object) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = objects.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = objects.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Object physics pass. Skipped entirely while the gravity timer is spent;
/// any movement rearms it for another four ticks.
pub fn move_objects(level: &mut Level, state: &mut SimulationState, audio: &mut dyn AudioSink) {
    if state.gravity_timer == 0 {
        return;
    }
    for index in 0..level.objects.len() {
        if !level.objects[index].sprite.enabled {
            continue;
        }
        move_object(level, state, audio, index);
    }
}

fn move_object(level: &mut Level, state: &mut SimulationState, audio: &mut dyn AudioSink, index: usize) {
    let mut obj_vs_sprite: Option<usize> = None;

    // level edges reflect
    if level.objects[index].sprite.x <= 8 {
        level.objects[index].sprite.speed_x = 2 * 16;
        level.objects[index].sprite.speed_y = 0;
    }
    if level.objects[index].sprite.x >= level.grid.width() * 16 - 8 {
        level.objects[index].sprite.speed_x = -2 * 16;
        level.objects[index].sprite.speed_y = 0;
    }

    // flying carpet state machine
    let number = level.objects[index].sprite.number;
    if number == OBJ_CARPET_FLY_A || number == OBJ_CARPET_FLY_B {
        state.gravity_timer = 4;
        if state.carpet_state != 0 {
            // in flight: track the player's height
            let hover_y = level.player.sprite.y - 8;
            let object = &mut level.objects[index];
            object.momentum = 0;
            if object.sprite.y == hover_y {
                object.sprite.speed_y = 0;
            } else if object.sprite.y < hover_y {
                object.sprite.speed_y = 16;
            } else {
                object.sprite.speed_y = -16;
            }
        }
        if state.carpet_fly_timer == 0 {
            // flight budget spent, fold up
            update_object_sprite(&level.assets, &mut level.objects[index], OBJ_CARPET_FOLDED, true);
            level.objects[index].sprite.speed_x = 0;
            state.carpet_state = 2;
        }
    } else if (number == OBJ_CARPET_FOLDED || number == OBJ_CARPET_OPEN)
        && (state.frame_counter & 0x03) == 0
        && level.objects[index].sprite.speed_y > 0
        && state.carpet_state != 2
    {
        // a thrown carpet unfolds in two steps while falling
        if number == OBJ_CARPET_FOLDED {
            level.objects[index].sprite.speed_x >>= 1;
            update_object_sprite(&level.assets, &mut level.objects[index], OBJ_CARPET_OPEN, false);
        } else {
            level.objects[index].sprite.speed_x = 0;
            update_object_sprite(&level.assets, &mut level.objects[index], OBJ_CARPET_FLY_A, false);
        }
        state.carpet_state = 1;
        state.carpet_fly_timer = CARPET_FLY_TICKS;
    }

    // horizontal movement with wall reversal
    if level.objects[index].sprite.speed_x != 0 {
        let tile_x = level.objects[index].sprite.x >> 4;
        let mut tile_y = level.objects[index].sprite.y >> 4;
        if level.objects[index].sprite.y & 0x0F == 0 {
            tile_y -= 1;
        }
        let hflag = level.grid.horiz_flag(tile_y, tile_x);
        if hflag.blocks() {
            let object = &mut level.objects[index];
            object.sprite.speed_x = -object.sprite.speed_x;
            object.sprite.x += object.sprite.speed_x >> 4;
        } else {
            let object = &level.objects[index];
            let crossing = ((object.sprite.speed_x >> 4) + object.sprite.x) >> 4 != tile_x;
            if crossing {
                let probe_x = if object.sprite.speed_x < 0 {
                    tile_x - 1
                } else {
                    tile_x + 1
                };
                if probe_x < level.grid.width() && probe_x >= 0 {
                    let hflag = level.grid.horiz_flag(tile_y, probe_x);
                    if hflag.blocks() {
                        let object = &mut level.objects[index];
                        object.sprite.speed_x = -object.sprite.speed_x;
                        object.sprite.x += object.sprite.speed_x >> 4;
                    }
                }
            }
        }

        state.gravity_timer = 4;
        let object = &mut level.objects[index];
        object.sprite.x += object.sprite.speed_x >> 4;
        let mut reduction = if object.sprite.speed_y.abs() >= 16 { 1 } else { 3 };
        if object.sprite.speed_x < 0 {
            reduction = -reduction;
        }
        object.sprite.speed_x -= reduction;
        if object.sprite.speed_x.abs() < 16 {
            object.sprite.speed_x = 0;
        }
    }

    if level.objects[index].sprite.speed_y < 0 {
        // rising: probe the ceiling above the collision box
        let object = &level.objects[index];
        let tile_x = object.sprite.x >> 4;
        let mut tile_y =
            (object.sprite.y >> 4) - ((object.sprite.sbox.coll_height as i16) >> 4) - 1;
        if level.grid.ceil_flag(tile_y, tile_x) != CeilFlag::None {
            let object = &mut level.objects[index];
            object.sprite.speed_y = 0;
            if !object.kind.bounce {
                object.sprite.y &= !0x0F;
            }
            return;
        }
        // Quirk kept: this compares a pixel sum against a tile index, so
        // the probe one tile higher runs for any moving sprite.
        let object = &level.objects[index];
        if (object.sprite.speed_y >> 4) + object.sprite.y != object.sprite.y >> 4 {
            tile_y -= 1;
            if level.grid.ceil_flag(tile_y, tile_x) != CeilFlag::None {
                let object = &mut level.objects[index];
                object.sprite.speed_y = 0;
                if !object.kind.bounce {
                    object.sprite.y &= !0x0F;
                }
                return;
            }
        }
    } else if level.objects[index].sprite.drop_to_bottom
        || (level.objects[index].kind.drop_to_bottom
            && level.objects[index].sprite.speed_y >= 10 * 16)
    {
        // dropping to the bottom skips collision; cull once invisible
        if !level.objects[index].sprite.visible {
            level.objects[index].sprite.enabled = false;
            return;
        }
    } else {
        // falling with collision detection
        let tile_x = level.objects[index].sprite.x >> 4;
        let mut tile_y = level.objects[index].sprite.y >> 4;
        let hflag = level.grid.horiz_flag(tile_y, tile_x);
        let mut fflag = level.grid.floor_flag(tile_y, tile_x);
        {
            let object = &level.objects[index];
            if object.sprite.y <= 6 || object.sprite.y >= level.grid.height() << 4 {
                fflag = FloorFlag::None;
                if object.sprite.y >= (level.grid.height() << 4) + 64 {
                    level.objects[index].sprite.enabled = false;
                    return;
                }
            }
        }
        if fflag == FloorFlag::Fire {
            level.objects[index].sprite.enabled = false;
            return;
        }
        if fflag == FloorFlag::Water {
            if level.objects[index].sprite.number == OBJ_BALL {
                level.objects[index].sprite.speed_y = 0;
            } else {
                level.objects[index].sprite.enabled = false;
            }
            return;
        }
        if fflag != FloorFlag::Ladder && (fflag != FloorFlag::None || hflag.blocks()) {
            let object = &mut level.objects[index];
            object.sprite.speed_y = 0;
            if !object.kind.bounce {
                object.sprite.y &= !0x0F;
            }
            return;
        }

        // sweep every tile the fall will cross this tick
        let object = &level.objects[index];
        let tile_count =
            ((object.sprite.y + (object.sprite.speed_y >> 4)) >> 4) - (object.sprite.y >> 4);
        if tile_count != 0 {
            // quirk kept: the support probe runs ahead of the sweep
            obj_vs_sprite = find_support(
                &level.objects,
                level.objects[index].sprite.x,
                level.objects[index].sprite.y,
                level.objects[index].sprite.sbox,
                Some(index),
            );
        }
        let mut swept = 0;
        let mut stopped = false;
        while swept < tile_count {
            if obj_vs_sprite.is_some() {
                stopped = true;
                break;
            }
            tile_y += 1;
            let hflag = level.grid.horiz_flag(tile_y, tile_x);
            let fflag = level.grid.floor_flag(tile_y, tile_x);
            if fflag == FloorFlag::Fire {
                level.objects[index].sprite.enabled = false;
                stopped = true;
                break;
            }
            if fflag != FloorFlag::Ladder && (fflag != FloorFlag::None || hflag.blocks()) {
                if !level.objects[index].kind.bounce {
                    let object = &mut level.objects[index];
                    object.sprite.speed_y = 0;
                    object.sprite.y = (object.sprite.y & !0x0F) + 16;
                    let landed_number = object.sprite.number;
                    if (OBJ_CARPET_FOLDED..=OBJ_CARPET_FLY_B).contains(&landed_number) {
                        update_object_sprite(
                            &level.assets,
                            &mut level.objects[index],
                            OBJ_CARPET_FOLDED,
                            false,
                        );
                        state.carpet_state = 0;
                    }
                    if level.objects[index].sprite.visible && !level.player.sprite2.enabled {
                        // puff of smoke where it landed
                        state.smoke_timer = 32;
                        level.player.sprite2.y = level.objects[index].sprite.y;
                        level.player.sprite2.x = level.objects[index].sprite.x;
                        update_sprite(
                            &level.assets,
                            &mut level.player.sprite2,
                            OBJ_SMOKE_FIRST,
                            true,
                        );
                    }
                } else {
                    let object = &mut level.objects[index];
                    object.sprite.y = (object.sprite.y & !0x0F) + 16;
                    state.gravity_timer = 4;
                    object.momentum = 0;
                    // bounce back up, decayed
                    object.sprite.speed_y = -object.sprite.speed_y + 16 * 3;
                    if object.sprite.speed_y > 0 {
                        object.sprite.speed_y = 0;
                    }
                }
                stopped = true;
                break;
            }
            swept += 1;
        }
        if obj_vs_sprite.is_none() && (stopped || !level.objects[index].sprite.enabled) {
            return;
        }
        if obj_vs_sprite.is_none() {
            obj_vs_sprite = find_support(
                &level.objects,
                level.objects[index].sprite.x,
                level.objects[index].sprite.y,
                level.objects[index].sprite.sbox,
                Some(index),
            );
        }
        if let Some(support_index) = obj_vs_sprite {
            level.objects[index].momentum = 0;
            let (object, support) = object_pair(&mut level.objects, index, support_index);
            if support.kind.bounce {
                support.sprite.spring_load |= 0x01;
                support.sprite.rider = Some(Rider::Object(index));
                if object.sprite.speed_y > 64 {
                    let fall_speed = object.sprite.speed_y;
                    support.sprite.speed_y = ((-fall_speed) >> 1) + 32;
                    object.sprite.speed_y = ((-fall_speed) >> 1) + 16;
                    support.sprite.speed_x = object.sprite.speed_x >> 1;
                } else {
                    object.sprite.speed_y = 0;
                    object.sprite.y = support.sprite.y - support.sprite.sbox.coll_height as i16;
                    return;
                }
            } else if object.kind.bounce {
                object.sprite.y = support.sprite.y - support.sprite.sbox.coll_height as i16;
                if object.sprite.speed_y >= 16 || object.sprite.speed_y < 0 {
                    state.gravity_timer = 4;
                    object.sprite.speed_y = -object.sprite.speed_y + 16 * 3;
                    if object.sprite.speed_y > 0 {
                        object.sprite.speed_y = 0;
                    }
                } else {
                    object.sprite.speed_y = 0;
                }
                return;
            } else {
                object.sprite.y = support.sprite.y - support.sprite.sbox.coll_height as i16;
                object.sprite.speed_y = 0;
            }
        }
    }

    // integrate the fall and accumulate momentum toward a damaging landing
    let mut max_speed = 15;
    if level.objects[index].sprite.number < FIRST_ENEMY_SPRITE {
        max_speed = level.objects[index].kind.max_fall_speed as i16;
    }
    let object = &mut level.objects[index];
    let speed = object.sprite.speed_y >> 4;
    if speed != 0 {
        state.gravity_timer = 4;
    }
    object.sprite.y += speed;
    if speed < max_speed {
        object.sprite.speed_y += 16;
        if object.sprite.speed_y > 0 {
            object.momentum = object.momentum.wrapping_add(1);
        }
    }
    shock(level, state, audio, index);
}

/// A falling object landing on the player stuns, and hurts if the object
/// fell long enough to count as a weapon.
fn shock(level: &mut Level, state: &mut SimulationState, audio: &mut dyn AudioSink, index: usize) {
    let object = &level.objects[index];
    let player = &level.player;

    if object.momentum < SHOCK_MOMENTUM_THRESHOLD {
        return;
    }
    if player.sprite.speed_y >= MAX_SPEED_Y * 16 {
        return;
    }
    if (player.sprite.y - object.sprite.y).abs() >= 32 {
        return;
    }
    if (player.sprite.x - object.sprite.x).abs() >= 32 {
        return;
    }

    if object.sprite.x > player.sprite.x {
        if object.sprite.x > player.sprite.x + 24 {
            return;
        }
    } else if object.sprite.x + (object.sprite.sbox.coll_width as i16) < player.sprite.x {
        return;
    }

    if object.sprite.y < player.sprite.y {
        if object.sprite.y <= player.sprite.y - 32 {
            return;
        }
    } else if object.sprite.y - object.sprite.sbox.coll_height as i16 + 1 >= player.sprite.y {
        return;
    }

    audio.play_event(AudioEvent::PlayerHeadImpact);
    state.headache_timer = 24;
    if level.objects[index].sprite.killing {
        if !state.god_mode {
            dec_energy(level, state);
        }
        level.objects[index].sprite.killing = false;
    }
}
