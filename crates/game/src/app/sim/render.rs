fn sprite_on_screen(sprite: &Sprite, camera: &Camera) -> bool {
    let sx = sprite.x - (camera.tile_x << 4);
    let sy = sprite.y - (camera.tile_y << 4);
    sx + 32 >= 0
        && sx - 32 <= SCREEN_WIDTH_TILES * 16
        && sy >= 0
        && sy - 32 <= SCREEN_HEIGHT_TILES * 16
}

/// Refreshes the "was on screen" flags the physics reads next tick (carpet
/// landing smoke, drop-to-bottom culling, trash movement). Enemies manage
/// their own flag in the collision pass, elevators in their movement pass.
pub fn update_visibility(level: &mut Level, camera: &Camera) {
    let player = &mut level.player;
    player.sprite.visible = sprite_on_screen(&player.sprite, camera);
    if player.sprite2.enabled {
        player.sprite2.visible = sprite_on_screen(&player.sprite2, camera);
    }
    if player.sprite3.enabled {
        player.sprite3.visible = sprite_on_screen(&player.sprite3, camera);
    }
    for object in &mut level.objects {
        if object.sprite.enabled {
            object.sprite.visible = sprite_on_screen(&object.sprite, camera);
        }
    }
    for trash in &mut level.trash {
        if trash.enabled {
            trash.visible = sprite_on_screen(trash, camera);
        }
    }
}

fn push_sprite(list: &mut Vec<SpriteInstance>, sprite: &Sprite, camera: &Camera) {
    if !sprite.enabled || sprite.invisible || !sprite_on_screen(sprite, camera) {
        return;
    }
    list.push(SpriteInstance {
        x: sprite.x,
        y: sprite.y,
        number: sprite.number,
        flipped: sprite.flipped,
        flash: sprite.flash,
    });
}

/// Collects the visible tile window and sprite set for the renderer. The
/// camera offset gates which tiles are tested at all.
pub fn build_draw_lists(
    level: &Level,
    state: &SimulationState,
    camera: &Camera,
) -> (Vec<TileInstance>, Vec<SpriteInstance>) {
    let mut tiles =
        Vec::with_capacity((SCREEN_WIDTH_TILES as usize + 1) * SCREEN_HEIGHT_TILES as usize);
    for row in 0..SCREEN_HEIGHT_TILES {
        // one spare column covers the sub-tile scroll offset
        for column in 0..=SCREEN_WIDTH_TILES {
            let tile_y = camera.tile_y + row;
            let tile_x = camera.tile_x + column;
            if tile_y >= level.grid.height() || tile_x >= level.grid.width() {
                continue;
            }
            tiles.push(TileInstance {
                screen_x: column * 16 - camera.px_offset,
                screen_y: row * 16,
                tile_id: level.grid.animation_frame(tile_y, tile_x, state.tile_cycle),
            });
        }
    }

    let mut sprites = Vec::new();
    for elevator in &level.elevators {
        if elevator.enabled {
            push_sprite(&mut sprites, &elevator.sprite, camera);
        }
    }
    for object in &level.objects {
        push_sprite(&mut sprites, &object.sprite, camera);
    }
    for enemy in &level.enemies {
        if enemy.visible {
            push_sprite(&mut sprites, &enemy.sprite, camera);
        }
    }
    for trash in &level.trash {
        push_sprite(&mut sprites, trash, camera);
    }
    push_sprite(&mut sprites, &level.player.sprite2, camera);
    push_sprite(&mut sprites, &level.player.sprite3, camera);
    push_sprite(&mut sprites, &level.player.sprite, camera);

    (tiles, sprites)
}
