/// Rebinds a sprite to a species: number, collision box, enabled. The
/// clear_flags variant is for hard rebinds; soft updates (animation frames)
/// keep orientation and render flags.
pub fn update_sprite(assets: &AssetCatalog, spr: &mut Sprite, number: i16, clear_flags: bool) {
    spr.number = number;
    spr.sbox = assets.sprite_box(number);
    spr.enabled = true;
    if clear_flags {
        spr.flipped = false;
        spr.flash = false;
        spr.visible = false;
        spr.drop_to_bottom = false;
        spr.killing = false;
    }
    spr.invisible = false;
}

/// Species copy only: position, speeds and spring state are deliberately
/// not carried over.
pub fn copy_sprite(assets: &AssetCatalog, dest: &mut Sprite, src: &Sprite) {
    dest.number = src.number;
    dest.sbox = assets.sprite_box(src.number);
    dest.enabled = src.enabled;
    dest.flipped = src.flipped;
    dest.flash = src.flash;
    dest.visible = src.visible;
    dest.invisible = false;
}

pub fn update_object_sprite(
    assets: &AssetCatalog,
    object: &mut Object,
    number: i16,
    clear_flags: bool,
) {
    update_sprite(assets, &mut object.sprite, number, clear_flags);
    object.kind = assets.object_kind(number);
}

/// Rebinds an enemy sprite and re-derives the cross-references that hang on
/// the sprite number: which sprite a picked-up enemy shows, which inert
/// sprite replaces it on death, and whether it counts as a boss.
pub fn update_enemy_sprite(
    assets: &AssetCatalog,
    enemy: &mut Enemy,
    number: i16,
    clear_flags: bool,
) {
    update_sprite(assets, &mut enemy.sprite, number, clear_flags);

    enemy.carry_sprite = match number {
        101..=105 => Some(105), // walking man
        126..=130 => Some(130), // fly
        149..=153 => Some(149), // skeleton
        157..=158 => Some(158), // worm
        159..=167 => Some(167), // swordsman
        185..=191 => Some(186), // zombie
        197..=203 => Some(203), // woman with pot
        _ => None,
    };

    enemy.dead_sprite = match number {
        172..=184 => Some(184), // periscope
        192..=196 => Some(196), // camel
        210..=213 => Some(213), // old man
        214..=220 => Some(220), // snake in pot
        221..=226 => Some(226), // knife thrower
        242..=247 => Some(247), // carnivorous plant
        _ => None,
    };

    enemy.boss = matches!(
        number,
        248..=251 | 252..=256 | 257..=261 | 263..=267 | 284..=288 | 329..=332
    );
}

/// Idle animation for sprites that flicker on their own: the cage, the
/// carpet in flight, and the loaded springs. Returns the rider a released
/// spring pushes back down; the caller applies it since the rider lives in
/// another pool slot.
fn animate_idle_sprite(
    assets: &AssetCatalog,
    state: &mut SimulationState,
    spr: &mut Sprite,
) -> Option<Rider> {
    if !spr.visible || !spr.enabled {
        return None;
    }
    if spr.number == OBJ_CAGE_A {
        if state.frame_counter & 0x0007 == 0 {
            update_sprite(assets, spr, OBJ_CAGE_B, false);
        }
    } else if spr.number == OBJ_CAGE_B {
        if state.frame_counter & 0x003F == 0 {
            update_sprite(assets, spr, OBJ_CAGE_A, false);
        }
    } else if spr.number == OBJ_CARPET_FLY_A {
        if state.frame_counter & 0x0007 == 0 {
            update_sprite(assets, spr, OBJ_CARPET_FLY_B, false);
        }
    } else if spr.number == OBJ_CARPET_FLY_B {
        if state.frame_counter & 0x0007 == 0 {
            update_sprite(assets, spr, OBJ_CARPET_FLY_A, false);
        }
    } else if spr.number == OBJ_SPRING_SMALL {
        if state.frame_counter & 0x0001 == 0 {
            if spr.spring_load == 0 {
                update_sprite(assets, spr, OBJ_SPRING_BIG, false);
            } else if state.gravity_timer > 1 {
                spr.spring_load = 0;
            } else {
                // keep an object load, shed the player load
                spr.spring_load &= 0x01;
            }
        }
    } else if spr.number == OBJ_SPRING_BIG && state.frame_counter & 0x0001 == 0 {
        if spr.spring_load == 0 {
            return None; // unloaded, stays big
        } else if state.gravity_timer > 1 {
            spr.spring_load = 0;
        } else {
            spr.spring_load &= 0x01;
        }
        let rider = spr.rider;
        state.gravity_timer = 3;
        update_sprite(assets, spr, OBJ_SPRING_SMALL, false);
        return rider;
    }
    None
}

fn apply_spring_bump(level: &mut Level, rider: Option<Rider>) {
    match rider {
        Some(Rider::Player) => level.player.sprite.y += 5,
        Some(Rider::Object(index)) => {
            if let Some(object) = level.objects.get_mut(index) {
                object.sprite.y += 5;
            }
        }
        None => {}
    }
}

/// The per-tick idle animation pass over every pool, plus the player's
/// stand-still fidget sprite.
pub fn animate_sprites(level: &mut Level, state: &mut SimulationState) {
    if state.last_action == ACTION_REST && state.grounded && state.action_timer >= 35 * 4 {
        update_sprite(&level.assets, &mut level.player.sprite, SPRITE_PAUSE, false);
        if state.action_timer >= 35 * 5 {
            update_sprite(&level.assets, &mut level.player.sprite, SPRITE_REST, false);
            state.action_timer = 0;
        }
    }

    let bump = animate_idle_sprite(&level.assets, state, &mut level.player.sprite2);
    apply_spring_bump(level, bump);
    let bump = animate_idle_sprite(&level.assets, state, &mut level.player.sprite3);
    apply_spring_bump(level, bump);

    for index in 0..level.objects.len() {
        let bump = animate_idle_sprite(&level.assets, state, &mut level.objects[index].sprite);
        apply_spring_bump(level, bump);
    }
    for index in 0..level.enemies.len() {
        let bump = animate_idle_sprite(&level.assets, state, &mut level.enemies[index].sprite);
        apply_spring_bump(level, bump);
    }
    for index in 0..level.elevators.len() {
        let bump = animate_idle_sprite(&level.assets, state, &mut level.elevators[index].sprite);
        apply_spring_bump(level, bump);
    }
}
