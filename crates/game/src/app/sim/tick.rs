/// The collaborators a tick may call out to. All are fire-and-forget or
/// synchronous; none feed state back except through result codes.
pub struct Collaborators<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub audio: &'a mut dyn AudioSink,
    pub ui: &'a mut dyn UiGateway,
}

/// The tick orchestrator: owns the level, the consolidated flag state and
/// the camera, and runs the fixed per-tick component order.
pub struct Simulation {
    pub level: Level,
    pub state: SimulationState,
    pub camera: Camera,
}

impl Simulation {
    pub fn new(mut level: Level) -> Self {
        let mut state = SimulationState::default();
        let mut camera = Camera::default();
        clear_level_state(&mut level, &mut state, &mut camera);
        Self {
            level,
            state,
            camera,
        }
    }

    /// One full simulation step: input and player first, then enemies,
    /// projectiles and objects over the already-updated player state, then
    /// collision resolution, idle animation, visibility and the camera.
    pub fn tick(
        &mut self,
        input: &InputSnapshot,
        collaborators: &mut Collaborators<'_>,
    ) -> Result<TickStatus, AbortRequested> {
        let Self {
            level,
            state,
            camera,
        } = self;

        move_player(level, state, camera, input, collaborators.audio, collaborators.ui)?;
        move_elevators(level, camera);
        move_enemies(level, state, camera);
        move_trash(level, state, camera, collaborators.audio);
        move_objects(level, state, collaborators.audio);
        resolve_enemy_collisions(level, state, camera, collaborators.audio);
        animate_sprites(level, state);
        update_visibility(level, camera);
        scroll(level, state, camera);

        state.frame_counter = (state.frame_counter + 1) & 0x0FFF;
        level.tick_count += 1;

        self.tick_outcome(collaborators)
    }

    /// End-of-tick resolution of the terminal flags. The finish level
    /// reports through the death code with the new-level flag raised.
    fn tick_outcome(
        &mut self,
        collaborators: &mut Collaborators<'_>,
    ) -> Result<TickStatus, AbortRequested> {
        if self.state.new_level {
            return Ok(TickStatus::LevelFinished);
        }
        if self.state.game_over {
            info!(level = self.level.number, "game_over");
            return Ok(TickStatus::GameOver);
        }
        if self.state.reset_timer == 1 {
            return Ok(TickStatus::Death);
        }
        if self.level.is_finish {
            run_finale(&mut self.level, &mut self.state, &mut self.camera, collaborators)?;
            self.state.new_level = true;
            return Ok(TickStatus::Death);
        }
        Ok(TickStatus::Running)
    }

    /// Spend a life and rebuild the level from its init data. Checkpoints
    /// survive because they rewrote the player's init position.
    pub fn respawn(&mut self) {
        self.level.lives -= 1;
        clear_level_state(&mut self.level, &mut self.state, &mut self.camera);
    }

    pub fn build_draw_lists(&self) -> (Vec<TileInstance>, Vec<SpriteInstance>) {
        build_draw_lists(&self.level, &self.state, &self.camera)
    }
}

/// One animation step of the end sequence: advance past the current frame,
/// loop if the stream ran out, and bind the new frame.
fn move_him(assets: &AssetCatalog, sprite: &mut Sprite) {
    let Some(mut cursor) = sprite.animation else {
        return;
    };
    cursor.advance();
    cursor.rewind_while_negative(assets);
    let frame = cursor.entry(assets);
    update_sprite(assets, sprite, frame, true);
    sprite.animation = Some(cursor);
}

fn present_finale_frame(
    level: &Level,
    state: &SimulationState,
    camera: &Camera,
    renderer: &mut dyn Renderer,
) {
    let (tiles, sprites) = build_draw_lists(level, state, camera);
    renderer.draw_tiles(&tiles);
    renderer.draw_sprites(&sprites);
    renderer.present();
}

// Heart flight path of the end sequence: x/y pairs with a loop-back tail.
const HEART_PATH: [i16; 37] = [
    153, 142, 153, 142, 153, 142, //
    139, 148, 139, 148, 139, 148, //
    139, 162, 139, 162, 139, 162, //
    152, 171, 152, 171, 152, 171, //
    171, 165, 171, 165, 171, 165, //
    170, 147, 170, 147, 170, 147, //
    -12 * 3,
];

/// The scripted end-of-game sequence: the two sprites walk together, merge,
/// a smoke puff rises, hearts circle until the player confirms, then the
/// closing banners slide in. Runs through the renderer and UI gateway, with
/// quit propagating out of every wait.
fn run_finale(
    level: &mut Level,
    state: &mut SimulationState,
    camera: &mut Camera,
    collaborators: &mut Collaborators<'_>,
) -> Result<(), AbortRequested> {
    info!(level = level.number, "finale_started");
    camera.tile_x = 0;
    camera.no_scroll = true;

    update_sprite(&level.assets, &mut level.player.sprite, FINALE_HERO_SPRITE, true);
    level.player.sprite.x = -100;
    level.player.sprite.y = 180;
    level.player.sprite.animation = Some(AnimationCursor::new(AnimStream::FinaleHero));
    update_sprite(
        &level.assets,
        &mut level.player.sprite2,
        FINALE_PARTNER_SPRITE,
        true,
    );
    level.player.sprite2.x = 420;
    level.player.sprite2.y = 180;
    level.player.sprite2.animation = Some(AnimationCursor::new(AnimStream::FinalePartner));

    // walk toward each other
    while level.player.sprite2.x > level.player.sprite.x + 28 {
        scroll(level, state, camera);
        level.player.sprite.x += 3;
        move_him(&level.assets, &mut level.player.sprite);
        level.player.sprite2.x -= 3;
        move_him(&level.assets, &mut level.player.sprite2);
        update_visibility(level, camera);
        present_finale_frame(level, state, camera, collaborators.renderer);
        collaborators.ui.pump_frame()?;
    }

    // the couple in one sprite
    update_sprite(
        &level.assets,
        &mut level.player.sprite2,
        FINALE_COUPLE_SPRITE,
        true,
    );
    level.player.sprite2.flipped = true;
    level.player.sprite2.x -= 24;

    // smoke puff rising
    level.player.sprite.animation = Some(AnimationCursor::new(AnimStream::FinaleSmoke));
    level.player.sprite.y -= 16;
    for _ in 0..16 {
        move_him(&level.assets, &mut level.player.sprite);
        scroll(level, state, camera);
        update_visibility(level, camera);
        present_finale_frame(level, state, camera, collaborators.renderer);
        collaborators.ui.pump_frame()?;
        level.player.sprite.y += 1;
    }

    // hearts circling until confirmed
    update_sprite(&level.assets, &mut level.player.sprite, FINALE_HEART_SPRITE, true);
    let mut heart_index = 0usize;
    loop {
        if HEART_PATH[heart_index] < 0 {
            heart_index = heart_index
                .saturating_sub(HEART_PATH[heart_index].unsigned_abs() as usize);
        }
        level.player.sprite.x = HEART_PATH[heart_index];
        heart_index += 1;
        level.player.sprite.y = HEART_PATH[heart_index];
        heart_index += 1;

        scroll(level, state, camera);
        update_visibility(level, camera);
        present_finale_frame(level, state, camera, collaborators.renderer);
        if collaborators.ui.pump_frame()? == UiSignal::Confirm {
            break;
        }
    }

    // closing banners slide together
    update_sprite(&level.assets, &mut level.player.sprite, FINALE_THE_SPRITE, true);
    level.player.sprite.x = (camera.tile_x << 4) - (120 - 2);
    level.player.sprite.y = (camera.tile_y << 4) + 100;
    update_sprite(&level.assets, &mut level.player.sprite3, FINALE_END_SPRITE, true);
    level.player.sprite3.x = (camera.tile_x << 4) + (320 + 120 - 2);
    level.player.sprite3.y = (camera.tile_y << 4) + 100;
    for _ in 0..31 {
        update_visibility(level, camera);
        present_finale_frame(level, state, camera, collaborators.renderer);
        collaborators.ui.pump_frame()?;
        level.player.sprite.x += 8;
        level.player.sprite3.x -= 8;
    }
    while collaborators.ui.pump_frame()? != UiSignal::Confirm {}
    Ok(())
}
