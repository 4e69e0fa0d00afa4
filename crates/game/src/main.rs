mod app;

use engine::{
    run_loop, AbortRequested, AudioSink, Game, InputSnapshot, InputSource, LoopConfig,
    MetricsHandle, NullAudio, NullRenderer, NullUi, Renderer, TickCommand, UiGateway,
};
use tracing::{error, info};

use app::sim::{Collaborators, Simulation, TickStatus};

/// Wires the simulation to its collaborators. Rendering, audio and UI
/// backends live outside this workspace; the demo runs them headless.
struct PlatformGame {
    sim: Simulation,
    renderer: Box<dyn Renderer>,
    audio: Box<dyn AudioSink>,
    ui: Box<dyn UiGateway>,
}

impl Game for PlatformGame {
    fn tick(&mut self, input: &InputSnapshot) -> Result<TickCommand, AbortRequested> {
        let mut collaborators = Collaborators {
            renderer: self.renderer.as_mut(),
            audio: self.audio.as_mut(),
            ui: self.ui.as_mut(),
        };
        match self.sim.tick(input, &mut collaborators)? {
            TickStatus::Running => Ok(TickCommand::Continue),
            TickStatus::LevelFinished => Ok(TickCommand::LevelFinished),
            TickStatus::GameOver => Ok(TickCommand::GameOver),
            TickStatus::Death => {
                if self.sim.state.new_level {
                    // The finale path reports completion through the death
                    // code with the new-level flag raised.
                    return Ok(TickCommand::LevelFinished);
                }
                info!(
                    lives_left = self.sim.level.lives - 1,
                    "player_died_restarting_level"
                );
                self.sim.respawn();
                Ok(TickCommand::Continue)
            }
        }
    }

    fn render(&mut self) {
        let (tiles, sprites) = self.sim.build_draw_lists();
        self.renderer.draw_tiles(&tiles);
        self.renderer.draw_sprites(&sprites);
        self.renderer.present();
    }
}

/// Scripted input for the headless demo: walk right, jump once, then idle.
struct DemoInput {
    tick: u64,
}

impl InputSource for DemoInput {
    fn poll(&mut self) -> InputSnapshot {
        use engine::InputAction::{MoveRight, MoveUp};
        self.tick += 1;
        let mut snapshot = InputSnapshot::empty();
        if self.tick < 240 {
            snapshot = snapshot.with_action_down(MoveRight, true);
        }
        if (120..126).contains(&self.tick) {
            snapshot = snapshot.with_action_down(MoveUp, true);
        }
        snapshot
    }
}

fn main() {
    app::bootstrap::init_tracing();
    info!("=== platform core demo ===");

    let level = match app::demo::build_demo_level() {
        Ok(level) => level,
        Err(error) => {
            error!(%error, "demo level definition rejected");
            std::process::exit(1);
        }
    };

    let mut game = PlatformGame {
        sim: Simulation::new(level),
        renderer: Box::new(NullRenderer::default()),
        audio: Box::new(NullAudio),
        ui: Box::new(NullUi),
    };
    game.audio.select_song(game.sim.level.music);
    let mut input = DemoInput { tick: 0 };
    let config = LoopConfig {
        max_run_ticks: Some(600),
        ..LoopConfig::default()
    };
    let metrics = MetricsHandle::default();

    match run_loop(config, &mut game, &mut input, &metrics) {
        Ok(summary) => info!(
            outcome = ?summary.outcome,
            ticks = summary.ticks_run,
            bonus_collected = game.sim.level.bonus_collected,
            "demo_finished"
        ),
        Err(AbortRequested) => info!("demo_aborted"),
    }
}
