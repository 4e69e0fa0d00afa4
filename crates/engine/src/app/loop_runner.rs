use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::game::{AbortRequested, Game, TickCommand};
use super::input::InputSource;
use super::metrics::{MetricsAccumulator, MetricsHandle};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Stop after this many ticks. Headless demos set it; interactive
    /// frontends leave it unset and stop on quit.
    pub max_run_ticks: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_run_ticks: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    LevelFinished,
    GameOver,
    TickBudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub ticks_run: u64,
}

/// Fixed-timestep driver. One tick is one full simulation pass; rendering
/// happens once per wall-clock frame after whatever ticks were due.
pub fn run_loop(
    config: LoopConfig,
    game: &mut dyn Game,
    input: &mut dyn InputSource,
    metrics_handle: &MetricsHandle,
) -> Result<RunSummary, AbortRequested> {
    let target_tps = config.target_tps.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let max_frame_delta = non_zero_or(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_interval = non_zero_or(config.metrics_log_interval, Duration::from_secs(1));

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame = Instant::now();
    let mut metrics = MetricsAccumulator::new(metrics_interval);
    let mut ticks_run: u64 = 0;

    loop {
        let now = Instant::now();
        let frame_dt = now.saturating_duration_since(last_frame).min(max_frame_delta);
        last_frame = now;
        accumulator = accumulator.saturating_add(frame_dt);

        let plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        accumulator = plan.remaining_accumulator;
        if plan.dropped_backlog > Duration::ZERO {
            metrics.record_backlog_drop();
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        for _ in 0..plan.ticks_to_run {
            let snapshot = input.poll();
            let command = game.tick(&snapshot)?;
            ticks_run = ticks_run.saturating_add(1);
            metrics.record_tick();

            match command {
                TickCommand::Continue => {}
                TickCommand::LevelFinished => {
                    return Ok(RunSummary {
                        outcome: RunOutcome::LevelFinished,
                        ticks_run,
                    });
                }
                TickCommand::GameOver => {
                    return Ok(RunSummary {
                        outcome: RunOutcome::GameOver,
                        ticks_run,
                    });
                }
            }

            if let Some(budget) = config.max_run_ticks {
                if ticks_run >= budget {
                    return Ok(RunSummary {
                        outcome: RunOutcome::TickBudgetExhausted,
                        ticks_run,
                    });
                }
            }
        }

        game.render();
        metrics.record_frame(frame_dt);
        if let Some(snapshot) = metrics.maybe_snapshot(Instant::now()) {
            metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                "loop_metrics"
            );
        }

        // Sleep off the remainder of the tick budget. The pacing source is
        // wall clock only; simulation time never reads it.
        if accumulator < fixed_dt {
            thread::sleep(fixed_dt - accumulator);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::{InputSnapshot, NullInput};

    struct CountingGame {
        ticks: u64,
        finish_after: Option<u64>,
        renders: u64,
    }

    impl Game for CountingGame {
        fn tick(&mut self, _input: &InputSnapshot) -> Result<TickCommand, AbortRequested> {
            self.ticks += 1;
            match self.finish_after {
                Some(limit) if self.ticks >= limit => Ok(TickCommand::LevelFinished),
                _ => Ok(TickCommand::Continue),
            }
        }

        fn render(&mut self) {
            self.renders += 1;
        }
    }

    struct AbortingGame;

    impl Game for AbortingGame {
        fn tick(&mut self, _input: &InputSnapshot) -> Result<TickCommand, AbortRequested> {
            Err(AbortRequested)
        }

        fn render(&mut self) {}
    }

    #[test]
    fn plan_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let plan = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_drops_backlog_at_tick_cap() {
        let fixed_dt = Duration::from_millis(16);
        let plan = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn plan_keeps_sub_tick_remainder() {
        let fixed_dt = Duration::from_millis(16);
        let plan = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(plan.ticks_to_run, 1);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn run_loop_stops_on_level_finished() {
        let mut game = CountingGame {
            ticks: 0,
            finish_after: Some(3),
            renders: 0,
        };
        let mut input = NullInput;
        let config = LoopConfig {
            target_tps: 1000,
            ..LoopConfig::default()
        };

        let summary = run_loop(config, &mut game, &mut input, &MetricsHandle::default())
            .expect("loop should finish cleanly");
        assert_eq!(summary.outcome, RunOutcome::LevelFinished);
        assert_eq!(summary.ticks_run, 3);
    }

    #[test]
    fn run_loop_honors_tick_budget() {
        let mut game = CountingGame {
            ticks: 0,
            finish_after: None,
            renders: 0,
        };
        let mut input = NullInput;
        let config = LoopConfig {
            target_tps: 1000,
            max_run_ticks: Some(7),
            ..LoopConfig::default()
        };

        let summary = run_loop(config, &mut game, &mut input, &MetricsHandle::default())
            .expect("loop should finish cleanly");
        assert_eq!(summary.outcome, RunOutcome::TickBudgetExhausted);
        assert_eq!(summary.ticks_run, 7);
        assert_eq!(game.ticks, 7);
        assert!(game.renders > 0);
    }

    #[test]
    fn run_loop_propagates_abort() {
        let mut game = AbortingGame;
        let mut input = NullInput;
        let config = LoopConfig {
            target_tps: 1000,
            ..LoopConfig::default()
        };

        let result = run_loop(config, &mut game, &mut input, &MetricsHandle::default());
        assert_eq!(result, Err(AbortRequested));
    }
}
