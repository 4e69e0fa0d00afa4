use thiserror::Error;

use super::input::InputSnapshot;

/// The user asked to leave. Propagated with `?` through every frame of a
/// tick so the loop unwinds without finishing the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("abort requested")]
pub struct AbortRequested;

/// What the loop runner should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickCommand {
    Continue,
    LevelFinished,
    GameOver,
}

pub trait Game {
    fn tick(&mut self, input: &InputSnapshot) -> Result<TickCommand, AbortRequested>;
    fn render(&mut self);
}
