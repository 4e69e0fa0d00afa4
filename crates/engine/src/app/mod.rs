mod audio;
mod game;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod ui;

pub use audio::{AudioEvent, AudioSink, NullAudio};
pub use game::{AbortRequested, Game, TickCommand};
pub use input::{InputAction, InputSnapshot, InputSource, NullInput};
pub use loop_runner::{run_loop, LoopConfig, RunOutcome, RunSummary};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{NullRenderer, Renderer, SpriteInstance, TileInstance};
pub use ui::{NullUi, StatusView, UiGateway, UiSignal};
