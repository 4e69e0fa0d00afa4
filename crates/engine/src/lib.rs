pub mod app;

pub use app::{
    run_loop, AbortRequested, AudioEvent, AudioSink, Game, InputAction, InputSnapshot, InputSource,
    LoopConfig, LoopMetricsSnapshot, MetricsHandle, NullAudio, NullInput, NullRenderer, NullUi,
    Renderer, RunOutcome, RunSummary, SpriteInstance, StatusView, TickCommand, TileInstance,
    UiGateway, UiSignal,
};
