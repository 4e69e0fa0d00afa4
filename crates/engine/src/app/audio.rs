/// Fire-and-forget audio notifications. No acknowledgement, no feedback
/// into simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioEvent {
    HitEnemy,
    HitPlayer,
    PlayerHeadImpact,
    PlayerPickup,
    PlayerPickupEnemy,
    PlayerThrow,
    BallBounce,
    CollectWaypoint,
    CollectBonus,
    CollectLamp,
}

pub trait AudioSink {
    fn play_event(&mut self, event: AudioEvent);
    fn select_song(&mut self, song: u8);
}

#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_event(&mut self, _event: AudioEvent) {}

    fn select_song(&mut self, _song: u8) {}
}
