use super::game::AbortRequested;

/// Summary handed to the status page collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    pub level_number: u16,
    pub lives: i16,
    pub extra_bonus: i16,
    pub bonus_collected: u32,
    pub hp: u8,
}

/// What the gateway reported back from one pumped frame of a blocking
/// sequence (the end-of-game animation waits on this).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    Idle,
    Confirm,
}

/// Opaque, possibly blocking UI calls. Password and status screens render
/// and read input on their own; the simulation only waits for the result.
pub trait UiGateway {
    fn view_password(&mut self, level_index: u8) -> Result<(), AbortRequested>;
    fn view_status(&mut self, status: StatusView) -> Result<(), AbortRequested>;
    /// Paces one frame of a scripted sequence and reports key state.
    fn pump_frame(&mut self) -> Result<UiSignal, AbortRequested>;
}

#[derive(Debug, Default)]
pub struct NullUi;

impl UiGateway for NullUi {
    fn view_password(&mut self, _level_index: u8) -> Result<(), AbortRequested> {
        Ok(())
    }

    fn view_status(&mut self, _status: StatusView) -> Result<(), AbortRequested> {
        Ok(())
    }

    fn pump_frame(&mut self) -> Result<UiSignal, AbortRequested> {
        // Headless runs skip scripted sequences immediately.
        Ok(UiSignal::Confirm)
    }
}
