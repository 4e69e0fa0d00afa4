#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ActionButton,
    Quit,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::ActionButton => 4,
            InputAction::Quit => 5,
        }
    }
}

/// Digital input for a single simulation tick. Axes are derived from the
/// held action states; the service keys are edge-triggered and consumed by
/// one tick only.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    display_energy_pressed: bool,
    status_page_pressed: bool,
    lose_life_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        if action == InputAction::Quit && is_down {
            self.quit_requested = true;
        }
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_display_energy_pressed(mut self, pressed: bool) -> Self {
        self.display_energy_pressed = pressed;
        self
    }

    pub fn with_status_page_pressed(mut self, pressed: bool) -> Self {
        self.status_page_pressed = pressed;
        self
    }

    pub fn with_lose_life_pressed(mut self, pressed: bool) -> Self {
        self.lose_life_pressed = pressed;
        self
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// -1 left, 0 neutral, 1 right.
    pub fn x_axis(&self) -> i8 {
        self.actions.is_down(InputAction::MoveRight) as i8
            - self.actions.is_down(InputAction::MoveLeft) as i8
    }

    /// -1 up, 0 neutral, 1 down.
    pub fn y_axis(&self) -> i8 {
        self.actions.is_down(InputAction::MoveDown) as i8
            - self.actions.is_down(InputAction::MoveUp) as i8
    }

    pub fn action_down(&self) -> bool {
        self.actions.is_down(InputAction::ActionButton)
    }

    pub fn display_energy_pressed(&self) -> bool {
        self.display_energy_pressed
    }

    pub fn status_page_pressed(&self) -> bool {
        self.status_page_pressed
    }

    pub fn lose_life_pressed(&self) -> bool {
        self.lose_life_pressed
    }
}

/// Produces one snapshot per tick. The windowing layer that feeds real key
/// events lives outside this workspace; tests and the demo binary script
/// their own sources.
pub trait InputSource {
    fn poll(&mut self) -> InputSnapshot;
}

#[derive(Debug, Default)]
pub struct NullInput;

impl InputSource for NullInput {
    fn poll(&mut self) -> InputSnapshot {
        InputSnapshot::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_derive_from_held_actions() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveDown, true);

        assert_eq!(snapshot.x_axis(), -1);
        assert_eq!(snapshot.y_axis(), 1);
    }

    #[test]
    fn opposing_directions_cancel() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true);

        assert_eq!(snapshot.x_axis(), 0);
    }

    #[test]
    fn quit_action_marks_quit_requested() {
        let snapshot = InputSnapshot::empty().with_action_down(InputAction::Quit, true);
        assert!(snapshot.quit_requested());
    }

    #[test]
    fn service_key_edges_default_off() {
        let snapshot = InputSnapshot::empty();
        assert!(!snapshot.display_energy_pressed());
        assert!(!snapshot.status_page_pressed());
        assert!(!snapshot.lose_life_pressed());
    }

    #[test]
    fn null_input_is_always_empty() {
        let mut source = NullInput;
        let snapshot = source.poll();
        assert_eq!(snapshot.x_axis(), 0);
        assert!(!snapshot.action_down());
        assert!(!snapshot.quit_requested());
    }
}
