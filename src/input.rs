use std::collections::HashSet;

/// Index of the primary (left) pointer button, matching DOM `MouseEvent.button`
pub const BUTTON_PRIMARY: u16 = 0;

/// Pointer state sampled once per frame
///
/// Host event handlers feed it with `pointer_moved`, `button_pressed` and
/// `button_released`; the frame reads `is_clicked` and then calls
/// `end_frame`, so a click is seen by exactly one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pointer: (f64, f64),
    down: HashSet<u16>,
    clicked: HashSet<u16>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in canvas pixels, origin top left
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    /// Every press is a click, hosts never repeat a press while held
    pub fn button_pressed(&mut self, button: u16) {
        self.down.insert(button);
        self.clicked.insert(button);
    }

    pub fn button_released(&mut self, button: u16) {
        self.down.remove(&button);
    }

    /// The host lost the pointer, nothing is held anymore
    pub fn cancel(&mut self) {
        self.down.clear();
    }

    /// Whether `button` went down since the last `end_frame`
    pub fn is_clicked(&self, button: u16) -> bool {
        self.clicked.contains(&button)
    }

    pub fn is_down(&self, button: u16) -> bool {
        self.down.contains(&button)
    }

    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    pub fn end_frame(&mut self) {
        self.clicked.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn click_lasts_one_frame() {
        let mut input = InputState::new();
        input.pointer_moved(3.0, 4.0);
        input.button_pressed(BUTTON_PRIMARY);

        assert!(input.is_clicked(BUTTON_PRIMARY));
        assert!(!input.is_clicked(2));
        assert_eq!((3.0, 4.0), input.pointer());

        input.end_frame();
        assert!(!input.is_clicked(BUTTON_PRIMARY));
        assert!(input.is_down(BUTTON_PRIMARY));
    }

    #[test]
    fn press_after_missed_release_clicks_again() {
        let mut input = InputState::new();
        input.button_pressed(BUTTON_PRIMARY);
        input.end_frame();
        input.end_frame();

        input.button_pressed(BUTTON_PRIMARY);

        assert!(input.is_clicked(BUTTON_PRIMARY));
        assert!(input.is_down(BUTTON_PRIMARY));
    }

    #[test]
    fn cancel_releases_every_button() {
        let mut input = InputState::new();
        input.button_pressed(BUTTON_PRIMARY);
        input.button_pressed(2);

        input.cancel();

        assert!(!input.is_down(BUTTON_PRIMARY));
        assert!(!input.is_down(2));
        assert!(input.is_clicked(BUTTON_PRIMARY));
    }

    #[test]
    fn press_and_release_within_a_frame_still_clicks() {
        let mut input = InputState::new();
        input.button_pressed(BUTTON_PRIMARY);
        input.button_released(BUTTON_PRIMARY);

        assert!(input.is_clicked(BUTTON_PRIMARY));
        assert!(!input.is_down(BUTTON_PRIMARY));
    }
}
