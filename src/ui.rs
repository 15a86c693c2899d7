#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
pub use wasm::*;

/// Name of the control group selecting the canvas mode
pub const CANVAS_GROUP: &str = "Canvas";

/// What the "Canvas" control currently asks for
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CanvasMode {
    #[default]
    Draw,
    /// Clears the scene every frame while selected
    Clear,
}

impl CanvasMode {
    pub const ALL: [CanvasMode; 2] = [CanvasMode::Draw, CanvasMode::Clear];

    pub fn label(self) -> &'static str {
        match self {
            CanvasMode::Draw => "Draw",
            CanvasMode::Clear => "Clear Canvas",
        }
    }
}

/// Values of the on-page controls, refreshed once per frame
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct UiState {
    pub canvas: CanvasMode,
}

impl UiState {
    pub fn should_clear(&self) -> bool {
        self.canvas == CanvasMode::Clear
    }
}
