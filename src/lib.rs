#[cfg(not(target_arch = "wasm32"))]
use thiserror::Error;

pub mod app;
pub mod color;
pub mod config;
pub mod context;
#[cfg(not(target_arch = "wasm32"))]
pub mod headless;
pub mod input;
pub mod math;
pub mod primitives;
pub mod scene;
pub mod shader;
pub mod shape;
pub mod ui;
#[cfg(target_arch = "wasm32")]
pub mod webgl;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug, Error)]
pub enum GraphicsInitError {
    #[error("failed to find adapter for WGPU instance")]
    NoAdapter,
    #[error("WGPU failed to request device: {0}")]
    NoDevice(#[from] wgpu::RequestDeviceError),
}

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

pub mod prelude {
    pub use crate::app::{App, AppError};
    pub use crate::color::{hex_to_rgb, ColorError, Rgb};
    pub use crate::config::AppConfig;
    pub use crate::context::{ContextError, RenderContext};
    pub use crate::input::{InputState, BUTTON_PRIMARY};
    pub use crate::primitives::{DrawMode, Vertex, VertexAttribute};
    pub use crate::scene::Scene;
    pub use crate::shader::{Shader, ShaderError};
    pub use crate::shape::{
        ComputeGeometry, Geometry, InvalidGeometryError, RenderError, ResourceCreationError,
        Shape, ShapeError, Triangle,
    };
    pub use crate::ui::{CanvasMode, UiState};
}

#[cfg(not(target_arch = "wasm32"))]
mod linux;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

#[cfg(not(target_arch = "wasm32"))]
pub use linux::*;
