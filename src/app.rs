use crate::{
    color::{hex_to_rgb, ColorError, Rgb},
    config::AppConfig,
    context::RenderContext,
    input::{InputState, BUTTON_PRIMARY},
    scene::Scene,
    shader::{Shader, UNIFORM_RESOLUTION},
    shape::{RenderError, Shape, ShapeError, Triangle},
    ui::UiState,
};
use thiserror::Error;
use web_time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum AppError {
    #[error("invalid color in configuration: {0}")]
    Color(#[from] ColorError),
    #[error("triangle side_divisor must be positive, got {0}")]
    SideDivisor(f32),
    #[error("failed to add shape: {0}")]
    Shape(#[from] ShapeError),
    #[error("failed to render frame: {0}")]
    Render(#[from] RenderError),
}

struct FrameClock {
    last_frame: Instant,
    delta_time: Duration,
    frames: u64,
}

impl FrameClock {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_time: Duration::ZERO,
            frames: 0,
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        self.delta_time = now - self.last_frame;
        self.last_frame = now;
        self.frames += 1;
    }
}

/// Click-to-place-triangles app, driven one frame at a time by the host
pub struct App<C: RenderContext, S: Shader<C>> {
    scene: Scene<C>,
    shader: S,
    triangle_color: Rgb,
    side_divisor: f32,
    initial_size: (u32, u32),
    clock: FrameClock,
}

impl<C: RenderContext, S: Shader<C>> App<C, S> {
    /// `initial_size` is the canvas size at startup. Clicks are scaled into
    /// this space and the shader resolution stays fixed to it.
    pub fn new(config: &AppConfig, shader: S, initial_size: (u32, u32)) -> Result<Self, AppError> {
        let background = hex_to_rgb(&config.scene.background)?;
        let triangle_color = hex_to_rgb(&config.triangle.color)?;

        let side_divisor = config.triangle.side_divisor;
        // also rejects NaN
        if !(side_divisor > 0.0) {
            return Err(AppError::SideDivisor(side_divisor));
        }

        log::info!(
            "shapegl::app::App::new: starting {} at {}x{}",
            config.app.name,
            initial_size.0,
            initial_size.1
        );

        Ok(Self {
            scene: Scene::new(background),
            shader,
            triangle_color,
            side_divisor,
            initial_size: (initial_size.0.max(1), initial_size.1.max(1)),
            clock: FrameClock::new(),
        })
    }

    /// Run one frame: apply input, then draw
    ///
    /// A triangle that fails to build is left out of the frame; the error
    /// is returned after the frame has rendered.
    pub fn update(
        &mut self,
        ctx: &mut C,
        input: &mut InputState,
        ui: &UiState,
        canvas_size: (u32, u32),
    ) -> Result<(), AppError> {
        self.clock.tick();
        log::trace!(
            "shapegl::app::App::update: frame {} after {:?}",
            self.clock.frames,
            self.clock.delta_time
        );

        let added = if input.is_clicked(BUTTON_PRIMARY) {
            let position = self.scene_position(input.pointer(), canvas_size);
            self.add_triangle(ctx, position, self.side_length())
        } else {
            Ok(())
        };

        if ui.should_clear() {
            self.clear_shapes(ctx);
        }

        input.end_frame();
        self.render(ctx, canvas_size)?;

        added.map_err(AppError::from)
    }

    pub fn add_triangle(
        &mut self,
        ctx: &mut C,
        position: [f32; 2],
        side_length: f32,
    ) -> Result<(), ShapeError> {
        let triangle = Triangle::new(position, side_length);
        let shape = Shape::new(ctx, &self.shader, &triangle, self.triangle_color)?;
        log::debug!(
            "shapegl::app::App::add_triangle: triangle at ({}, {})",
            position[0],
            position[1]
        );
        self.scene.add(shape);
        Ok(())
    }

    pub fn clear_shapes(&mut self, ctx: &mut C) {
        self.scene.clear(ctx);
    }

    pub fn render(&self, ctx: &mut C, canvas_size: (u32, u32)) -> Result<(), RenderError> {
        let (width, height) = self.initial_size;

        self.shader.use_program(ctx);
        self.shader
            .set_uniform2f(ctx, UNIFORM_RESOLUTION, [width as f32, height as f32])?;
        self.scene
            .render_frame(ctx, &self.shader, canvas_size.0, canvas_size.1)
    }

    /// Map a pointer position on the current canvas into initial canvas space
    pub fn scene_position(&self, pointer: (f64, f64), canvas_size: (u32, u32)) -> [f32; 2] {
        let scale_x = self.initial_size.0 as f64 / canvas_size.0.max(1) as f64;
        let scale_y = self.initial_size.1 as f64 / canvas_size.1.max(1) as f64;
        [(pointer.0 * scale_x) as f32, (pointer.1 * scale_y) as f32]
    }

    pub fn side_length(&self) -> f32 {
        self.initial_size.0 as f32 / self.side_divisor * std::f32::consts::SQRT_2
    }

    pub fn scene(&self) -> &Scene<C> {
        &self.scene
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frames
    }
}
