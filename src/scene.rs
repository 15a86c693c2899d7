use crate::{
    color::Rgb,
    context::RenderContext,
    shader::Shader,
    shape::{RenderError, Shape},
};

/// Ordered list of shapes, painted back to front in insertion order
///
/// Every shape writes the shared color uniform right before its draw, so
/// shapes are always rendered one at a time in list order.
pub struct Scene<C: RenderContext> {
    shapes: Vec<Shape<C>>,
    background: Rgb,
}

impl<C: RenderContext> Scene<C> {
    pub fn new(background: Rgb) -> Self {
        Self {
            shapes: vec![],
            background,
        }
    }

    pub fn add(&mut self, shape: Shape<C>) {
        self.shapes.push(shape);
    }

    /// Remove every shape and release its device resources
    pub fn clear(&mut self, ctx: &mut C) {
        if self.shapes.is_empty() {
            return;
        }

        log::debug!(
            "shapegl::scene::Scene::clear: releasing {} shapes",
            self.shapes.len()
        );
        for shape in self.shapes.drain(..) {
            shape.release(ctx);
        }
    }

    pub fn render_frame<S: Shader<C>>(
        &self,
        ctx: &mut C,
        shader: &S,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        ctx.viewport(width, height);
        ctx.clear(self.background);

        for shape in &self.shapes {
            shape.render(ctx, shader)?;
        }

        Ok(())
    }

    pub fn shapes(&self) -> &[Shape<C>] {
        self.shapes.as_slice()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
