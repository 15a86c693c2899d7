use crate::{
    color::Rgb,
    context::{ContextError, RenderContext},
    primitives::{DrawMode, Vertex, VertexAttribute},
    shader::{Shader, ShaderError, ATTRIBUTE_POSITION, UNIFORM_COLOR},
};
use thiserror::Error;

pub mod triangle;
pub use triangle::Triangle;

/// CPU side geometry of a shape
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Anything that can describe itself as indexed geometry
pub trait ComputeGeometry {
    fn compute_geometry(&self) -> Geometry;

    fn draw_mode(&self) -> DrawMode {
        DrawMode::Triangles
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResourceCreationError {
    #[error("failed to create vertex buffer: {0}")]
    VertexBuffer(ContextError),
    #[error("failed to create index buffer: {0}")]
    IndexBuffer(ContextError),
    #[error("failed to create vertex array binding: {0}")]
    Binding(ContextError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidGeometryError {
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },
    #[error("{0} vertices cannot be addressed by u16 indices")]
    TooManyVertices(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error(transparent)]
    ResourceCreation(#[from] ResourceCreationError),
    #[error(transparent)]
    InvalidGeometry(#[from] InvalidGeometryError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

impl Geometry {
    pub fn validate(&self) -> Result<(), InvalidGeometryError> {
        let vertex_count = self.vertices.len();
        if vertex_count > u16::MAX as usize + 1 {
            return Err(InvalidGeometryError::TooManyVertices(vertex_count));
        }

        match self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            Some(&index) => Err(InvalidGeometryError::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

/// A drawable primitive backed by device buffers
///
/// The buffers and binding are created once in the constructor and stay
/// the same until `Shape::release`.
pub struct Shape<C: RenderContext> {
    geometry: Geometry,
    color: Rgb,
    draw_mode: DrawMode,
    vertex_buffer: C::Buffer,
    index_buffer: C::Buffer,
    binding: C::Binding,
}

impl<C: RenderContext> Shape<C> {
    pub fn new<S: Shader<C>>(
        ctx: &mut C,
        shader: &S,
        source: &impl ComputeGeometry,
        color: Rgb,
    ) -> Result<Self, ShapeError> {
        Self::with_geometry(
            ctx,
            shader,
            source.compute_geometry(),
            color,
            source.draw_mode(),
        )
    }

    pub fn with_geometry<S: Shader<C>>(
        ctx: &mut C,
        shader: &S,
        geometry: Geometry,
        color: Rgb,
        draw_mode: DrawMode,
    ) -> Result<Self, ShapeError> {
        geometry.validate()?;
        let location = shader.attribute_location(ctx, ATTRIBUTE_POSITION)?;

        let vertex_buffer = ctx
            .create_vertex_buffer(&geometry.vertices)
            .map_err(ResourceCreationError::VertexBuffer)?;

        let index_buffer = match ctx.create_index_buffer(&geometry.indices) {
            Ok(buffer) => buffer,
            Err(e) => {
                ctx.delete_buffer(vertex_buffer);
                return Err(ResourceCreationError::IndexBuffer(e).into());
            }
        };

        let binding = match ctx.create_binding(
            &vertex_buffer,
            &index_buffer,
            VertexAttribute::position(location),
        ) {
            Ok(binding) => binding,
            Err(e) => {
                ctx.delete_buffer(index_buffer);
                ctx.delete_buffer(vertex_buffer);
                return Err(ResourceCreationError::Binding(e).into());
            }
        };

        log::debug!(
            "shapegl::shape::Shape::with_geometry: created shape with {} vertices, {} indices",
            geometry.vertices.len(),
            geometry.indices.len()
        );

        Ok(Self {
            geometry,
            color,
            draw_mode,
            vertex_buffer,
            index_buffer,
            binding,
        })
    }

    /// Draw the shape with its own fill color
    /// Overwrites the shader's color uniform
    pub fn render<S: Shader<C>>(&self, ctx: &mut C, shader: &S) -> Result<(), RenderError> {
        ctx.bind(Some(&self.binding));
        let result = self.draw(ctx, shader);
        ctx.bind(None);
        result
    }

    fn draw<S: Shader<C>>(&self, ctx: &mut C, shader: &S) -> Result<(), RenderError> {
        shader.set_uniform3f(ctx, UNIFORM_COLOR, self.color.to_array())?;
        ctx.draw_elements(self.draw_mode, self.geometry.indices.len())?;
        Ok(())
    }

    /// Delete the device resources owned by this shape
    pub fn release(self, ctx: &mut C) {
        ctx.delete_binding(self.binding);
        ctx.delete_buffer(self.index_buffer);
        ctx.delete_buffer(self.vertex_buffer);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::recording::{Call, FailOn, RecordingContext, RecordingShader};

    fn quad() -> Geometry {
        Geometry {
            vertices: vec![
                Vertex::new(0.0, 0.0),
                Vertex::new(1.0, 0.0),
                Vertex::new(1.0, 1.0),
                Vertex::new(0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);

    fn build(
        ctx: &mut RecordingContext,
        geometry: Geometry,
        mode: DrawMode,
    ) -> Result<Shape<RecordingContext>, ShapeError> {
        Shape::with_geometry(ctx, &RecordingShader, geometry, RED, mode)
    }

    #[test]
    fn construction_uploads_and_binds_position() {
        let mut ctx = RecordingContext::new();
        let geometry = quad();

        let shape = build(&mut ctx, geometry.clone(), DrawMode::Triangles).unwrap();

        assert_eq!(
            vec![
                Call::CreateVertexBuffer(0, geometry.vertices.clone()),
                Call::CreateIndexBuffer(1, geometry.indices.clone()),
                Call::CreateBinding {
                    id: 2,
                    vertices: 0,
                    indices: 1,
                    attribute: VertexAttribute {
                        location: 0,
                        components: 2,
                        stride: 8,
                    },
                },
            ],
            ctx.calls
        );
        assert_eq!(&geometry, shape.geometry());
    }

    #[test]
    fn render_sets_color_then_draws_and_unbinds() {
        let mut ctx = RecordingContext::new();
        let shape = build(&mut ctx, quad(), DrawMode::Triangles).unwrap();
        ctx.calls.clear();

        shape.render(&mut ctx, &RecordingShader).unwrap();
        shape.render(&mut ctx, &RecordingShader).unwrap();

        let frame = vec![
            Call::Bind(Some(2)),
            Call::Uniform3f(UNIFORM_COLOR.to_owned(), [1.0, 0.0, 0.0]),
            Call::Draw(DrawMode::Triangles, 6),
            Call::Bind(None),
        ];
        assert_eq!([frame.clone(), frame].concat(), ctx.calls);
    }

    #[test]
    fn failed_index_buffer_frees_vertex_buffer() {
        let mut ctx = RecordingContext::failing_on(FailOn::IndexBuffer);

        let result = build(&mut ctx, quad(), DrawMode::Triangles);

        assert!(matches!(
            result,
            Err(ShapeError::ResourceCreation(ResourceCreationError::IndexBuffer(_)))
        ));
        assert!(ctx.live().is_empty());
        assert_eq!(0, ctx.count(|call| matches!(call, Call::Bind(Some(_)))));
    }

    #[test]
    fn failed_binding_frees_both_buffers() {
        let mut ctx = RecordingContext::failing_on(FailOn::Binding);

        let result = build(&mut ctx, quad(), DrawMode::Triangles);

        assert!(matches!(
            result,
            Err(ShapeError::ResourceCreation(ResourceCreationError::Binding(_)))
        ));
        assert!(ctx.live().is_empty());
    }

    #[test]
    fn unknown_position_attribute_creates_nothing() {
        let mut ctx = RecordingContext::failing_on(FailOn::Attribute);

        let result = build(&mut ctx, quad(), DrawMode::Triangles);

        assert_eq!(
            Some(ShapeError::Shader(ShaderError::UnknownAttribute(
                ATTRIBUTE_POSITION.to_owned()
            ))),
            result.err()
        );
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn failed_draw_still_unbinds() {
        let mut ctx = RecordingContext::new();
        let shape = build(&mut ctx, quad(), DrawMode::Triangles).unwrap();
        ctx.calls.clear();
        ctx.fail_on = Some(FailOn::Draw);

        let result = shape.render(&mut ctx, &RecordingShader);

        assert_eq!(Err(RenderError::Context(ContextError::ContextLost)), result);
        assert_eq!(Some(&Call::Bind(None)), ctx.calls.last());
        assert!(ctx.draws().is_empty());
    }

    #[test]
    fn failed_color_uniform_skips_draw_and_unbinds() {
        let mut ctx = RecordingContext::new();
        let shape = build(&mut ctx, quad(), DrawMode::Triangles).unwrap();
        ctx.calls.clear();
        ctx.fail_on = Some(FailOn::Uniform);

        let result = shape.render(&mut ctx, &RecordingShader);

        assert_eq!(
            Err(RenderError::Shader(ShaderError::UnknownUniform(
                UNIFORM_COLOR.to_owned()
            ))),
            result
        );
        assert_eq!(vec![Call::Bind(Some(2)), Call::Bind(None)], ctx.calls);
    }

    #[test]
    fn failed_vertex_buffer_names_vertex_buffer() {
        let mut ctx = RecordingContext::failing_on(FailOn::VertexBuffer);

        let result = build(&mut ctx, quad(), DrawMode::Triangles);

        assert_eq!(
            Some(ShapeError::ResourceCreation(
                ResourceCreationError::VertexBuffer(ContextError::AllocationFailed(
                    "vertex buffer"
                ))
            )),
            result.err()
        );
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut ctx = RecordingContext::new();
        let mut geometry = quad();
        geometry.indices.push(4);

        let result = build(&mut ctx, geometry, DrawMode::Triangles);

        assert_eq!(
            Some(ShapeError::InvalidGeometry(
                InvalidGeometryError::IndexOutOfRange {
                    index: 4,
                    vertex_count: 4,
                }
            )),
            result.err()
        );
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn release_deletes_everything() {
        let mut ctx = RecordingContext::new();
        let shape = build(&mut ctx, quad(), DrawMode::LineStrip).unwrap();
        assert_eq!(3, ctx.live().len());

        shape.release(&mut ctx);

        assert!(ctx.live().is_empty());
    }

    #[test]
    fn empty_geometry_is_valid() {
        assert_eq!(Ok(()), Geometry::default().validate());
    }
}
