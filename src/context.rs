use crate::color::Rgb;
use crate::primitives::{DrawMode, Vertex, VertexAttribute};
use thiserror::Error;

#[cfg(test)]
pub mod recording;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("graphics context is lost")]
    ContextLost,
    #[error("graphics context could not allocate {0}")]
    AllocationFailed(&'static str),
    #[error("draw issued with no vertex array binding bound")]
    NothingBound,
    #[error("graphics backend error: {0}")]
    Backend(String),
}

/// The device operations shapes and scenes need
///
/// Calls are applied in the order they are made. Shader uniforms are shared
/// state, so callers must not interleave one shape's uniform writes with
/// another shape's draw.
pub trait RenderContext {
    type Buffer;
    type Binding;

    /// Upload vertices into an immutable (static draw) vertex buffer
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<Self::Buffer, ContextError>;

    /// Upload indices into an immutable (static draw) index buffer
    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<Self::Buffer, ContextError>;

    /// Record a vertex array binding: `vertices` feeds `attribute`, `indices` is the
    /// element buffer. Nothing is left bound when this returns.
    fn create_binding(
        &mut self,
        vertices: &Self::Buffer,
        indices: &Self::Buffer,
        attribute: VertexAttribute,
    ) -> Result<Self::Binding, ContextError>;

    fn bind(&mut self, binding: Option<&Self::Binding>);

    /// Indexed draw of `count` u16 elements from the bound binding
    fn draw_elements(&mut self, mode: DrawMode, count: usize) -> Result<(), ContextError>;

    fn viewport(&mut self, width: u32, height: u32);

    /// Clear the color buffer to `color` with full alpha
    fn clear(&mut self, color: Rgb);

    fn delete_buffer(&mut self, buffer: Self::Buffer);

    fn delete_binding(&mut self, binding: Self::Binding);
}
