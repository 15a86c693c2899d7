//! In-memory `RenderContext` that records every call, for tests

use super::{ContextError, RenderContext};
use crate::color::Rgb;
use crate::primitives::{DrawMode, Vertex, VertexAttribute};
use crate::shader::{Shader, ShaderError, ATTRIBUTE_POSITION};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateVertexBuffer(u32, Vec<Vertex>),
    CreateIndexBuffer(u32, Vec<u16>),
    CreateBinding {
        id: u32,
        vertices: u32,
        indices: u32,
        attribute: VertexAttribute,
    },
    Bind(Option<u32>),
    Draw(DrawMode, usize),
    Viewport(u32, u32),
    Clear(Rgb),
    DeleteBuffer(u32),
    DeleteBinding(u32),
    UseProgram,
    Uniform2f(String, [f32; 2]),
    Uniform3f(String, [f32; 3]),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailOn {
    VertexBuffer,
    IndexBuffer,
    Binding,
    /// Every draw fails as if the context was lost
    Draw,
    /// `RecordingShader` rejects every uniform write
    Uniform,
    /// `RecordingShader` knows no attributes
    Attribute,
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    pub calls: Vec<Call>,
    pub fail_on: Option<FailOn>,
    live: BTreeSet<u32>,
    bound: Option<u32>,
    next_id: u32,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(fail_on: FailOn) -> Self {
        Self {
            fail_on: Some(fail_on),
            ..Self::default()
        }
    }

    /// Handles created and not yet deleted
    pub fn live(&self) -> &BTreeSet<u32> {
        &self.live
    }

    pub fn draws(&self) -> Vec<(DrawMode, usize)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                &Call::Draw(mode, count) => Some((mode, count)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    fn allocate(&mut self, what: FailOn, name: &'static str) -> Result<u32, ContextError> {
        if self.fail_on == Some(what) {
            return Err(ContextError::AllocationFailed(name));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        Ok(id)
    }
}

impl RenderContext for RecordingContext {
    type Buffer = u32;
    type Binding = u32;

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<u32, ContextError> {
        let id = self.allocate(FailOn::VertexBuffer, "vertex buffer")?;
        self.calls.push(Call::CreateVertexBuffer(id, vertices.to_vec()));
        Ok(id)
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<u32, ContextError> {
        let id = self.allocate(FailOn::IndexBuffer, "index buffer")?;
        self.calls.push(Call::CreateIndexBuffer(id, indices.to_vec()));
        Ok(id)
    }

    fn create_binding(
        &mut self,
        vertices: &u32,
        indices: &u32,
        attribute: VertexAttribute,
    ) -> Result<u32, ContextError> {
        let id = self.allocate(FailOn::Binding, "vertex array")?;
        self.calls.push(Call::CreateBinding {
            id,
            vertices: *vertices,
            indices: *indices,
            attribute,
        });
        Ok(id)
    }

    fn bind(&mut self, binding: Option<&u32>) {
        self.bound = binding.copied();
        self.calls.push(Call::Bind(binding.copied()));
    }

    fn draw_elements(&mut self, mode: DrawMode, count: usize) -> Result<(), ContextError> {
        if self.bound.is_none() {
            return Err(ContextError::NothingBound);
        }
        if self.fail_on == Some(FailOn::Draw) {
            return Err(ContextError::ContextLost);
        }
        self.calls.push(Call::Draw(mode, count));
        Ok(())
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Viewport(width, height));
    }

    fn clear(&mut self, color: Rgb) {
        self.calls.push(Call::Clear(color));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.live.remove(&buffer);
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn delete_binding(&mut self, binding: u32) {
        self.live.remove(&binding);
        self.calls.push(Call::DeleteBinding(binding));
    }
}

/// Shader that knows `a_position` at location 0 and accepts any uniform,
/// unless the context is set to fail on uniforms or attributes
#[derive(Debug, Default)]
pub struct RecordingShader;

impl Shader<RecordingContext> for RecordingShader {
    fn use_program(&self, ctx: &mut RecordingContext) {
        ctx.calls.push(Call::UseProgram);
    }

    fn set_uniform2f(
        &self,
        ctx: &mut RecordingContext,
        name: &str,
        value: [f32; 2],
    ) -> Result<(), ShaderError> {
        if ctx.fail_on == Some(FailOn::Uniform) {
            return Err(ShaderError::UnknownUniform(name.to_owned()));
        }
        ctx.calls.push(Call::Uniform2f(name.to_owned(), value));
        Ok(())
    }

    fn set_uniform3f(
        &self,
        ctx: &mut RecordingContext,
        name: &str,
        value: [f32; 3],
    ) -> Result<(), ShaderError> {
        if ctx.fail_on == Some(FailOn::Uniform) {
            return Err(ShaderError::UnknownUniform(name.to_owned()));
        }
        ctx.calls.push(Call::Uniform3f(name.to_owned(), value));
        Ok(())
    }

    fn attribute_location(&self, ctx: &RecordingContext, name: &str) -> Result<u32, ShaderError> {
        if name == ATTRIBUTE_POSITION && ctx.fail_on != Some(FailOn::Attribute) {
            Ok(0)
        } else {
            Err(ShaderError::UnknownAttribute(name.to_owned()))
        }
    }
}
