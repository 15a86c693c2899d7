use crate::context::RenderContext;
use thiserror::Error;

pub const ATTRIBUTE_POSITION: &str = "a_position";
pub const UNIFORM_COLOR: &str = "u_color";
pub const UNIFORM_RESOLUTION: &str = "u_resolution";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("graphics context could not create a {0} object")]
    Creation(&'static str),
    #[error("shader failed to compile: {0}")]
    Compile(String),
    #[error("program failed to link: {0}")]
    Link(String),
    #[error("program has no uniform named {0:?}")]
    UnknownUniform(String),
    #[error("program has no attribute named {0:?}")]
    UnknownAttribute(String),
}

/// A compiled program on a `RenderContext`
pub trait Shader<C: RenderContext> {
    fn use_program(&self, ctx: &mut C);

    fn set_uniform2f(&self, ctx: &mut C, name: &str, value: [f32; 2]) -> Result<(), ShaderError>;

    fn set_uniform3f(&self, ctx: &mut C, name: &str, value: [f32; 3]) -> Result<(), ShaderError>;

    fn attribute_location(&self, ctx: &C, name: &str) -> Result<u32, ShaderError>;
}
