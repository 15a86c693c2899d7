//! WebGL2 implementation of the rendering capabilities

use crate::{
    color::Rgb,
    context::{ContextError, RenderContext},
    primitives::{DrawMode, Vertex, VertexAttribute},
    shader::{Shader, ShaderError},
};
use std::collections::HashMap;
use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

pub const VERTEX_SHADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res/shape.vert"));
pub const FRAGMENT_SHADER: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res/shape.frag"));

pub struct WebGlContext {
    gl: GL,
}

impl WebGlContext {
    pub fn new(gl: GL) -> Self {
        Self { gl }
    }

    pub fn gl(&self) -> &GL {
        &self.gl
    }

    fn allocation_error(&self, what: &'static str) -> ContextError {
        if self.gl.is_context_lost() {
            ContextError::ContextLost
        } else {
            ContextError::AllocationFailed(what)
        }
    }

    fn create_buffer(
        &self,
        target: u32,
        data: &[u8],
        what: &'static str,
    ) -> Result<WebGlBuffer, ContextError> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or_else(|| self.allocation_error(what))?;
        self.gl.bind_buffer(target, Some(&buffer));
        self.gl.buffer_data_with_u8_array(target, data, GL::STATIC_DRAW);
        self.gl.bind_buffer(target, None);

        if self.gl.get_error() == GL::OUT_OF_MEMORY {
            self.gl.delete_buffer(Some(&buffer));
            return Err(ContextError::AllocationFailed(what));
        }

        Ok(buffer)
    }
}

fn gl_draw_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Points => GL::POINTS,
        DrawMode::Lines => GL::LINES,
        DrawMode::LineStrip => GL::LINE_STRIP,
        DrawMode::Triangles => GL::TRIANGLES,
        DrawMode::TriangleStrip => GL::TRIANGLE_STRIP,
    }
}

impl RenderContext for WebGlContext {
    type Buffer = WebGlBuffer;
    type Binding = WebGlVertexArrayObject;

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<WebGlBuffer, ContextError> {
        self.create_buffer(
            GL::ARRAY_BUFFER,
            bytemuck::cast_slice(vertices),
            "vertex buffer",
        )
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<WebGlBuffer, ContextError> {
        self.create_buffer(
            GL::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(indices),
            "index buffer",
        )
    }

    fn create_binding(
        &mut self,
        vertices: &WebGlBuffer,
        indices: &WebGlBuffer,
        attribute: VertexAttribute,
    ) -> Result<WebGlVertexArrayObject, ContextError> {
        let vao = self
            .gl
            .create_vertex_array()
            .ok_or_else(|| self.allocation_error("vertex array"))?;

        self.gl.bind_vertex_array(Some(&vao));
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(vertices));
        self.gl.vertex_attrib_pointer_with_i32(
            attribute.location,
            attribute.components as i32,
            GL::FLOAT,
            false,
            attribute.stride as i32,
            0,
        );
        self.gl.enable_vertex_attrib_array(attribute.location);
        // element buffer binding is recorded in the vao
        self.gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(indices));
        self.gl.bind_vertex_array(None);
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);

        Ok(vao)
    }

    fn bind(&mut self, binding: Option<&WebGlVertexArrayObject>) {
        self.gl.bind_vertex_array(binding);
    }

    fn draw_elements(&mut self, mode: DrawMode, count: usize) -> Result<(), ContextError> {
        if self.gl.is_context_lost() {
            return Err(ContextError::ContextLost);
        }

        let count = i32::try_from(count)
            .map_err(|_| ContextError::Backend(format!("index count {count} exceeds i32")))?;
        self.gl
            .draw_elements_with_i32(gl_draw_mode(mode), count, GL::UNSIGNED_SHORT, 0);
        Ok(())
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn clear(&mut self, color: Rgb) {
        self.gl.clear_color(color.r, color.g, color.b, 1.0);
        self.gl.clear(GL::COLOR_BUFFER_BIT);
    }

    fn delete_buffer(&mut self, buffer: WebGlBuffer) {
        self.gl.delete_buffer(Some(&buffer));
    }

    fn delete_binding(&mut self, binding: WebGlVertexArrayObject) {
        self.gl.delete_vertex_array(Some(&binding));
    }
}

/// A linked GLSL program with its active uniforms looked up once
pub struct GlShader {
    program: WebGlProgram,
    uniforms: HashMap<String, WebGlUniformLocation>,
}

impl GlShader {
    pub fn new(ctx: &WebGlContext, vertex_src: &str, fragment_src: &str) -> Result<Self, ShaderError> {
        let gl = ctx.gl();

        let vertex = compile_shader(gl, GL::VERTEX_SHADER, vertex_src)?;
        let fragment = match compile_shader(gl, GL::FRAGMENT_SHADER, fragment_src) {
            Ok(fragment) => fragment,
            Err(e) => {
                gl.delete_shader(Some(&vertex));
                return Err(e);
            }
        };

        let program = link_program(gl, &vertex, &fragment);
        // the program keeps the compiled stages alive
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));
        let program = program?;

        let active = gl
            .get_program_parameter(&program, GL::ACTIVE_UNIFORMS)
            .as_f64()
            .unwrap_or_default() as u32;

        let uniforms = (0..active)
            .filter_map(|idx| gl.get_active_uniform(&program, idx))
            .filter_map(|info| {
                let name = info.name();
                gl.get_uniform_location(&program, &name)
                    .map(|location| (name, location))
            })
            .collect::<HashMap<_, _>>();

        log::debug!(
            "shapegl::webgl::GlShader::new: linked program with uniforms {:?}",
            uniforms.keys().collect::<Vec<_>>()
        );

        Ok(Self { program, uniforms })
    }

    fn uniform(&self, name: &str) -> Result<&WebGlUniformLocation, ShaderError> {
        self.uniforms
            .get(name)
            .ok_or_else(|| ShaderError::UnknownUniform(name.to_owned()))
    }
}

fn compile_shader(gl: &GL, stage: u32, source: &str) -> Result<WebGlShader, ShaderError> {
    let shader = gl
        .create_shader(stage)
        .ok_or(ShaderError::Creation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(ShaderError::Compile(log))
    }
}

fn link_program(
    gl: &GL,
    vertex: &WebGlShader,
    fragment: &WebGlShader,
) -> Result<WebGlProgram, ShaderError> {
    let program = gl
        .create_program()
        .ok_or(ShaderError::Creation("program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(ShaderError::Link(log))
    }
}

impl Shader<WebGlContext> for GlShader {
    fn use_program(&self, ctx: &mut WebGlContext) {
        ctx.gl().use_program(Some(&self.program));
    }

    fn set_uniform2f(
        &self,
        ctx: &mut WebGlContext,
        name: &str,
        value: [f32; 2],
    ) -> Result<(), ShaderError> {
        let [x, y] = value;
        ctx.gl().uniform2f(Some(self.uniform(name)?), x, y);
        Ok(())
    }

    fn set_uniform3f(
        &self,
        ctx: &mut WebGlContext,
        name: &str,
        value: [f32; 3],
    ) -> Result<(), ShaderError> {
        let [x, y, z] = value;
        ctx.gl().uniform3f(Some(self.uniform(name)?), x, y, z);
        Ok(())
    }

    fn attribute_location(&self, ctx: &WebGlContext, name: &str) -> Result<u32, ShaderError> {
        let location = ctx.gl().get_attrib_location(&self.program, name);
        u32::try_from(location).map_err(|_| ShaderError::UnknownAttribute(name.to_owned()))
    }
}
