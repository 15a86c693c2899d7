use crate::{
    color::Rgb,
    context::{ContextError, RenderContext},
    primitives::{DrawMode, Vertex, VertexAttribute},
    shader::{Shader, ShaderError, ATTRIBUTE_POSITION, UNIFORM_COLOR, UNIFORM_RESOLUTION},
    GraphicsInitError,
};
use bytemuck::{Pod, Zeroable};
use std::{collections::HashMap, num::NonZeroU64, rc::Rc};
use wgpu::util::DeviceExt;

pub const SHADER_SOURCE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res/shape.wgsl"));

/// Offscreen target format, bytes map 1:1 to the uniform colors
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Mirror of `ShapeUniforms` in shape.wgsl (vec3 is 16 byte aligned)
#[derive(Copy, Clone, Debug, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
struct ShapeUniforms {
    resolution: [f32; 2],
    _pad0: [f32; 2],
    color: [f32; 3],
    _pad1: f32,
}

const UNIFORMS_SIZE: u64 = std::mem::size_of::<ShapeUniforms>() as u64;

#[derive(Clone)]
pub struct HeadlessBinding {
    vertices: Rc<wgpu::Buffer>,
    indices: Rc<wgpu::Buffer>,
}

struct DrawCommand {
    pipelines: Rc<Pipelines>,
    binding: HeadlessBinding,
    mode: DrawMode,
    count: u32,
    uniforms: ShapeUniforms,
}

struct Pipelines {
    by_mode: HashMap<DrawMode, wgpu::RenderPipeline>,
}

/// Bytes per row of the readback buffer, padded for texture copies
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = std::mem::size_of::<u32>() as u32 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Size of a padded readback of a `size` texture
pub fn readback_size(size: (u32, u32)) -> wgpu::BufferAddress {
    padded_bytes_per_row(size.0) as wgpu::BufferAddress * size.1 as wgpu::BufferAddress
}

/// Drop the per-row padding of a texture copy
pub fn unpad_rows(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row = std::mem::size_of::<u32>() * width as usize;
    let padded = padded_bytes_per_row(width) as usize;
    data.chunks(padded)
        .take(height as usize)
        .flat_map(|chunk| &chunk[..row.min(chunk.len())])
        .copied()
        .collect()
}

/// Offscreen wgpu `RenderContext`
///
/// Draws are recorded as commands with a snapshot of the uniforms set just
/// before them, then encoded into one render pass by `submit`.
pub struct HeadlessContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    texture: wgpu::Texture,
    texture_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    size: (u32, u32),
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_stride: u64,
    viewport: (u32, u32),
    clear_color: Option<Rgb>,
    program: Option<Rc<Pipelines>>,
    uniforms: ShapeUniforms,
    bound: Option<HeadlessBinding>,
    commands: Vec<DrawCommand>,
}

pub async fn init(mut size: (u32, u32)) -> Result<HeadlessContext, GraphicsInitError> {
    log::debug!("shapegl::headless::init: Initializing renderer");

    size.0 = size.0.max(1);
    size.1 = size.1.max(1);

    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: None,
        })
        .await
        .ok_or(GraphicsInitError::NoAdapter)?;

    log::debug!("shapegl::headless::init: Requesting rendering device");
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("shapegl::headless"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        )
        .await?;

    fn unhandled_error(error: wgpu::Error) {
        log::error!("shapegl::headless: wgpu unhandled error: {error:?}");
    }
    device.on_uncaptured_error(Box::new(unhandled_error));

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        size: wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        label: Some("shapegl::headless::target"),
        usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let texture_view = texture.create_view(&Default::default());

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        size: readback_size(size),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        label: Some("shapegl::headless::readback"),
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("shapegl::headless::uniforms"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(UNIFORMS_SIZE),
            },
            count: None,
        }],
    });

    let align = device.limits().min_uniform_buffer_offset_alignment as u64;
    let uniform_stride = UNIFORMS_SIZE.div_ceil(align) * align;

    log::info!("shapegl::headless::init: {}x{} target ready", size.0, size.1);

    Ok(HeadlessContext {
        device,
        queue,
        texture,
        texture_view,
        readback,
        size,
        bind_group_layout,
        uniform_stride,
        viewport: size,
        clear_color: None,
        program: None,
        uniforms: ShapeUniforms::default(),
        bound: None,
        commands: vec![],
    })
}

impl HeadlessContext {
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Encode and submit everything recorded since the last submit
    pub fn submit(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        let stride = self.uniform_stride as usize;

        let mut contents = vec![0u8; stride * commands.len().max(1)];
        for (idx, command) in commands.iter().enumerate() {
            let offset = idx * stride;
            contents[offset..offset + UNIFORMS_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&command.uniforms));
        }

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shapegl::headless::uniforms"),
                contents: contents.as_slice(),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shapegl::headless::uniforms"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(UNIFORMS_SIZE),
                }),
            }],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("shapegl::headless::encoder"),
            });

        {
            let load = match self.clear_color.take() {
                Some(Rgb { r, g, b }) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: 1.0,
                }),
                None => wgpu::LoadOp::Load,
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shapegl::headless::pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let width = self.viewport.0.clamp(1, self.size.0);
            let height = self.viewport.1.clamp(1, self.size.1);
            render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);

            for (idx, command) in commands.iter().enumerate() {
                let Some(pipeline) = command.pipelines.by_mode.get(&command.mode) else {
                    log::warn!(
                        "shapegl::headless::HeadlessContext::submit: no pipeline for {:?}",
                        command.mode
                    );
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &bind_group, &[(idx * stride) as u32]);
                render_pass.set_vertex_buffer(0, command.binding.vertices.slice(..));
                render_pass
                    .set_index_buffer(command.binding.indices.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..command.count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        log::debug!(
            "shapegl::headless::HeadlessContext::submit: submitted {} draws",
            commands.len()
        );
    }

    /// Copy the target texture back as tightly packed RGBA8 rows
    pub async fn read_pixels(&self) -> Result<Vec<u8>, ContextError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("shapegl::headless::readback"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                aspect: wgpu::TextureAspect::All,
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row(self.size.0)),
                    rows_per_image: Some(self.size.1),
                },
            },
            self.texture.size(),
        );
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = self.readback.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        match rx.receive().await {
            Some(Ok(())) => {}
            Some(Err(e)) => return Err(ContextError::Backend(e.to_string())),
            None => return Err(ContextError::Backend("buffer map was dropped".to_owned())),
        }

        let pixels = {
            let data = buffer_slice.get_mapped_range();
            unpad_rows(&data, self.size.0, self.size.1)
        };
        self.readback.unmap();

        Ok(pixels)
    }
}

impl RenderContext for HeadlessContext {
    type Buffer = Rc<wgpu::Buffer>;
    type Binding = HeadlessBinding;

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<Self::Buffer, ContextError> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shapegl::headless::vertices"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Ok(Rc::new(buffer))
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<Self::Buffer, ContextError> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shapegl::headless::indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Ok(Rc::new(buffer))
    }

    fn create_binding(
        &mut self,
        vertices: &Self::Buffer,
        indices: &Self::Buffer,
        attribute: VertexAttribute,
    ) -> Result<HeadlessBinding, ContextError> {
        // pipelines fix the layout, see `WgslShader::new`
        if attribute != VertexAttribute::position(0) {
            return Err(ContextError::Backend(format!(
                "unsupported vertex attribute {attribute:?}"
            )));
        }

        Ok(HeadlessBinding {
            vertices: vertices.clone(),
            indices: indices.clone(),
        })
    }

    fn bind(&mut self, binding: Option<&HeadlessBinding>) {
        self.bound = binding.cloned();
    }

    fn draw_elements(&mut self, mode: DrawMode, count: usize) -> Result<(), ContextError> {
        let binding = self.bound.clone().ok_or(ContextError::NothingBound)?;
        let pipelines = self
            .program
            .clone()
            .ok_or_else(|| ContextError::Backend("draw issued with no program in use".to_owned()))?;
        let count = u32::try_from(count)
            .map_err(|_| ContextError::Backend(format!("index count {count} exceeds u32")))?;

        self.commands.push(DrawCommand {
            pipelines,
            binding,
            mode,
            count,
            uniforms: self.uniforms,
        });
        Ok(())
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn clear(&mut self, color: Rgb) {
        // nothing recorded before a clear would survive it
        self.commands.clear();
        self.clear_color = Some(color);
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        if let Ok(buffer) = Rc::try_unwrap(buffer) {
            buffer.destroy();
        }
    }

    fn delete_binding(&mut self, binding: HeadlessBinding) {
        drop(binding);
    }
}

/// WGSL program with one pipeline per `DrawMode`
pub struct WgslShader {
    pipelines: Rc<Pipelines>,
}

impl WgslShader {
    pub fn new(ctx: &HeadlessContext, source: &str) -> Self {
        let module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("shapegl::headless::shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shapegl::headless::layout"),
                bind_group_layouts: &[&ctx.bind_group_layout],
                push_constant_ranges: &[],
            });

        let attributes = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: 0,
        }];
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: Vertex::STRIDE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];
        let targets = [Some(wgpu::ColorTargetState {
            format: TARGET_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let by_mode = DrawMode::ALL
            .into_iter()
            .map(|mode| {
                let (topology, strip_index_format) = match mode {
                    DrawMode::Points => (wgpu::PrimitiveTopology::PointList, None),
                    DrawMode::Lines => (wgpu::PrimitiveTopology::LineList, None),
                    DrawMode::LineStrip => (
                        wgpu::PrimitiveTopology::LineStrip,
                        Some(wgpu::IndexFormat::Uint16),
                    ),
                    DrawMode::Triangles => (wgpu::PrimitiveTopology::TriangleList, None),
                    DrawMode::TriangleStrip => (
                        wgpu::PrimitiveTopology::TriangleStrip,
                        Some(wgpu::IndexFormat::Uint16),
                    ),
                };

                let pipeline = ctx
                    .device
                    .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("shapegl::headless::pipeline"),
                        layout: Some(&layout),
                        vertex: wgpu::VertexState {
                            module: &module,
                            entry_point: Some("vs_main"),
                            buffers: &buffers,
                            compilation_options: Default::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &module,
                            entry_point: Some("fs_main"),
                            targets: &targets,
                            compilation_options: Default::default(),
                        }),
                        primitive: wgpu::PrimitiveState {
                            topology,
                            strip_index_format,
                            front_face: wgpu::FrontFace::Ccw,
                            cull_mode: None,
                            polygon_mode: wgpu::PolygonMode::Fill,
                            unclipped_depth: false,
                            conservative: false,
                        },
                        depth_stencil: None,
                        multisample: wgpu::MultisampleState::default(),
                        multiview: None,
                        cache: None,
                    });

                (mode, pipeline)
            })
            .collect();

        Self {
            pipelines: Rc::new(Pipelines { by_mode }),
        }
    }
}

impl Shader<HeadlessContext> for WgslShader {
    fn use_program(&self, ctx: &mut HeadlessContext) {
        ctx.program = Some(self.pipelines.clone());
    }

    fn set_uniform2f(
        &self,
        ctx: &mut HeadlessContext,
        name: &str,
        value: [f32; 2],
    ) -> Result<(), ShaderError> {
        match name {
            UNIFORM_RESOLUTION => ctx.uniforms.resolution = value,
            _ => return Err(ShaderError::UnknownUniform(name.to_owned())),
        }
        Ok(())
    }

    fn set_uniform3f(
        &self,
        ctx: &mut HeadlessContext,
        name: &str,
        value: [f32; 3],
    ) -> Result<(), ShaderError> {
        match name {
            UNIFORM_COLOR => ctx.uniforms.color = value,
            _ => return Err(ShaderError::UnknownUniform(name.to_owned())),
        }
        Ok(())
    }

    fn attribute_location(&self, _ctx: &HeadlessContext, name: &str) -> Result<u32, ShaderError> {
        match name {
            ATTRIBUTE_POSITION => Ok(0),
            _ => Err(ShaderError::UnknownAttribute(name.to_owned())),
        }
    }
}
