use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use polyspin_render::{BufferId, GraphicsContext, PipelineError, PipelineId, PipelineStage};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

/// Per-draw uniform block: shared projection plus the instance's model
/// matrix. Matches `FrameUniforms` in the WGSL sources.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    projection: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

/// Minimum uniform buffer offset alignment required by wgpu's defaults.
const UNIFORM_STRIDE: usize = 256;

/// One recorded indexed draw, replayed in `present`.
struct DrawCommand {
    pipeline: PipelineId,
    positions: BufferId,
    colors: BufferId,
    indices: BufferId,
    index_count: u32,
    uniforms: FrameUniforms,
}

/// wgpu implementation of the graphics-context capability.
///
/// Trait calls accumulate one frame's worth of state (clear color, bound
/// pipeline, per-draw uniforms and buffers); `present` encodes it all as a
/// single render pass against the given surface view and submits.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    pipelines: HashMap<PipelineId, wgpu::RenderPipeline>,
    next_buffer: u32,
    next_pipeline: u32,
    width: u32,
    height: u32,
    depth_view: wgpu::TextureView,
    depth_test: bool,
    clear_color: Option<wgpu::Color>,
    bound_pipeline: Option<PipelineId>,
    pending_uniforms: FrameUniforms,
    draws: Vec<DrawCommand>,
}

impl WgpuContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FrameUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let depth_view = create_depth_texture(&device, width, height);

        Self {
            device,
            queue,
            surface_format,
            uniform_layout,
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
            next_buffer: 0,
            next_pipeline: 0,
            width,
            height,
            depth_view,
            depth_test: false,
            clear_color: None,
            bound_pipeline: None,
            pending_uniforms: FrameUniforms {
                projection: Mat4::IDENTITY.to_cols_array_2d(),
                model: Mat4::IDENTITY.to_cols_array_2d(),
            },
            draws: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Encode the recorded frame into one render pass against `view`,
    /// submit it, and reset the per-frame state.
    pub fn present(&mut self, view: &wgpu::TextureView) {
        let draws = std::mem::take(&mut self.draws);
        let clear_color = self.clear_color.take();

        let uniform_resources = if draws.is_empty() {
            None
        } else {
            let blocks: Vec<FrameUniforms> = draws.iter().map(|d| d.uniforms).collect();
            let uniform_buffer =
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("frame_uniform_buffer"),
                        contents: &pack_uniforms(&blocks),
                        usage: wgpu::BufferUsages::UNIFORM,
                    });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("frame_uniform_bind_group"),
                layout: &self.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &uniform_buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<FrameUniforms>() as u64),
                    }),
                }],
            });
            Some((uniform_buffer, bind_group))
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let depth_attachment = self.depth_test.then_some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            );

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: match clear_color {
                            Some(color) => wgpu::LoadOp::Clear(color),
                            None => wgpu::LoadOp::Load,
                        },
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_attachment,
                ..Default::default()
            });

            for (i, draw) in draws.iter().enumerate() {
                let Some(pipeline) = self.pipelines.get(&draw.pipeline) else {
                    tracing::warn!(?draw.pipeline, "draw references unknown pipeline");
                    continue;
                };
                let (Some(positions), Some(colors), Some(indices)) = (
                    self.buffers.get(&draw.positions),
                    self.buffers.get(&draw.colors),
                    self.buffers.get(&draw.indices),
                ) else {
                    tracing::warn!("draw references unknown buffer");
                    continue;
                };
                let Some((_, bind_group)) = uniform_resources.as_ref() else {
                    continue;
                };

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[(i * UNIFORM_STRIDE) as u32]);
                pass.set_vertex_buffer(0, positions.slice(..));
                pass.set_vertex_buffer(1, colors.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn compile_module(
        &self,
        source: &str,
        stage: PipelineStage,
    ) -> Result<wgpu::ShaderModule, PipelineError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    PipelineStage::Vertex => "vertex_shader",
                    _ => "fragment_shader",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(PipelineError {
                stage,
                log: error.to_string(),
            });
        }
        Ok(module)
    }
}

impl GraphicsContext for WgpuContext {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferId {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("vertex_buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(id, buffer);
        id
    }

    fn create_index_buffer(&mut self, data: &[u32]) -> BufferId {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("index_buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX,
            });
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(id, buffer);
        id
    }

    fn create_pipeline(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<PipelineId, PipelineError> {
        let vertex_module = self.compile_module(vertex_src, PipelineStage::Vertex)?;
        let fragment_module = self.compile_module(fragment_src, PipelineStage::Fragment)?;

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("pipeline_layout"),
                bind_group_layouts: &[&self.uniform_layout],
                push_constant_ranges: &[],
            });

        let vertex_stride = std::mem::size_of::<[f32; 3]>() as u64;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("scene_pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: vertex_stride,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: vertex_stride,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![1 => Float32x3],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    // The reference geometry has mixed winding; depth
                    // testing resolves visibility, not face culling.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: self.depth_test.then_some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(PipelineError {
                stage: PipelineStage::Link,
                log: error.to_string(),
            });
        }

        let id = PipelineId(self.next_pipeline);
        self.next_pipeline += 1;
        self.pipelines.insert(id, pipeline);
        tracing::debug!(?id, "pipeline compiled");
        Ok(id)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.depth_view = create_depth_texture(&self.device, width, height);
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = Some(wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        });
    }

    fn bind_pipeline(&mut self, pipeline: PipelineId) {
        self.bound_pipeline = Some(pipeline);
    }

    fn set_matrix_uniforms(&mut self, projection: &Mat4, model: &Mat4) {
        self.pending_uniforms = FrameUniforms {
            projection: projection.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        };
    }

    fn draw_indexed(
        &mut self,
        positions: BufferId,
        colors: BufferId,
        indices: BufferId,
        index_count: u32,
    ) {
        let Some(pipeline) = self.bound_pipeline else {
            tracing::warn!("draw_indexed with no bound pipeline, dropping draw");
            return;
        };
        self.draws.push(DrawCommand {
            pipeline,
            positions,
            colors,
            indices,
            index_count,
            uniforms: self.pending_uniforms,
        });
    }
}

/// Lay uniform blocks out at the dynamic-offset stride.
fn pack_uniforms(blocks: &[FrameUniforms]) -> Vec<u8> {
    let mut bytes = vec![0u8; blocks.len() * UNIFORM_STRIDE];
    for (i, block) in blocks.iter().enumerate() {
        let start = i * UNIFORM_STRIDE;
        let data = bytemuck::bytes_of(block);
        bytes[start..start + data.len()].copy_from_slice(data);
    }
    bytes
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
