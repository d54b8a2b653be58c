//! GPU state for the render harness.
//!
//! Owns the wgpu surface, device, pipeline, textures and the per-instance
//! vertex buffers. The simulation side never touches wgpu: it writes into
//! staging [`InstanceBuffer`](crate::bridge::InstanceBuffer)s and raster
//! bytes, and [`GpuState::sync`] uploads whatever is marked dirty, at most
//! once per frame.

mod camera;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::shader::{self, Uniforms};
use crate::sketch::{Sketch, SketchKind};

pub use camera::Camera;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    offset_buffer: wgpu::Buffer,
    color_buffer: Option<wgpu::Buffer>,
    angle_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    trail_texture: wgpu::Texture,
    trail_size: (u32, u32),
    depth_texture: wgpu::TextureView,
    num_instances: u32,
    texture_size: [f32; 2],
    cell_scale: f32,
    pub camera: Camera,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, sketch: &Sketch) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        // Per-instance vertex buffers, created once from the staging
        // contents; never resized, re-written when staging goes dirty.
        let offset_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Offset Buffer"),
            contents: sketch.offsets().as_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let color_buffer = sketch.colors().map(|colors| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Color Buffer"),
                contents: colors.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        });

        let angle_buffer = sketch.angles().map(|angles| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Angle Buffer"),
                contents: angles.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        });

        let index_buffer = sketch.cell_indices().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cell Index Buffer"),
                contents: indices.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
        });

        // Mask texture, uploaded once.
        let mask = sketch.mask();
        let mask_texture = create_rgba_texture(
            &device,
            "Mask Texture",
            mask.width,
            mask.height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        );
        write_rgba_texture(&queue, &mask_texture, &mask.data, mask.width, mask.height);

        // Trail texture. Sketches without a trail get a 1x1 black texture
        // so every sketch shares one bind group layout.
        let trail_size = sketch
            .trail()
            .map(|t| (t.width().max(1), t.height().max(1)))
            .unwrap_or((1, 1));
        let trail_texture = create_rgba_texture(
            &device,
            "Trail Texture",
            trail_size.0,
            trail_size.1,
            wgpu::TextureFormat::Rgba8Unorm,
        );
        write_rgba_texture(
            &queue,
            &trail_texture,
            &vec![0; (trail_size.0 * trail_size.1 * 4) as usize],
            trail_size.0,
            trail_size.1,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bounds = sketch.bounds();
        let texture_size = [bounds.width, bounds.height];
        let cell_scale = sketch.cell_scale();

        // Camera target is fixed at scene construction: the center of the
        // mask, far enough back to frame the whole scene.
        let camera = Camera::framing(bounds);

        let uniforms = Uniforms {
            view_proj: camera
                .view_proj(config.width as f32 / config.height as f32)
                .to_cols_array_2d(),
            time: 0.0,
            delta_time: 0.0,
            texture_size,
            cell_scale,
            _padding: [0.0; 3],
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    texture_layout_entry(0),
                    sampler_layout_entry(1),
                    texture_layout_entry(2),
                    sampler_layout_entry(3),
                ],
            });

        let mask_view = mask_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let trail_view = trail_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&mask_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&trail_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let shader_source = match sketch.kind() {
            SketchKind::Particles => shader::particle_shader(),
            SketchKind::Cells => shader::cell_shader(),
        };

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Render Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
                push_constant_ranges: &[],
            });

        let vertex_buffers = vertex_layouts(sketch.kind());

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            offset_buffer,
            color_buffer,
            angle_buffer,
            index_buffer,
            trail_texture,
            trail_size,
            depth_texture,
            num_instances: sketch.instance_count(),
            texture_size,
            cell_scale,
            camera,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Upload whatever the simulation marked dirty this frame.
    ///
    /// Each staging buffer is uploaded at most once per call; the dirty
    /// flags are consumed here, completing the simulate -> bridge -> mark
    /// dirty -> upload ordering.
    pub fn sync(&mut self, sketch: &mut Sketch) {
        if sketch.offsets_mut().take_dirty() {
            self.queue
                .write_buffer(&self.offset_buffer, 0, sketch.offsets().as_bytes());
        }

        if let Some(buffer) = &self.color_buffer {
            if let Some(colors) = sketch.colors_mut() {
                if colors.take_dirty() {
                    self.queue.write_buffer(buffer, 0, colors.as_bytes());
                }
            }
        }

        if let Some(buffer) = &self.angle_buffer {
            if let Some(angles) = sketch.angles_mut() {
                if angles.take_dirty() {
                    self.queue.write_buffer(buffer, 0, angles.as_bytes());
                }
            }
        }

        if let Some(buffer) = &self.index_buffer {
            if let Some(indices) = sketch.cell_indices_mut() {
                if indices.take_dirty() {
                    self.queue.write_buffer(buffer, 0, indices.as_bytes());
                }
            }
        }

        if let Some(trail) = sketch.trail_mut() {
            if trail.take_dirty() && (trail.width(), trail.height()) == self.trail_size {
                let (w, h) = (trail.width(), trail.height());
                write_rgba_texture(&self.queue, &self.trail_texture, trail.raster(), w, h);
            }
        }
    }

    pub fn render(&mut self, time: f32, delta_time: f32) -> Result<(), wgpu::SurfaceError> {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let uniforms = Uniforms {
            view_proj: self.camera.view_proj(aspect).to_cols_array_2d(),
            time,
            delta_time,
            texture_size: self.texture_size,
            cell_scale: self.cell_scale,
            _padding: [0.0; 3],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.offset_buffer.slice(..));
            if let Some(colors) = &self.color_buffer {
                render_pass.set_vertex_buffer(1, colors.slice(..));
            }
            if let Some(angles) = &self.angle_buffer {
                render_pass.set_vertex_buffer(1, angles.slice(..));
            }
            if let Some(indices) = &self.index_buffer {
                render_pass.set_vertex_buffer(2, indices.slice(..));
            }
            render_pass.draw(0..6, 0..self.num_instances);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Per-instance vertex buffer layouts for a sketch kind.
fn vertex_layouts(kind: SketchKind) -> Vec<wgpu::VertexBufferLayout<'static>> {
    const OFFSET: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    const COLOR: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
    const ANGLE: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32];
    const P_INDEX: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];

    let offsets = wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &OFFSET,
    };

    match kind {
        SketchKind::Particles => vec![
            offsets,
            wgpu::VertexBufferLayout {
                array_stride: 12,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &COLOR,
            },
        ],
        SketchKind::Cells => vec![
            offsets,
            wgpu::VertexBufferLayout {
                array_stride: 4,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &ANGLE,
            },
            wgpu::VertexBufferLayout {
                array_stride: 4,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &P_INDEX,
            },
        ],
    }
}

fn texture_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_layout_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn create_rgba_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_rgba_texture(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    data: &[u8],
    width: u32,
    height: u32,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
