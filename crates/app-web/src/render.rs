//! WebGPU renderer for the deformable blob.
//!
//! One pipeline, one dynamic position buffer per mesh. Positions are
//! re-uploaded only when the engine marks them dirty; normals and indices
//! are static per mesh.

use app_core::{constants, MeshId};
use glam::{Mat4, Vec3};
use web_sys as web;
use wgpu::util::DeviceExt;

use crate::model::ClipSide;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    ambient: [f32; 4],     // rgb, intensity
    main_light: [f32; 4],  // xyz direction, intensity
    point_pos: [f32; 4],   // xyz, intensity
    point_color: [f32; 4], // rgb, unused
    clip: [f32; 4],        // front, mode, unused, unused
}

pub struct LightParams {
    pub point_pos: Vec3,
    pub point_color: Vec3,
    pub point_intensity: f32,
}

pub struct MeshDraw {
    pub id: MeshId,
    pub model: Mat4,
    pub clip: ClipSide,
}

struct MeshBuffers {
    id: MeshId,
    position_vb: wgpu::Buffer,
    normal_vb: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

const SHADER_SRC: &str = r#"
struct Uniforms {
  view_proj: mat4x4<f32>,
  model: mat4x4<f32>,
  ambient: vec4<f32>,
  main_light: vec4<f32>,
  point_pos: vec4<f32>,
  point_color: vec4<f32>,
  clip: vec4<f32>,
};
@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) world: vec3<f32>,
  @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) normal: vec3<f32>) -> VsOut {
  let world = u.model * vec4<f32>(pos, 1.0);
  var out: VsOut;
  out.pos = u.view_proj * world;
  out.world = world.xyz;
  // the model matrix carries uniform scale only, so no normal matrix
  out.normal = (u.model * vec4<f32>(normal, 0.0)).xyz;
  return out;
}

@fragment
fn fs_main(inf: VsOut) -> @location(0) vec4<f32> {
  // clip modes: 0 none, 1 keep x >= front, 2 keep x <= front
  let mode = u.clip.y;
  if (mode > 0.5 && mode < 1.5 && inf.world.x < u.clip.x) { discard; }
  if (mode > 1.5 && inf.world.x > u.clip.x) { discard; }

  let n = normalize(inf.normal);
  let base = vec3<f32>(0.82, 0.55, 0.46);

  let ambient = u.ambient.rgb * (u.ambient.a * 0.25);
  let main_dir = normalize(u.main_light.xyz);
  let diffuse = vec3<f32>(max(dot(n, main_dir), 0.0) * u.main_light.a * 0.45);

  let to_point = u.point_pos.xyz - inf.world;
  let d = length(to_point);
  let point = u.point_color.rgb
    * (u.point_pos.w * 0.02)
    * max(dot(n, to_point / max(d, 1e-4)), 0.0)
    / (1.0 + 0.15 * d * d);

  let rgb = base * (ambient + diffuse + point);
  return vec4<f32>(rgb, 1.0);
}
"#;

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    depth_view: wgpu::TextureView,
    meshes: Vec<MeshBuffers>,
    width: u32,
    height: u32,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SRC.into()),
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let vertex_buffers = [
            // slot 0: positions, re-uploaded while deforming
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 3) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: rest-pose normals, static
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 3) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 1,
                }],
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let depth_view = create_depth_view(&device, width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            depth_view,
            meshes: Vec::new(),
            width,
            height,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, width, height);
        }
    }

    pub fn add_mesh(&mut self, id: MeshId, positions: &[f32], normals: &[f32], indices: &[u32]) {
        self.remove_mesh(id);
        let position_vb = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("positions"),
                contents: bytemuck::cast_slice(positions),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let normal_vb = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("normals"),
                contents: bytemuck::cast_slice(normals),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("indices"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        self.meshes.push(MeshBuffers {
            id,
            position_vb,
            normal_vb,
            index_buffer,
            index_count: indices.len() as u32,
            uniform_buffer,
            bind_group,
        });
    }

    pub fn remove_mesh(&mut self, id: MeshId) {
        self.meshes.retain(|m| m.id != id);
    }

    pub fn update_positions(&mut self, id: MeshId, positions: &[f32]) {
        if let Some(mesh) = self.meshes.iter().find(|m| m.id == id) {
            self.queue
                .write_buffer(&mesh.position_vb, 0, bytemuck::cast_slice(positions));
        }
    }

    pub fn render(
        &mut self,
        view_proj: Mat4,
        draws: &[MeshDraw],
        lights: &LightParams,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        // each mesh has its own uniform buffer, so per-draw values survive
        // until submit
        for draw in draws {
            let Some(mesh) = self.meshes.iter().find(|m| m.id == draw.id) else {
                continue;
            };
            let (clip_front, clip_mode) = match draw.clip {
                ClipSide::None => (0.0, 0.0),
                ClipSide::KeepAbove(front) => (front, 1.0),
                ClipSide::KeepBelow(front) => (front, 2.0),
            };
            let uniforms = Uniforms {
                view_proj: view_proj.to_cols_array_2d(),
                model: draw.model.to_cols_array_2d(),
                ambient: [1.0, 1.0, 1.0, constants::AMBIENT_LIGHT_INTENSITY],
                main_light: [1.0, 1.0, 1.0, constants::MAIN_LIGHT_INTENSITY],
                point_pos: [
                    lights.point_pos.x,
                    lights.point_pos.y,
                    lights.point_pos.z,
                    lights.point_intensity,
                ],
                point_color: [
                    lights.point_color.x,
                    lights.point_color.y,
                    lights.point_color.z,
                    0.0,
                ],
                clip: [clip_front, clip_mode, 0.0, 0.0],
            };
            self.queue
                .write_buffer(&mesh.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("rpass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.02,
                        g: 0.02,
                        b: 0.03,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&self.pipeline);
        for draw in draws {
            let Some(mesh) = self.meshes.iter().find(|m| m.id == draw.id) else {
                continue;
            };
            rpass.set_bind_group(0, &mesh.bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh.position_vb.slice(..));
            rpass.set_vertex_buffer(1, mesh.normal_vb.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        drop(rpass);
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
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
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
