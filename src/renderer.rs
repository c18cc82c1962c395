use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{DrawRequest, RenderBackend, SceneHandle};
use crate::geometry::{build_mesh, Vertex};
use crate::loaders::EnvironmentMap;
use crate::scene::{Light, Material, MaterialKind, SceneDescriptor};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

/// Per-frame uniform shared by every object
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    key_light: [f32; 4],
    key_color: [f32; 4],
    environment: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    material: [f32; 4],
}

impl ObjectUniform {
    fn new(model: Mat4, material: &Material) -> Self {
        let params = match material.kind {
            MaterialKind::Standard {
                metalness,
                roughness,
            } => [0.0, metalness, roughness, 0.0],
            MaterialKind::Phong { shininess } => [1.0, 0.0, 0.0, shininess],
            MaterialKind::Lambert => [2.0, 0.0, 0.0, 0.0],
            MaterialKind::Normal => [3.0, 0.0, 0.0, 0.0],
        };
        let [r, g, b] = material.color;
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, 1.0],
            material: params,
        }
    }
}

/// Ambient term plus the single key light the shader supports
#[derive(Debug, Clone, Copy)]
struct LightRig {
    ambient: Vec3,
    key_light: [f32; 4],
    key_color: Vec3,
}

impl LightRig {
    fn from_lights(lights: &[Light]) -> Self {
        let mut rig = Self {
            ambient: Vec3::ZERO,
            key_light: [0.0, 1.0, 0.0, 0.0],
            key_color: Vec3::ZERO,
        };
        let mut has_key = false;
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    rig.ambient += Vec3::from_array(color) * intensity;
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                } if !has_key => {
                    rig.key_light = position.extend(0.0).to_array();
                    rig.key_color = Vec3::from_array(color) * intensity;
                    has_key = true;
                }
                Light::Point {
                    color,
                    intensity,
                    position,
                } if !has_key => {
                    rig.key_light = position.extend(1.0).to_array();
                    rig.key_color = Vec3::from_array(color) * intensity;
                    has_key = true;
                }
                _ => log::warn!("Ignoring extra key light {:?}", light),
            }
        }
        rig
    }
}

struct GpuObject {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu rasterizer drawing into a winit window
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    objects: Vec<GpuObject>,
    lights: LightRig,
    background: [f32; 3],
    environment: Option<Vec3>,
    scenes_built: u32,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")?;

        let config = Self::create_surface_config(&surface, &adapter, size.width, size.height);
        surface.configure(&device, &config);
        let depth_view = Self::create_depth_view(&device, &config);

        let uniform_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline = Self::create_pipeline(&device, &globals_layout, &object_layout, config.format);

        log::info!(
            "GPU renderer initialized: {:?}, surface {}x{} {:?}",
            adapter.get_info().backend,
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            pipeline,
            globals_buffer,
            globals_bind_group,
            object_layout,
            objects: Vec::new(),
            lights: LightRig::from_lights(&[]),
            background: [0.0; 3],
            environment: None,
            scenes_built: 0,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(
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

    fn create_pipeline(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[globals_layout, object_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn clear_color(&self) -> wgpu::Color {
        // Reinhard-compressed environment radiance stands in for a skybox
        let [r, g, b] = match self.environment {
            Some(radiance) => (radiance / (Vec3::ONE + radiance)).to_array(),
            None => self.background,
        };
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    fn globals(&self, request: &DrawRequest<'_>) -> GlobalsUniform {
        let camera = request.camera;
        let environment = match self.environment {
            Some(radiance) => radiance.extend(1.0).to_array(),
            None => [0.0; 4],
        };
        GlobalsUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            ambient: self.lights.ambient.extend(1.0).to_array(),
            key_light: self.lights.key_light,
            key_color: self.lights.key_color.extend(1.0).to_array(),
            environment,
        }
    }
}

impl RenderBackend for GpuRenderer {
    fn construct(&mut self, scene: &SceneDescriptor) -> SceneHandle {
        self.objects = scene
            .objects
            .iter()
            .enumerate()
            .map(|(i, object)| {
                let mesh = build_mesh(&object.geometry);
                let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Object {i} Vertices")),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Object {i} Indices")),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let uniform = ObjectUniform::new(object.transform.matrix(), &object.material);
                let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Object {i} Uniform")),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("object_{i}_bind_group")),
                    layout: &self.object_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });

                log::debug!(
                    "Object {} uploaded: {} triangles, {} material",
                    i,
                    mesh.triangle_count(),
                    object.material.kind.name()
                );
                GpuObject {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    uniform_buffer,
                    bind_group,
                }
            })
            .collect();

        self.lights = LightRig::from_lights(&scene.lights);
        self.background = scene.background;
        self.environment = None;
        self.scenes_built += 1;
        SceneHandle(self.scenes_built)
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, &self.config);
    }

    fn draw(&mut self, request: &DrawRequest<'_>) {
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[self.globals(request)]),
        );
        for (gpu_object, object) in self.objects.iter().zip(request.objects) {
            let uniform = ObjectUniform::new(object.transform.matrix(), &object.material);
            self.queue
                .write_buffer(&gpu_object.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for object in &self.objects {
                render_pass.set_bind_group(1, &object.bind_group, &[]);
                render_pass.set_vertex_buffer(0, object.vertex_buffer.slice(..));
                render_pass.set_index_buffer(object.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..object.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn install_environment(&mut self, scene: SceneHandle, environment: &EnvironmentMap) {
        if scene != SceneHandle(self.scenes_built) {
            log::warn!("Environment for stale scene {:?} ignored", scene);
            return;
        }
        self.environment = Some(environment.average_radiance());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 64 + 5 * 16);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 2 * 64 + 2 * 16);
    }

    #[test]
    fn test_light_rig_from_showcase_lights() {
        let lights = [
            Light::Ambient {
                color: [1.0, 1.0, 1.0],
                intensity: 0.5,
            },
            Light::Directional {
                color: [1.0, 1.0, 1.0],
                intensity: 2.0,
                position: Vec3::new(5.0, 10.0, 7.5),
            },
        ];
        let rig = LightRig::from_lights(&lights);
        assert_eq!(rig.ambient, Vec3::splat(0.5));
        assert_eq!(rig.key_light, [5.0, 10.0, 7.5, 0.0]);
        assert_eq!(rig.key_color, Vec3::splat(2.0));
    }

    #[test]
    fn test_point_light_is_marked_positional() {
        let rig = LightRig::from_lights(&[Light::Point {
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            position: Vec3::new(5.0, 5.0, 5.0),
        }]);
        assert_eq!(rig.key_light[3], 1.0);
        assert_eq!(rig.ambient, Vec3::ZERO);
    }

    #[test]
    fn test_material_parameters_packed_for_shader() {
        let uniform = ObjectUniform::new(Mat4::IDENTITY, &Material::ROTATION[0]);
        assert_eq!(uniform.material, [0.0, 0.7, 0.3, 0.0]);
        let uniform = ObjectUniform::new(Mat4::IDENTITY, &Material::ROTATION[1]);
        assert_eq!(uniform.material[0], 1.0);
        assert_eq!(uniform.normal_matrix, Mat4::IDENTITY.to_cols_array_2d());
    }
}
