//! Blinn-Phong scene renderer.
//!
//! Three fixed objects: a pulsing cone at the center, a wood-textured
//! ground plane and a checkerboard sphere orbiting the cone. Per frame
//! the renderer receives the amplified light levels, the pulse scale and
//! the animation angle, rebuilds the matrices and draws.

use std::path::PathBuf;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tracing::info;

use crate::mesh::{GpuMesh, Mesh, Vertex};
use crate::texture::SceneTexture;
use crate::Result;
use sonolux_core::LightLevels;

/// Depth buffer format used by the scene pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Paths of the file-loaded textures.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    /// Wood color texture for the ground plane.
    pub wood_color: PathBuf,
    /// Wood normal map for the ground plane.
    pub wood_normal: PathBuf,
}

/// Per-frame inputs the renderer consumes.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    /// Amplified light intensities and light position.
    pub light: LightLevels,
    /// Scale factor of the pulsing cone.
    pub pulse_scale: f32,
    /// Animation angle driving camera and object motion.
    pub angle: f32,
}

/// Per-frame uniforms (matches blinn_phong.wgsl `FrameUniforms`).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_position: [f32; 4],
    light_ambient: [f32; 4],
    light_diffuse: [f32; 4],
    light_specular: [f32; 4],
}

/// Per-object uniforms (matches blinn_phong.wgsl `ObjectUniforms`).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    surface_ambient: [f32; 4],
    surface_diffuse: [f32; 4],
    surface_specular: [f32; 4],
    tex_repeat: f32,
    use_texture: f32,
    use_normal_map: f32,
    shininess: f32,
}

/// Static material of one scene object.
struct Material {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    tex_repeat: f32,
    use_texture: bool,
    use_normal_map: bool,
    shininess: f32,
}

struct SceneObject {
    mesh: GpuMesh,
    material: Material,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    last_uniforms: Option<ObjectUniforms>,
}

impl SceneObject {
    fn uniforms(&self, model: Mat4) -> ObjectUniforms {
        ObjectUniforms {
            model: model.to_cols_array_2d(),
            surface_ambient: self.material.ambient,
            surface_diffuse: self.material.diffuse,
            surface_specular: self.material.specular,
            tex_repeat: self.material.tex_repeat,
            use_texture: if self.material.use_texture { 1.0 } else { 0.0 },
            use_normal_map: if self.material.use_normal_map { 1.0 } else { 0.0 },
            shininess: self.material.shininess,
        }
    }

    /// Writes the object uniforms, skipping the upload when nothing
    /// changed since the previous frame.
    fn update(&mut self, queue: &wgpu::Queue, model: Mat4) {
        let uniforms = self.uniforms(model);
        if self.last_uniforms != Some(uniforms) {
            queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
            self.last_uniforms = Some(uniforms);
        }
    }
}

/// Renders the audio-reactive scene into the window surface.
pub struct Scene {
    device: Arc<wgpu::Device>,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    aspect: f32,
    cone: SceneObject,
    plane: SceneObject,
    sphere: SceneObject,
}

impl Scene {
    /// Builds the pipeline, meshes, textures and uniform buffers.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        assets: &SceneAssets,
    ) -> Result<Self> {
        info!("Creating scene renderer");

        let shader_source = include_str!("../../../shaders/blinn_phong.wgsl");
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blinn-Phong Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Uniform Bind Group Layout"),
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

        let object_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Object Uniform Bind Group Layout"),
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

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &object_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
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
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniform Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // Textures: a solid white stand-in for the untextured cone, the
        // wood pair for the plane, the in-RAM checkerboard for the sphere.
        let white = SceneTexture::solid_color(&device, queue, [255, 255, 255, 255]);
        let flat = SceneTexture::flat_normal(&device, queue);
        let wood_color = SceneTexture::color_map(&device, queue, &assets.wood_color);
        let wood_normal = SceneTexture::normal_map(&device, queue, &assets.wood_normal);
        let checker = SceneTexture::checkerboard(&device, queue);

        let make_texture_bind_group = |color: &SceneTexture, normal: &SceneTexture| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Scene Texture Bind Group"),
                layout: &texture_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&color.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&color.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&normal.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&normal.sampler),
                    },
                ],
            })
        };

        let make_object = |label: &str, mesh: &Mesh, material: Material, texture_bind_group| {
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{} Uniform Buffer", label)),
                size: std::mem::size_of::<ObjectUniforms>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} Uniform Bind Group", label)),
                layout: &object_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            SceneObject {
                mesh: GpuMesh::upload(&device, label, mesh),
                material,
                uniform_buffer,
                uniform_bind_group,
                texture_bind_group,
                last_uniforms: None,
            }
        };

        const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
        const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
        const PALE_GREEN: [f32; 4] = [0.7, 1.0, 0.7, 1.0];
        const BLUE: [f32; 4] = [0.2, 0.2, 0.9, 1.0];

        let cone = make_object(
            "Cone",
            &Mesh::cone(1.0, 2.0, 4),
            Material {
                ambient: RED,
                diffuse: RED,
                specular: RED,
                tex_repeat: 1.0,
                use_texture: false,
                use_normal_map: false,
                shininess: 50.0,
            },
            make_texture_bind_group(&white, &flat),
        );

        let plane = make_object(
            "Ground Plane",
            &Mesh::quad(),
            Material {
                ambient: WHITE,
                diffuse: PALE_GREEN,
                specular: WHITE,
                tex_repeat: 20.0,
                use_texture: true,
                use_normal_map: true,
                shininess: 50.0,
            },
            make_texture_bind_group(&wood_color, &wood_normal),
        );

        let sphere = make_object(
            "Sphere",
            &Mesh::sphere(1.0, 5, 9),
            Material {
                ambient: BLUE,
                diffuse: BLUE,
                specular: WHITE,
                tex_repeat: 1.0,
                use_texture: true,
                use_normal_map: false,
                shininess: 50.0,
            },
            make_texture_bind_group(&checker, &flat),
        );

        let depth_view = create_depth_view(&device, width, height);

        Ok(Self {
            device,
            pipeline,
            frame_buffer,
            frame_bind_group,
            depth_view,
            aspect: width as f32 / height.max(1) as f32,
            cone,
            plane,
            sphere,
        })
    }

    /// Recreates the depth buffer and projection aspect after a resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_view = create_depth_view(&self.device, width, height);
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Draws one frame into `target`.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        params: &FrameParams,
    ) {
        let camera = camera_position(params.angle);
        let view = Mat4::look_at_rh(camera, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, self.aspect, 1.0, 1000.0);

        let light = &params.light;
        let frame = FrameUniforms {
            view_proj: (proj * view).to_cols_array_2d(),
            camera_pos: [camera.x, camera.y, camera.z, 1.0],
            light_position: [light.position.x, light.position.y, light.position.z, 1.0],
            light_ambient: light.ambient,
            light_diffuse: light.diffuse,
            light_specular: light.specular,
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));

        self.cone
            .update(queue, cone_model(params.pulse_scale, params.angle));
        self.plane.update(queue, plane_model());
        self.sphere.update(queue, sphere_model(params.angle));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for object in [&self.cone, &self.plane, &self.sphere] {
                render_pass.set_bind_group(1, &object.uniform_bind_group, &[]);
                render_pass.set_bind_group(2, &object.texture_bind_group, &[]);
                render_pass.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(object.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..object.mesh.index_count, 0, 0..1);
            }
        }

        queue.submit(Some(encoder.finish()));
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Scene Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
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

/// Camera orbit: a slow circle of radius 6 at height 2, looking at the
/// origin.
fn camera_position(angle: f32) -> Vec3 {
    Vec3::new(
        6.0 * (-angle / 1000.0).sin(),
        2.0,
        6.0 * (-angle / 1000.0).cos(),
    )
}

/// The cone pulses with the music and spins in place above the plane.
/// The pulse scale is applied last so the lift off the ground pulses too.
fn cone_model(pulse_scale: f32, angle: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(pulse_scale))
        * Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0))
        * Mat4::from_rotation_y((angle / 5.0).to_radians())
}

/// The ground: the unit quad laid flat and stretched.
fn plane_model() -> Mat4 {
    Mat4::from_rotation_x((-90.0f32).to_radians()) * Mat4::from_scale(Vec3::splat(15.0))
}

/// The sphere orbits the cone while tumbling around its own axis.
fn sphere_model(angle: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0))
        * Mat4::from_rotation_y((angle / 2.0).to_radians())
        * Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0))
        * Mat4::from_rotation_x((-angle).to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes() {
        // Uniform buffer bindings must stay 16-byte aligned.
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 144);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 128);
    }

    #[test]
    fn test_camera_orbit() {
        for angle in [0.0f32, 314.0, 1000.0, 9999.0] {
            let pos = camera_position(angle);
            assert_eq!(pos.y, 2.0);
            let radial = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!((radial - 6.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_plane_lies_flat() {
        let model = plane_model();
        for corner in [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ] {
            let world = model.transform_point3(corner);
            assert!(world.y.abs() < 1e-5, "corner ended up at y = {}", world.y);
            assert!(world.x.abs() <= 15.0 + 1e-4);
            assert!(world.z.abs() <= 15.0 + 1e-4);
        }
    }

    #[test]
    fn test_cone_pulse_scales_uniformly() {
        let apex = Vec3::new(0.0, 1.0, 0.0);
        let still = cone_model(1.0, 0.0).transform_point3(apex);
        let pulsed = cone_model(1.5, 0.0).transform_point3(apex);
        assert!((still.y - 2.5).abs() < 1e-5);
        assert!((pulsed.y - still.y * 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_orbit_radius() {
        // The sphere's center stays 3 units from the cone's axis at the
        // cone's height.
        for angle in [0.0f32, 90.0, 777.0] {
            let center = sphere_model(angle).transform_point3(Vec3::ZERO);
            let radial = (center.x.powi(2) + center.z.powi(2)).sqrt();
            assert!((radial - 3.0).abs() < 1e-4);
            assert!((center.y - 1.5).abs() < 1e-4);
        }
    }
}
