//! Procedural primitive meshes.
//!
//! The scene uses three primitives: a unit quad for the ground, a UV
//! sphere and a cone. All are generated on the CPU with positions,
//! normals, tangents and texture coordinates, then uploaded once.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::PI;
use wgpu::util::DeviceExt;

/// Vertex format shared by every scene mesh (matches blinn_phong.wgsl).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Object-space tangent (for normal mapping).
    pub tangent: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x3, // tangent
        3 => Float32x2, // uv
    ];

    /// Vertex buffer layout for pipeline creation.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side mesh data.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    /// Vertex list.
    pub vertices: Vec<Vertex>,
    /// Triangle list indices.
    pub indices: Vec<u16>,
}

impl Mesh {
    fn add_vertex(&mut self, position: Vec3, normal: Vec3, tangent: Vec3, uv: (f32, f32)) -> u16 {
        let index = self.vertices.len() as u16;
        self.vertices.push(Vertex {
            position: position.to_array(),
            normal: normal.to_array(),
            tangent: tangent.to_array(),
            uv: [uv.0, uv.1],
        });
        index
    }

    fn add_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// A quad spanning [-1, 1]^2 in the XY plane, facing +Z.
    pub fn quad() -> Self {
        let mut mesh = Mesh::default();
        let normal = Vec3::Z;
        let tangent = Vec3::X;

        for (x, y) in [(-1.0f32, -1.0f32), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            let uv = ((x + 1.0) * 0.5, (1.0 - y) * 0.5);
            mesh.add_vertex(Vec3::new(x, y, 0.0), normal, tangent, uv);
        }
        mesh.add_triangle(0, 1, 3);
        mesh.add_triangle(0, 3, 2);
        mesh
    }

    /// A UV sphere with smooth normals and equirectangular texture
    /// coordinates. The seam column is duplicated at u = 1.0 so textures
    /// wrap cleanly.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.clamp(3, 256);
        let rings = rings.clamp(2, 256);
        let mut mesh = Mesh::default();

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let phi = v * PI; // north pole to south pole
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let theta = u * 2.0 * PI;
                let position = Vec3::new(
                    ring_radius * theta.cos(),
                    y,
                    ring_radius * theta.sin(),
                );
                // Smooth normals point away from the center; the tangent
                // follows increasing theta.
                let normal = if ring_radius > 0.0 {
                    position.normalize()
                } else {
                    Vec3::new(0.0, phi.cos().signum(), 0.0)
                };
                let tangent = Vec3::new(-theta.sin(), 0.0, theta.cos());
                mesh.add_vertex(position, normal, tangent, (u, v));
            }
        }

        let verts_per_ring = (segments + 1) as u16;
        for ring in 0..rings as u16 {
            for seg in 0..segments as u16 {
                let i0 = ring * verts_per_ring + seg;
                let i1 = i0 + 1;
                let i2 = (ring + 1) * verts_per_ring + seg;
                let i3 = i2 + 1;
                mesh.add_triangle(i0, i1, i3);
                mesh.add_triangle(i0, i3, i2);
            }
        }

        mesh
    }

    /// A cone with its apex up (+Y), base at -height/2, with a closed
    /// base cap. The apex vertex is duplicated per segment so each side
    /// triangle keeps its own slant normal.
    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        let segments = segments.clamp(3, 256);
        let mut mesh = Mesh::default();

        let half = height * 0.5;
        // Slant normal of a cone: (h cos, r, h sin), normalized.
        let slant = |theta: f32| Vec3::new(height * theta.cos(), radius, height * theta.sin()).normalize();

        // Side: base ring and per-segment apex vertices.
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * 2.0 * PI;
            let base = Vec3::new(radius * theta.cos(), -half, radius * theta.sin());
            let tangent = Vec3::new(-theta.sin(), 0.0, theta.cos());
            mesh.add_vertex(base, slant(theta), tangent, (u, 1.0));
        }
        for seg in 0..segments {
            let u = (seg as f32 + 0.5) / segments as f32;
            let theta = u * 2.0 * PI;
            let tangent = Vec3::new(-theta.sin(), 0.0, theta.cos());
            mesh.add_vertex(Vec3::new(0.0, half, 0.0), slant(theta), tangent, (u, 0.0));
        }
        let apex_start = (segments + 1) as u16;
        for seg in 0..segments as u16 {
            mesh.add_triangle(seg, apex_start + seg, seg + 1);
        }

        // Base cap: its own ring so the normals can point straight down.
        let cap_center = mesh.add_vertex(
            Vec3::new(0.0, -half, 0.0),
            -Vec3::Y,
            Vec3::X,
            (0.5, 0.5),
        );
        let cap_start = mesh.vertices.len() as u16;
        for seg in 0..=segments {
            let theta = (seg as f32 / segments as f32) * 2.0 * PI;
            let position = Vec3::new(radius * theta.cos(), -half, radius * theta.sin());
            let uv = (0.5 + 0.5 * theta.cos(), 0.5 + 0.5 * theta.sin());
            mesh.add_vertex(position, -Vec3::Y, Vec3::X, uv);
        }
        for seg in 0..segments as u16 {
            mesh.add_triangle(cap_center, cap_start + seg, cap_start + seg + 1);
        }

        mesh
    }
}

/// Vertex and index buffers of an uploaded mesh.
pub struct GpuMesh {
    /// Vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer (u16 triangle list).
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

impl GpuMesh {
    /// Uploads a CPU mesh into GPU buffers.
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_bounds(mesh: &Mesh) {
        for &i in &mesh.indices {
            assert!((i as usize) < mesh.vertices.len(), "index {} out of bounds", i);
        }
    }

    fn assert_unit_normals(mesh: &Mesh) {
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4, "normal {:?} not unit", v.normal);
        }
    }

    #[test]
    fn test_quad_is_flat() {
        let mesh = Mesh::quad();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        for v in &mesh.vertices {
            assert_eq!(v.position[2], 0.0);
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
        assert_indices_in_bounds(&mesh);
    }

    #[test]
    fn test_sphere_topology() {
        let (segments, rings) = (9, 5);
        let mesh = Mesh::sphere(1.0, segments, rings);
        assert_eq!(
            mesh.vertices.len(),
            ((rings + 1) * (segments + 1)) as usize
        );
        assert_eq!(mesh.indices.len(), (rings * segments * 6) as usize);
        assert_indices_in_bounds(&mesh);
        assert_unit_normals(&mesh);
    }

    #[test]
    fn test_sphere_radius() {
        let mesh = Mesh::sphere(2.0, 12, 6);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            assert!((r - 2.0).abs() < 1e-4, "vertex at radius {}", r);
        }
    }

    #[test]
    fn test_sphere_seam_is_duplicated() {
        let segments = 8u32;
        let mesh = Mesh::sphere(1.0, segments, 4);
        // First ring: seam vertices share a position but differ in u.
        let first = &mesh.vertices[0];
        let last = &mesh.vertices[segments as usize];
        assert_eq!(first.uv[0], 0.0);
        assert_eq!(last.uv[0], 1.0);
        for c in 0..3 {
            assert!((first.position[c] - last.position[c]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cone_shape() {
        let mesh = Mesh::cone(1.0, 2.0, 8);
        assert_indices_in_bounds(&mesh);
        assert_unit_normals(&mesh);

        let apex_count = mesh
            .vertices
            .iter()
            .filter(|v| v.position == [0.0, 1.0, 0.0])
            .count();
        assert_eq!(apex_count, 8);

        // Every vertex stays inside the cone's bounding cylinder.
        for v in &mesh.vertices {
            assert!(v.position[1] >= -1.0 && v.position[1] <= 1.0);
            let radial = (v.position[0].powi(2) + v.position[2].powi(2)).sqrt();
            assert!(radial <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn test_cone_base_cap_points_down() {
        let mesh = Mesh::cone(1.0, 2.0, 6);
        let down = mesh
            .vertices
            .iter()
            .filter(|v| v.normal == [0.0, -1.0, 0.0])
            .count();
        // Center plus the duplicated cap ring.
        assert_eq!(down, 1 + 7);
    }
}
