//! CPU-side mesh generation for the primitive geometry kinds.
//!
//! Layouts follow the usual parametric constructions: a grid of
//! `(segments + 1)` rows of `(segments + 1)` vertices with a duplicated seam,
//! two triangles per grid cell, counter-clockwise front faces.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::scene::GeometryKind;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

pub fn build_mesh(kind: &GeometryKind) -> Mesh {
    match *kind {
        GeometryKind::TorusKnot {
            radius,
            tube,
            tubular_segments,
            radial_segments,
            p,
            q,
        } => torus_knot(radius, tube, tubular_segments, radial_segments, p, q),
        GeometryKind::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(radius, width_segments, height_segments),
        GeometryKind::Cuboid { size } => cuboid(size),
        GeometryKind::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => torus(radius, tube, radial_segments, tubular_segments),
    }
}

/// Two triangles per cell of a `rows x cols` vertex grid with row stride `cols + 1`
fn grid_indices(rows: u32, cols: u32) -> Vec<u32> {
    let stride = cols + 1;
    (0..rows)
        .flat_map(|j| {
            (0..cols).flat_map(move |i| {
                let a = j * stride + i;
                let b = (j + 1) * stride + i;
                let c = (j + 1) * stride + i + 1;
                let d = j * stride + i + 1;
                [a, b, d, b, c, d]
            })
        })
        .collect()
}

fn torus_knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let quo_p = q / p * u;
    let cs = quo_p.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * quo_p.sin() * 0.5,
    )
}

pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> Mesh {
    let (pf, qf) = (p as f32, q as f32);
    let mut vertices = Vec::with_capacity(((tubular_segments + 1) * (radial_segments + 1)) as usize);

    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * pf * TAU;
        let p1 = torus_knot_curve(u, pf, qf, radius);
        let p2 = torus_knot_curve(u + 0.01, pf, qf, radius);

        // Frenet-like frame along the curve
        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n).normalize();
        let n = b.cross(t).normalize();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let position = p1 + n * cx + b * cy;
            vertices.push(Vertex::new(position, (position - p1).normalize()));
        }
    }

    Mesh {
        vertices,
        indices: grid_indices(tubular_segments, radial_segments),
    }
}

pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);

    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let normal = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            vertices.push(Vertex::new(normal * radius, normal));
        }
    }

    // Skip the degenerate triangles at the poles
    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * stride + x + 1;
            let b = y * stride + x;
            let c = (y + 1) * stride + x;
            let d = (y + 1) * stride + x + 1;
            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh { vertices, indices }
}

pub fn cuboid(size: f32) -> Mesh {
    let h = size * 0.5;
    // (normal, u axis, v axis) per face, u x v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = Mesh::default();
    for (normal, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        let center = normal * h;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            mesh.vertices
                .push(Vertex::new(center + u * (su * h) + v * (sv * h), normal));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Mesh {
    let mut vertices = Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);

    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let v = j as f32 / radial_segments as f32 * TAU;
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let ring_center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            vertices.push(Vertex::new(position, (position - ring_center).normalize()));
        }
    }

    Mesh {
        vertices,
        indices: grid_indices(radial_segments, tubular_segments),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit_normals(mesh: &Mesh) {
        for vertex in &mesh.vertices {
            let length = Vec3::from_array(vertex.normal).length();
            assert!((length - 1.0).abs() < 1e-4, "normal length {length}");
        }
    }

    fn assert_indices_in_range(mesh: &Mesh) {
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn test_torus_knot_counts() {
        let mesh = build_mesh(&GeometryKind::TORUS_KNOT);
        assert_eq!(mesh.vertices.len(), 101 * 17);
        assert_eq!(mesh.triangle_count(), 100 * 16 * 2);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
    }

    #[test]
    fn test_torus_knot_stays_within_tube_of_curve() {
        let mesh = torus_knot(1.0, 0.4, 64, 8, 2, 3);
        // Curve radius is at most 1.5, plus the tube
        for vertex in &mesh.vertices {
            assert!(Vec3::from_array(vertex.position).length() <= 1.5 + 0.4 + 1e-3);
        }
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = sphere(2.0, 16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        // Pole rows contribute one triangle per cell, the rest two
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2 - 16 * 2);
        for vertex in &mesh.vertices {
            let length = Vec3::from_array(vertex.position).length();
            assert!((length - 2.0).abs() < 1e-4);
        }
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mesh = cuboid(2.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a).normalize();
            let stored = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(stored) > 0.99, "triangle wound inward");
        }
    }

    #[test]
    fn test_torus_counts() {
        let mesh = torus(1.0, 0.4, 16, 64);
        assert_eq!(mesh.vertices.len(), 17 * 65);
        assert_eq!(mesh.triangle_count(), 16 * 64 * 2);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
    }
}
