//! Unit shapes
//!
//! Built once at unit scale; per-object size comes from the model matrix.

use std::f32::consts::{PI, TAU};

use super::{MeshData, Primitive};

/// Unit-radius UV sphere centered on the origin
pub fn uv_sphere(rings: u32, sectors: u32) -> MeshData {
    let rings = rings.max(2);
    let sectors = sectors.max(3);
    let mut mesh = MeshData::new(Primitive::Triangles);

    for r in 0..=rings {
        let phi = PI * r as f32 / rings as f32;
        for s in 0..=sectors {
            let theta = TAU * s as f32 / sectors as f32;
            mesh.push_vertex([phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()]);
        }
    }

    let stride = (sectors + 1) as u16;
    for r in 0..rings as u16 {
        for s in 0..sectors as u16 {
            let a = r * stride + s;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

/// Unit circle in XY as a closed line loop
pub fn ring(segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut mesh = MeshData::new(Primitive::Lines);
    for i in 0..segments {
        let theta = TAU * i as f32 / segments as f32;
        mesh.push_vertex([theta.cos(), theta.sin(), 0.0]);
    }
    let n = segments as u16;
    for i in 0..n {
        mesh.indices.extend_from_slice(&[i, (i + 1) % n]);
    }
    mesh
}

/// Unit-radius cylinder along +Y from 0 to 1, capped at the top
pub fn axis_cylinder(sectors: u32) -> MeshData {
    let sectors = sectors.max(3);
    let mut mesh = MeshData::new(Primitive::Triangles);

    for i in 0..sectors {
        let theta = TAU * i as f32 / sectors as f32;
        let (x, z) = (theta.cos(), theta.sin());
        mesh.push_vertex([x, 0.0, z]);
        mesh.push_vertex([x, 1.0, z]);
    }
    let cap = mesh.push_vertex([0.0, 1.0, 0.0]);

    let n = sectors as u16;
    for i in 0..n {
        let bottom = i * 2;
        let top = bottom + 1;
        let next_bottom = ((i + 1) % n) * 2;
        let next_top = next_bottom + 1;
        mesh.indices.extend_from_slice(&[bottom, top, next_bottom, next_bottom, top, next_top]);
        mesh.indices.extend_from_slice(&[cap, next_top, top]);
    }
    mesh
}

/// Arrow head: unit-radius base at y = 0, tip at y = 1
pub fn axis_cone(sectors: u32) -> MeshData {
    let sectors = sectors.max(3);
    let mut mesh = MeshData::new(Primitive::Triangles);
    for i in 0..sectors {
        let theta = TAU * i as f32 / sectors as f32;
        mesh.push_vertex([theta.cos(), 0.0, theta.sin()]);
    }
    let tip = mesh.push_vertex([0.0, 1.0, 0.0]);
    let base = mesh.push_vertex([0.0, 0.0, 0.0]);
    let n = sectors as u16;
    for i in 0..n {
        let next = (i + 1) % n;
        mesh.indices.extend_from_slice(&[i, tip, next, i, next, base]);
    }
    mesh
}

/// Square grid in XY spanning [-0.5, 0.5] with `divisions` cells per side
pub fn grid_plane(divisions: u32) -> MeshData {
    let divisions = divisions.max(1);
    let mut mesh = MeshData::new(Primitive::Lines);
    for i in 0..=divisions {
        let t = i as f32 / divisions as f32 - 0.5;
        let a = mesh.push_vertex([t, -0.5, 0.0]);
        let b = mesh.push_vertex([t, 0.5, 0.0]);
        mesh.indices.extend_from_slice(&[a, b]);
        let c = mesh.push_vertex([-0.5, t, 0.0]);
        let d = mesh.push_vertex([0.5, t, 0.0]);
        mesh.indices.extend_from_slice(&[c, d]);
    }
    mesh
}

/// Unit box: x, y in [-0.5, 0.5], z in [0, 1] (stands on the XY plane)
pub fn unit_box() -> MeshData {
    let mut mesh = MeshData::new(Primitive::Triangles);
    for z in [0.0, 1.0] {
        for (x, y) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            mesh.push_vertex([x, y, z]);
        }
    }
    mesh.indices.extend_from_slice(&[
        0, 2, 1, 0, 3, 2, // bottom
        4, 5, 6, 4, 6, 7, // top
        0, 1, 5, 0, 5, 4,
        1, 2, 6, 1, 6, 5,
        2, 3, 7, 2, 7, 6,
        3, 0, 4, 3, 4, 7,
    ]);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &MeshData) -> bool {
        let n = mesh.positions.len() as u16;
        mesh.indices.iter().all(|&i| i < n)
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = uv_sphere(8, 12);
        assert_eq!(mesh.positions.len(), 9 * 13);
        assert_eq!(mesh.element_count(), 8 * 12 * 2);
        assert!(indices_in_range(&mesh));
        for p in &mesh.positions {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ring_is_closed() {
        let mesh = ring(16);
        assert_eq!(mesh.element_count(), 16);
        assert_eq!(mesh.indices.last(), Some(&0));
    }

    #[test]
    fn test_cylinder_counts() {
        let mesh = axis_cylinder(10);
        assert_eq!(mesh.element_count(), 10 * 3);
        assert!(indices_in_range(&mesh));
    }

    #[test]
    fn test_cone_tip_and_base() {
        let mesh = axis_cone(12);
        assert_eq!(mesh.element_count(), 24);
        assert!(indices_in_range(&mesh));
        assert!(mesh.positions.contains(&[0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_grid_line_count() {
        let mesh = grid_plane(4);
        assert_eq!(mesh.element_count(), 5 * 2);
        assert!(mesh.positions.iter().all(|p| p[0].abs() <= 0.5 && p[1].abs() <= 0.5));
    }

    #[test]
    fn test_box_has_twelve_triangles() {
        let mesh = unit_box();
        assert_eq!(mesh.element_count(), 12);
        assert!(indices_in_range(&mesh));
    }
}
