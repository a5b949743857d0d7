//! Figure-eight blade geometry
//!
//! One lobe is a lemniscate half `r = sqrt(cos 2θ)` sampled over
//! `θ ∈ [-π/4, π/4]`, x scaled by size and y by width. The second lobe is the
//! first one negated. Everything is built in the XY plane around the origin;
//! the renderer orients it into the object's plane.

use std::collections::HashSet;
use std::f32::consts::FRAC_PI_4;

use crate::asset::MIN_BLADE_SEGMENTS;
use super::{MeshData, Primitive};

/// Samples this close to the origin (on both axes) are dropped
pub const ORIGIN_EPSILON: f32 = 1e-4;
/// Every Nth boundary sample gets a spoke
pub const SPOKE_STRIDE: usize = 4;
/// Upper bound so both lobes fit 16-bit indices
pub const MAX_BLADE_SEGMENTS: u32 = 4096;

/// Rounding applied to spoke endpoints before deduplication
const SPOKE_KEY_SCALE: f32 = 1000.0;

/// Generated blade geometry
#[derive(Debug, Clone, PartialEq)]
pub struct FigureEightMesh {
    /// Boundary polyline per lobe (origin excluded)
    pub lobes: [Vec<[f32; 2]>; 2],
    /// Triangle fan per lobe
    pub fill: MeshData,
    /// origin -> boundary -> origin, per lobe
    pub outline: MeshData,
    /// Radial spokes, deduplicated
    pub spokes: MeshData,
}

fn near_origin(p: [f32; 2]) -> bool {
    p[0].abs() < ORIGIN_EPSILON && p[1].abs() < ORIGIN_EPSILON
}

/// Sample one lobe's boundary
pub fn lobe_boundary(size: f32, width: f32, segments: u32) -> Vec<[f32; 2]> {
    let segments = segments.clamp(MIN_BLADE_SEGMENTS, MAX_BLADE_SEGMENTS);

    (0..=segments)
        .filter_map(|i| {
            // Symmetric in i so both ends land exactly on ±π/4
            let theta = FRAC_PI_4 * (2.0 * i as f32 / segments as f32 - 1.0);
            let r = (2.0 * theta).cos().max(0.0).sqrt();
            let p = [size * r * theta.cos(), width * r * theta.sin()];
            (!near_origin(p)).then_some(p)
        })
        .collect()
}

fn to_xy(p: [f32; 2]) -> [f32; 3] {
    [p[0], p[1], 0.0]
}

/// Build all blade meshes. Cost is linear in `segments`.
pub fn figure_eight(size: f32, width: f32, segments: u32) -> FigureEightMesh {
    let first = lobe_boundary(size, width, segments);
    let second: Vec<[f32; 2]> = first.iter().map(|p| [-p[0], -p[1]]).collect();
    let lobes = [first, second];

    let mut fill = MeshData::new(Primitive::Triangles);
    let mut outline = MeshData::new(Primitive::Lines);
    for lobe in &lobes {
        // Fan from the lobe's local origin
        let origin = fill.push_vertex([0.0; 3]);
        let start = fill.positions.len() as u16;
        for &p in lobe {
            fill.push_vertex(to_xy(p));
        }
        for i in 1..lobe.len() as u16 {
            fill.indices.extend_from_slice(&[origin, start + i - 1, start + i]);
        }

        let origin = outline.push_vertex([0.0; 3]);
        let mut prev = origin;
        for &p in lobe {
            let idx = outline.push_vertex(to_xy(p));
            outline.indices.extend_from_slice(&[prev, idx]);
            prev = idx;
        }
        if prev != origin {
            outline.indices.extend_from_slice(&[prev, origin]);
        }
    }

    let mut spokes = MeshData::new(Primitive::Lines);
    let mut seen = HashSet::new();
    let origin = spokes.push_vertex([0.0; 3]);
    for lobe in &lobes {
        let last = lobe.len().saturating_sub(1);
        for (i, &p) in lobe.iter().enumerate() {
            if i % SPOKE_STRIDE != 0 && i != last {
                continue;
            }
            let key = (
                (p[0] * SPOKE_KEY_SCALE).round() as i64,
                (p[1] * SPOKE_KEY_SCALE).round() as i64,
            );
            if !seen.insert(key) {
                continue;
            }
            let idx = spokes.push_vertex(to_xy(p));
            spokes.indices.extend_from_slice(&[origin, idx]);
        }
    }

    FigureEightMesh { lobes, fill, outline, spokes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_never_touches_origin() {
        for segments in [8, 9, 31, 64, 257] {
            let lobe = lobe_boundary(2.0, 1.0, segments);
            assert!(!lobe.is_empty());
            for p in &lobe {
                assert!(!near_origin(*p), "segments={} point={:?}", segments, p);
            }
        }
    }

    #[test]
    fn test_lobes_are_mirrored() {
        let mesh = figure_eight(2.0, 0.8, 48);
        assert_eq!(mesh.lobes[0].len(), mesh.lobes[1].len());
        for (a, b) in mesh.lobes[0].iter().zip(&mesh.lobes[1]) {
            assert_eq!(*b, [-a[0], -a[1]]);
        }
    }

    #[test]
    fn test_segment_floor_applies() {
        let floored = lobe_boundary(1.0, 1.0, 1);
        let minimum = lobe_boundary(1.0, 1.0, MIN_BLADE_SEGMENTS);
        assert_eq!(floored, minimum);
    }

    #[test]
    fn test_fan_triangle_count() {
        let mesh = figure_eight(2.0, 1.0, 32);
        let per_lobe = mesh.lobes[0].len() - 1;
        assert_eq!(mesh.fill.element_count(), per_lobe * 2);
        let max = mesh.fill.positions.len() as u16;
        assert!(mesh.fill.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn test_outline_closes_each_lobe() {
        let mesh = figure_eight(2.0, 1.0, 16);
        // origin->first, n-1 inner edges, last->origin
        let per_lobe = mesh.lobes[0].len() + 1;
        assert_eq!(mesh.outline.element_count(), per_lobe * 2);
    }

    #[test]
    fn test_spokes_have_no_duplicates() {
        let mesh = figure_eight(2.0, 1.0, 64);
        let mut keys = HashSet::new();
        for pair in mesh.spokes.indices.chunks(2) {
            let p = mesh.spokes.positions[pair[1] as usize];
            let key = ((p[0] * 1000.0).round() as i64, (p[1] * 1000.0).round() as i64);
            assert!(keys.insert(key), "duplicate spoke at {:?}", p);
        }
        // stride samples plus the last one, both lobes
        let n = mesh.lobes[0].len();
        let per_lobe = (n + SPOKE_STRIDE - 1) / SPOKE_STRIDE + usize::from((n - 1) % SPOKE_STRIDE != 0);
        assert_eq!(mesh.spokes.element_count(), per_lobe * 2);
    }

    #[test]
    fn test_size_and_width_scale_axes() {
        let lobe = lobe_boundary(3.0, 0.5, 64);
        let max_x = lobe.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        let max_y = lobe.iter().map(|p| p[1].abs()).fold(f32::MIN, f32::max);
        assert!((max_x - 3.0).abs() < 1e-3);
        assert!(max_y <= 0.5 * 0.36);
    }
}
