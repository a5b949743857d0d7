//! Scene renderer
//!
//! Every shape is uploaded once at unit scale and cached by [`MeshKey`];
//! objects are placed with a model matrix built from their fields and
//! runtime [`ObjectState`]. A cached mesh that no object drew during a
//! [`SceneRenderer::draw_scene`] is released at the end of that frame.
//! Programs and the remaining meshes stay alive until
//! [`SceneRenderer::dispose`].

use std::collections::{HashMap, HashSet};
use std::f32::consts::FRAC_PI_2;

use macroquad::math::{Mat4, Vec3};

use crate::asset::MIN_BLADE_SEGMENTS;
use crate::geometry::{
    axis_cone, axis_cylinder, figure_eight, grid_plane, ring, unit_box, uv_sphere, MeshData,
    Primitive, MAX_BLADE_SEGMENTS,
};
use crate::gpu::shaders::{FLAT_LINES, FLAT_TRIANGLES};
use crate::gpu::{GpuError, GpuMesh, GraphicsContext, InstanceUniforms, ShaderProgram};
use crate::segment::GhostMarker;
use crate::sim::{Axis, ObjectState, Plane, SimObjectDefinition};

const SPHERE_RINGS: u32 = 12;
const SPHERE_SECTORS: u32 = 18;
const RING_SEGMENTS: u32 = 64;
const AXIS_SECTORS: u32 = 12;
const MAX_GRID_DIVISIONS: u32 = 256;

/// Opacity multiplier for blade fill under its outline
const BLADE_FILL_ALPHA: f32 = 0.35;
const TWIRL_BEAD_RADIUS: f32 = 0.12;

/// Cache key for a unit-scale mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    Sphere,
    Ring,
    Cylinder,
    Cone,
    Grid(u32),
    Box,
    BladeFill(u32),
    BladeOutline(u32),
    BladeSpokes(u32),
}

impl MeshKey {
    fn blade_segments(segments: u32) -> u32 {
        segments.clamp(MIN_BLADE_SEGMENTS, MAX_BLADE_SEGMENTS)
    }

    pub fn build(self) -> MeshData {
        match self {
            MeshKey::Sphere => uv_sphere(SPHERE_RINGS, SPHERE_SECTORS),
            MeshKey::Ring => ring(RING_SEGMENTS),
            MeshKey::Cylinder => axis_cylinder(AXIS_SECTORS),
            MeshKey::Cone => axis_cone(AXIS_SECTORS),
            MeshKey::Grid(divisions) => grid_plane(divisions),
            MeshKey::Box => unit_box(),
            MeshKey::BladeFill(segments) => figure_eight(1.0, 1.0, segments).fill,
            MeshKey::BladeOutline(segments) => figure_eight(1.0, 1.0, segments).outline,
            MeshKey::BladeSpokes(segments) => figure_eight(1.0, 1.0, segments).spokes,
        }
    }
}

/// Rotation taking the local XY plane onto `plane`
fn plane_orientation(plane: Plane) -> Mat4 {
    match plane {
        Plane::Xy => Mat4::IDENTITY,
        Plane::Xz => Mat4::from_rotation_x(FRAC_PI_2),
        Plane::Yz => Mat4::from_rotation_y(-FRAC_PI_2),
    }
}

/// Rotation taking local +Y onto `axis`
fn axis_orientation(axis: Axis) -> Mat4 {
    match axis {
        Axis::X => Mat4::from_rotation_z(-FRAC_PI_2),
        Axis::Y => Mat4::IDENTITY,
        Axis::Z => Mat4::from_rotation_x(FRAC_PI_2),
    }
}

fn rgba(color: [u8; 3], opacity: f32) -> [f32; 4] {
    [
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
        opacity.clamp(0.0, 1.0),
    ]
}

fn translation(position: [f32; 3]) -> Mat4 {
    Mat4::from_translation(Vec3::from(position))
}

pub struct SceneRenderer {
    triangles: ShaderProgram,
    lines: ShaderProgram,
    meshes: HashMap<MeshKey, GpuMesh>,
    /// Keys drawn since the last sweep
    used: HashSet<MeshKey>,
}

impl SceneRenderer {
    pub fn new(ctx: &mut dyn GraphicsContext) -> Result<Self, GpuError> {
        let triangles = ShaderProgram::compile(ctx, &FLAT_TRIANGLES)?;
        let lines = match ShaderProgram::compile(ctx, &FLAT_LINES) {
            Ok(program) => program,
            Err(e) => {
                triangles.dispose(ctx);
                return Err(e);
            }
        };
        log::info!("compiled '{}' and '{}' programs", triangles.name(), lines.name());
        Ok(Self {
            triangles,
            lines,
            meshes: HashMap::new(),
            used: HashSet::new(),
        })
    }

    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn draw_mesh(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        key: MeshKey,
        mvp: Mat4,
        color: [f32; 4],
    ) -> Result<(), GpuError> {
        if !self.meshes.contains_key(&key) {
            let mesh = GpuMesh::upload(ctx, &key.build())?;
            self.meshes.insert(key, mesh);
        }
        self.used.insert(key);
        let Some(mesh) = self.meshes.get(&key) else {
            return Ok(());
        };
        let program = match mesh.primitive() {
            Primitive::Triangles => &self.triangles,
            Primitive::Lines => &self.lines,
        };
        mesh.draw(ctx, program, InstanceUniforms { mvp: mvp.to_cols_array(), color })
    }

    /// Draw one object, returning the number of draw calls issued
    pub fn draw_object(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        view_proj: Mat4,
        object: &SimObjectDefinition,
        state: ObjectState,
    ) -> Result<usize, GpuError> {
        let scale = state.scale;
        match object {
            SimObjectDefinition::Sphere(o) => {
                let model = translation(o.position) * Mat4::from_scale(Vec3::splat(o.radius * scale));
                self.draw_mesh(ctx, MeshKey::Sphere, view_proj * model, rgba(o.color, o.opacity))?;
                Ok(1)
            }
            SimObjectDefinition::Twirl(o) => {
                let frame = translation(o.position) * plane_orientation(o.plane);
                let color = rgba(o.color, o.opacity);
                let ring_model = frame * Mat4::from_scale(Vec3::splat(o.radius * scale));
                self.draw_mesh(ctx, MeshKey::Ring, view_proj * ring_model, color)?;

                let (sin, cos) = state.angle.sin_cos();
                let bead = Vec3::new(cos, sin, 0.0) * o.radius * scale;
                let bead_model = frame
                    * Mat4::from_translation(bead)
                    * Mat4::from_scale(Vec3::splat(TWIRL_BEAD_RADIUS));
                self.draw_mesh(ctx, MeshKey::Sphere, view_proj * bead_model, color)?;
                Ok(2)
            }
            SimObjectDefinition::TwirlingAxis(o) => {
                let frame = translation(o.position)
                    * axis_orientation(o.axis)
                    * Mat4::from_rotation_y(state.angle)
                    * Mat4::from_scale(Vec3::splat(scale));
                let color = rgba(o.color, o.opacity);
                let shaft = frame * Mat4::from_scale(Vec3::new(o.thickness, o.length, o.thickness));
                self.draw_mesh(ctx, MeshKey::Cylinder, view_proj * shaft, color)?;

                let head = frame
                    * Mat4::from_translation(Vec3::new(0.0, o.length, 0.0))
                    * Mat4::from_scale(Vec3::new(o.thickness * 2.5, o.thickness * 5.0, o.thickness * 2.5));
                self.draw_mesh(ctx, MeshKey::Cone, view_proj * head, color)?;
                Ok(2)
            }
            SimObjectDefinition::RgpXy(o) => {
                let divisions = o.divisions.clamp(1, MAX_GRID_DIVISIONS);
                let model = translation(o.position) * Mat4::from_scale(Vec3::new(o.size * scale, o.size * scale, 1.0));
                self.draw_mesh(ctx, MeshKey::Grid(divisions), view_proj * model, rgba(o.color, o.opacity))?;
                Ok(1)
            }
            SimObjectDefinition::Twirl8(o) => {
                let segments = MeshKey::blade_segments(o.segments);
                let model = translation(o.position)
                    * plane_orientation(o.plane)
                    * Mat4::from_rotation_z(state.angle)
                    * Mat4::from_scale(Vec3::new(o.size * scale, o.width * scale, 1.0));
                let mvp = view_proj * model;
                let fill = rgba(o.color, o.opacity * BLADE_FILL_ALPHA);
                let line = rgba(o.color, o.opacity);
                self.draw_mesh(ctx, MeshKey::BladeFill(segments), mvp, fill)?;
                self.draw_mesh(ctx, MeshKey::BladeOutline(segments), mvp, line)?;
                if o.show_spokes {
                    self.draw_mesh(ctx, MeshKey::BladeSpokes(segments), mvp, line)?;
                    return Ok(3);
                }
                Ok(2)
            }
            SimObjectDefinition::Dexel(o) => {
                let model = translation(o.position)
                    * Mat4::from_scale(Vec3::new(o.size, o.size, o.height * scale));
                self.draw_mesh(ctx, MeshKey::Box, view_proj * model, rgba(o.color, o.opacity))?;
                Ok(1)
            }
        }
    }

    /// Draw a frame: objects paired with their runtime state, then ghosts.
    /// Returns the number of draw calls.
    pub fn draw_scene(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        view_proj: Mat4,
        objects: &[SimObjectDefinition],
        states: &[ObjectState],
        ghosts: &[GhostMarker],
    ) -> Result<usize, GpuError> {
        let mut calls = 0;
        for (i, object) in objects.iter().enumerate() {
            let state = states.get(i).copied().unwrap_or_default();
            calls += self.draw_object(ctx, view_proj, object, state)?;
        }
        for ghost in ghosts {
            let model = translation(ghost.position) * Mat4::from_scale(Vec3::splat(ghost.radius));
            self.draw_mesh(ctx, MeshKey::Sphere, view_proj * model, rgba(ghost.color, ghost.opacity))?;
            calls += 1;
        }
        self.evict_unused(ctx);
        Ok(calls)
    }

    /// Release cached meshes not drawn since the last sweep
    fn evict_unused(&mut self, ctx: &mut dyn GraphicsContext) {
        let stale: Vec<MeshKey> = self
            .meshes
            .keys()
            .filter(|key| !self.used.contains(*key))
            .copied()
            .collect();
        for key in &stale {
            if let Some(mesh) = self.meshes.remove(key) {
                mesh.dispose(ctx);
            }
        }
        if !stale.is_empty() {
            log::debug!("evicted {} unused meshes", stale.len());
        }
        self.used.clear();
    }

    /// Release every cached mesh and both programs
    pub fn dispose(mut self, ctx: &mut dyn GraphicsContext) {
        let count = self.meshes.len();
        for (_, mesh) in self.meshes.drain() {
            mesh.dispose(ctx);
        }
        let Self { triangles, lines, .. } = self;
        triangles.dispose(ctx);
        lines.dispose(ctx);
        log::info!("renderer disposed ({} meshes)", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetOverrides, AssetRegistry};
    use crate::gpu::testing::RecordingContext;
    use crate::segment::{build_segment, builtin_blueprints};

    #[test]
    fn test_scene_draw_and_dispose_balance() {
        let registry = AssetRegistry::builtin();
        let mut ctx = RecordingContext::default();
        let mut renderer = SceneRenderer::new(&mut ctx).unwrap();

        for blueprint in builtin_blueprints() {
            let segment = build_segment(&registry, &blueprint).unwrap();
            let states = vec![ObjectState::default(); segment.objects.len()];
            let calls = renderer
                .draw_scene(&mut ctx, Mat4::IDENTITY, &segment.objects, &states, &segment.ghosts)
                .unwrap();
            assert!(calls >= segment.objects.len() + segment.ghosts.len());
        }
        assert!(renderer.cached_meshes() > 0);
        assert_eq!(ctx.live_buffers.len(), renderer.cached_meshes() * 2);

        renderer.dispose(&mut ctx);
        assert!(ctx.live_buffers.is_empty());
        assert!(ctx.live_programs.is_empty());
    }

    #[test]
    fn test_meshes_are_cached_across_frames() {
        let registry = AssetRegistry::builtin();
        let build = registry.instantiate("s", "sphere", &AssetOverrides::None).unwrap();
        let mut ctx = RecordingContext::default();
        let mut renderer = SceneRenderer::new(&mut ctx).unwrap();
        let states = [ObjectState::default()];

        for _ in 0..3 {
            renderer.draw_scene(&mut ctx, Mat4::IDENTITY, &build.objects, &states, &[]).unwrap();
        }
        assert_eq!(renderer.cached_meshes(), 1);
        assert_eq!(ctx.draws.len(), 3);
        renderer.dispose(&mut ctx);
    }

    #[test]
    fn test_changing_blade_segments_keeps_cache_bounded() {
        let registry = AssetRegistry::builtin();
        let mut objects = registry.instantiate("blade", "k1p2", &AssetOverrides::None).unwrap().objects;
        let states = [ObjectState::default()];
        let mut ctx = RecordingContext::default();
        let mut renderer = SceneRenderer::new(&mut ctx).unwrap();

        for segments in MIN_BLADE_SEGMENTS..MIN_BLADE_SEGMENTS + 40 {
            if let SimObjectDefinition::Twirl8(blade) = &mut objects[0] {
                blade.segments = segments;
            }
            renderer.draw_scene(&mut ctx, Mat4::IDENTITY, &objects, &states, &[]).unwrap();
            assert!(renderer.cached_meshes() <= 3, "{} meshes at {}", renderer.cached_meshes(), segments);
            assert_eq!(ctx.live_buffers.len(), renderer.cached_meshes() * 2);
        }
        assert!(!ctx.deleted_buffers.is_empty());

        renderer.dispose(&mut ctx);
        assert!(ctx.live_buffers.is_empty());
    }

    #[test]
    fn test_segment_switch_evicts_previous_meshes() {
        let registry = AssetRegistry::builtin();
        let sphere = registry.instantiate("s", "sphere", &AssetOverrides::None).unwrap().objects;
        let dexel = registry.instantiate("d", "dexel", &AssetOverrides::None).unwrap().objects;
        let states = [ObjectState::default()];
        let mut ctx = RecordingContext::default();
        let mut renderer = SceneRenderer::new(&mut ctx).unwrap();

        renderer.draw_scene(&mut ctx, Mat4::IDENTITY, &sphere, &states, &[]).unwrap();
        renderer.draw_scene(&mut ctx, Mat4::IDENTITY, &dexel, &states, &[]).unwrap();
        assert_eq!(renderer.cached_meshes(), 1);
        assert_eq!(ctx.deleted_buffers.len(), 2);
        renderer.dispose(&mut ctx);
    }

    #[test]
    fn test_failed_program_compile_releases_first_program() {
        let mut ctx = RecordingContext { fail_compile_after: Some(1), ..Default::default() };
        assert!(SceneRenderer::new(&mut ctx).is_err());
        assert_eq!(ctx.programs_created, 1);
        assert_eq!(ctx.deleted_programs.len(), 1);
        assert!(ctx.live_programs.is_empty());
    }

    #[test]
    fn test_failed_first_compile_creates_nothing() {
        let mut ctx = RecordingContext { fail_compile_after: Some(0), ..Default::default() };
        assert!(SceneRenderer::new(&mut ctx).is_err());
        assert_eq!(ctx.programs_created, 0);
        assert!(ctx.deleted_programs.is_empty());
    }

    #[test]
    fn test_orientations_map_axes() {
        let x = axis_orientation(Axis::X).transform_vector3(Vec3::Y);
        let z = axis_orientation(Axis::Z).transform_vector3(Vec3::Y);
        assert!((x - Vec3::X).length() < 1e-5);
        assert!((z - Vec3::Z).length() < 1e-5);

        let xz = plane_orientation(Plane::Xz).transform_vector3(Vec3::Y);
        let yz = plane_orientation(Plane::Yz).transform_vector3(Vec3::X);
        assert!((xz - Vec3::Z).length() < 1e-5);
        assert!((yz - Vec3::Z).length() < 1e-5);
    }
}
