//! GPU resources
//!
//! Buffers and shader programs are unmanaged: whoever creates one must hand
//! it back through `dispose`, which consumes the handle so a resource can't
//! be released twice. Dropping a handle without disposing it only logs a
//! leak warning; nothing is released implicitly.
//!
//! - `resources` - [`GpuMesh`] and [`ShaderProgram`]
//! - `shaders` - built-in GLSL sources
//! - `miniquad_backend` - [`GraphicsContext`] over macroquad's miniquad context

mod miniquad_backend;
mod resources;
pub mod shaders;

pub use miniquad_backend::MiniquadContext;
pub use resources::{GpuMesh, ShaderProgram};

use crate::geometry::Primitive;

/// Opaque buffer handle issued by a [`GraphicsContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Opaque program handle issued by a [`GraphicsContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float4,
    Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSpec {
    pub name: &'static str,
    pub kind: UniformKind,
}

/// Uniform layout shared by every built-in program. Order matches
/// [`InstanceUniforms`].
pub const INSTANCE_UNIFORMS: &[UniformSpec] = &[
    UniformSpec { name: "mvp", kind: UniformKind::Mat4 },
    UniformSpec { name: "color", kind: UniformKind::Float4 },
];

/// Per-draw transform and appearance
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceUniforms {
    /// Column-major model-view-projection
    pub mvp: [f32; 16],
    /// Straight RGBA, alpha = opacity
    pub color: [f32; 4],
}

/// Everything needed to compile one program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramSource {
    pub name: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub uniforms: &'static [UniformSpec],
    pub primitive: Primitive,
    /// Straight alpha blending
    pub blend: bool,
    pub depth_write: bool,
}

/// One indexed draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub vertices: BufferHandle,
    pub indices: BufferHandle,
    pub index_count: i32,
    pub uniforms: InstanceUniforms,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GpuError {
    #[error("shader '{program}' failed to compile: {message}")]
    ShaderCompile { program: String, message: String },
    #[error("shader '{program}' does not declare uniform '{uniform}'")]
    MissingUniform { program: String, uniform: String },
    #[error("unknown GPU handle {0}")]
    UnknownHandle(u32),
    #[error("cannot upload an empty mesh")]
    EmptyMesh,
    #[error("mesh primitive {mesh:?} does not match program primitive {program:?}")]
    PrimitiveMismatch { mesh: Primitive, program: Primitive },
}

/// The seam between resource builders and an actual graphics API
pub trait GraphicsContext {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle;
    fn create_index_buffer(&mut self, data: &[u16]) -> BufferHandle;
    fn delete_buffer(&mut self, buffer: BufferHandle);
    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramHandle, GpuError>;
    fn delete_program(&mut self, program: ProgramHandle);
    fn draw(&mut self, call: &DrawCall) -> Result<(), GpuError>;
}

/// In-memory context that records every call, for tests
#[cfg(test)]
pub mod testing {
    use std::collections::HashSet;
    use super::*;

    #[derive(Debug, Default)]
    pub struct RecordingContext {
        pub(crate) next: u32,
        pub live_buffers: HashSet<BufferHandle>,
        pub live_programs: HashSet<ProgramHandle>,
        pub deleted_buffers: Vec<BufferHandle>,
        pub deleted_programs: Vec<ProgramHandle>,
        pub draws: Vec<DrawCall>,
        /// Programs compiled so far, including deleted ones
        pub programs_created: u32,
        /// Fail every compile once this many programs have been created
        pub fail_compile_after: Option<u32>,
    }

    impl RecordingContext {
        fn issue(&mut self) -> u32 {
            self.next += 1;
            self.next
        }
    }

    impl GraphicsContext for RecordingContext {
        fn create_vertex_buffer(&mut self, _data: &[f32]) -> BufferHandle {
            let handle = BufferHandle(self.issue());
            self.live_buffers.insert(handle);
            handle
        }

        fn create_index_buffer(&mut self, _data: &[u16]) -> BufferHandle {
            let handle = BufferHandle(self.issue());
            self.live_buffers.insert(handle);
            handle
        }

        fn delete_buffer(&mut self, buffer: BufferHandle) {
            assert!(self.live_buffers.remove(&buffer), "double delete of {:?}", buffer);
            self.deleted_buffers.push(buffer);
        }

        fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramHandle, GpuError> {
            if self.fail_compile_after.is_some_and(|limit| self.programs_created >= limit) {
                return Err(GpuError::ShaderCompile {
                    program: source.name.to_string(),
                    message: "forced failure".to_string(),
                });
            }
            let handle = ProgramHandle(self.issue());
            self.programs_created += 1;
            self.live_programs.insert(handle);
            Ok(handle)
        }

        fn delete_program(&mut self, program: ProgramHandle) {
            assert!(self.live_programs.remove(&program), "double delete of {:?}", program);
            self.deleted_programs.push(program);
        }

        fn draw(&mut self, call: &DrawCall) -> Result<(), GpuError> {
            if !self.live_programs.contains(&call.program) {
                return Err(GpuError::UnknownHandle(call.program.0));
            }
            if !self.live_buffers.contains(&call.vertices) {
                return Err(GpuError::UnknownHandle(call.vertices.0));
            }
            self.draws.push(*call);
            Ok(())
        }
    }
}
