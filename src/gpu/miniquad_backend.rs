//! GraphicsContext over macroquad's internal miniquad backend
//!
//! macroquad batches its own 2D draws; `begin_frame` flushes that batch so
//! raw draws land on top of the background and under the UI drawn later in
//! the frame.

use std::collections::HashMap;

use macroquad::miniquad::{
    BlendFactor, BlendState, BlendValue, Bindings, BufferId, BufferLayout, BufferSource,
    BufferType, BufferUsage, Comparison, Equation, PassAction, Pipeline, PipelineParams,
    PrimitiveType, ShaderId, ShaderMeta, ShaderSource, UniformBlockLayout, UniformDesc,
    UniformType, UniformsSource, VertexAttribute, VertexFormat,
};
use macroquad::window::get_internal_gl;

use crate::geometry::Primitive;
use super::{
    BufferHandle, DrawCall, GpuError, GraphicsContext, ProgramHandle, ProgramSource, UniformKind,
};

struct ProgramEntry {
    shader: ShaderId,
    pipeline: Pipeline,
}

/// Live miniquad objects keyed by the handles we hand out
#[derive(Default)]
pub struct MiniquadContext {
    next_handle: u32,
    buffers: HashMap<u32, BufferId>,
    programs: HashMap<u32, ProgramEntry>,
}

impl MiniquadContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Flush macroquad's batch and open a pass that only clears depth
    pub fn begin_frame(&mut self) {
        let mut gl = unsafe { get_internal_gl() };
        gl.flush();
        gl.quad_context.begin_default_pass(PassAction::Clear {
            color: None,
            depth: Some(1.0),
            stencil: None,
        });
    }

    pub fn end_frame(&mut self) {
        let gl = unsafe { get_internal_gl() };
        gl.quad_context.end_render_pass();
    }

    /// Live buffer and program counts
    pub fn live_counts(&self) -> (usize, usize) {
        (self.buffers.len(), self.programs.len())
    }
}

fn uniform_type(kind: UniformKind) -> UniformType {
    match kind {
        UniformKind::Float4 => UniformType::Float4,
        UniformKind::Mat4 => UniformType::Mat4,
    }
}

fn primitive_type(primitive: Primitive) -> PrimitiveType {
    match primitive {
        Primitive::Triangles => PrimitiveType::Triangles,
        Primitive::Lines => PrimitiveType::Lines,
    }
}

impl GraphicsContext for MiniquadContext {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle {
        let gl = unsafe { get_internal_gl() };
        let id = gl.quad_context.new_buffer(
            BufferType::VertexBuffer,
            BufferUsage::Immutable,
            BufferSource::slice(data),
        );
        let handle = self.issue();
        self.buffers.insert(handle, id);
        BufferHandle(handle)
    }

    fn create_index_buffer(&mut self, data: &[u16]) -> BufferHandle {
        let gl = unsafe { get_internal_gl() };
        let id = gl.quad_context.new_buffer(
            BufferType::IndexBuffer,
            BufferUsage::Immutable,
            BufferSource::slice(data),
        );
        let handle = self.issue();
        self.buffers.insert(handle, id);
        BufferHandle(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(&buffer.0) {
            Some(id) => {
                let gl = unsafe { get_internal_gl() };
                gl.quad_context.delete_buffer(id);
            }
            None => log::warn!("delete of unknown buffer {}", buffer.0),
        }
    }

    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramHandle, GpuError> {
        let gl = unsafe { get_internal_gl() };
        let meta = ShaderMeta {
            uniforms: UniformBlockLayout {
                uniforms: source
                    .uniforms
                    .iter()
                    .map(|u| UniformDesc::new(u.name, uniform_type(u.kind)))
                    .collect(),
            },
            images: vec![],
        };
        let shader = gl
            .quad_context
            .new_shader(
                ShaderSource::Glsl { vertex: source.vertex, fragment: source.fragment },
                meta,
            )
            .map_err(|e| GpuError::ShaderCompile {
                program: source.name.to_string(),
                message: format!("{:?}", e),
            })?;

        let color_blend = source.blend.then(|| {
            BlendState::new(
                Equation::Add,
                BlendFactor::Value(BlendValue::SourceAlpha),
                BlendFactor::OneMinusValue(BlendValue::SourceAlpha),
            )
        });
        let pipeline = gl.quad_context.new_pipeline(
            &[BufferLayout::default()],
            &[VertexAttribute::new("in_pos", VertexFormat::Float3)],
            shader,
            PipelineParams {
                primitive_type: primitive_type(source.primitive),
                depth_test: Comparison::LessOrEqual,
                depth_write: source.depth_write,
                color_blend,
                ..Default::default()
            },
        );

        let handle = self.issue();
        self.programs.insert(handle, ProgramEntry { shader, pipeline });
        Ok(ProgramHandle(handle))
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        match self.programs.remove(&program.0) {
            Some(entry) => {
                let gl = unsafe { get_internal_gl() };
                gl.quad_context.delete_pipeline(entry.pipeline);
                gl.quad_context.delete_shader(entry.shader);
            }
            None => log::warn!("delete of unknown program {}", program.0),
        }
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), GpuError> {
        let entry = self
            .programs
            .get(&call.program.0)
            .ok_or(GpuError::UnknownHandle(call.program.0))?;
        let vertices = *self
            .buffers
            .get(&call.vertices.0)
            .ok_or(GpuError::UnknownHandle(call.vertices.0))?;
        let indices = *self
            .buffers
            .get(&call.indices.0)
            .ok_or(GpuError::UnknownHandle(call.indices.0))?;

        let gl = unsafe { get_internal_gl() };
        let ctx = gl.quad_context;
        ctx.apply_pipeline(&entry.pipeline);
        ctx.apply_bindings(&Bindings {
            vertex_buffers: vec![vertices],
            index_buffer: indices,
            images: vec![],
        });
        ctx.apply_uniforms(UniformsSource::table(&call.uniforms));
        ctx.draw(0, call.index_count, 1);
        Ok(())
    }
}
