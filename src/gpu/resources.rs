//! Mesh and program handles with explicit disposal

use crate::geometry::{MeshData, Primitive};
use super::{
    BufferHandle, DrawCall, GpuError, GraphicsContext, InstanceUniforms, ProgramHandle,
    ProgramSource,
};

/// Index and vertex buffers for one mesh
#[derive(Debug)]
pub struct GpuMesh {
    vertices: BufferHandle,
    indices: BufferHandle,
    index_count: i32,
    primitive: Primitive,
    released: bool,
}

impl GpuMesh {
    pub fn upload(ctx: &mut dyn GraphicsContext, mesh: &MeshData) -> Result<Self, GpuError> {
        if mesh.is_empty() || mesh.positions.is_empty() {
            return Err(GpuError::EmptyMesh);
        }
        let vertices = ctx.create_vertex_buffer(&mesh.flat_positions());
        let indices = ctx.create_index_buffer(&mesh.indices);
        Ok(Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as i32,
            primitive: mesh.primitive,
            released: false,
        })
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }

    pub fn draw(
        &self,
        ctx: &mut dyn GraphicsContext,
        program: &ShaderProgram,
        uniforms: InstanceUniforms,
    ) -> Result<(), GpuError> {
        if program.primitive != self.primitive {
            return Err(GpuError::PrimitiveMismatch {
                mesh: self.primitive,
                program: program.primitive,
            });
        }
        ctx.draw(&DrawCall {
            program: program.handle,
            vertices: self.vertices,
            indices: self.indices,
            index_count: self.index_count,
            uniforms,
        })
    }

    /// Release both buffers
    pub fn dispose(mut self, ctx: &mut dyn GraphicsContext) {
        ctx.delete_buffer(self.vertices);
        ctx.delete_buffer(self.indices);
        self.released = true;
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "GpuMesh ({:?}, {} indices) dropped without dispose; buffers leaked",
                self.primitive, self.index_count
            );
        }
    }
}

/// A compiled program and its pipeline state
#[derive(Debug)]
pub struct ShaderProgram {
    name: &'static str,
    handle: ProgramHandle,
    primitive: Primitive,
    released: bool,
}

/// Whether `source` declares `uniform [precision] <type> <name>;`
fn declares_uniform(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        let words: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ';')
            .filter(|w| !w.is_empty())
            .collect();
        words.len() >= 3 && words[0] == "uniform" && words.last() == Some(&name)
    })
}

impl ShaderProgram {
    /// Check every declared uniform against the sources, then compile
    pub fn compile(ctx: &mut dyn GraphicsContext, source: &ProgramSource) -> Result<Self, GpuError> {
        for uniform in source.uniforms {
            if !declares_uniform(source.vertex, uniform.name)
                && !declares_uniform(source.fragment, uniform.name)
            {
                return Err(GpuError::MissingUniform {
                    program: source.name.to_string(),
                    uniform: uniform.name.to_string(),
                });
            }
        }
        let handle = ctx.create_program(source)?;
        log::debug!("compiled shader program '{}'", source.name);
        Ok(Self {
            name: source.name,
            handle,
            primitive: source.primitive,
            released: false,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn dispose(mut self, ctx: &mut dyn GraphicsContext) {
        ctx.delete_program(self.handle);
        self.released = true;
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if !self.released {
            log::warn!("ShaderProgram '{}' dropped without dispose; program leaked", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{grid_plane, uv_sphere};
    use crate::gpu::shaders::{FLAT_LINES, FLAT_TRIANGLES};
    use crate::gpu::testing::RecordingContext;
    use crate::gpu::INSTANCE_UNIFORMS;

    fn uniforms() -> InstanceUniforms {
        InstanceUniforms { mvp: [0.0; 16], color: [1.0; 4] }
    }

    #[test]
    fn test_dispose_releases_exactly_what_was_allocated() {
        let mut ctx = RecordingContext::default();
        let program = ShaderProgram::compile(&mut ctx, &FLAT_TRIANGLES).unwrap();
        let mesh = GpuMesh::upload(&mut ctx, &uv_sphere(4, 6)).unwrap();
        assert_eq!(ctx.live_buffers.len(), 2);
        assert_eq!(ctx.live_programs.len(), 1);

        mesh.dispose(&mut ctx);
        program.dispose(&mut ctx);
        assert!(ctx.live_buffers.is_empty());
        assert!(ctx.live_programs.is_empty());
        assert_eq!(ctx.deleted_buffers.len(), 2);
        assert_eq!(ctx.deleted_programs.len(), 1);
    }

    #[test]
    fn test_missing_uniform_fails_before_compile() {
        const BROKEN: ProgramSource = ProgramSource {
            name: "broken",
            vertex: "attribute vec3 in_pos;\nvoid main() {}\n",
            fragment: "precision mediump float;\nuniform vec4 color;\nvoid main() {}\n",
            uniforms: INSTANCE_UNIFORMS,
            primitive: Primitive::Triangles,
            blend: false,
            depth_write: true,
        };
        let mut ctx = RecordingContext::default();
        let err = ShaderProgram::compile(&mut ctx, &BROKEN).unwrap_err();
        assert_eq!(
            err,
            GpuError::MissingUniform { program: "broken".into(), uniform: "mvp".into() }
        );
        assert!(ctx.live_programs.is_empty());
    }

    #[test]
    fn test_compile_error_propagates() {
        let mut ctx = RecordingContext { fail_compile_after: Some(0), ..Default::default() };
        let err = ShaderProgram::compile(&mut ctx, &FLAT_LINES).unwrap_err();
        assert!(matches!(err, GpuError::ShaderCompile { .. }));
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let mut ctx = RecordingContext::default();
        let empty = MeshData::new(Primitive::Lines);
        assert_eq!(GpuMesh::upload(&mut ctx, &empty).unwrap_err(), GpuError::EmptyMesh);
        assert!(ctx.live_buffers.is_empty());
    }

    #[test]
    fn test_draw_checks_primitive() {
        let mut ctx = RecordingContext::default();
        let lines = ShaderProgram::compile(&mut ctx, &FLAT_LINES).unwrap();
        let tris = ShaderProgram::compile(&mut ctx, &FLAT_TRIANGLES).unwrap();
        let grid = GpuMesh::upload(&mut ctx, &grid_plane(2)).unwrap();

        assert!(grid.draw(&mut ctx, &lines, uniforms()).is_ok());
        assert!(matches!(
            grid.draw(&mut ctx, &tris, uniforms()),
            Err(GpuError::PrimitiveMismatch { .. })
        ));
        assert_eq!(ctx.draws.len(), 1);
        assert_eq!(ctx.draws[0].index_count, grid.index_count());

        grid.dispose(&mut ctx);
        lines.dispose(&mut ctx);
        tris.dispose(&mut ctx);
    }

    #[test]
    fn test_uniform_declaration_parsing() {
        assert!(declares_uniform("uniform mat4 mvp;", "mvp"));
        assert!(declares_uniform("  uniform lowp vec4 color ;", "color"));
        assert!(!declares_uniform("uniform lowp vec4 color;", "vec4"));
        assert!(!declares_uniform("// mvp", "mvp"));
        assert!(!declares_uniform("uniform mat4 mvp_other;", "mvp"));
    }
}
