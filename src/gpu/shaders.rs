//! Built-in shader programs
//!
//! GLSL ES 1.00 so the same sources run on desktop GL and WebGL 1.

use crate::geometry::Primitive;
use super::{ProgramSource, INSTANCE_UNIFORMS};

pub const FLAT_VERTEX: &str = r#"#version 100
attribute vec3 in_pos;
uniform mat4 mvp;
void main() {
    gl_Position = mvp * vec4(in_pos, 1.0);
}
"#;

pub const FLAT_FRAGMENT: &str = r#"#version 100
precision mediump float;
uniform vec4 color;
void main() {
    gl_FragColor = color;
}
"#;

/// Filled triangles, alpha blended, writes depth
pub const FLAT_TRIANGLES: ProgramSource = ProgramSource {
    name: "flat_triangles",
    vertex: FLAT_VERTEX,
    fragment: FLAT_FRAGMENT,
    uniforms: INSTANCE_UNIFORMS,
    primitive: Primitive::Triangles,
    blend: true,
    depth_write: true,
};

/// Lines, alpha blended, depth tested only
pub const FLAT_LINES: ProgramSource = ProgramSource {
    name: "flat_lines",
    vertex: FLAT_VERTEX,
    fragment: FLAT_FRAGMENT,
    uniforms: INSTANCE_UNIFORMS,
    primitive: Primitive::Lines,
    blend: true,
    depth_write: false,
};
