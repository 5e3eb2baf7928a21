//! WGSL sources for the fixed vertex/color pipeline.
//!
//! The contract is the pass-through pipeline of the reference scene:
//! positions are transformed by `projection * model`, vertex colors are
//! interpolated and written out unchanged.

/// Vertex stage: transform position, pass color through.
pub const VERTEX_SHADER: &str = r#"
struct FrameUniforms {
    projection: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = frame.projection * frame.model * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}
"#;

/// Fragment stage: output the interpolated color unchanged.
pub const FRAGMENT_SHADER: &str = r#"
struct FragmentInput {
    @location(0) color: vec3<f32>,
};

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;
