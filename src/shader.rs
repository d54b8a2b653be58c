//! WGSL shader sources and the uniform block layout.
//!
//! Two render programs cover the sketch variants:
//!
//! - [`particle_shader`]: billboarded instanced quads positioned by the
//!   `offset` attribute and tinted by the per-instance `color`, brightened
//!   where the pointer trail is hot.
//! - [`cell_shader`]: one rotated quad per field cell, positioned by
//!   `offset`, rotated by `angle`, phase-shifted by `p_index`, textured
//!   from the mask image and perturbed by the trail.
//!
//! The `Uniforms` struct must match the WGSL `Uniforms` declaration
//! byte-for-byte; a test validates both programs with naga.

use bytemuck::{Pod, Zeroable};

/// Uniform block shared by both programs.
///
/// Layout mirrors the WGSL struct: mat4 at 0, scalars at 64, vec2 at 72,
/// cell scale at 80, padded to 96 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Seconds since sketch start.
    pub time: f32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// Scaled mask dimensions, for mapping offsets to texture UVs.
    pub texture_size: [f32; 2],
    /// Half-extent of a cell quad in scene units (cell sketches only).
    pub cell_scale: f32,
    pub _padding: [f32; 3],
}

const UNIFORMS_WGSL: &str = r#"struct Uniforms {
    view_proj: mat4x4<f32>,
    time: f32,
    delta_time: f32,
    texture_size: vec2<f32>,
    cell_scale: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var u_texture: texture_2d<f32>;
@group(1) @binding(1)
var u_sampler: sampler;
@group(1) @binding(2)
var u_mouse_texture: texture_2d<f32>;
@group(1) @binding(3)
var u_mouse_sampler: sampler;
"#;

/// Shader for the particle sketches.
pub fn particle_shader() -> String {
    format!(
        r#"{UNIFORMS_WGSL}
struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) quad: vec2<f32>,
    @location(2) uv: vec2<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) offset: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];
    let particle_size = 0.004;

    var clip_pos = uniforms.view_proj * vec4<f32>(offset, 1.0);
    clip_pos.x += quad_pos.x * particle_size * clip_pos.w;
    clip_pos.y += quad_pos.y * particle_size * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.color = color;
    out.quad = quad_pos;
    out.uv = clamp(offset.xy / uniforms.texture_size, vec2<f32>(0.0), vec2<f32>(1.0));
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let dist = length(in.quad);
    if dist > 1.0 {{
        discard;
    }}
    let trail = textureSample(u_mouse_texture, u_mouse_sampler, in.uv).r;
    let alpha = 1.0 - smoothstep(0.5, 1.0, dist);
    return vec4<f32>(in.color + vec3<f32>(trail), alpha);
}}
"#
    )
}

/// Shader for the cell-grid sketches.
pub fn cell_shader() -> String {
    format!(
        r#"{UNIFORMS_WGSL}
struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) p_index: f32,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) offset: vec3<f32>,
    @location(1) angle: f32,
    @location(2) p_index: f32,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    let c = cos(angle);
    let s = sin(angle);
    let rotated = vec2<f32>(
        quad_pos.x * c - quad_pos.y * s,
        quad_pos.x * s + quad_pos.y * c,
    ) * uniforms.cell_scale;

    let world = vec3<f32>(offset.xy + rotated, offset.z);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.uv = clamp(offset.xy / uniforms.texture_size, vec2<f32>(0.0), vec2<f32>(1.0));
    out.p_index = p_index;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let base = textureSample(u_texture, u_sampler, in.uv).rgb;
    let trail = textureSample(u_mouse_texture, u_mouse_sampler, in.uv).r;
    let pulse = 0.75 + 0.25 * sin(uniforms.time + in.p_index * 0.01);
    return vec4<f32>(base * pulse + vec3<f32>(trail * 0.3), 1.0);
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_particle_shader_validates() {
        validate_wgsl(&particle_shader()).expect("particle shader should be valid");
    }

    #[test]
    fn test_cell_shader_validates() {
        validate_wgsl(&cell_shader()).expect("cell shader should be valid");
    }

    #[test]
    fn test_uniforms_size_matches_wgsl_layout() {
        // mat4 (64) + 2 scalars (8) + vec2 (8) + scalar (4) + padding (12).
        assert_eq!(std::mem::size_of::<Uniforms>(), 96);
    }
}
