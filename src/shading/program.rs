//! WGSL generation for the point shader.

use super::*;
use crate::noise::{noise_wgsl, wgsl_f32, FBM_OCTAVES};

/// Emit the shared tuning constants as WGSL declarations.
fn constants_wgsl() -> String {
    let scalars: [(&str, f32); 18] = [
        ("NOISE_POSITION_SCALE", NOISE_POSITION_SCALE),
        ("NOISE_TIME_SCALE", NOISE_TIME_SCALE),
        ("NOISE_AMPLITUDE", NOISE_AMPLITUDE),
        ("WAVE_LIFETIME", WAVE_LIFETIME),
        ("WAVE_PUSH", WAVE_PUSH),
        ("WAVE_SIZE_BONUS", WAVE_SIZE_BONUS),
        ("WAVE_DEGENERATE_DISTANCE", WAVE_DEGENERATE_DISTANCE),
        ("PULSE_SPEED", PULSE_SPEED),
        ("PULSE_AMPLITUDE", PULSE_AMPLITUDE),
        ("PULSE_RADIAL_PHASE", PULSE_RADIAL_PHASE),
        ("POINT_SCALE", POINT_SCALE),
        ("GLOW_CORE_RADIUS", GLOW_CORE_RADIUS),
        ("GLOW_OUTER_RADIUS", GLOW_OUTER_RADIUS),
        ("WAVE_TINT", WAVE_TINT),
        ("WAVE_BRIGHTEN", WAVE_BRIGHTEN),
        ("FADE_NEAR", FADE_NEAR),
        ("FADE_FAR", FADE_FAR),
        ("COLOR_CEILING", COLOR_CEILING),
    ];

    let mut out = format!("// Tuning constants\nconst NOISE_OCTAVES: i32 = {FBM_OCTAVES};\n");
    for (name, value) in scalars {
        out.push_str(&format!("const {name}: f32 = {};\n", wgsl_f32(value)));
    }
    for (i, stop) in FIERY_STOPS.iter().enumerate() {
        out.push_str(&format!(
            "const FIERY_{i}: vec3<f32> = vec3<f32>({}, {}, {});\n",
            wgsl_f32(stop[0]),
            wgsl_f32(stop[1]),
            wgsl_f32(stop[2]),
        ));
    }
    out
}

/// Full WGSL source of the point shader (`vs_main` and `fs_main`).
///
/// Expects the uniform block at group 0, binding 0, per-particle
/// attributes at locations 0 through 3 and the per-particle color at
/// location 4, both stepped per instance. Each instance draws 6 vertices.
pub fn point_shader() -> String {
    format!(
        r#"{constants}
{uniforms}
@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) wave: f32,
    @location(3) distance: f32,
}};

{noise}
fn wave_intensity(world: vec3<f32>) -> f32 {{
    if (uniforms.click_active < 0.5) {{
        return 0.0;
    }}
    let elapsed = uniforms.time - uniforms.click_time;
    if (elapsed < 0.0 || elapsed >= WAVE_LIFETIME) {{
        return 0.0;
    }}
    let radius = elapsed * uniforms.wave_speed;
    let proximity = abs(length(world - uniforms.click_position) - radius);
    return 1.0 - smoothstep(0.0, uniforms.wave_thickness, proximity);
}}

fn wave_push(world: vec3<f32>, normal: vec3<f32>, wave: f32) -> vec3<f32> {{
    let away = world - uniforms.click_position;
    var direction = normal;
    if (length(away) >= WAVE_DEGENERATE_DISTANCE) {{
        direction = normalize(away);
    }}
    return direction * wave * WAVE_PUSH;
}}

fn repulsion(current: vec3<f32>) -> vec3<f32> {{
    if (uniforms.pointer_active < 0.5) {{
        return vec3<f32>(0.0);
    }}
    let diff = current - uniforms.pointer_position;
    let dist = length(diff);
    if (dist <= 0.0 || dist >= uniforms.repel_radius) {{
        return vec3<f32>(0.0);
    }}
    let falloff = 1.0 - smoothstep(0.0, uniforms.repel_radius, dist);
    return diff / dist * falloff * uniforms.repel_strength;
}}

fn fiery_gradient(t: f32) -> vec3<f32> {{
    let low = mix(FIERY_0, FIERY_1, smoothstep(0.0, 0.5, t));
    let high = mix(FIERY_1, FIERY_2, smoothstep(0.5, 1.0, t));
    return mix(low, high, step(0.5, t));
}}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) normal: vec3<f32>,
    @location(3) original_hue: f32,
    @location(4) color: vec3<f32>,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = quad_vertices[vertex_index];
    let t = uniforms.time;

    // Breathing along the normal
    let breath = fbm3_animated(position * NOISE_POSITION_SCALE, t * NOISE_TIME_SCALE, NOISE_OCTAVES);
    let modulation = normal * breath * NOISE_AMPLITUDE;

    let rest_world4 = uniforms.model * vec4<f32>(position, 1.0);
    let rest_world = rest_world4.xyz / rest_world4.w;
    let wave = wave_intensity(rest_world);
    var push = vec3<f32>(0.0);
    if (wave > 0.0) {{
        push = wave_push(rest_world, normal, wave);
    }}

    let current4 = uniforms.model * vec4<f32>(position + modulation, 1.0);
    let repel = repulsion(current4.xyz / current4.w);

    let displaced = position + modulation + push + repel;
    let view_position = uniforms.view * uniforms.model * vec4<f32>(displaced, 1.0);

    var out: VertexOutput;
    out.color = color;
    out.uv = corner;
    out.wave = wave;
    out.distance = length(view_position.xyz);

    // Behind the eye: park outside the clip volume
    if (view_position.z >= 0.0) {{
        out.clip_position = vec4<f32>(0.0, 0.0, 2.0, 1.0);
        return out;
    }}

    let pulse = 1.0 + sin(t * PULSE_SPEED + length(position) * PULSE_RADIAL_PHASE) * PULSE_AMPLITUDE;
    let point_size = (size * pulse + wave * WAVE_SIZE_BONUS) * (POINT_SCALE / -view_position.z);

    var clip = uniforms.projection * view_position;
    clip.x += corner.x * point_size / uniforms.viewport.x * clip.w;
    clip.y += corner.y * point_size / uniforms.viewport.y * clip.w;
    out.clip_position = clip;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let r2 = dot(in.uv, in.uv);
    if (r2 > 1.0) {{
        discard;
    }}
    let r = sqrt(r2);

    let center = 1.0 - smoothstep(0.0, GLOW_CORE_RADIUS, r);
    let halo = 1.0 - smoothstep(GLOW_CORE_RADIUS, GLOW_OUTER_RADIUS, r);
    var alpha = center + halo * (1.0 - center);

    var color = in.color;
    if (in.wave > 0.0) {{
        color = mix(color, fiery_gradient(in.wave), in.wave * WAVE_TINT);
        color *= 1.0 + in.wave * WAVE_BRIGHTEN;
    }}

    let radius = uniforms.formation_radius;
    alpha *= 1.0 - smoothstep(radius * FADE_NEAR, radius * FADE_FAR, in.distance);

    return vec4<f32>(clamp(color, vec3<f32>(0.0), vec3<f32>(COLOR_CEILING)), alpha);
}}
"#,
        constants = constants_wgsl(),
        uniforms = ShaderUniforms::WGSL_STRUCT,
        noise = noise_wgsl(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(module)
    }

    #[test]
    fn test_point_shader_validates() {
        let shader = point_shader();
        let module = validate_wgsl(&shader).unwrap_or_else(|e| panic!("{e}\n{shader}"));

        let entry_points: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }

    #[test]
    fn test_constants_are_emitted() {
        let consts = constants_wgsl();
        assert!(consts.contains("const WAVE_PUSH: f32 = 7.0;"));
        assert!(consts.contains("const POINT_SCALE: f32 = 1500.0;"));
        assert!(consts.contains("const FIERY_2: vec3<f32> = vec3<f32>(1.0, 1.0, 0.9);"));
    }
}
