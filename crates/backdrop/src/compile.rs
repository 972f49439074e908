use std::borrow::Cow;

use sha2::{Digest, Sha256};
use wgpu::naga::ShaderStage;

use crate::error::SessionError;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule, SessionError> {
    compile_stage(
        device,
        "fullscreen triangle vertex",
        VERTEX_SHADER_GLSL,
        ShaderStage::Vertex,
    )
}

/// Compiles the procedural swirl fragment shader.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, SessionError> {
    tracing::debug!(fingerprint = %fragment_fingerprint(), "compiling backdrop fragment shader");
    compile_stage(
        device,
        "backdrop fragment",
        FRAGMENT_SHADER_GLSL,
        ShaderStage::Fragment,
    )
}

/// Compiles one GLSL stage, surfacing naga's diagnostics instead of letting
/// wgpu's uncaptured-error handler panic later.
fn compile_stage(
    device: &wgpu::Device,
    label: &'static str,
    source: &'static str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, SessionError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(SessionError::ShaderCompile(format!("{label}: {err}"))),
        None => Ok(module),
    }
}

/// SHA-256 of the fragment program; identifies the visual asset in logs.
pub fn fragment_fingerprint() -> String {
    let digest = Sha256::digest(FRAGMENT_SHADER_GLSL.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Minimal full-screen triangle vertex shader. `v_uv` has its origin in the
/// bottom-left corner.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -1.0),
    vec2(3.0, -1.0),
    vec2(-1.0, 3.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// Procedural paint-swirl effect.
///
/// The uniform block layout must match [`crate::uniforms::EffectUniforms`].
/// Members carry a leading underscore and are aliased back to their public
/// names with macros so the names never clash with the block instance.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform EffectParams {
    vec4 _iResolution;
    vec4 _uColor1;
    vec4 _uColor2;
    vec4 _uColor3;
    vec2 _uOffset;
    vec2 _uMouse;
    float _iTime;
    float _uSpinRotation;
    float _uSpinSpeed;
    float _uContrast;
    float _uLighting;
    float _uSpinAmount;
    float _uPixelFilter;
    float _uSpinEase;
    uint _uIsRotate;
    uint _padding0;
    uint _padding1;
    uint _padding2;
} ubo;

#define iResolution ubo._iResolution
#define uColor1 ubo._uColor1
#define uColor2 ubo._uColor2
#define uColor3 ubo._uColor3
#define uOffset ubo._uOffset
#define uMouse ubo._uMouse
#define iTime ubo._iTime
#define uSpinRotation ubo._uSpinRotation
#define uSpinSpeed ubo._uSpinSpeed
#define uContrast ubo._uContrast
#define uLighting ubo._uLighting
#define uSpinAmount ubo._uSpinAmount
#define uPixelFilter ubo._uPixelFilter
#define uSpinEase ubo._uSpinEase
#define uIsRotate ubo._uIsRotate

vec4 effect(vec2 screenSize, vec2 screenCoords) {
    float pixelSize = length(screenSize) / uPixelFilter;
    vec2 uv = (floor(screenCoords * (1.0 / pixelSize)) * pixelSize - 0.5 * screenSize) / length(screenSize) - uOffset;
    float uvLen = length(uv);

    float speed = uSpinRotation * uSpinEase * 0.2;
    if (uIsRotate != 0u) {
        speed = iTime * speed;
    }
    speed += 302.2;

    float mouseInfluence = uMouse.x * 2.0 - 1.0;
    speed += mouseInfluence * 0.1;

    float angle = atan(uv.y, uv.x) + speed - uSpinEase * 20.0 * (uSpinAmount * uvLen + (1.0 - uSpinAmount));
    vec2 mid = (screenSize / length(screenSize)) / 2.0;
    uv = vec2(uvLen * cos(angle) + mid.x, uvLen * sin(angle) + mid.y) - mid;

    uv *= 30.0;
    speed = iTime * uSpinSpeed + mouseInfluence * 2.0;

    vec2 uv2 = vec2(uv.x + uv.y);
    for (int i = 0; i < 5; i++) {
        uv2 += vec2(sin(max(uv.x, uv.y))) + uv;
        uv += 0.5 * vec2(
            cos(5.1123314 + 0.353 * uv2.y + speed * 0.131121),
            sin(uv2.x - 0.113 * speed)
        );
        uv -= vec2(cos(uv.x + uv.y) - sin(uv.x * 0.711 - uv.y));
    }

    float contrastMod = 0.25 * uContrast + 0.5 * uSpinAmount + 1.2;
    float paintRes = min(2.0, max(0.0, length(uv) * 0.035 * contrastMod));
    float c1p = max(0.0, 1.0 - contrastMod * abs(1.0 - paintRes));
    float c2p = max(0.0, 1.0 - contrastMod * abs(paintRes));
    float c3p = 1.0 - min(1.0, c1p + c2p);
    float light = (uLighting - 0.2) * max(c1p * 5.0 - 4.0, 0.0) + uLighting * max(c2p * 5.0 - 4.0, 0.0);

    vec4 paint = uColor1 * c1p + uColor2 * c2p + vec4(c3p * uColor3.rgb, c3p * uColor1.a);
    return (0.3 / uContrast) * uColor1 + (1.0 - 0.3 / uContrast) * paint + vec4(light);
}

void main() {
    vec2 coords = v_uv * iResolution.xy;
    outColor = effect(iResolution.xy, coords);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::UniformSlot;

    #[test]
    fn fragment_declares_every_named_uniform() {
        for slot in UniformSlot::ALL {
            let alias = format!("#define {} ubo._{}", slot.name(), slot.name());
            assert!(
                FRAGMENT_SHADER_GLSL.contains(&alias),
                "missing alias for {}",
                slot.name()
            );
        }
    }

    #[test]
    fn fullscreen_triangle_covers_clip_space() {
        let corners = [[-1.0f32, -1.0], [3.0, -1.0], [-1.0, 3.0]];
        for [x, y] in corners {
            assert!(
                VERTEX_SHADER_GLSL.contains(&format!("vec2({x:.1}, {y:.1})")),
                "missing corner ({x}, {y})"
            );
        }
        // The hypotenuse is x + y = 2, which passes through the (1, 1) corner.
        for [x, y] in &corners[1..] {
            assert_eq!(x + y, 2.0);
        }
        // The uv mapping puts the bottom-left clip corner at the origin.
        let [x, y] = corners[0];
        assert_eq!([x * 0.5 + 0.5, y * 0.5 + 0.5], [0.0, 0.0]);
    }

    #[test]
    fn both_stages_parse_as_glsl() {
        use wgpu::naga::front::glsl::{Frontend, Options};

        let mut frontend = Frontend::default();
        for (stage, source) in [
            (ShaderStage::Vertex, VERTEX_SHADER_GLSL),
            (ShaderStage::Fragment, FRAGMENT_SHADER_GLSL),
        ] {
            if let Err(errors) = frontend.parse(&Options::from(stage), source) {
                panic!("{stage:?} stage failed to parse: {errors:?}");
            }
        }
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let first = fragment_fingerprint();
        assert_eq!(first.len(), 64);
        assert!(first.bytes().all(|byte| byte.is_ascii_hexdigit()));
        assert_eq!(first, fragment_fingerprint());
    }
}
