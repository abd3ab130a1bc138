use std::borrow::Cow;
use std::fmt::Write as _;

use wgpu::naga::ShaderStage;

use crate::types::{WaveLayer, WAVE_LAYERS};

/// Compiles the pass-through quad vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("wave quad vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the wave field fragment shader generated from [`WAVE_LAYERS`].
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    let source = fragment_source(&WAVE_LAYERS);
    tracing::trace!(bytes = source.len(), "generated wave fragment shader");
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("wave field fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Swizzle that reads wave `index`'s opacity out of the packed uniform block.
fn opacity_component(index: usize) -> String {
    const LANES: [&str; 4] = ["x", "y", "z", "w"];
    let vector = if index < 4 { "opacityLo" } else { "opacityHi" };
    format!("params.{vector}.{}", LANES[index % 4])
}

/// Produces the fragment shader: [`FRAGMENT_HEADER`], one `calcSine` call per
/// layer, then the discard mask.
pub fn fragment_source(layers: &[WaveLayer]) -> String {
    let mut body = String::new();
    for (index, layer) in layers.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = writeln!(
            body,
            "    accumulated += calcSine(uv, {:?}, {:?}, {:?}, {:?}, {:?}, params.waveColor, {:?}, {:?}, {}, {});",
            layer.speed,
            layer.frequency,
            layer.amplitude,
            layer.phase,
            layer.vertical_offset,
            layer.line_width,
            layer.sharpness,
            layer.invert_falloff,
            opacity_component(index),
        );
    }
    format!("{FRAGMENT_HEADER}\nvoid main() {{\n    vec2 uv = vec2(gl_FragCoord.x, params.resolution.y - gl_FragCoord.y) / params.resolution;\n    vec3 accumulated = vec3(0.0);\n{body}{FRAGMENT_FOOTER}")
}

/// Uniform block and per-wave evaluation.
///
/// The block layout must match [`crate::uniforms::WaveUniforms`].
const FRAGMENT_HEADER: &str = r"#version 450
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform WaveParams {
    vec2 resolution;
    float time;
    float _padding0;
    vec3 waveColor;
    float _padding1;
    vec4 opacityLo;
    vec4 opacityHi;
} params;

const float waveWidthFactor = 1.5;

vec3 calcSine(
    vec2 uv,
    float speed,
    float frequency,
    float amplitude,
    float phaseShift,
    float verticalOffset,
    vec3 baseColor,
    float lineWidth,
    float sharpness,
    bool invertFalloff,
    float opacity
) {
    float angle = params.time * speed * frequency * -1.0 + (phaseShift + uv.x) * 2.0;
    float waveY = sin(angle) * amplitude + verticalOffset;
    float deltaY = waveY - uv.y;
    float distanceVal = abs(deltaY);

    if (invertFalloff) {
        if (deltaY > 0.0) {
            distanceVal = distanceVal * 4.0;
        }
    } else {
        if (deltaY < 0.0) {
            distanceVal = distanceVal * 4.0;
        }
    }

    float smoothVal = smoothstep(lineWidth * waveWidthFactor, 0.0, distanceVal);
    float scaleVal = pow(smoothVal, sharpness);

    return min(baseColor * scaleVal * opacity, baseColor * opacity);
}
";

const FRAGMENT_FOOTER: &str = r"
    float maxChannel = max(accumulated.r, max(accumulated.g, accumulated.b));
    if (maxChannel <= 0.0) {
        discard;
    }

    outColor = vec4(accumulated, 1.0);
}
";

/// Pass-through vertex shader for the two-triangle strip quad.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Full-screen quad as a triangle strip in clip space.
pub(crate) const QUAD_VERTICES: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WAVE_COUNT;

    fn parse(stage: ShaderStage, source: &str) -> wgpu::naga::Module {
        let mut frontend = wgpu::naga::front::glsl::Frontend::default();
        match frontend.parse(&wgpu::naga::front::glsl::Options::from(stage), source) {
            Ok(module) => module,
            Err(errors) => panic!("shader failed to parse: {errors:?}\n{source}"),
        }
    }

    #[test]
    fn fragment_evaluates_every_layer() {
        let source = fragment_source(&WAVE_LAYERS);
        assert_eq!(source.matches("accumulated += calcSine(").count(), WAVE_COUNT);
        assert!(source.contains("params.opacityLo.x"));
        assert!(source.contains("params.opacityHi.z"));
        assert!(!source.contains("params.opacityHi.w"));
        assert!(source.contains("discard;"));
    }

    #[test]
    fn layer_literals_are_glsl_floats() {
        let source = fragment_source(&WAVE_LAYERS);
        assert!(source.contains(
            "calcSine(uv, 0.2, 0.2, 0.2, 0.0, 0.5, params.waveColor, 0.1, 15.0, false, params.opacityLo.x)"
        ));
        assert!(source.contains(
            "calcSine(uv, 0.2, 0.58, 0.05, 0.0, 0.3, params.waveColor, 0.2, 15.0, true, params.opacityHi.z)"
        ));
    }

    #[test]
    fn shaders_pass_naga_validation() {
        let fragment = parse(ShaderStage::Fragment, &fragment_source(&WAVE_LAYERS));
        let vertex = parse(ShaderStage::Vertex, VERTEX_SHADER_GLSL);
        for module in [&fragment, &vertex] {
            let mut validator = wgpu::naga::valid::Validator::new(
                wgpu::naga::valid::ValidationFlags::all(),
                wgpu::naga::valid::Capabilities::all(),
            );
            if let Err(err) = validator.validate(module) {
                panic!("shader failed validation: {err:?}");
            }
        }
    }
}
