use bytemuck::{Pod, Zeroable};

use crate::color::Rgb;
use crate::types::WAVE_COUNT;

/// Uniform block shared with the fragment shader.
///
/// Layout is std140: `vec3` occupies a 16 byte slot, so the color carries an
/// explicit pad and the seven opacities are packed into two `vec4`s.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _padding0: f32,
    pub wave_color: [f32; 3],
    pub _padding1: f32,
    pub opacity_lo: [f32; 4],
    pub opacity_hi: [f32; 4],
}

unsafe impl Zeroable for WaveUniforms {}
unsafe impl Pod for WaveUniforms {}

impl WaveUniforms {
    pub fn new(width: u32, height: u32, color: Rgb) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_resolution(width, height);
        uniforms.set_color(color);
        uniforms
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width.max(1) as f32, height.max(1) as f32];
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.wave_color = color.to_array();
    }

    pub fn set_opacities(&mut self, opacities: &[f32; WAVE_COUNT]) {
        self.opacity_lo.copy_from_slice(&opacities[..4]);
        self.opacity_hi[..3].copy_from_slice(&opacities[4..]);
        self.opacity_hi[3] = 0.0;
    }

    pub fn wave_color(&self) -> Rgb {
        let [r, g, b] = self.wave_color;
        Rgb::new(r, g, b)
    }

    pub fn opacity(&self, index: usize) -> Option<f32> {
        match index {
            0..=3 => Some(self.opacity_lo[index]),
            4..=6 => Some(self.opacity_hi[index - 4]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{FIG_BLUE, FIG_GREEN};

    #[test]
    fn block_matches_std140_size() {
        assert_eq!(std::mem::size_of::<WaveUniforms>(), 64);
        assert_eq!(std::mem::align_of::<WaveUniforms>(), 16);
    }

    #[test]
    fn opacities_split_across_vectors() {
        let mut uniforms = WaveUniforms::new(800, 600, FIG_BLUE);
        uniforms.set_opacities(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
        assert_eq!(uniforms.opacity_lo, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(uniforms.opacity_hi, [0.5, 0.6, 0.7, 0.0]);
        assert_eq!(uniforms.opacity(6), Some(0.7));
        assert_eq!(uniforms.opacity(7), None);
    }

    #[test]
    fn zero_sized_viewport_is_clamped() {
        let uniforms = WaveUniforms::new(0, 0, FIG_GREEN);
        assert_eq!(uniforms.resolution, [1.0, 1.0]);
        assert_eq!(uniforms.wave_color(), FIG_GREEN);
    }
}
