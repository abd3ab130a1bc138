//! Color constants and the sRGB transfer function.

/// An RGB triple with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Converts every channel from gamma-encoded sRGB to linear light.
    pub fn to_linear(self) -> Self {
        Self {
            r: srgb_to_linear(self.r),
            g: srgb_to_linear(self.g),
            b: srgb_to_linear(self.b),
        }
    }
}

/// Blue wave preset used by the `design` mode.
pub const FIG_BLUE: Rgb = Rgb::new(0.043, 0.600, 1.000);

/// Green wave preset used by the `dev` mode.
pub const FIG_GREEN: Rgb = Rgb::new(0.067, 0.682, 0.361);

/// Page background (`rgb(0, 0, 0)`), gamma-encoded.
pub const BACKGROUND: Rgb = Rgb::new(0.0, 0.0, 0.0);

/// Standard piecewise sRGB to linear transfer function.
pub fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Clear color for the surface: linear background, fully transparent.
pub fn clear_color() -> wgpu::Color {
    let linear = BACKGROUND.to_linear();
    wgpu::Color {
        r: f64::from(linear.r),
        g: f64::from(linear.g),
        b: f64::from(linear.b),
        a: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_function_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn transfer_function_is_monotonic() {
        let mut last = srgb_to_linear(0.0);
        for step in 1..=1000 {
            let value = srgb_to_linear(step as f32 / 1000.0);
            assert!(value > last, "not increasing at step {step}");
            last = value;
        }
    }

    #[test]
    fn linear_segment_below_threshold() {
        assert!((srgb_to_linear(0.04) - 0.04 / 12.92).abs() < 1e-7);
        assert!((srgb_to_linear(0.5) - 0.214_041).abs() < 1e-4);
    }

    #[test]
    fn clear_color_is_transparent_black() {
        let color = clear_color();
        assert_eq!((color.r, color.g, color.b, color.a), (0.0, 0.0, 0.0, 0.0));
    }
}
