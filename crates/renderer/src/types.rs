use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::color::{Rgb, FIG_BLUE, FIG_GREEN};

/// Number of wave layers in the field.
pub const WAVE_COUNT: usize = 7;

/// Named preset selecting which base color tints the wave field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Blue preset.
    #[default]
    Design,
    /// Green preset.
    Dev,
}

impl ColorMode {
    /// Maps a mode name onto a preset. Unrecognised names fall back to `Design`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "dev" => ColorMode::Dev,
            _ => ColorMode::Design,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorMode::Design => "design",
            ColorMode::Dev => "dev",
        }
    }

    /// Base wave color in gamma-encoded (sRGB) space.
    pub fn wave_color(self) -> Rgb {
        match self {
            ColorMode::Design => FIG_BLUE,
            ColorMode::Dev => FIG_GREEN,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Design => ColorMode::Dev,
            ColorMode::Dev => ColorMode::Design,
        }
    }
}

impl FromStr for ColorMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fade-in timing of the wave layers.
///
/// Wave `i` ramps from transparent to opaque inside
/// `[fade_in_delay + i * wave_stagger, fade_in_delay + i * wave_stagger + fade_in_duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveConfig {
    pub fade_in_delay: Duration,
    pub wave_stagger: Duration,
    pub fade_in_duration: Duration,
}

impl WaveConfig {
    pub const STANDARD: WaveConfig = WaveConfig {
        fade_in_delay: Duration::from_millis(500),
        wave_stagger: Duration::from_millis(250),
        fade_in_duration: Duration::from_millis(1500),
    };

    pub fn window_start(&self, index: usize) -> Duration {
        self.fade_in_delay + self.wave_stagger * index as u32
    }

    pub fn window_end(&self, index: usize) -> Duration {
        self.window_start(index) + self.fade_in_duration
    }

    /// Time from the first tick until the last wave is fully opaque.
    pub fn total_duration(&self) -> Duration {
        self.window_end(WAVE_COUNT - 1)
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Shape parameters for one traveling sine wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveLayer {
    pub speed: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub phase: f32,
    pub vertical_offset: f32,
    pub line_width: f32,
    pub sharpness: f32,
    /// Amplify the falloff above the curve instead of below it.
    pub invert_falloff: bool,
}

impl WaveLayer {
    #[allow(clippy::too_many_arguments)]
    const fn new(
        speed: f32,
        frequency: f32,
        amplitude: f32,
        phase: f32,
        vertical_offset: f32,
        line_width: f32,
        sharpness: f32,
        invert_falloff: bool,
    ) -> Self {
        Self {
            speed,
            frequency,
            amplitude,
            phase,
            vertical_offset,
            line_width,
            sharpness,
            invert_falloff,
        }
    }
}

/// The seven layers, front-loaded with the three broad upper waves.
pub const WAVE_LAYERS: [WaveLayer; WAVE_COUNT] = [
    WaveLayer::new(0.2, 0.20, 0.2, 0.0, 0.5, 0.1, 15.0, false),
    WaveLayer::new(0.4, 0.40, 0.15, 0.0, 0.5, 0.1, 17.0, false),
    WaveLayer::new(0.3, 0.60, 0.15, 0.0, 0.5, 0.05, 23.0, false),
    WaveLayer::new(0.1, 0.26, 0.07, 0.0, 0.3, 0.1, 17.0, true),
    WaveLayer::new(0.3, 0.36, 0.07, 0.0, 0.3, 0.1, 17.0, true),
    WaveLayer::new(0.5, 0.46, 0.07, 0.0, 0.3, 0.05, 23.0, true),
    WaveLayer::new(0.2, 0.58, 0.05, 0.0, 0.3, 0.2, 15.0, true),
];

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Options handed to the GPU backend when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuOptions {
    pub antialiasing: Antialiasing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_windows_match_reference_timing() {
        let config = WaveConfig::STANDARD;
        assert_eq!(config.window_start(0), Duration::from_millis(500));
        assert_eq!(config.window_end(0), Duration::from_millis(2000));
        assert_eq!(config.window_start(6), Duration::from_millis(2000));
        assert_eq!(config.window_end(6), Duration::from_millis(3500));
        assert_eq!(config.total_duration(), Duration::from_millis(3500));
    }

    #[test]
    fn unknown_mode_names_fall_back_to_design() {
        assert_eq!(ColorMode::from_name("dev"), ColorMode::Dev);
        assert_eq!(ColorMode::from_name(" DEV "), ColorMode::Dev);
        assert_eq!(ColorMode::from_name("design"), ColorMode::Design);
        assert_eq!(ColorMode::from_name("sepia"), ColorMode::Design);
        assert_eq!("".parse::<ColorMode>(), Ok(ColorMode::Design));
    }

    #[test]
    fn toggling_alternates_presets() {
        assert_eq!(ColorMode::Design.toggled(), ColorMode::Dev);
        assert_eq!(ColorMode::Dev.toggled().wave_color(), FIG_BLUE);
    }
}
