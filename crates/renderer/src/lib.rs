//! Animated wave background renderer.
//!
//! Seven traveling sine waves are drawn by one fragment shader over a
//! full-screen quad. Each wave fades in inside its own staggered window and
//! the renderer broadcasts a single "animation complete" event once every
//! layer is fully visible:
//!
//! ```text
//!   host frame callback ──▶ WaveRenderer::render(timestamp)
//!                               │ FadeIn::advance ──▶ CompletionSignal (once)
//!                               │ WaveUniforms
//!                               ▼
//!                           WaveSurface::draw ──▶ GpuState (wgpu) / test double
//!                               │
//!                               └─▶ FrameLoop::schedule ──▶ request_frame
//! ```
//!
//! [`WaveRenderer`] is generic over [`WaveSurface`] so the animation state can
//! be exercised without a GPU. [`GpuState`] is the `wgpu` implementation that
//! draws into a `winit` window.

mod color;
mod compile;
mod ease;
mod gpu;
mod runtime;
mod signal;
mod slot;
mod timeline;
mod types;
mod uniforms;
mod wave;

pub use color::{clear_color, srgb_to_linear, Rgb, BACKGROUND, FIG_BLUE, FIG_GREEN};
pub use compile::fragment_source;
pub use ease::{cubic_bezier, CubicBezier};
pub use gpu::GpuState;
pub use runtime::{
    time_source, BoxedTimeSource, FixedTimeSource, FrameLoop, SystemTimeSource, TimeSample,
    TimeSource,
};
pub use signal::{AnimationComplete, CompletionSignal, Subscription};
pub use slot::RendererSlot;
pub use timeline::{wave_opacity, FadeIn};
pub use types::{
    Antialiasing, ColorMode, GpuOptions, WaveConfig, WaveLayer, WAVE_COUNT, WAVE_LAYERS,
};
pub use uniforms::WaveUniforms;
pub use wave::{FrameError, WaveRenderer, WaveSurface};
