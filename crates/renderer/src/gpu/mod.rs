//! `wgpu` backend for the wave renderer.
//!
//! - `context` owns the instance, surface, device and swapchain config, and
//!   picks the format, alpha mode and MSAA sample count.
//! - `pipeline` compiles the GLSL pair through naga and uploads the quad.
//! - `state` glues both into [`GpuState`], the [`crate::WaveSurface`]
//!   implementation used by the window host.

mod context;
mod pipeline;
mod state;

pub use state::GpuState;
