use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::runtime::FrameLoop;
use crate::signal::{CompletionSignal, Subscription};
use crate::timeline::FadeIn;
use crate::types::{ColorMode, WaveConfig};
use crate::uniforms::WaveUniforms;

/// Why a frame could not be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Swapchain lost or outdated; reconfigure before the next frame.
    Outdated,
    /// Acquiring the next frame timed out; skip this one.
    Timeout,
    /// Unrecoverable device failure.
    Fatal(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Outdated => write!(f, "surface is outdated"),
            FrameError::Timeout => write!(f, "timed out acquiring the next frame"),
            FrameError::Fatal(reason) => write!(f, "fatal surface error: {reason}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Drawing backend driven by [`WaveRenderer`].
///
/// The GPU implementation lives in [`crate::gpu::GpuState`]; tests use a
/// recording stand-in.
pub trait WaveSurface {
    /// Current drawable size in physical pixels.
    fn viewport_size(&self) -> (u32, u32);
    /// Rebuilds size-dependent resources.
    fn configure(&mut self, width: u32, height: u32);
    /// Clears the target and draws the full-screen quad with `uniforms`.
    fn draw(&mut self, uniforms: &WaveUniforms) -> Result<(), FrameError>;
    /// Asks the host for one more frame callback.
    fn request_frame(&self);
    /// Frees pipeline and device resources. Called at most once.
    fn release(&mut self);
}

/// The animated wave background.
///
/// Owns the drawing backend, the fade-in state and the completion signal.
/// If the backend fails to initialise the renderer stays inert: every
/// operation becomes a no-op and the signal never fires.
pub struct WaveRenderer<S: WaveSurface> {
    surface: Option<S>,
    fade: FadeIn,
    uniforms: WaveUniforms,
    color_mode: ColorMode,
    frame_loop: FrameLoop,
    completion: CompletionSignal,
    reduced_motion: bool,
    last_timestamp: Duration,
    destroyed: bool,
}

impl<S: WaveSurface> WaveRenderer<S> {
    pub fn new<F>(init: F, mode: ColorMode) -> Self
    where
        F: FnOnce() -> anyhow::Result<S>,
    {
        Self::with_config(init, mode, WaveConfig::STANDARD)
    }

    pub fn with_config<F>(init: F, mode: ColorMode, config: WaveConfig) -> Self
    where
        F: FnOnce() -> anyhow::Result<S>,
    {
        let surface = match init() {
            Ok(surface) => Some(surface),
            Err(err) => {
                error!(error = ?err, "failed to initialise wave renderer; background disabled");
                None
            }
        };

        let (width, height) = surface
            .as_ref()
            .map(WaveSurface::viewport_size)
            .unwrap_or((1, 1));
        let uniforms = WaveUniforms::new(width, height, mode.wave_color());

        if surface.is_some() {
            debug!(width, height, mode = %mode, "wave renderer ready");
        }

        Self {
            surface,
            fade: FadeIn::new(config),
            uniforms,
            color_mode: mode,
            frame_loop: FrameLoop::new(),
            completion: CompletionSignal::new(),
            reduced_motion: false,
            last_timestamp: Duration::ZERO,
            destroyed: false,
        }
    }

    /// Whether a backend is attached and the renderer has not been destroyed.
    pub fn is_active(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn uniforms(&self) -> &WaveUniforms {
        &self.uniforms
    }

    pub fn fade(&self) -> &FadeIn {
        &self.fade
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn completion(&self) -> &CompletionSignal {
        &self.completion
    }

    pub fn subscribe(&self) -> Subscription {
        self.completion.subscribe()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Begins the frame loop. Returns `false` if already running or inert.
    pub fn start(&mut self) -> bool {
        let Some(surface) = self.surface.as_ref() else {
            return false;
        };
        if !self.frame_loop.start() {
            return false;
        }
        surface.request_frame();
        true
    }

    /// One animation tick at `timestamp`.
    pub fn render(&mut self, timestamp: Duration) {
        if self.surface.is_none() || self.frame_loop.is_stopped() {
            return;
        }
        self.last_timestamp = timestamp;

        let event = if self.reduced_motion {
            self.fade.finish(timestamp)
        } else {
            self.fade.advance(timestamp)
        };
        if let Some(event) = event {
            if self.completion.fire(event) {
                info!(completed_at = ?event.completed_at, "wave fade-in complete");
            }
        }

        if !self.reduced_motion {
            self.uniforms.set_time(timestamp.as_secs_f32());
        }
        self.uniforms.set_opacities(self.fade.opacities());

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match surface.draw(&self.uniforms) {
            Ok(()) => {}
            Err(FrameError::Outdated) => {
                debug!("surface outdated; reconfiguring");
                self.resize();
            }
            Err(FrameError::Timeout) => {
                warn!("timed out acquiring frame; skipping");
            }
            Err(FrameError::Fatal(reason)) => {
                error!(%reason, "unrecoverable surface error; stopping wave renderer");
                self.destroy();
                return;
            }
        }

        if self.frame_loop.schedule() {
            if let Some(surface) = self.surface.as_ref() {
                surface.request_frame();
            }
        }
    }

    /// Re-reads the viewport size from the backend and reconfigures it.
    pub fn resize(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let (width, height) = surface.viewport_size();
        if width == 0 || height == 0 {
            return;
        }
        surface.configure(width, height);
        self.uniforms.set_resolution(width, height);
    }

    /// Switches the color preset. Fade-in progress is untouched.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if mode != self.color_mode {
            debug!(from = %self.color_mode, to = %mode, "switching wave color mode");
        }
        self.color_mode = mode;
        self.uniforms.set_color(mode.wave_color());
    }

    /// Measures the fade-in from `origin` rather than from the first
    /// rendered timestamp. Hosts with a pinned clock anchor at zero so the
    /// pinned timestamp is the elapsed time.
    pub fn anchor_at(&mut self, origin: Duration) {
        if self.surface.is_none() {
            return;
        }
        self.fade.anchor(origin);
    }

    /// Freezes the wave field and completes the fade-in when `reduced` is set.
    /// Clearing it resumes wave travel; opacities stay where they are.
    ///
    /// Turning it on fires the completion signal right away, before the last
    /// wave's window ends, if it has not fired yet.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if reduced == self.reduced_motion {
            return;
        }
        self.reduced_motion = reduced;
        if self.surface.is_none() {
            return;
        }
        debug!(reduced, "reduced motion changed");
        if reduced {
            if let Some(event) = self.fade.finish(self.last_timestamp) {
                self.completion.fire(event);
            }
            self.uniforms.set_opacities(self.fade.opacities());
        }
    }

    /// Cancels the pending frame and frees the backend. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.frame_loop.stop();
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            info!("wave renderer destroyed");
        }
    }
}

impl<S: WaveSurface> Drop for WaveRenderer<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<S: WaveSurface> fmt::Debug for WaveRenderer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaveRenderer")
            .field("active", &self.surface.is_some())
            .field("color_mode", &self.color_mode)
            .field("fade", &self.fade)
            .field("reduced_motion", &self.reduced_motion)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSurface;
    use super::*;
    use crate::color::{FIG_BLUE, FIG_GREEN};
    use crate::types::WAVE_COUNT;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn double_destroy_releases_once() {
        let (surface, log) = RecordingSurface::new(640, 480);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        renderer.start();
        renderer.destroy();
        renderer.destroy();
        drop(renderer);
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn dev_to_design_keeps_fade_progress() {
        let (surface, log) = RecordingSurface::new(800, 600);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::from_name("dev"));
        renderer.start();
        renderer.render(ms(1_000));
        renderer.render(ms(2_000));
        assert_eq!(renderer.uniforms().wave_color(), FIG_GREEN);
        let started = renderer.fade().started_at();

        renderer.set_color_mode(ColorMode::Design);
        renderer.render(ms(2_016));

        assert_eq!(renderer.fade().started_at(), started);
        assert_eq!(started, Some(ms(1_000)));
        let log = log.borrow();
        let last = log.draws.last().copied().unwrap_or_else(|| panic!("no draws recorded"));
        assert_eq!(last.wave_color(), FIG_BLUE);
        assert_eq!(last.resolution, [800.0, 600.0]);
        assert!(last.opacity(0).unwrap_or_default() > 0.0);
    }

    #[test]
    fn failed_init_is_inert() {
        let mut renderer: WaveRenderer<RecordingSurface> =
            WaveRenderer::new(|| Err(anyhow::anyhow!("no adapter")), ColorMode::Design);
        assert!(!renderer.is_active());
        assert!(!renderer.start());
        renderer.render(ms(5_000));
        renderer.resize();
        renderer.set_reduced_motion(true);
        renderer.destroy();
        renderer.destroy();
        assert_eq!(renderer.completion().fired(), None);
        assert_eq!(renderer.fade().started_at(), None);
    }

    #[test]
    fn start_is_idempotent_and_each_tick_reschedules() {
        let (surface, log) = RecordingSurface::new(100, 100);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        assert!(renderer.start());
        assert!(!renderer.start());
        renderer.render(ms(16));
        renderer.render(ms(32));
        assert_eq!(log.borrow().frame_requests, 3);
        assert_eq!(log.borrow().draws.len(), 2);

        renderer.destroy();
        renderer.render(ms(48));
        assert_eq!(log.borrow().draws.len(), 2);
        assert_eq!(log.borrow().frame_requests, 3);
    }

    #[test]
    fn completion_signal_fires_once() {
        let (surface, _log) = RecordingSurface::new(100, 100);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        let subscription = renderer.subscribe();
        renderer.start();
        for frame in 0..300 {
            renderer.render(ms(frame * 16));
        }
        let event = subscription.try_recv();
        assert!(event.is_some());
        assert!(event.map(|e| e.completed_at >= ms(3_500)).unwrap_or(false));
        assert_eq!(subscription.try_recv(), None);
        assert_eq!(renderer.fade().opacities(), &[1.0; WAVE_COUNT]);
    }

    #[test]
    fn resize_reads_viewport_from_backend() {
        let (surface, log) = RecordingSurface::new(100, 100);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        log.borrow_mut().size = (1920, 1080);
        renderer.resize();
        log.borrow_mut().size = (0, 1080);
        renderer.resize();
        assert_eq!(log.borrow().configures, vec![(1920, 1080)]);
        assert_eq!(renderer.uniforms().resolution, [1920.0, 1080.0]);
    }

    #[test]
    fn outdated_surface_reconfigures_and_keeps_running() {
        let (surface, log) = RecordingSurface::new(300, 200);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        renderer.start();
        log.borrow_mut().next_error = Some(FrameError::Outdated);
        renderer.render(ms(16));
        assert_eq!(log.borrow().configures, vec![(300, 200)]);
        assert!(renderer.frame_loop().is_running());

        log.borrow_mut().next_error = Some(FrameError::Timeout);
        renderer.render(ms(32));
        assert!(renderer.is_active());
    }

    #[test]
    fn fatal_surface_error_makes_renderer_inert() {
        let (surface, log) = RecordingSurface::new(300, 200);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        renderer.start();
        log.borrow_mut().next_error = Some(FrameError::Fatal("out of memory".into()));
        renderer.render(ms(16));
        assert!(!renderer.is_active());
        assert!(renderer.is_destroyed());
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn reduced_motion_completes_and_freezes_time() {
        let (surface, log) = RecordingSurface::new(300, 200);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        let subscription = renderer.subscribe();
        renderer.start();
        renderer.render(ms(1_000));
        renderer.set_reduced_motion(true);
        assert!(subscription.try_recv().is_some());

        renderer.render(ms(2_000));
        renderer.render(ms(9_000));
        let frozen = log.borrow().draws.last().map(|u| u.time);
        assert_eq!(frozen, Some(1.0));
        assert_eq!(renderer.fade().opacities(), &[1.0; WAVE_COUNT]);

        renderer.set_reduced_motion(false);
        renderer.render(ms(10_000));
        assert_eq!(log.borrow().draws.last().map(|u| u.time), Some(10.0));
        assert_eq!(renderer.fade().opacities(), &[1.0; WAVE_COUNT]);
    }

    #[test]
    fn pinned_clock_shows_the_pinned_moment() {
        use crate::runtime::{time_source, TimeSource};

        let (surface, log) = RecordingSurface::new(300, 200);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        let mut clock = time_source(Some(ms(2_500)));
        renderer.anchor_at(Duration::ZERO);
        renderer.start();
        for _ in 0..100 {
            renderer.render(clock.sample().timestamp);
        }

        let opacities = *renderer.fade().opacities();
        assert_eq!(opacities[0], 1.0);
        assert!(opacities[3] > 0.0 && opacities[3] < 1.0);
        assert!(opacities[6] < 1.0);
        assert_eq!(renderer.completion().fired(), None);
        assert_eq!(log.borrow().draws.len(), 100);

        let (surface, _log) = RecordingSurface::new(300, 200);
        let mut renderer = WaveRenderer::new(move || Ok(surface), ColorMode::Design);
        let mut clock = time_source(Some(ms(3_500)));
        renderer.anchor_at(Duration::ZERO);
        renderer.start();
        renderer.render(clock.sample().timestamp);
        assert!(renderer.completion().fired().is_some());
    }
}
