use tracing::warn;

use crate::wave::{WaveRenderer, WaveSurface};

/// Holder for the single renderer of a process.
///
/// The host creates the renderer once when its window exists and calls
/// [`RendererSlot::shutdown`] when the event loop exits.
pub struct RendererSlot<S: WaveSurface> {
    renderer: Option<WaveRenderer<S>>,
    shut_down: bool,
}

impl<S: WaveSurface> RendererSlot<S> {
    pub const fn new() -> Self {
        Self {
            renderer: None,
            shut_down: false,
        }
    }

    /// Creates the renderer on first call. Later calls keep the existing one.
    /// Returns `None` once the slot has been shut down.
    pub fn init_with<F>(&mut self, create: F) -> Option<&mut WaveRenderer<S>>
    where
        F: FnOnce() -> WaveRenderer<S>,
    {
        if self.shut_down {
            warn!("renderer slot already shut down; ignoring init");
            return None;
        }
        if self.renderer.is_some() {
            warn!("renderer already initialised; keeping existing instance");
        }
        Some(self.renderer.get_or_insert_with(create))
    }

    pub fn get(&self) -> Option<&WaveRenderer<S>> {
        self.renderer.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut WaveRenderer<S>> {
        self.renderer.as_mut()
    }

    pub fn is_initialised(&self) -> bool {
        self.renderer.is_some()
    }

    /// Destroys the renderer and refuses further initialisation. Idempotent.
    pub fn shutdown(&mut self) {
        self.shut_down = true;
        if let Some(mut renderer) = self.renderer.take() {
            renderer.destroy();
        }
    }
}

impl<S: WaveSurface> Default for RendererSlot<S> {
    fn default() -> Self {
        Self::new()
    }
}
