/// Scroll-driven opacity for the navigation bar.
///
/// Fully opaque up to `fade_start`, fully faded from `fade_end` on, linear in
/// between. A page override replaces the computed value and reduced motion
/// pins it to `max_opacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollFade {
    pub fade_start: f32,
    pub fade_end: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
    offset: f32,
    page_override: Option<f32>,
    reduced_motion: bool,
}

impl ScrollFade {
    pub fn new(fade_start: f32, fade_end: f32, min_opacity: f32, max_opacity: f32) -> Self {
        Self {
            fade_start,
            fade_end,
            min_opacity,
            max_opacity,
            offset: 0.0,
            page_override: None,
            reduced_motion: false,
        }
    }

    /// Opacity for a scroll offset, ignoring overrides.
    pub fn opacity_at(&self, offset: f32) -> f32 {
        if offset <= self.fade_start {
            self.max_opacity
        } else if offset >= self.fade_end {
            self.min_opacity
        } else {
            let progress = (offset - self.fade_start) / (self.fade_end - self.fade_start);
            self.max_opacity - progress * (self.max_opacity - self.min_opacity)
        }
    }

    pub fn opacity(&self) -> f32 {
        if let Some(value) = self.page_override {
            return value;
        }
        if self.reduced_motion {
            return self.max_opacity;
        }
        self.opacity_at(self.offset)
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Sets the absolute scroll offset and returns the resulting opacity.
    pub fn set_offset(&mut self, offset: f32) -> f32 {
        self.offset = offset.max(0.0);
        self.opacity()
    }

    /// Moves the scroll offset by `delta`, clamped at the top of the page.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        self.set_offset(self.offset + delta)
    }

    pub fn set_page_override(&mut self, value: Option<f32>) {
        self.page_override = value;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }
}

impl Default for ScrollFade {
    fn default() -> Self {
        Self::new(0.0, 100.0, 0.0, 1.0)
    }
}
