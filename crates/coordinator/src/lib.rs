//! Bridges the renderer's one-shot completion event into a "ready" flag for
//! the UI elements that wait on the wave background.

mod motion;
mod scroll;

use std::time::{Duration, Instant};

use renderer::{AnimationComplete, CubicBezier, Subscription};
use tracing::{debug, info};
use waveconfig::TimingTable;

pub use motion::{MotionPreference, MotionWatch};
pub use scroll::ScrollFade;

/// Slack added to the wave duration before the fallback deadline fires.
pub const FALLBACK_BUFFER: Duration = Duration::from_millis(100);

/// What flipped the coordinator to ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadySource {
    ReducedMotion,
    Completed(AnimationComplete),
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Transition parameters for one element, applied once readiness is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementStyle {
    pub visibility: Visibility,
    pub delay: Duration,
    pub duration: Duration,
    pub easing: CubicBezier,
}

pub struct AnimationCoordinator {
    table: TimingTable,
    fallback_after: Duration,
    active: bool,
    should_animate: bool,
    motion: Option<MotionWatch>,
    completion: Option<Subscription>,
    deadline: Option<Instant>,
    ready: Option<ReadySource>,
}

impl AnimationCoordinator {
    /// `wave_total` is the full wave fade-in length; the fallback deadline is
    /// armed that long plus [`FALLBACK_BUFFER`] after activation.
    pub fn new(table: TimingTable, wave_total: Duration) -> Self {
        Self {
            table,
            fallback_after: wave_total + FALLBACK_BUFFER,
            active: false,
            should_animate: true,
            motion: None,
            completion: None,
            deadline: None,
            ready: None,
        }
    }

    pub fn timing(&self) -> &TimingTable {
        &self.table
    }

    pub fn fallback_after(&self) -> Duration {
        self.fallback_after
    }

    /// Starts listening. `completion` is `None` when no renderer exists; the
    /// fallback deadline still makes the coordinator ready.
    pub fn activate(
        &mut self,
        now: Instant,
        motion: MotionWatch,
        completion: Option<Subscription>,
    ) -> Option<ReadySource> {
        self.active = true;
        self.should_animate = !motion.is_reduced();
        self.motion = Some(motion);
        self.completion = completion;
        debug!(should_animate = self.should_animate, "animation coordinator active");

        if self.should_animate {
            self.arm(now);
            // The signal may already have fired before we subscribed.
            self.poll_completion()
        } else {
            self.flip(ReadySource::ReducedMotion)
        }
    }

    /// Checks the preference, the completion subscription and the deadline,
    /// in that order. Returns the cause on the call that flips to ready.
    pub fn poll(&mut self, now: Instant) -> Option<ReadySource> {
        if !self.active {
            return None;
        }

        let mut flipped = None;
        if let Some(reduced) = self.motion.as_mut().and_then(MotionWatch::poll_change) {
            self.should_animate = !reduced;
            debug!(reduced, "motion preference changed");
            if reduced {
                flipped = self.flip(ReadySource::ReducedMotion);
            } else if self.ready.is_none() && self.deadline.is_none() {
                self.arm(now);
            }
        }

        flipped = flipped.or_else(|| self.poll_completion());

        if let Some(deadline) = self.deadline {
            if now >= deadline {
                flipped = flipped.or_else(|| self.flip(ReadySource::Fallback));
            }
        }
        flipped
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    pub fn ready_source(&self) -> Option<ReadySource> {
        self.ready
    }

    pub fn should_animate(&self) -> bool {
        self.should_animate
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// When the host should wake up to poll the fallback, if armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn element_visibility(&self, _id: &str) -> Visibility {
        if !self.should_animate || self.is_ready() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    pub fn element_style(&self, id: &str) -> ElementStyle {
        if !self.should_animate {
            return ElementStyle {
                visibility: Visibility::Visible,
                delay: Duration::ZERO,
                duration: Duration::ZERO,
                easing: CubicBezier::WAVE,
            };
        }
        ElementStyle {
            visibility: self.element_visibility(id),
            delay: self.table.delay_for(id),
            duration: self.table.duration_for(id),
            easing: CubicBezier::WAVE,
        }
    }

    /// Time from page start until the last landing element is visible.
    pub fn total_animation_time(&self) -> Duration {
        self.table.total_animation_time()
    }

    /// Drops the subscription and the preference watch and disarms the
    /// deadline. Safe to call repeatedly and after the renderer is gone.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.completion = None;
        self.motion = None;
        self.deadline = None;
        debug!("animation coordinator deactivated");
    }

    fn arm(&mut self, now: Instant) {
        if self.ready.is_none() {
            self.deadline = Some(now + self.fallback_after);
        }
    }

    fn poll_completion(&mut self) -> Option<ReadySource> {
        let event = self.completion.as_ref()?.try_recv()?;
        self.completion = None;
        self.flip(ReadySource::Completed(event))
    }

    fn flip(&mut self, source: ReadySource) -> Option<ReadySource> {
        if self.ready.is_some() {
            return None;
        }
        self.ready = Some(source);
        self.deadline = None;
        info!(?source, "landing elements ready");
        Some(source)
    }
}

impl std::fmt::Debug for AnimationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationCoordinator")
            .field("active", &self.active)
            .field("should_animate", &self.should_animate)
            .field("deadline", &self.deadline)
            .field("ready", &self.ready)
            .finish()
    }
}
