use std::time::{Duration, Instant};

/// Snapshot of the clock handed to one render tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSample {
    /// Time since the clock origin, like a frame callback timestamp.
    pub timestamp: Duration,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(timestamp: Duration, frame_index: u64) -> Self {
        Self {
            timestamp,
            frame_index,
        }
    }
}

/// Abstraction over where frame timestamps originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.origin.elapsed(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports the same timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    timestamp: Duration,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(timestamp: Duration) -> Self {
        Self {
            timestamp,
            frame: 0,
        }
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.timestamp, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds the time source for a run: frozen at `fixed` when given, live otherwise.
pub fn time_source(fixed: Option<Duration>) -> BoxedTimeSource {
    match fixed {
        Some(timestamp) => Box::new(FixedTimeSource::new(timestamp)),
        None => Box::new(SystemTimeSource::new()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopPhase {
    Idle,
    Scheduled,
    Stopped,
}

/// Self-rescheduling frame loop state.
///
/// Every tick asks the host for exactly one more frame. `stop` is the
/// cancellation flag: once set, no further frames are requested and any
/// frame already in flight is ignored.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    phase: LoopPhase,
    requested: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            phase: LoopPhase::Idle,
            requested: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == LoopPhase::Scheduled
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == LoopPhase::Stopped
    }

    /// Total frames requested from the host so far.
    pub fn requested_frames(&self) -> u64 {
        self.requested
    }

    /// Marks the loop running. Returns `false` if it already was (or was stopped).
    pub fn start(&mut self) -> bool {
        match self.phase {
            LoopPhase::Idle => {
                self.phase = LoopPhase::Scheduled;
                self.requested += 1;
                true
            }
            LoopPhase::Scheduled | LoopPhase::Stopped => false,
        }
    }

    /// Requests the frame after the current one. Returns `false` once stopped.
    pub fn schedule(&mut self) -> bool {
        if self.phase == LoopPhase::Stopped {
            return false;
        }
        self.phase = LoopPhase::Scheduled;
        self.requested += 1;
        true
    }

    /// Cancels the loop. Returns whether a frame was pending.
    pub fn stop(&mut self) -> bool {
        let was_pending = self.phase == LoopPhase::Scheduled;
        self.phase = LoopPhase::Stopped;
        was_pending
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
