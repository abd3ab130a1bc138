use std::time::Duration;

use crate::ease::CubicBezier;
use crate::signal::AnimationComplete;
use crate::types::{WaveConfig, WAVE_COUNT};

/// Opacity of wave `index` after `elapsed` time since the first tick.
pub fn wave_opacity(config: &WaveConfig, index: usize, elapsed: Duration) -> f32 {
    let start = config.window_start(index);
    let end = config.window_end(index);
    if elapsed < start {
        0.0
    } else if elapsed < end {
        let progress = (elapsed - start).as_secs_f32()
            / config.fade_in_duration.as_secs_f32().max(f32::EPSILON);
        CubicBezier::WAVE.sample(progress).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Per-renderer fade-in state: lazily anchored start, one opacity per wave,
/// and a one-shot completion latch.
///
/// The state only moves forward. Opacities never decrease, even if a host
/// delivers an out-of-order timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeIn {
    config: WaveConfig,
    started_at: Option<Duration>,
    opacities: [f32; WAVE_COUNT],
    completed: bool,
}

impl FadeIn {
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config,
            started_at: None,
            opacities: [0.0; WAVE_COUNT],
            completed: false,
        }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    pub fn opacities(&self) -> &[f32; WAVE_COUNT] {
        &self.opacities
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Fixes the fade-in origin instead of taking it from the first tick.
    /// Ignored once the fade has started.
    pub fn anchor(&mut self, origin: Duration) {
        self.started_at.get_or_insert(origin);
    }

    /// Advances to `timestamp`. Returns the completion event on the single
    /// tick where every wave first reaches full opacity.
    pub fn advance(&mut self, timestamp: Duration) -> Option<AnimationComplete> {
        let start = *self.started_at.get_or_insert(timestamp);
        let elapsed = timestamp.saturating_sub(start);

        let mut all_visible = true;
        for (index, opacity) in self.opacities.iter_mut().enumerate() {
            let next = wave_opacity(&self.config, index, elapsed);
            *opacity = opacity.max(next);
            if *opacity < 1.0 {
                all_visible = false;
            }
        }

        self.latch_completion(all_visible, timestamp)
    }

    /// Pins every wave to full opacity immediately.
    pub fn finish(&mut self, timestamp: Duration) -> Option<AnimationComplete> {
        self.started_at.get_or_insert(timestamp);
        self.opacities = [1.0; WAVE_COUNT];
        self.latch_completion(true, timestamp)
    }

    fn latch_completion(&mut self, all_visible: bool, timestamp: Duration) -> Option<AnimationComplete> {
        if all_visible && !self.completed {
            self.completed = true;
            Some(AnimationComplete {
                completed_at: timestamp,
            })
        } else {
            None
        }
    }
}

impl Default for FadeIn {
    fn default() -> Self {
        Self::new(WaveConfig::STANDARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn opacity_is_zero_before_each_window() {
        let config = WaveConfig::STANDARD;
        for index in 0..WAVE_COUNT {
            let start = config.window_start(index);
            assert_eq!(wave_opacity(&config, index, start - ms(1)), 0.0);
            assert_eq!(wave_opacity(&config, index, start), 0.0);
        }
    }

    #[test]
    fn opacity_rises_strictly_inside_window() {
        let config = WaveConfig::STANDARD;
        for index in 0..WAVE_COUNT {
            let start = config.window_start(index);
            let mut last = wave_opacity(&config, index, start);
            for step in 1..150 {
                let value = wave_opacity(&config, index, start + ms(step * 10));
                assert!(value > last, "wave {index} stalled at step {step}");
                assert!((0.0..=1.0).contains(&value));
                last = value;
            }
        }
    }

    #[test]
    fn opacity_is_pinned_after_window() {
        let config = WaveConfig::STANDARD;
        for index in 0..WAVE_COUNT {
            let end = config.window_end(index);
            assert_eq!(wave_opacity(&config, index, end), 1.0);
            assert_eq!(wave_opacity(&config, index, end + ms(10_000)), 1.0);
        }
    }

    #[test]
    fn explicit_anchor_wins_over_first_tick() {
        let mut fade = FadeIn::default();
        fade.anchor(Duration::ZERO);
        fade.advance(ms(1_250));
        assert_eq!(fade.started_at(), Some(Duration::ZERO));
        assert!(fade.opacities()[0] > 0.0);

        fade.anchor(ms(5_000));
        assert_eq!(fade.started_at(), Some(Duration::ZERO));
    }

    #[test]
    fn start_is_anchored_on_first_tick() {
        let mut fade = FadeIn::default();
        assert_eq!(fade.started_at(), None);
        fade.advance(ms(10_000));
        assert_eq!(fade.started_at(), Some(ms(10_000)));
        fade.advance(ms(11_000));
        assert_eq!(fade.started_at(), Some(ms(10_000)));
        assert!(fade.opacities()[0] > 0.0);
        assert_eq!(fade.opacities()[6], 0.0);
    }

    #[test]
    fn completion_fires_once_at_last_window_end() {
        let mut fade = FadeIn::default();
        let origin = ms(250);
        let mut events = Vec::new();
        for frame in 0..=400 {
            let timestamp = origin + ms(frame * 16);
            if let Some(event) = fade.advance(timestamp) {
                events.push(event);
            }
        }
        assert_eq!(events.len(), 1);
        let elapsed = events[0].completed_at - origin;
        assert!(elapsed >= ms(3500), "completed early at {elapsed:?}");
        assert!(elapsed < ms(3500 + 16));
        assert!(fade.is_complete());
    }

    #[test]
    fn completion_not_signalled_just_before_last_window_end() {
        let mut fade = FadeIn::default();
        assert!(fade.advance(ms(0)).is_none());
        assert!(fade.advance(ms(3499)).is_none());
        assert!(fade.advance(ms(3500)).is_some());
        assert!(fade.advance(ms(3600)).is_none());
    }

    #[test]
    fn opacities_never_decrease() {
        let mut fade = FadeIn::default();
        fade.advance(ms(0));
        fade.advance(ms(1500));
        let before = *fade.opacities();
        fade.advance(ms(700));
        for (after, before) in fade.opacities().iter().zip(before.iter()) {
            assert!(after >= before);
        }
    }

    #[test]
    fn finish_snaps_to_complete_once() {
        let mut fade = FadeIn::default();
        fade.advance(ms(0));
        assert!(fade.finish(ms(100)).is_some());
        assert_eq!(fade.opacities(), &[1.0; WAVE_COUNT]);
        assert!(fade.advance(ms(200)).is_none());
        assert!(fade.finish(ms(300)).is_none());
    }
}
