use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::deserialize_duration_opt;

/// Fade timing for one named UI element, relative to the ready signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTiming {
    pub id: String,
    pub delay: Duration,
    pub duration: Duration,
}

impl ElementTiming {
    pub fn new(id: impl Into<String>, delay: Duration, duration: Duration) -> Self {
        Self {
            id: id.into(),
            delay,
            duration,
        }
    }
}

/// Ordered fade timings for the elements that wait on the wave background.
///
/// `start_delay` is the absolute offset at which the landing elements begin
/// (the wave fade-in length). Element delays are stored relative to it.
/// In the config file an element without `delay` starts `default_stagger`
/// after the one before it (the first at zero), and an element without
/// `duration` uses `default_duration`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTimingTable")]
pub struct TimingTable {
    pub start_delay: Duration,
    pub default_duration: Duration,
    pub default_stagger: Duration,
    elements: Vec<ElementTiming>,
}

#[derive(Deserialize)]
struct RawElementTiming {
    id: String,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    delay: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    duration: Option<Duration>,
}

#[derive(Deserialize)]
struct RawTimingTable {
    #[serde(
        default = "default_start_delay",
        deserialize_with = "deserialize_duration"
    )]
    start_delay: Duration,
    #[serde(
        default = "default_element_duration",
        deserialize_with = "deserialize_duration"
    )]
    default_duration: Duration,
    #[serde(
        default = "default_stagger",
        deserialize_with = "deserialize_duration"
    )]
    default_stagger: Duration,
    elements: Option<Vec<RawElementTiming>>,
}

impl From<RawTimingTable> for TimingTable {
    fn from(raw: RawTimingTable) -> Self {
        let elements = match raw.elements {
            None => default_elements(),
            Some(list) => {
                let mut previous: Option<Duration> = None;
                list.into_iter()
                    .map(|element| {
                        let delay = element.delay.unwrap_or_else(|| match previous {
                            Some(before) => before + raw.default_stagger,
                            None => Duration::ZERO,
                        });
                        previous = Some(delay);
                        ElementTiming::new(
                            element.id,
                            delay,
                            element.duration.unwrap_or(raw.default_duration),
                        )
                    })
                    .collect()
            }
        };
        Self {
            start_delay: raw.start_delay,
            default_duration: raw.default_duration,
            default_stagger: raw.default_stagger,
            elements,
        }
    }
}

impl Default for TimingTable {
    fn default() -> Self {
        Self {
            start_delay: default_start_delay(),
            default_duration: default_element_duration(),
            default_stagger: default_stagger(),
            elements: default_elements(),
        }
    }
}

impl TimingTable {
    pub fn new(start_delay: Duration, elements: Vec<ElementTiming>) -> Self {
        Self {
            start_delay,
            elements,
            ..Self::default()
        }
    }

    pub fn elements(&self) -> &[ElementTiming] {
        &self.elements
    }

    pub fn lookup(&self, id: &str) -> Option<&ElementTiming> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Transition delay for `id`, measured from the moment readiness is reached.
    ///
    /// Unknown elements start immediately.
    pub fn delay_for(&self, id: &str) -> Duration {
        self.lookup(id)
            .map(|element| element.delay)
            .unwrap_or(Duration::ZERO)
    }

    /// Absolute delay for `id`, measured from page start.
    pub fn absolute_delay_for(&self, id: &str) -> Duration {
        self.start_delay + self.delay_for(id)
    }

    pub fn duration_for(&self, id: &str) -> Duration {
        self.lookup(id)
            .map(|element| element.duration)
            .unwrap_or(self.default_duration)
    }

    /// Time from page start until the last listed element finishes fading in.
    pub fn total_animation_time(&self) -> Duration {
        match self.elements.last() {
            Some(last) => self.start_delay + last.delay + last.duration,
            None => self.start_delay,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|value| value.unwrap_or_default())
}

fn default_start_delay() -> Duration {
    Duration::from_millis(3500)
}

fn default_element_duration() -> Duration {
    Duration::from_millis(400)
}

fn default_stagger() -> Duration {
    Duration::from_millis(100)
}

fn default_elements() -> Vec<ElementTiming> {
    vec![
        ElementTiming::new("nav-logo-name", Duration::ZERO, Duration::from_millis(400)),
        ElementTiming::new(
            "bottom-bar-currently",
            Duration::from_millis(100),
            Duration::from_millis(400),
        ),
        ElementTiming::new(
            "bottom-bar-button",
            Duration::from_millis(100),
            Duration::from_millis(400),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_landing_layout() {
        let table = TimingTable::default();
        assert_eq!(table.delay_for("nav-logo-name"), Duration::ZERO);
        assert_eq!(
            table.delay_for("bottom-bar-button"),
            Duration::from_millis(100)
        );
        assert_eq!(
            table.absolute_delay_for("bottom-bar-currently"),
            Duration::from_millis(3600)
        );
        assert_eq!(table.total_animation_time(), Duration::from_millis(4000));
    }

    #[test]
    fn unknown_elements_use_defaults() {
        let table = TimingTable::default();
        assert!(table.lookup("footer").is_none());
        assert_eq!(table.delay_for("footer"), Duration::ZERO);
        assert_eq!(table.duration_for("footer"), Duration::from_millis(400));
    }

    #[test]
    fn omitted_delays_follow_default_stagger() {
        let table: TimingTable = toml::from_str(
            r#"
default_duration = "300ms"
default_stagger = "150ms"

[[elements]]
id = "first"

[[elements]]
id = "second"

[[elements]]
id = "third"
delay = 500
duration = 200

[[elements]]
id = "fourth"
"#,
        )
        .unwrap();
        assert_eq!(table.delay_for("first"), Duration::ZERO);
        assert_eq!(table.delay_for("second"), Duration::from_millis(150));
        assert_eq!(table.delay_for("third"), Duration::from_millis(500));
        assert_eq!(table.delay_for("fourth"), Duration::from_millis(650));
        assert_eq!(table.duration_for("first"), Duration::from_millis(300));
        assert_eq!(table.duration_for("third"), Duration::from_millis(200));
    }

    #[test]
    fn missing_elements_key_keeps_default_layout() {
        let table: TimingTable = toml::from_str("start_delay = 1000").unwrap();
        assert_eq!(table.elements(), TimingTable::default().elements());
        assert_eq!(table.start_delay, Duration::from_millis(1000));
    }

    #[test]
    fn empty_table_ends_at_start_delay() {
        let table = TimingTable::new(Duration::from_millis(1200), Vec::new());
        assert_eq!(table.total_animation_time(), Duration::from_millis(1200));
    }
}
