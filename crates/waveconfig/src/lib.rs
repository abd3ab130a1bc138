//! Configuration for the wavefield background.
//!
//! The config file is TOML and is read exactly once at start-up. Everything
//! in it is optional; an empty file (or no file at all) yields the compiled-in
//! defaults:
//!
//! ```toml
//! version = 1
//!
//! [display]
//! mode = "design"
//! size = "1920x1080"
//! antialias = "auto"
//!
//! [motion]
//! reduced = false
//!
//! [landing]
//! start_delay = "3500ms"
//!
//! [[landing.elements]]
//! id = "nav-logo-name"
//! delay = "0ms"
//! duration = "400ms"
//! ```
//!
//! Durations accept `humantime` strings or integer milliseconds.

mod timing;

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

pub use timing::{ElementTiming, TimingTable};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WavefieldConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub landing: TimingTable,
}

impl Default for WavefieldConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            display: DisplayConfig::default(),
            motion: MotionConfig::default(),
            landing: TimingTable::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// Color mode name; unknown names fall back to `design` at the renderer.
    pub mode: Option<String>,
    /// Initial window size as `WIDTHxHEIGHT`.
    pub size: Option<String>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotionConfig {
    #[serde(default)]
    pub reduced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// Requested MSAA sample count; `None` means "highest supported".
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

fn default_version() -> u32 {
    1
}

pub(crate) fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of milliseconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_millis(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_millis(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v / 1000.0)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}ms: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            let raw = value.to_string();
            Some(parse_antialias(&raw).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off`, or an explicit MSAA sample count.
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!(
            "invalid antialias setting '{other}'; use auto/off or 2/4/8/16"
        )),
    }
}

/// Parses a `WIDTHxHEIGHT` surface size such as `1280x720`.
pub fn parse_surface_size(raw: &str) -> Result<(u32, u32), ConfigError> {
    let trimmed = raw.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| ConfigError::Invalid(format!("size '{trimmed}' must look like WIDTHxHEIGHT")))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::Invalid(format!("size '{trimmed}' has a non-numeric dimension")))
    };
    let (width, height) = (parse(width)?, parse(height)?);
    if width == 0 || height == 0 {
        return Err(ConfigError::Invalid(format!(
            "size '{trimmed}' must have non-zero dimensions"
        )));
    }
    Ok((width, height))
}

impl WavefieldConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: WavefieldConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads the config at `path`, or returns defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn surface_size(&self) -> Result<Option<(u32, u32)>, ConfigError> {
        self.display
            .size
            .as_deref()
            .map(parse_surface_size)
            .transpose()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        self.surface_size()?;

        if self.landing.default_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "landing.default_duration must be greater than zero".into(),
            ));
        }

        let mut seen = HashSet::new();
        for element in self.landing.elements() {
            if element.id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "landing element id may not be empty".into(),
                ));
            }
            if !seen.insert(element.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "landing element '{}' is defined more than once",
                    element.id
                )));
            }
            if element.duration.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "landing element '{}' duration must be > 0",
                    element.id
                )));
            }
        }

        Ok(())
    }
}
