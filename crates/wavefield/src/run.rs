use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use renderer::{Antialiasing, ColorMode, GpuOptions};
use tracing_subscriber::EnvFilter;
use waveconfig::{TimingTable, WavefieldConfig};

use crate::audio::{self, AudioStatus};
use crate::cli::{antialiasing_from_setting, RunArgs};
use crate::host;
use crate::paths::AppPaths;

const DEFAULT_SURFACE_SIZE: (u32, u32) = (1280, 720);

/// Everything the host needs for one windowed run, after merging CLI flags
/// over the config file.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: ColorMode,
    pub surface_size: (u32, u32),
    pub gpu: GpuOptions,
    pub reduced_motion: bool,
    pub fixed_time: Option<Duration>,
    pub timing: TimingTable,
    pub audio: AudioStatus,
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config = load_config(args.config.as_deref(), &paths)?;
    let audio = audio::startup_status(&paths.state_file());
    let run_config = resolve_run_config(&args, config, audio)?;

    tracing::debug!(
        config = %paths.config_dir().display(),
        data = %paths.data_dir().display(),
        "resolved wavefield paths"
    );
    tracing::info!(
        mode = %run_config.mode,
        width = run_config.surface_size.0,
        height = run_config.surface_size.1,
        antialias = ?run_config.gpu.antialiasing,
        reduced_motion = run_config.reduced_motion,
        fixed_time = ?run_config.fixed_time,
        audio = %run_config.audio,
        "starting wavefield"
    );

    host::run(run_config)
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads `explicit` if given (it must exist), otherwise the default config
/// file, falling back to built-in defaults when that file is absent.
pub fn load_config(explicit: Option<&Path>, paths: &AppPaths) -> Result<WavefieldConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            WavefieldConfig::load_or_default(path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => {
            let path = paths.config_file();
            WavefieldConfig::load_or_default(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
    }
}

/// Unknown preset names fall back to the default preset with a warning.
fn resolve_mode(name: &str) -> ColorMode {
    let mode = ColorMode::from_name(name);
    if mode.name() != name.trim().to_ascii_lowercase() {
        tracing::warn!(requested = name, fallback = %mode, "unknown color mode");
    }
    mode
}

pub fn resolve_run_config(
    args: &RunArgs,
    config: WavefieldConfig,
    audio: AudioStatus,
) -> Result<RunConfig> {
    let mode = args
        .mode
        .as_deref()
        .or(config.display.mode.as_deref())
        .map(resolve_mode)
        .unwrap_or_default();

    let surface_size = match args.size.as_deref() {
        Some(raw) => waveconfig::parse_surface_size(raw)
            .with_context(|| format!("invalid --size '{raw}'"))?,
        None => config.surface_size()?.unwrap_or(DEFAULT_SURFACE_SIZE),
    };

    let antialiasing = args
        .antialias
        .or_else(|| config.display.antialias.map(antialiasing_from_setting))
        .unwrap_or(Antialiasing::Auto);

    Ok(RunConfig {
        mode,
        surface_size,
        gpu: GpuOptions { antialiasing },
        reduced_motion: args.reduced_motion || config.motion.reduced,
        fixed_time: args.time,
        timing: config.landing,
        audio,
    })
}
