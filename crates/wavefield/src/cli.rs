use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use renderer::Antialiasing;
use waveconfig::AntialiasSetting;

#[derive(Parser, Debug)]
#[command(
    name = "wavefield",
    author,
    version,
    about = "Animated wave background",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Wave color preset: `design` (blue) or `dev` (green). Unknown names use `design`.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Skip all fades and freeze the wave field.
    #[arg(long, env = "WAVEFIELD_REDUCED_MOTION")]
    pub reduced_motion: bool,

    /// Freeze the clock at a fixed timestamp (e.g. `1500ms`, `2s`).
    #[arg(long, value_name = "DURATION", value_parser = parse_time)]
    pub time: Option<Duration>,

    /// Config file to use instead of `wavefield.toml` in the config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the persisted startup-audio preference.
    Audio(AudioCommand),
    /// Print the landing element timing table.
    Timings(TimingsArgs),
    /// Print resolved config, data and state paths.
    Where,
}

#[derive(Parser, Debug)]
pub struct AudioCommand {
    #[command(subcommand)]
    pub action: AudioAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioAction {
    /// Allow audio at startup.
    Enable,
    /// Require permission again at startup.
    Disable,
    /// Print the startup audio status.
    Status,
}

#[derive(Parser, Debug)]
pub struct TimingsArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Config file to read timings from.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    if value.trim().is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }
    waveconfig::parse_antialias(value).map(antialiasing_from_setting)
}

pub fn antialiasing_from_setting(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(0 | 1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

pub fn parse_time(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(millis) = trimmed.parse::<u64>() {
        return Ok(Duration::from_millis(millis));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_antialias_variants() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("off").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias(" ").is_err());
    }

    #[test]
    fn unknown_mode_name_is_accepted_by_parser() {
        let cli = Cli::try_parse_from(["wavefield", "--mode", "neon"]).unwrap();
        assert_eq!(cli.run.mode.as_deref(), Some("neon"));
    }

    #[test]
    fn time_accepts_millis_and_humantime() {
        assert_eq!(parse_time("1500").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_time("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_time("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_time("soon").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["wavefield", "audio", "enable"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Audio(AudioCommand {
                action: AudioAction::Enable
            }))
        ));

        let cli = Cli::try_parse_from(["wavefield", "--mode", "dev", "--time", "3s"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.mode.as_deref(), Some("dev"));
        assert_eq!(cli.run.time, Some(Duration::from_secs(3)));
    }
}
