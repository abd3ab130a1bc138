mod audio;
mod cli;
mod host;
mod paths;
mod run;
mod state;

use anyhow::{Context, Result};
use cli::{AudioAction, Command, TimingsArgs};
use paths::AppPaths;
use serde_json::json;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Audio(audio_cmd)) => handle_audio_command(audio_cmd.action),
        Some(Command::Timings(args)) => handle_timings_command(args),
        Some(Command::Where) => handle_where_command(),
        None => run::run(cli.run),
    }
}

fn handle_audio_command(action: AudioAction) -> Result<()> {
    let paths = AppPaths::discover()?;
    let state_file = paths.state_file();

    let status = match action {
        AudioAction::Enable => audio::set_enabled(&state_file, true)?,
        AudioAction::Disable => audio::set_enabled(&state_file, false)?,
        AudioAction::Status => audio::startup_status(&state_file),
    };
    println!("{status}");
    Ok(())
}

fn handle_timings_command(args: TimingsArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config = run::load_config(args.config.as_deref(), &paths)?;
    let table = &config.landing;

    if args.json {
        let elements: Vec<_> = table
            .elements()
            .iter()
            .map(|element| {
                json!({
                    "id": element.id,
                    "delay_ms": table.absolute_delay_for(&element.id).as_millis() as u64,
                    "duration_ms": element.duration.as_millis() as u64,
                })
            })
            .collect();
        let document = json!({
            "start_delay_ms": table.start_delay.as_millis() as u64,
            "total_ms": table.total_animation_time().as_millis() as u64,
            "elements": elements,
        });
        let rendered =
            serde_json::to_string_pretty(&document).context("failed to render timings as JSON")?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "Landing elements (start {}ms, total {}ms):",
        table.start_delay.as_millis(),
        table.total_animation_time().as_millis()
    );
    for element in table.elements() {
        println!(
            "  {:<16} delay={:>5}ms duration={:>4}ms",
            element.id,
            table.absolute_delay_for(&element.id).as_millis(),
            element.duration.as_millis()
        );
    }
    Ok(())
}

fn handle_where_command() -> Result<()> {
    let paths = AppPaths::discover()?;
    let state_file = paths.state_file();
    println!("Configuration directories:");
    println!("  config:     {}", paths.config_dir().display());
    println!("  data:       {}", paths.data_dir().display());
    println!("  config file: {}", paths.config_file().display());
    println!("  state:      {}", state_file.display());
    println!("Audio at startup: {}", audio::startup_status(&state_file));
    Ok(())
}
