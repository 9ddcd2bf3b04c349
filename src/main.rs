use std::process::ExitCode;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod models;
mod services;

use models::settings::Settings;
use services::config_service::ConfigurationError;
use services::player_service::RodioBackend;
use services::{beep_service, config_service, ui_manager};

fn init_logging(verbose: bool) {
    // En modo raw la terminal no traduce saltos de línea
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Carga config.txt (creándolo si falta) y aplica los argumentos
fn resolve_settings(args: &args::Args) -> Result<Settings, ConfigurationError> {
    // Si no existe el archivo se crea con los valores por defecto
    if !args.config.exists() {
        config_service::write_default_config(&args.config)?;
        println!("Created default configuration at '{}'.", args.config.display());
        println!("Please enter the path to your sound file (wav, mp3, ogg or flac) in it.");
    }

    let settings = config_service::load_settings(&args.config)?;
    args.overrides().apply(settings)
}

fn run(args: &args::Args) -> anyhow::Result<u64> {
    let settings = resolve_settings(args).context("configuration error")?;
    info!("loaded settings: {settings:?}");

    let interrupted = ui_manager::install_interrupt_handler()?;

    ui_manager::print_banner(&settings)?;

    let mut backend = RodioBackend::new().context("playback error")?;
    let mut pacer = ui_manager::pacer_for_terminal(interrupted)?;

    let summary = beep_service::run(&settings, &mut backend, pacer.as_mut(), |state, cycle| {
        ui_manager::show_state(state, cycle, &settings)
    })
    .context("playback error")?;

    Ok(summary.plays)
}

fn main() -> ExitCode {
    let args = args::parse_args();
    init_logging(args.verbose);

    match run(&args) {
        Ok(plays) => {
            ui_manager::print_goodbye(plays);
            ExitCode::SUCCESS
        }
        Err(e) => {
            ui_manager::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bipmap-main-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args_for(config: &std::path::Path) -> args::Args {
        args::Args::parse_from(["bipmap", "-c", config.to_str().unwrap()])
    }

    #[test]
    fn nonexistent_sound_fails_before_playback() {
        let dir = scratch_dir("ghost-sound");
        let config = dir.join("config.txt");
        fs::write(&config, "sound_path=ghost.wav\ndelay=15\n").unwrap();

        let err = resolve_settings(&args_for(&config)).unwrap_err();
        assert!(matches!(err, ConfigurationError::SoundNotFound(p) if p == dir.join("ghost.wav")));

        // run() corta antes de abrir el dispositivo de audio
        let err = run(&args_for(&config)).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
        assert!(format!("{err:#}").starts_with("configuration error: "));
    }

    #[test]
    fn missing_config_is_created_then_loaded() {
        let dir = scratch_dir("fresh");
        let config = dir.join("config.txt");

        let err = resolve_settings(&args_for(&config)).unwrap_err();
        assert!(config.is_file());
        assert!(matches!(err, ConfigurationError::SoundNotFound(_)));

        fs::write(dir.join("beep.wav"), b"RIFF").unwrap();
        let settings = resolve_settings(&args_for(&config)).unwrap();
        assert_eq!(settings.sound_path, dir.join("beep.wav"));
    }
}
