use std::path::PathBuf;

use clap::Parser;

use crate::services::config_service::{Overrides, CONFIG_FILE_NAME};

/// Bipmap: beeps every few seconds so you remember to check the minimap
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file (created with defaults when missing)
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Volume between 0.0 and 1.0 (default: from config)
    #[arg(short, long)]
    pub volume: Option<f32>,

    /// Seconds between beeps (default: from config)
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// Sound file to play (default: from config)
    /// Example: ~/sounds/ping.wav
    #[arg(short, long)]
    pub sound: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            sound_path: self.sound.clone(),
            volume: self.volume,
            delay_secs: self.delay,
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
