use crate::models::settings::{Settings, DEFAULT_DELAY_SECS, DEFAULT_VOLUME};
use crate::services::player_service::is_supported_sound;
use std::env;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Nombre del archivo de configuración buscado en el directorio de trabajo
pub const CONFIG_FILE_NAME: &str = "config.txt";

/// Sonido que se escribe en la configuración por defecto
const DEFAULT_SOUND: &str = "beep.wav";

/// Errores al construir la configuración de arranque
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no sound_path set in the configuration")]
    MissingSoundPath,
    #[error("sound file '{}' does not exist", .0.display())]
    SoundNotFound(PathBuf),
    #[error("sound file '{}' is not readable: {source}", .path.display())]
    SoundUnreadable { path: PathBuf, source: io::Error },
    #[error("sound file '{}' is not a supported format (wav, mp3, ogg, flac)", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("could not read configuration '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write configuration '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Valores pasados por línea de comandos que reemplazan a los del archivo
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub sound_path: Option<PathBuf>,
    pub volume: Option<f32>,
    pub delay_secs: Option<u64>,
}

impl Overrides {
    /// Aplica los valores presentes sobre `settings`.
    ///
    /// Se normalizan con las mismas reglas que el archivo: el volumen se
    /// recorta a [0.0, 1.0] y un retraso de cero se ignora. Un sonido
    /// relativo se resuelve contra el directorio de trabajo.
    pub fn apply(&self, settings: Settings) -> Result<Settings, ConfigurationError> {
        let mut settings = settings;

        if let Some(path) = &self.sound_path {
            let expanded = expand_env_vars(&path.to_string_lossy());
            settings.sound_path = validate_sound(expanded)?;
        }
        if let Some(volume) = self.volume {
            settings.volume = clamp_volume(volume).unwrap_or(settings.volume);
        }
        match self.delay_secs {
            Some(0) => warn!("ignoring --delay 0, keeping {}s", settings.delay.as_secs()),
            Some(secs) => settings.delay = Duration::from_secs(secs),
            None => {}
        }

        Ok(settings)
    }
}

/// Expande variables de entorno en la ruta
///
/// Soporta:
/// - Windows: %USERNAME%, %USERPROFILE%, %APPDATA%, %LOCALAPPDATA%
/// - Linux/macOS: $USER, $HOME, ~
fn expand_env_vars(path: &str) -> PathBuf {
    let mut result = path.to_string();

    for name in ["USERNAME", "USERPROFILE", "APPDATA", "LOCALAPPDATA"] {
        let token = format!("%{name}%");
        if result.contains(&token) {
            if let Ok(value) = env::var(name) {
                result = result.replace(&token, &value);
            }
        }
    }

    if result.contains("$USER") {
        if let Ok(user) = env::var("USER") {
            result = result.replace("$USER", &user);
        }
    }
    // "~" solo cuenta al inicio de la ruta
    if result.contains("$HOME") || result.starts_with('~') {
        if let Ok(home) = env::var("HOME") {
            result = result.replace("$HOME", &home);
            if let Some(rest) = result.strip_prefix('~') {
                result = format!("{home}{rest}");
            }
        }
    }

    PathBuf::from(result)
}

fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        return None;
    }
    Some(volume.clamp(0.0, 1.0))
}

/// Interpreta un volumen; lo que no es un número vuelve al valor por defecto
pub fn normalize_volume(raw: &str) -> f32 {
    match raw.trim().parse::<f32>().ok().and_then(clamp_volume) {
        Some(volume) => volume,
        None => {
            warn!("invalid volume '{raw}', using {DEFAULT_VOLUME}");
            DEFAULT_VOLUME
        }
    }
}

/// Interpreta un retraso en segundos enteros; cero, negativos o basura
/// vuelven al valor por defecto
pub fn normalize_delay(raw: &str) -> Duration {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!("invalid delay '{raw}', using {DEFAULT_DELAY_SECS}s");
            Duration::from_secs(DEFAULT_DELAY_SECS)
        }
    }
}

/// Comprueba que el sonido exista, sea legible y tenga un formato soportado
fn validate_sound(path: PathBuf) -> Result<PathBuf, ConfigurationError> {
    if !path.is_file() {
        return Err(ConfigurationError::SoundNotFound(path));
    }
    if let Err(source) = File::open(&path) {
        return Err(ConfigurationError::SoundUnreadable { path, source });
    }
    if !is_supported_sound(&path) {
        return Err(ConfigurationError::UnsupportedFormat(path));
    }
    Ok(path)
}

/// Construye la configuración a partir del texto `key=value`.
///
/// Las rutas relativas de `sound_path` se resuelven contra `base_dir`.
pub fn parse_settings(text: &str, base_dir: &Path) -> Result<Settings, ConfigurationError> {
    let mut sound: Option<String> = None;
    let mut volume = DEFAULT_VOLUME;
    let mut delay = Duration::from_secs(DEFAULT_DELAY_SECS);

    // Notepad guarda con BOM
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "sound_path" | "sound" => sound = Some(value.to_string()),
            "volume" => volume = normalize_volume(value),
            "delay" => delay = normalize_delay(value),
            other => debug!("ignoring unknown key '{other}'"),
        }
    }

    let sound = sound
        .filter(|s| !s.is_empty())
        .ok_or(ConfigurationError::MissingSoundPath)?;

    let mut sound_path = expand_env_vars(&sound);
    if sound_path.is_relative() {
        sound_path = base_dir.join(sound_path);
    }

    Ok(Settings {
        volume,
        delay,
        ..Settings::new(validate_sound(sound_path)?)
    })
}

/// Carga la configuración desde `path`
///
/// El único efecto es la lectura del archivo.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigurationError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse_settings(&text, base_dir)
}

/// Escribe un config.txt con los valores por defecto
pub fn write_default_config(path: &Path) -> Result<(), ConfigurationError> {
    let contents = format!(
        "# bipmap configuration\n\
         # sound_path: wav, mp3, ogg or flac file, relative to this file\n\
         # volume: 0.0 - 1.0\n\
         # delay: seconds between beeps\n\
         sound_path={DEFAULT_SOUND}\n\
         volume={DEFAULT_VOLUME:.1}\n\
         delay={DEFAULT_DELAY_SECS}\n"
    );
    fs::write(path, contents).map_err(|source| ConfigurationError::Write {
        path: path.to_path_buf(),
        source,
    })
}
