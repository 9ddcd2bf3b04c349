use std::path::PathBuf;
use std::time::Duration;

/// Volumen por defecto (0.0 - 1.0)
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Segundos de espera por defecto entre pitidos
pub const DEFAULT_DELAY_SECS: u64 = 7;

/// Configuración inmutable de una ejecución del recordatorio
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Ruta al archivo de sonido que se reproduce en cada ciclo
    pub sound_path: PathBuf,
    /// Volumen de reproducción, siempre dentro de [0.0, 1.0]
    pub volume: f32,
    /// Espera entre pitidos, siempre mayor que cero
    pub delay: Duration,
}

impl Settings {
    pub fn new(sound_path: PathBuf) -> Self {
        Self {
            sound_path,
            volume: DEFAULT_VOLUME,
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
        }
    }

    /// Volumen expresado en porcentaje para mostrarlo al usuario
    pub fn volume_percent(&self) -> u32 {
        (self.volume * 100.0).round() as u32
    }
}
