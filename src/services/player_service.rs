use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::{fs::File, io::BufReader, path::{Path, PathBuf}};
use thiserror::Error;
use tracing::debug;

/// Formatos de audio que decodifica rodio con sus features por defecto
pub const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac"];

/// Verifica si la extensión de la ruta corresponde a un formato soportado
pub fn is_supported_sound(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_AUDIO_EXTENSIONS
                .iter()
                .any(|&e| ext.eq_ignore_ascii_case(e))
        })
}

/// Errores del backend de audio durante la reproducción
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No se pudo inicializar el dispositivo de audio
    #[error("no audio output device available: {0}")]
    Device(String),
    #[error("could not open '{}': {source}", .path.display())]
    Open { path: PathBuf, source: std::io::Error },
    /// Archivo corrupto o codec no soportado
    #[error("could not decode '{}': {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("audio sink error: {0}")]
    Sink(String),
}

/// Facilidad de audio del sistema: recibe una ruta y un volumen
pub trait AudioBackend {
    /// Reproduce el sonido completo antes de volver
    fn play(&mut self, path: &Path, volume: f32) -> Result<(), PlaybackError>;
}

/// Backend real sobre el dispositivo de salida por defecto
pub struct RodioBackend {
    // El stream debe vivir mientras se use el handle; se libera al soltarlo
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioBackend {
    pub fn new() -> Result<Self, PlaybackError> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            PlaybackError::Device(format!("could not get default device: {}", e))
        })?;

        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl AudioBackend for RodioBackend {
    fn play(&mut self, path: &Path, volume: f32) -> Result<(), PlaybackError> {
        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let sink = Sink::try_new(&self.handle).map_err(|e| PlaybackError::Sink(e.to_string()))?;

        sink.set_volume(volume);
        sink.append(source);
        sink.sleep_until_end();
        debug!("finished playing {}", path.display());

        Ok(())
    }
}
