use std::time::Duration;

use tracing::{debug, info};

use crate::models::settings::Settings;
use crate::services::player_service::{AudioBackend, PlaybackError};

/// Estados del ciclo de recordatorio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepState {
    /// Esperando el retraso configurado
    Waiting,
    /// Reproduciendo el sonido
    Playing,
}

/// Resultado de una espera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Pasó el tiempo completo
    Elapsed,
    /// El usuario pidió salir
    Interrupted,
}

/// Marca el ritmo entre pitidos
pub trait Pacer {
    fn wait(&mut self, delay: Duration) -> WaitOutcome;
}

/// Resumen de una ejecución terminada limpiamente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    /// Sonidos reproducidos por completo
    pub plays: u64,
}

/// Alterna espera y reproducción hasta que el pacer informe una interrupción.
///
/// `observe` recibe cada cambio de estado junto con el número de ciclo
/// (empezando en 1). Un fallo del backend termina el bucle sin reintentos.
pub fn run<B, P, F>(
    settings: &Settings,
    backend: &mut B,
    pacer: &mut P,
    mut observe: F,
) -> Result<LoopSummary, PlaybackError>
where
    B: AudioBackend + ?Sized,
    P: Pacer + ?Sized,
    F: FnMut(BeepState, u64),
{
    let mut plays = 0u64;
    let mut state = BeepState::Waiting;

    info!(
        "beeping every {}s at {}% with {}",
        settings.delay.as_secs(),
        settings.volume_percent(),
        settings.sound_path.display()
    );

    loop {
        let cycle = plays + 1;
        observe(state, cycle);

        match state {
            BeepState::Waiting => {
                debug!("cycle {cycle}: waiting {:?}", settings.delay);
                if pacer.wait(settings.delay) == WaitOutcome::Interrupted {
                    info!("interrupted after {plays} beeps");
                    return Ok(LoopSummary { plays });
                }
                state = BeepState::Playing;
            }
            BeepState::Playing => {
                debug!("cycle {cycle}: playing");
                backend.play(&settings.sound_path, settings.volume)?;
                plays = cycle;
                state = BeepState::Waiting;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct RecordingBackend {
        plays: Vec<(PathBuf, f32)>,
        fail_on: Option<usize>,
    }

    impl AudioBackend for RecordingBackend {
        fn play(&mut self, path: &Path, volume: f32) -> Result<(), PlaybackError> {
            if self.fail_on == Some(self.plays.len() + 1) {
                return Err(PlaybackError::Device("unplugged".into()));
            }
            self.plays.push((path.to_path_buf(), volume));
            Ok(())
        }
    }

    /// Deja pasar `allowed` esperas y luego interrumpe
    struct CountingPacer {
        allowed: usize,
        waits: Vec<Duration>,
    }

    impl CountingPacer {
        fn new(allowed: usize) -> Self {
            Self { allowed, waits: Vec::new() }
        }
    }

    impl Pacer for CountingPacer {
        fn wait(&mut self, delay: Duration) -> WaitOutcome {
            self.waits.push(delay);
            if self.waits.len() > self.allowed {
                WaitOutcome::Interrupted
            } else {
                WaitOutcome::Elapsed
            }
        }
    }

    fn settings() -> Settings {
        Settings {
            sound_path: PathBuf::from("beep.wav"),
            volume: 0.5,
            delay: Duration::from_secs(15),
        }
    }

    #[test]
    fn waits_the_delay_before_every_play() {
        let mut backend = RecordingBackend::default();
        let mut pacer = CountingPacer::new(3);

        let summary = run(&settings(), &mut backend, &mut pacer, |_, _| {}).unwrap();

        assert_eq!(summary, LoopSummary { plays: 3 });
        assert_eq!(pacer.waits, vec![Duration::from_secs(15); 4]);
        assert_eq!(backend.plays, vec![(PathBuf::from("beep.wav"), 0.5); 3]);
    }

    #[test]
    fn interrupt_before_first_beep_is_clean() {
        let mut backend = RecordingBackend::default();
        let mut pacer = CountingPacer::new(0);

        let summary = run(&settings(), &mut backend, &mut pacer, |_, _| {}).unwrap();

        assert_eq!(summary.plays, 0);
        assert!(backend.plays.is_empty());
    }

    #[test]
    fn backend_failure_stops_the_loop() {
        let mut backend = RecordingBackend {
            fail_on: Some(2),
            ..Default::default()
        };
        let mut pacer = CountingPacer::new(10);

        let err = run(&settings(), &mut backend, &mut pacer, |_, _| {}).unwrap_err();

        assert!(matches!(err, PlaybackError::Device(_)));
        assert_eq!(backend.plays.len(), 1);
        // Sin reintentos: solo dos esperas, una por intento
        assert_eq!(pacer.waits.len(), 2);
    }

    #[test]
    fn states_alternate_starting_with_waiting() {
        let mut backend = RecordingBackend::default();
        let mut pacer = CountingPacer::new(2);
        let mut seen = Vec::new();

        run(&settings(), &mut backend, &mut pacer, |state, cycle| seen.push((state, cycle))).unwrap();

        assert_eq!(
            seen,
            vec![
                (BeepState::Waiting, 1),
                (BeepState::Playing, 1),
                (BeepState::Waiting, 2),
                (BeepState::Playing, 2),
                (BeepState::Waiting, 3),
            ]
        );
    }

    #[test]
    fn real_sleep_is_at_least_the_delay() {
        struct SleepOnce(bool);
        impl Pacer for SleepOnce {
            fn wait(&mut self, delay: Duration) -> WaitOutcome {
                if self.0 {
                    return WaitOutcome::Interrupted;
                }
                self.0 = true;
                std::thread::sleep(delay);
                WaitOutcome::Elapsed
            }
        }

        let settings = Settings {
            delay: Duration::from_millis(30),
            ..settings()
        };
        let mut backend = RecordingBackend::default();
        let start = std::time::Instant::now();

        run(&settings, &mut backend, &mut SleepOnce(false), |_, _| {}).unwrap();

        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(backend.plays.len(), 1);
    }
}
