use std::io::{self, stdout, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor, Stylize},
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
    tty::IsTty,
};
use tracing::warn;

use crate::models::settings::Settings;
use crate::services::beep_service::{BeepState, Pacer, WaitOutcome};

/// Intervalo máximo entre lecturas del teclado
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const BANNER: &str = r"
  ____  _         __  __
 | __ )(_)_ __   |  \/  | __ _ _ __
 |  _ \| | '_ \  | |\/| |/ _` | '_ \
 | |_) | | |_) | | |  | | (_| | |_) |
 |____/|_| .__/  |_|  |_|\__,_| .__/
         |_|                  |_|
";

/// Limpia la pantalla y muestra el banner con la configuración activa
pub fn print_banner(settings: &Settings) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let border = "#".repeat(60);
    writeln!(out, "{}", border.as_str().yellow())?;
    writeln!(out, "{}", BANNER.red())?;
    writeln!(out, "{}", "Stay aware of the minimap. For bad players only :)".cyan().bold())?;
    writeln!(out, "{}", "-".repeat(60).yellow())?;
    writeln!(out)?;
    writeln!(out, "Sound  : {}", settings.sound_path.display())?;
    writeln!(
        out,
        "{}",
        format!(
            "[INFO] - Volume : {}%  |  Delay : {}s",
            settings.volume_percent(),
            settings.delay.as_secs()
        )
        .yellow()
        .bold()
    )?;
    writeln!(out)?;
    writeln!(out, "{}", "Keys:  p  pause / resume    q  quit".green().bold())?;
    writeln!(out)?;
    out.flush()
}

/// Reescribe la línea de estado en su sitio
fn print_status(text: &str, color: Color) {
    let mut out = stdout();
    let _ = execute!(
        out,
        Print("\r"),
        Clear(ClearType::CurrentLine),
        SetForegroundColor(color),
        Print(text),
        ResetColor
    );
}

/// Muestra el cambio de estado del bucle de pitidos
pub fn show_state(state: BeepState, cycle: u64, settings: &Settings) {
    match state {
        BeepState::Waiting => print_status(
            &format!("waiting {}s before beep #{cycle}", settings.delay.as_secs()),
            Color::Yellow,
        ),
        BeepState::Playing => print_status(&format!("beep #{cycle}"), Color::Green),
    }
}

/// Mensaje final tras salir del bucle
pub fn print_goodbye(plays: u64) {
    println!("\r\n{}", format!("Exiting program after {plays} beeps.").yellow().bold());
}

/// Mensaje de error en rojo por stderr
pub fn print_error(message: &str) {
    eprintln!("\r\n{}", format!("⚠️  {message}").red());
}

/// Acciones que se pueden pedir con el teclado mientras se espera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    TogglePause,
}

fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(KeyAction::TogglePause),
        _ => None,
    }
}

/// Bandera compartida que se activa al recibir SIGINT/SIGTERM del sistema
pub type InterruptFlag = Arc<AtomicBool>;

/// Instala el manejador de interrupciones del sistema
pub fn install_interrupt_handler() -> Result<InterruptFlag, ctrlc::Error> {
    let flag = InterruptFlag::default();
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))?;
    Ok(flag)
}

/// Duerme en trozos de `POLL_INTERVAL` hasta completar `delay` desde `started`
fn sleep_until(interrupted: &AtomicBool, started: Instant, delay: Duration) -> WaitOutcome {
    loop {
        if interrupted.load(Ordering::SeqCst) {
            return WaitOutcome::Interrupted;
        }
        let elapsed = started.elapsed();
        if elapsed >= delay {
            return WaitOutcome::Elapsed;
        }
        thread::sleep((delay - elapsed).min(POLL_INTERVAL));
    }
}

/// Espera leyendo el teclado en modo raw.
///
/// Ctrl-C llega como tecla y no como señal, así que la salida es limpia.
/// Mientras está en pausa el tiempo no avanza; al reanudar la espera
/// vuelve a empezar entera. El modo raw se restaura al soltarlo.
pub struct KeyPacer {
    paused: bool,
    interrupted: InterruptFlag,
}

impl KeyPacer {
    pub fn new(interrupted: InterruptFlag) -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self {
            paused: false,
            interrupted,
        })
    }
}

impl Pacer for KeyPacer {
    fn wait(&mut self, delay: Duration) -> WaitOutcome {
        let mut started = Instant::now();

        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                return WaitOutcome::Interrupted;
            }
            let elapsed = started.elapsed();
            if !self.paused && elapsed >= delay {
                return WaitOutcome::Elapsed;
            }
            let timeout = if self.paused {
                POLL_INTERVAL
            } else {
                (delay - elapsed).min(POLL_INTERVAL)
            };

            let key = match event::poll(timeout).and_then(|ready| {
                if ready { event::read().map(Some) } else { Ok(None) }
            }) {
                Ok(Some(Event::Key(key))) => key,
                Ok(_) => continue,
                Err(e) => {
                    warn!("keyboard input unavailable, sleeping instead: {e}");
                    self.paused = false;
                    return sleep_until(&self.interrupted, started, delay);
                }
            };

            match key_action(&key) {
                Some(KeyAction::Quit) => return WaitOutcome::Interrupted,
                Some(KeyAction::TogglePause) => {
                    self.paused = !self.paused;
                    if self.paused {
                        print_status("paused (p to resume)", Color::Cyan);
                    } else {
                        started = Instant::now();
                        print_status(&format!("resumed, waiting {}s", delay.as_secs()), Color::Yellow);
                    }
                }
                None => {}
            }
        }
    }
}

impl Drop for KeyPacer {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Espera sin teclado; solo la señal del sistema la interrumpe
pub struct SleepPacer {
    interrupted: InterruptFlag,
}

impl SleepPacer {
    pub fn new(interrupted: InterruptFlag) -> Self {
        Self { interrupted }
    }
}

impl Pacer for SleepPacer {
    fn wait(&mut self, delay: Duration) -> WaitOutcome {
        sleep_until(&self.interrupted, Instant::now(), delay)
    }
}

/// Elige el pacer según si stdin es una terminal
pub fn pacer_for_terminal(interrupted: InterruptFlag) -> io::Result<Box<dyn Pacer>> {
    if io::stdin().is_tty() {
        Ok(Box::new(KeyPacer::new(interrupted)?))
    } else {
        Ok(Box::new(SleepPacer::new(interrupted)))
    }
}
