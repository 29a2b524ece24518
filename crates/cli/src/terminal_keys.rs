use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use facecloak_core::pipeline::key_source::KeyPress;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Puts the terminal in raw mode and forwards key presses from a background
/// thread. Dropping it stops the thread and restores the terminal.
pub struct TerminalKeys {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TerminalKeys {
    pub fn start(tx: Sender<KeyPress>) -> io::Result<Self> {
        enable_raw_mode()?;
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name("terminal-keys".into())
            .spawn(move || forward_keys(&tx, &thread_stop));
        let handle = match handle {
            Ok(handle) => handle,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(e);
            }
        };

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        if let Err(e) = disable_raw_mode() {
            log::warn!("Could not restore terminal mode: {e}");
        }
    }
}

fn forward_keys(tx: &Sender<KeyPress>, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                log::warn!("Key input stopped: {e}");
                return;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => map_key(key),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Key input stopped: {e}");
                return;
            }
        };
        if let Some(key) = key {
            if tx.send(key).is_err() {
                return;
            }
        }
    }
}

/// Raw mode swallows Ctrl+C, so it is mapped to Escape (quit).
fn map_key(event: KeyEvent) -> Option<KeyPress> {
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyPress::Escape)
        }
        KeyCode::Char(' ') => Some(KeyPress::Space),
        KeyCode::Char(c) => Some(KeyPress::Char(c)),
        KeyCode::Esc => Some(KeyPress::Escape),
        _ => None,
    }
}
