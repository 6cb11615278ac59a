//! Raw-mode keyboard handling.
//!
//! Once the run starts the terminal is switched to raw mode so single
//! keypresses can end the session. Raw mode does not translate `\n`, so
//! line-oriented output goes through [`CrlfWriter`].

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::{self, Write};
use tracing::warn;

/// `q`, `Esc` or Ctrl-C.
pub fn is_exit_event(event: &Event) -> bool {
    match event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) if *kind != KeyEventKind::Release => match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
            KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        },
        _ => false,
    }
}

fn read_until_exit_key() -> io::Result<()> {
    loop {
        if is_exit_event(&event::read()?) {
            return Ok(());
        }
    }
}

/// Resolves on the first exit keypress. Never resolves if the terminal
/// cannot be read.
pub async fn wait_for_exit_key() {
    match tokio::task::spawn_blocking(read_until_exit_key).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!(error = %e, "keyboard input unavailable");
            std::future::pending::<()>().await
        }
        Err(_) => std::future::pending::<()>().await,
    }
}

/// Enter raw mode, returning whether it took effect.
pub fn enter_raw_mode() -> bool {
    match crossterm::terminal::enable_raw_mode() {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "raw mode unavailable, only Ctrl+C will exit");
            false
        }
    }
}

pub fn leave_raw_mode() {
    let _ = crossterm::terminal::disable_raw_mode();
}

/// Writes `\r\n` for every `\n`.
pub struct CrlfWriter<W>(pub W);

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in buf.split_inclusive(|b| *b == b'\n') {
            match chunk.strip_suffix(b"\n") {
                Some(line) => {
                    self.0.write_all(line)?;
                    self.0.write_all(b"\r\n")?;
                }
                None => self.0.write_all(chunk)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
