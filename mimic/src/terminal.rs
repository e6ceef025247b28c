//! Keystrokes from the terminal.
use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use log::warn;
use mimic_core::KeySource;

/// Reads single keystrokes from the terminal without waiting for a newline.
///
/// The terminal is in raw mode while this object lives. `Ctrl-C` is reported as an error.
pub struct TerminalKeys {
    _private: (),
}

impl TerminalKeys {
    /// Puts the terminal into raw mode.
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> Result<char> {
        loop {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        bail!("interrupted")
                    }
                    KeyCode::Char(c) => return Ok(c),
                    _ => {}
                }
            }
        }
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore the terminal: {}", e);
        }
    }
}
