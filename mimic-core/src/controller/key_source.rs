//! Sources of operator keystrokes.
use anyhow::{bail, Result};
use std::collections::VecDeque;

/// Blocking source of single keystrokes.
pub trait KeySource {
    /// Waits for the next keystroke.
    fn next_key(&mut self) -> Result<char>;
}

/// Replays a fixed sequence of keystrokes. Fails once the sequence is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<char>,
}

impl ScriptedKeys {
    /// Constructs a source replaying the characters of `keys` in order.
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().collect(),
        }
    }

    /// Number of keystrokes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<char> {
        match self.keys.pop_front() {
            Some(key) => Ok(key),
            None => bail!("no more scripted keys"),
        }
    }
}
