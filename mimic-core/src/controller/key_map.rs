//! Mapping from keystrokes to commands.
use super::{Command, SnapshotSlot};
use crate::{Act, MimicError};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keystroke vocabulary of a recording session.
///
/// The default map is
///
/// | key | command |
/// |-----|---------|
/// | `w`, `d`, `a`, `s` | actions 0, 1, 2, 3 |
/// | `f`, space, `q` | auto-play |
/// | `1` / `l` | take / restore the primary snapshot |
/// | `2` / `3` | take / restore the secondary snapshot |
/// | `r` | rollback |
/// | `m` | commit the buffer |
/// | `p` | save and quit |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMap(BTreeMap<char, Command>);

impl Default for KeyMap {
    fn default() -> Self {
        use SnapshotSlot::*;

        Self::empty()
            .bind('w', Command::Act(Act::new(0)))
            .bind('d', Command::Act(Act::new(1)))
            .bind('a', Command::Act(Act::new(2)))
            .bind('s', Command::Act(Act::new(3)))
            .bind('f', Command::AutoPlay)
            .bind(' ', Command::AutoPlay)
            .bind('q', Command::AutoPlay)
            .bind('1', Command::TakeSnapshot(Primary))
            .bind('l', Command::RestoreSnapshot(Primary))
            .bind('2', Command::TakeSnapshot(Secondary))
            .bind('3', Command::RestoreSnapshot(Secondary))
            .bind('r', Command::Rollback)
            .bind('m', Command::Commit)
            .bind('p', Command::SaveAndQuit)
    }
}

impl KeyMap {
    /// A map without any bindings.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Binds `key` to `command`, replacing an existing binding.
    pub fn bind(mut self, key: char, command: Command) -> Self {
        self.0.insert(key, command);
        self
    }

    /// Returns the command bound to `key`.
    ///
    /// Fails with [`MimicError::UnmappedInput`] for keys outside the vocabulary.
    pub fn command(&self, key: char) -> Result<Command> {
        match self.0.get(&key) {
            Some(command) => Ok(*command),
            None => Err(MimicError::UnmappedInput(key).into()),
        }
    }

    /// Iterates over the bindings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (char, Command)> + '_ {
        self.0.iter().map(|(k, c)| (*k, *c))
    }
}
