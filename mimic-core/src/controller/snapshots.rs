use super::SnapshotSlot;
use crate::{CursorMark, MimicError};
use anyhow::Result;
use std::collections::HashMap;

/// Environment snapshots paired with a mark of the buffer cursor at the time of capture.
///
/// Each slot holds at most one snapshot; taking a new one replaces the old one.
#[derive(Debug, Clone)]
pub struct Snapshots<S> {
    slots: HashMap<SnapshotSlot, (S, CursorMark)>,
}

impl<S> Default for Snapshots<S> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<S> Snapshots<S> {
    /// Stores `token` and `mark` in `slot`.
    pub fn take(&mut self, slot: SnapshotSlot, token: S, mark: CursorMark) {
        self.slots.insert(slot, (token, mark));
    }

    /// Returns the token and the cursor mark stored in `slot`.
    pub fn get(&self, slot: SnapshotSlot) -> Result<(&S, CursorMark)> {
        match self.slots.get(&slot) {
            Some((token, mark)) => Ok((token, *mark)),
            None => Err(MimicError::NoSnapshot(slot).into()),
        }
    }

    /// Returns `true` if `slot` holds a snapshot.
    pub fn contains(&self, slot: SnapshotSlot) -> bool {
        self.slots.contains_key(&slot)
    }
}
