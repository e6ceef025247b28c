//! Commands of the recording session.
use crate::Act;
use serde::{Deserialize, Serialize};

/// One of the independent snapshot slots held by
/// [`RecordingController`](crate::RecordingController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotSlot {
    /// Slot used to mark a checkpoint of the episode.
    Primary,

    /// Slot used to bracket a short corrective sub-sequence.
    Secondary,
}

/// What a keystroke asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Step the environment with a primitive action and commit the transition.
    Act(Act),

    /// Capture the environment state and the buffer cursor.
    TakeSnapshot(SnapshotSlot),

    /// Go back to a captured environment state and buffer cursor.
    RestoreSnapshot(SnapshotSlot),

    /// Discard the most recent commits.
    Rollback,

    /// Save the buffer without ending the session.
    Commit,

    /// Step the environment with a placeholder action without committing.
    AutoPlay,

    /// Ask for confirmation, save and end the session.
    SaveAndQuit,
}
