//! Environment.
use super::{Act, Frame, Info, Step};
use anyhow::Result;

/// The capability an environment offers to the recording tool.
///
/// Any implementation can be driven by
/// [`RecordingController`](crate::RecordingController). Snapshots are opaque tokens owned by
/// the environment; the controller only stores and hands them back.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Opaque state token produced by [`Env::clone_state`].
    type Snapshot: Clone;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// The number of primitive actions. Valid actions are `0..num_actions()`.
    fn num_actions(&self) -> usize;

    /// Starts a new episode and returns its first frame.
    fn reset(&mut self) -> Result<Frame>;

    /// Performs an environment step.
    fn step(&mut self, act: &Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Shows the current state to the operator.
    fn render(&mut self) -> Result<()>;

    /// Releases resources held by the environment.
    fn close(&mut self);

    /// Captures the complete state of the environment.
    fn clone_state(&self) -> Self::Snapshot;

    /// Puts the environment back into a previously captured state.
    fn restore_state(&mut self, snapshot: &Self::Snapshot) -> Result<()>;
}
