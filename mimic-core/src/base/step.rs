//! Environment step.
use super::{Act, Env, Frame};

/// Additional information attached to a [`Step`].
pub trait Info {}

impl Info for () {}

/// The outcome of applying an action to an environment.
pub struct Step<E: Env> {
    /// Action.
    pub act: Act,

    /// Frame rendered after the action was applied.
    pub frame: Frame,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode ended.
    pub is_done: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(act: Act, frame: Frame, reward: f32, is_done: bool, info: E::Info) -> Self {
        Step {
            act,
            frame,
            reward,
            is_done,
            info,
        }
    }
}
