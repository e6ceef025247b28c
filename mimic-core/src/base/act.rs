use serde::{Deserialize, Serialize};

/// A primitive action of an environment with a small discrete action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Act {
    /// Index of the action in the action space of the environment.
    pub act: u8,
}

impl Act {
    /// Constructs an action.
    pub fn new(act: u8) -> Self {
        Self { act }
    }
}

impl From<u8> for Act {
    fn from(act: u8) -> Self {
        Self { act }
    }
}
