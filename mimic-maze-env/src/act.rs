//! Actions of [`MazeEnv`](crate::MazeEnv).
use anyhow::{bail, Result};
use mimic_core::Act;
use std::convert::TryFrom;

/// Moves of the player. The index of a variant is the action index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Action 0.
    Up = 0,

    /// Action 1.
    Right = 1,

    /// Action 2.
    Left = 2,

    /// Action 3.
    Down = 3,
}

impl Direction {
    /// All directions in the order of action indices.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Left,
        Direction::Down,
    ];

    /// `(row, column)` offset of a move.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
        }
    }
}

impl TryFrom<Act> for Direction {
    type Error = anyhow::Error;

    fn try_from(act: Act) -> Result<Self> {
        match Self::ALL.get(act.act as usize) {
            Some(dir) => Ok(*dir),
            None => bail!("invalid action {} for the maze", act.act),
        }
    }
}

impl From<Direction> for Act {
    fn from(dir: Direction) -> Self {
        Act::new(dir as u8)
    }
}
