//! Configuration of [`MazeEnv`](super::MazeEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

const DEFAULT_LAYOUT: [&str; 9] = [
    "###########",
    "#....G....#",
    "#.##.#.##.#",
    "#.........#",
    "#.#.###.#.#",
    "#....P....#",
    "#.##.#.##.#",
    "#G.......G#",
    "###########",
];

/// Configuration of [`MazeEnv`](super::MazeEnv).
///
/// A layout is a list of rows of equal length. `#` is a wall, `.` a pellet, `P` the start
/// of the player and `G` a start of a ghost. Any other character is an empty cell.
///
/// # Examples
///
/// ```rust
/// use mimic_maze_env::MazeEnvConfig;
///
/// let config = MazeEnvConfig::default()
///     .layout(["#####", "#P.G#", "#####"])
///     .n_ghosts(1)
///     .lives(1)
///     .cell_px(4)
///     .render(false);
/// assert_eq!(config.layout.len(), 3);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct MazeEnvConfig {
    /// Rows of the maze.
    pub layout: Vec<String>,

    /// Side length of a cell in pixels of the emitted frames.
    pub cell_px: usize,

    /// Number of ghosts, placed on the first `G` cells of the layout.
    pub n_ghosts: usize,

    /// Maximum number of steps in an episode.
    pub max_steps: usize,

    /// Lives at the start of an episode.
    pub lives: usize,

    /// If `true`, [`Env::render`](mimic_core::Env::render) draws the maze on the terminal.
    pub render: bool,
}

impl Default for MazeEnvConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.iter().map(|r| r.to_string()).collect(),
            cell_px: 8,
            n_ghosts: 2,
            max_steps: 2000,
            lives: 3,
            render: false,
        }
    }
}

impl MazeEnvConfig {
    /// Sets the layout.
    pub fn layout<S: Into<String>>(mut self, rows: impl IntoIterator<Item = S>) -> Self {
        self.layout = rows.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the side length of a cell in pixels.
    pub fn cell_px(mut self, cell_px: usize) -> Self {
        self.cell_px = cell_px;
        self
    }

    /// Sets the number of ghosts.
    pub fn n_ghosts(mut self, n_ghosts: usize) -> Self {
        self.n_ghosts = n_ghosts;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the lives at the start of an episode.
    pub fn lives(mut self, lives: usize) -> Self {
        self.lives = lives;
        self
    }

    /// Draws the maze on the terminal if `true`.
    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Constructs [`MazeEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MazeEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
