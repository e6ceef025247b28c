mod config;
mod maze;
use crate::Direction;
use anyhow::{bail, Result};
pub use config::MazeEnvConfig;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use log::{debug, info};
use maze::{Maze, Pos};
use mimic_core::{Act, Env, Frame, Info, Step};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::{
    convert::TryFrom,
    io::{stdout, Write},
};

const PELLET_REWARD: f32 = 10.0;
const CLEAR_BONUS: f32 = 100.0;

const BLACK: [u8; 3] = [0, 0, 0];
const WALL: [u8; 3] = [33, 33, 222];
const PELLET: [u8; 3] = [255, 184, 151];
const PLAYER: [u8; 3] = [255, 255, 0];
const GHOST: [u8; 3] = [255, 0, 0];

/// Information of a step of [`MazeEnv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeInfo {
    /// Lives left.
    pub lives: usize,

    /// Pellets left.
    pub pellets: usize,

    /// The player was caught by a ghost in this step.
    pub caught: bool,
}

impl Info for MazeInfo {}

/// Dynamic state of [`MazeEnv`], used as the snapshot token.
#[derive(Debug, Clone)]
pub struct MazeState {
    player: Pos,
    ghosts: Vec<Pos>,
    pellets: Vec<bool>,
    lives: usize,
    score: f32,
    steps: usize,
    rng: SmallRng,
}

impl MazeState {
    /// `(row, column)` of the player.
    pub fn player(&self) -> (usize, usize) {
        self.player
    }

    /// `(row, column)` of each ghost.
    pub fn ghosts(&self) -> &[(usize, usize)] {
        &self.ghosts
    }

    /// Lives left.
    pub fn lives(&self) -> usize {
        self.lives
    }

    /// Sum of rewards in the current episode.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Number of steps in the current episode.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of pellets left.
    pub fn pellets(&self) -> usize {
        self.pellets.iter().filter(|p| **p).count()
    }
}

/// An arcade maze game.
///
/// Actions are [`Direction`]s. Eating a pellet gives a reward of 10 and eating the last
/// one a bonus of 100. Ghosts move to a random free neighbor cell at every step. When a
/// ghost catches the player, a life is lost and all characters go back to their start cells.
///
/// Frames are RGB images of `cell_px` pixels per cell.
pub struct MazeEnv {
    config: MazeEnvConfig,
    maze: Maze,
    state: MazeState,
}

impl MazeEnv {
    /// Current state of the game.
    pub fn state(&self) -> &MazeState {
        &self.state
    }

    fn initial_state(maze: &Maze, config: &MazeEnvConfig, rng: SmallRng) -> MazeState {
        MazeState {
            player: maze.player_start,
            ghosts: maze.ghost_starts[..config.n_ghosts].to_vec(),
            pellets: maze.pellets.clone(),
            lives: config.lives,
            score: 0.0,
            steps: 0,
            rng,
        }
    }

    fn frame(&self) -> Frame {
        let px = self.config.cell_px;
        let (height, width) = (self.maze.height * px, self.maze.width * px);
        let mut data = vec![0u8; height * width * 3];
        let (lo, hi) = (px * 3 / 8, px - px * 3 / 8);

        for r in 0..self.maze.height {
            for c in 0..self.maze.width {
                let pos = (r, c);
                let (color, full) = if self.maze.is_wall(pos) {
                    (WALL, true)
                } else if self.state.ghosts.contains(&pos) {
                    (GHOST, true)
                } else if self.state.player == pos {
                    (PLAYER, true)
                } else if self.state.pellets[self.maze.index(pos)] {
                    (PELLET, false)
                } else {
                    (BLACK, true)
                };

                for y in 0..px {
                    for x in 0..px {
                        if !full && !((lo..hi).contains(&y) && (lo..hi).contains(&x)) {
                            continue;
                        }
                        let i = ((r * px + y) * width + c * px + x) * 3;
                        data[i..i + 3].copy_from_slice(&color);
                    }
                }
            }
        }

        Frame::rgb(height, width, data)
    }

    fn text(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "score {}  lives {}  steps {}",
            self.state.score, self.state.lives, self.state.steps
        )];
        for r in 0..self.maze.height {
            let line = (0..self.maze.width)
                .map(|c| {
                    let pos = (r, c);
                    if self.maze.is_wall(pos) {
                        '#'
                    } else if self.state.ghosts.contains(&pos) {
                        'G'
                    } else if self.state.player == pos {
                        'C'
                    } else if self.state.pellets[self.maze.index(pos)] {
                        '.'
                    } else {
                        ' '
                    }
                })
                .collect();
            lines.push(line);
        }
        lines
    }

    fn move_ghosts(&mut self) {
        let maze = &self.maze;
        let state = &mut self.state;
        for g in 0..state.ghosts.len() {
            let options: Vec<Pos> = Direction::ALL
                .iter()
                .filter_map(|dir| maze.neighbor(state.ghosts[g], *dir))
                .collect();
            if !options.is_empty() {
                state.ghosts[g] = options[state.rng.gen_range(0..options.len())];
            }
        }
    }
}

impl Env for MazeEnv {
    type Config = MazeEnvConfig;
    type Snapshot = MazeState;
    type Info = MazeInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let maze = Maze::parse(&config.layout)?;
        if maze.ghost_starts.len() < config.n_ghosts {
            bail!(
                "{} ghosts requested but the layout has {} ghost starts",
                config.n_ghosts,
                maze.ghost_starts.len()
            );
        }
        if config.cell_px == 0 || config.lives == 0 || config.max_steps == 0 {
            bail!("cell_px, lives and max_steps must be positive");
        }

        let rng = SmallRng::seed_from_u64(seed as _);
        let env = Self {
            config: config.clone(),
            state: Self::initial_state(&maze, config, rng),
            maze,
        };
        debug!(
            "Built a {}x{} maze with {} ghosts",
            env.maze.height, env.maze.width, config.n_ghosts
        );

        Ok(env)
    }

    fn num_actions(&self) -> usize {
        Direction::ALL.len()
    }

    fn reset(&mut self) -> Result<Frame> {
        let rng = self.state.rng.clone();
        self.state = Self::initial_state(&self.maze, &self.config, rng);
        Ok(self.frame())
    }

    fn step(&mut self, act: &Act) -> Result<Step<Self>> {
        let dir = Direction::try_from(*act)?;
        let mut reward = 0.0;

        if let Some(pos) = self.maze.neighbor(self.state.player, dir) {
            self.state.player = pos;
        }
        let i = self.maze.index(self.state.player);
        if self.state.pellets[i] {
            self.state.pellets[i] = false;
            reward += PELLET_REWARD;
        }

        let mut caught = self.state.ghosts.contains(&self.state.player);
        if !caught {
            self.move_ghosts();
            caught = self.state.ghosts.contains(&self.state.player);
        }
        if caught {
            self.state.lives = self.state.lives.saturating_sub(1);
            self.state.player = self.maze.player_start;
            self.state.ghosts = self.maze.ghost_starts[..self.config.n_ghosts].to_vec();
            info!("Caught by a ghost, {} lives left", self.state.lives);
        }

        let pellets = self.state.pellets();
        let cleared = pellets == 0 && self.maze.num_pellets() > 0;
        if cleared && reward > 0.0 {
            reward += CLEAR_BONUS;
        }
        self.state.steps += 1;
        self.state.score += reward;
        let is_done = self.state.lives == 0 || cleared || self.state.steps >= self.config.max_steps;

        let info = MazeInfo {
            lives: self.state.lives,
            pellets,
            caught,
        };
        Ok(Step::new(*act, self.frame(), reward, is_done, info))
    }

    fn render(&mut self) -> Result<()> {
        if !self.config.render {
            return Ok(());
        }
        let mut out = stdout();
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in self.text() {
            queue!(out, Print(line), Print("\r\n"))?;
        }
        out.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        debug!(
            "Closed the maze (score = {}, steps = {})",
            self.state.score, self.state.steps
        );
    }

    fn clone_state(&self) -> Self::Snapshot {
        self.state.clone()
    }

    fn restore_state(&mut self, snapshot: &Self::Snapshot) -> Result<()> {
        if snapshot.pellets.len() != self.maze.pellets.len()
            || snapshot.ghosts.len() != self.config.n_ghosts
        {
            bail!("snapshot does not belong to this maze");
        }
        self.state = snapshot.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> MazeEnvConfig {
        MazeEnvConfig::default()
            .layout(["#######", "#P...G#", "#######"])
            .cell_px(2)
            .n_ghosts(0)
    }

    #[test]
    fn test_eat_pellets() -> Result<()> {
        let mut env = MazeEnv::build(&corridor(), 0)?;
        env.reset()?;
        let step = env.step(&Direction::Right.into())?;
        assert_eq!(step.reward, 10.0);
        assert_eq!(step.info.pellets, 2);
        assert!(!step.is_done);

        // Walls block the player.
        let step = env.step(&Direction::Up.into())?;
        assert_eq!(step.reward, 0.0);
        assert_eq!(env.state().player(), (1, 2));

        env.step(&Direction::Right.into())?;
        let step = env.step(&Direction::Right.into())?;
        assert_eq!(step.reward, 110.0);
        assert!(step.is_done);
        assert_eq!(env.state().score(), 130.0);
        Ok(())
    }

    #[test]
    fn test_caught_by_ghost() -> Result<()> {
        let config = MazeEnvConfig::default()
            .layout(["####", "#PG#", "####"])
            .n_ghosts(1)
            .lives(2);
        let mut env = MazeEnv::build(&config, 0)?;
        env.reset()?;

        let step = env.step(&Direction::Right.into())?;
        assert!(step.info.caught);
        assert_eq!(step.info.lives, 1);
        assert!(!step.is_done);
        assert_eq!(env.state().player(), (1, 1));

        let step = env.step(&Direction::Right.into())?;
        assert_eq!(step.info.lives, 0);
        assert!(step.is_done);
        Ok(())
    }

    #[test]
    fn test_max_steps() -> Result<()> {
        let mut env = MazeEnv::build(&corridor().max_steps(2), 0)?;
        env.reset()?;
        assert!(!env.step(&Direction::Left.into())?.is_done);
        assert!(env.step(&Direction::Left.into())?.is_done);
        Ok(())
    }

    #[test]
    fn test_frame() -> Result<()> {
        let mut env = MazeEnv::build(&corridor(), 0)?;
        let frame = env.reset()?;
        assert_eq!((frame.height(), frame.width(), frame.channels()), (6, 14, 3));
        assert_eq!(frame.data().len(), 6 * 14 * 3);

        let pixel = |frame: &Frame, y: usize, x: usize| {
            let i = (y * frame.width() + x) * 3;
            [frame.data()[i], frame.data()[i + 1], frame.data()[i + 2]]
        };
        assert_eq!(pixel(&frame, 0, 0), WALL);
        assert_eq!(pixel(&frame, 2, 2), PLAYER);
        assert_eq!(pixel(&frame, 2, 4), PELLET);
        Ok(())
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut env = MazeEnv::build(&corridor(), 0)?;
        env.reset()?;
        assert!(env.step(&Act::new(4)).is_err());
        Ok(())
    }

    #[test]
    fn test_too_many_ghosts() {
        assert!(MazeEnv::build(&corridor().n_ghosts(2), 0).is_err());
    }
}
