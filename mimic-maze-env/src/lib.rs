//! An arcade maze game for [`mimic-core`](mimic_core).
//!
//! The player eats pellets in a maze while ghosts wander around. Being caught by a ghost costs
//! a life. The episode ends when all pellets are eaten, when no life is left or after a
//! maximum number of steps.
//!
//! The complete state of the game, including its random number generator, is captured by
//! [`Env::clone_state`](mimic_core::Env::clone_state), so restoring a snapshot and repeating
//! the same actions reproduces the same trajectory.
//!
//! ```no_run
//! use anyhow::Result;
//! use mimic_core::{Act, Env as _};
//! use mimic_maze_env::{MazeEnv, MazeEnvConfig};
//!
//! fn main() -> Result<()> {
//!     let config = MazeEnvConfig::default().render(true);
//!     let mut env = MazeEnv::build(&config, 42)?;
//!     let _frame = env.reset()?;
//!     let step = env.step(&Act::new(1))?;
//!     env.render()?;
//!     println!("reward = {}", step.reward);
//!     Ok(())
//! }
//! ```
mod act;
mod env;
pub use act::Direction;
pub use env::{MazeEnv, MazeEnvConfig, MazeInfo, MazeState};
