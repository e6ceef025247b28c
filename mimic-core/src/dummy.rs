//! A scripted environment used for tests.
use crate::{Act, Env, Frame, Step};
use anyhow::{bail, Result};

/// Configuration of [`DummyEnv`].
#[derive(Debug, Clone)]
pub struct DummyEnvConfig {
    /// Number of actions.
    pub num_actions: usize,

    /// The episode ends after this number of steps.
    pub episode_len: usize,

    /// Side length of the square gray frames.
    pub frame_px: usize,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            num_actions: 4,
            episode_len: 1000,
            frame_px: 8,
        }
    }
}

/// Environment whose state is the sequence of actions applied since the last reset.
///
/// Every frame is flat; its value is the number of steps taken, and the reward of a step is
/// the index of the action.
pub struct DummyEnv {
    config: DummyEnvConfig,
    history: Vec<u8>,

    /// Number of calls of [`Env::render`].
    pub renders: usize,

    /// Number of calls of [`Env::close`].
    pub closes: usize,
}

impl DummyEnv {
    /// Actions applied since the last reset.
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    fn frame(&self) -> Frame {
        let px = self.config.frame_px;
        Frame::gray(px, px, vec![self.history.len() as u8; px * px])
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Snapshot = Vec<u8>;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            history: vec![],
            renders: 0,
            closes: 0,
        })
    }

    fn num_actions(&self) -> usize {
        self.config.num_actions
    }

    fn reset(&mut self) -> Result<Frame> {
        self.history.clear();
        Ok(self.frame())
    }

    fn step(&mut self, act: &Act) -> Result<Step<Self>> {
        if act.act as usize >= self.config.num_actions {
            bail!("invalid action {}", act.act);
        }
        self.history.push(act.act);
        let is_done = self.history.len() >= self.config.episode_len;
        Ok(Step::new(*act, self.frame(), act.act as f32, is_done, ()))
    }

    fn render(&mut self) -> Result<()> {
        self.renders += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
    }

    fn clone_state(&self) -> Self::Snapshot {
        self.history.clone()
    }

    fn restore_state(&mut self, snapshot: &Self::Snapshot) -> Result<()> {
        self.history = snapshot.clone();
        Ok(())
    }
}
