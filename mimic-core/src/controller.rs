//! Keystroke-driven recording of demonstrations.
mod command;
mod config;
mod key_map;
mod key_source;
mod snapshots;
use crate::{Act, DemoBuffer, Env, MimicError, ObsPipeline, StackedObs};
use anyhow::{bail, Result};
pub use command::{Command, SnapshotSlot};
pub use config::ControllerConfig;
pub use key_map::KeyMap;
pub use key_source::{KeySource, ScriptedKeys};
use log::{debug, info, warn};
pub use snapshots::Snapshots;
use std::path::PathBuf;

/// States of [`RecordingController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Waiting for the next keystroke.
    AwaitingInput,

    /// Stepping the environment with the placeholder action.
    AutoPlay,

    /// The session is over.
    Terminated,
}

/// Result of a recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Value of the step counter at the end of the session.
    pub steps: usize,

    /// Sum of the rewards of the committed steps.
    pub score: f32,

    /// Number of valid records in the buffer.
    pub records: usize,

    /// Directory of the last commit, if any.
    pub saved_to: Option<PathBuf>,
}

/// Drives an environment with operator keystrokes and commits the resulting transitions.
///
/// # Session
///
/// 1. [`RecordingController::start`] resets the environment and the observation pipeline.
///    The step counter starts at the cursor of the buffer, so a resumed buffer keeps its
///    numbering.
/// 2. A keystroke is read and mapped to a [`Command`] with the [`KeyMap`].
///    Unmapped keys, and actions outside of the action space of the environment, are
///    ignored and the next keystroke is read.
/// 3. The command is applied with [`RecordingController::handle`]:
///     * [`Command::Act`] steps the environment, advances the pipeline, adds
///       `(obs, act, next_obs, is_done)` to the buffer and renders the environment.
///       The step counter is incremented and the reward added to the score.
///     * [`Command::TakeSnapshot`] stores the environment state together with the buffer
///       cursor. [`Command::RestoreSnapshot`] puts both back, except for records of the
///       snapshot's window whose slots were overwritten since, which stay discarded.
///       Restoring an empty slot is reported and the session continues.
///     * [`Command::Rollback`] moves the buffer cursor back by `rollback_steps`.
///     * [`Command::Commit`] saves the buffer to `<save_dir>/<save_prefix>-<n>`, where `n`
///       numbers the step awaiting input: one more than the step counter.
///     * [`Command::AutoPlay`] applies the placeholder action up to `auto_play_max_steps`
///       times without committing, then applies the resume action as an ordinary action.
///     * [`Command::SaveAndQuit`] reads one more key. The buffer is saved if it is the
///       confirm key. The session ends either way.
/// 4. The session ends when the environment reports the end of the episode or on
///    save-and-quit. The environment is closed and a [`SessionSummary`] is returned.
///
/// A failing save ends the session with an error, as does any failure of the environment
/// or of the keystroke source.
///
/// # Observation window on rollback and restore
///
/// Neither rollback nor snapshot restore rewinds the observation pipeline. After either
/// command the next record starts from the most recent stacked observation, which is not
/// necessarily the one that would have been produced had the discarded steps never
/// happened. The step counter is not rewound either.
pub struct RecordingController<E: Env, K: KeySource> {
    env: E,
    keys: K,
    pipeline: ObsPipeline,
    buffer: DemoBuffer,
    config: ControllerConfig,
    snapshots: Snapshots<E::Snapshot>,
    state: ControllerState,

    /// Stacked observation before the next action.
    obs: StackedObs,

    /// Action applied before the next keystroke is read.
    pending: Option<Act>,

    steps: usize,
    score: f32,
    saved_to: Option<PathBuf>,
    closed: bool,
}

impl<E: Env, K: KeySource> RecordingController<E, K> {
    /// Constructs a controller.
    ///
    /// Fails if the observation shape of the pipeline and the buffer disagree or if the
    /// auto-play actions are outside of the action space of the environment.
    pub fn new(
        env: E,
        keys: K,
        pipeline: ObsPipeline,
        buffer: DemoBuffer,
        config: ControllerConfig,
    ) -> Result<Self> {
        if pipeline.obs_shape() != buffer.obs_shape() {
            bail!(
                "observation shape of the pipeline {:?} differs from the buffer {:?}",
                pipeline.obs_shape(),
                buffer.obs_shape()
            );
        }
        let n = env.num_actions();
        for act in [config.auto_play_action, config.auto_play_resume_action] {
            if act as usize >= n {
                bail!("auto-play action {} is outside of {} actions", act, n);
            }
        }
        let [h, s1, s2] = pipeline.obs_shape();

        Ok(Self {
            env,
            keys,
            pipeline,
            steps: buffer.idx(),
            buffer,
            config,
            snapshots: Snapshots::default(),
            state: ControllerState::AwaitingInput,
            obs: StackedObs::zeros((h, s1, s2)),
            pending: None,
            score: 0.0,
            saved_to: None,
            closed: false,
        })
    }

    /// Resets the environment and the observation pipeline.
    pub fn start(&mut self) -> Result<()> {
        let frame = self.env.reset()?;
        self.obs = self.pipeline.reset(&frame)?;
        self.env.render()?;
        self.state = ControllerState::AwaitingInput;
        info!(
            "Start recording with {} records in the buffer (idx = {})",
            self.buffer.len(),
            self.buffer.idx()
        );
        Ok(())
    }

    /// Runs a session until the episode ends or the operator quits.
    pub fn run(&mut self) -> Result<SessionSummary> {
        if let Err(e) = self.start() {
            self.close();
            return Err(e);
        }

        while self.state != ControllerState::Terminated {
            let command = match self.pending.take() {
                Some(act) => Command::Act(act),
                None => match self.next_command() {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        self.close();
                        return Err(e);
                    }
                },
            };

            if let Err(e) = self.handle(command) {
                if let Some(MimicError::NoSnapshot(slot)) = e.downcast_ref::<MimicError>() {
                    warn!("Nothing to restore in the {:?} slot", slot);
                    continue;
                }
                self.close();
                return Err(e);
            }
        }
        self.close();

        Ok(self.summary())
    }

    /// Reads keystrokes until one is mapped to a command.
    fn next_command(&mut self) -> Result<Option<Command>> {
        debug!("idx = {}", self.buffer.idx());
        let key = self.keys.next_key()?;
        match self.config.key_map.command(key) {
            Ok(command) => Ok(Some(command)),
            Err(e) => {
                debug!("{}", e);
                Ok(None)
            }
        }
    }

    /// Applies a command.
    pub fn handle(&mut self, command: Command) -> Result<()> {
        if self.state == ControllerState::Terminated {
            bail!("the session is terminated");
        }

        match command {
            Command::Act(act) => {
                if act.act as usize >= self.env.num_actions() {
                    debug!("Action {} is outside of the action space", act.act);
                    return Ok(());
                }
                self.apply(act)?;
            }
            Command::TakeSnapshot(slot) => {
                let mark = self.buffer.mark();
                self.snapshots.take(slot, self.env.clone_state(), mark);
                info!("Took {:?} snapshot (idx = {})", slot, mark.idx());
            }
            Command::RestoreSnapshot(slot) => {
                let (token, mark) = self.snapshots.get(slot)?;
                self.env.restore_state(token)?;
                let lost = self.buffer.restore(&mark);
                if lost > 0 {
                    warn!(
                        "{} records before the {:?} snapshot were overwritten since it was taken",
                        lost, slot
                    );
                }
                info!("Restored {:?} snapshot (idx = {})", slot, mark.idx());
            }
            Command::Rollback => {
                let before = self.buffer.idx();
                self.buffer.rollback(self.config.rollback_steps);
                info!("Rollback: idx {} -> {}", before, self.buffer.idx());
            }
            Command::Commit => self.commit(self.steps + 1)?,
            Command::AutoPlay => self.auto_play()?,
            Command::SaveAndQuit => {
                info!("Press {:?} to save the buffer", self.config.confirm_key);
                let key = self.keys.next_key()?;
                if key == self.config.confirm_key {
                    self.commit(self.steps + 1)?;
                } else {
                    info!("Quit without saving");
                }
                self.state = ControllerState::Terminated;
            }
        }

        Ok(())
    }

    /// Steps the environment and commits the transition.
    fn apply(&mut self, act: Act) -> Result<()> {
        let step = self.env.step(&act)?;
        let next_obs = self.pipeline.step(&step.frame)?;
        self.env.render()?;

        self.buffer.add(&self.obs, act, &next_obs, step.is_done);
        self.obs = next_obs;
        self.steps += 1;
        self.score += step.reward;
        debug!(
            "idx = {}, action = {}, reward = {}",
            self.buffer.idx(),
            act.act,
            step.reward
        );

        if step.is_done {
            self.end_episode(self.steps)?;
        }
        Ok(())
    }

    fn auto_play(&mut self) -> Result<()> {
        self.state = ControllerState::AutoPlay;
        let act = Act::new(self.config.auto_play_action);
        info!("Auto-play with action {}", act.act);

        for i in 0..self.config.auto_play_max_steps {
            let step = self.env.step(&act)?;
            self.obs = self.pipeline.step(&step.frame)?;
            self.env.render()?;
            if step.is_done {
                info!("Episode ended during auto-play after {} steps", i + 1);
                return self.end_episode(self.steps + 1);
            }
        }

        info!("Auto-play finished");
        self.pending = Some(Act::new(self.config.auto_play_resume_action));
        self.state = ControllerState::AwaitingInput;
        Ok(())
    }

    /// Terminates the session after step `n`.
    fn end_episode(&mut self, n: usize) -> Result<()> {
        self.state = ControllerState::Terminated;
        info!(
            "Episode ended with score {}, {} records in the buffer",
            self.score,
            self.buffer.len()
        );
        if self.config.save_on_episode_end {
            self.commit(n)?;
        }
        Ok(())
    }

    /// Saves the buffer under the name of step `n`.
    fn commit(&mut self, n: usize) -> Result<()> {
        let path = self.config.commit_path(n);
        self.buffer.save(&path)?;
        self.saved_to = Some(path);
        Ok(())
    }

    fn close(&mut self) {
        self.state = ControllerState::Terminated;
        if !self.closed {
            self.env.close();
            self.closed = true;
        }
    }

    /// Summary of the session so far.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            steps: self.steps,
            score: self.score,
            records: self.buffer.len(),
            saved_to: self.saved_to.clone(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Value of the step counter.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Sum of the rewards of the committed steps.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Stacked observation the next record starts from.
    pub fn obs(&self) -> &StackedObs {
        &self.obs
    }

    /// The demonstration buffer.
    pub fn buffer(&self) -> &DemoBuffer {
        &self.buffer
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The keystroke source.
    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Consumes the controller and returns the buffer.
    pub fn into_buffer(self) -> DemoBuffer {
        self.buffer
    }
}
