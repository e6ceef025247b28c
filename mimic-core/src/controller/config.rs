//! Configuration of [`RecordingController`](super::RecordingController).
use super::KeyMap;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`RecordingController`](super::RecordingController).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct ControllerConfig {
    /// Keystroke vocabulary.
    pub key_map: KeyMap,

    /// Number of commits discarded by [`Command::Rollback`](super::Command::Rollback).
    pub rollback_steps: usize,

    /// Maximum number of environment steps of one auto-play.
    pub auto_play_max_steps: usize,

    /// Placeholder action applied during auto-play.
    pub auto_play_action: u8,

    /// Action committed after an auto-play that did not end the episode.
    pub auto_play_resume_action: u8,

    /// Prefix of the directories written on commit, followed by `-<n>` with `n` the number
    /// of the step awaiting input.
    pub save_prefix: String,

    /// Directory where commits are written.
    pub save_dir: PathBuf,

    /// Key confirming [`Command::SaveAndQuit`](super::Command::SaveAndQuit).
    pub confirm_key: char,

    /// If `true`, the buffer is committed when the episode ends.
    pub save_on_episode_end: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            key_map: KeyMap::default(),
            rollback_steps: 4,
            auto_play_max_steps: 80,
            auto_play_action: 3,
            auto_play_resume_action: 0,
            save_prefix: "expert_policy".to_string(),
            save_dir: PathBuf::from("."),
            confirm_key: 's',
            save_on_episode_end: false,
        }
    }
}

impl ControllerConfig {
    /// Sets the keystroke vocabulary.
    pub fn key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = key_map;
        self
    }

    /// Sets the number of commits discarded by a rollback.
    pub fn rollback_steps(mut self, v: usize) -> Self {
        self.rollback_steps = v;
        self
    }

    /// Sets the maximum length of an auto-play.
    pub fn auto_play_max_steps(mut self, v: usize) -> Self {
        self.auto_play_max_steps = v;
        self
    }

    /// Sets the placeholder and the resume actions of auto-play.
    pub fn auto_play_actions(mut self, action: u8, resume_action: u8) -> Self {
        self.auto_play_action = action;
        self.auto_play_resume_action = resume_action;
        self
    }

    /// Sets the prefix of commit directories.
    pub fn save_prefix(mut self, save_prefix: impl Into<String>) -> Self {
        self.save_prefix = save_prefix.into();
        self
    }

    /// Sets the directory where commits are written.
    pub fn save_dir(mut self, save_dir: impl Into<PathBuf>) -> Self {
        self.save_dir = save_dir.into();
        self
    }

    /// Sets the key confirming save-and-quit.
    pub fn confirm_key(mut self, key: char) -> Self {
        self.confirm_key = key;
        self
    }

    /// Commit the buffer at the end of the episode.
    pub fn save_on_episode_end(mut self, v: bool) -> Self {
        self.save_on_episode_end = v;
        self
    }

    /// Path of the directory written by a commit named after step `n`.
    pub fn commit_path(&self, n: usize) -> PathBuf {
        self.save_dir
            .join(format!("{}-{}", self.save_prefix, n))
    }

    /// Constructs [`ControllerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ControllerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_controller_config() -> Result<()> {
        let config = ControllerConfig::default()
            .rollback_steps(2)
            .save_prefix("run")
            .save_dir("/tmp/demos")
            .confirm_key('y');

        let dir = TempDir::new("controller_config")?;
        let path = dir.path().join("controller_config.yaml");
        config.save(&path)?;
        let config_ = ControllerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_partial_yaml() -> Result<()> {
        let config: ControllerConfig = serde_yaml::from_str("rollback_steps: 8\n")?;
        assert_eq!(config.rollback_steps, 8);
        assert_eq!(config.key_map, KeyMap::default());
        assert_eq!(config.confirm_key, 's');
        Ok(())
    }

    #[test]
    fn test_commit_path() {
        let config = ControllerConfig::default().save_dir("out");
        assert_eq!(
            config.commit_path(120),
            PathBuf::from("out").join("expert_policy-120")
        );
    }
}
