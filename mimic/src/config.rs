//! Configuration of a recording session.
use anyhow::Result;
use mimic_core::{ControllerConfig, DemoBufferConfig, ObsPipelineConfig};
use mimic_maze_env::MazeEnvConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of a recording session.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the environment.
    pub env_name: String,

    /// Side length of normalized frames.
    pub frame_size: usize,

    /// Number of frames in a stacked observation.
    pub history_length: usize,

    /// Capacity of the demonstration buffer.
    pub buffer_size: usize,

    /// Placement hint of the consumer of the recorded data. Recording does not use it.
    pub device: String,

    /// Resume recording into the buffer saved at `path`.
    pub continue_samples: bool,

    /// Directory of the buffer to resume from.
    pub path: PathBuf,

    /// Random seed of the environment.
    pub seed: i64,

    /// Configuration of the maze environment. Rendering is on unless the file turns it off.
    pub env: MazeEnvConfig,

    /// Configuration of the controller.
    pub controller: ControllerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            env_name: "maze".to_string(),
            frame_size: 84,
            history_length: 3,
            buffer_size: 100_000,
            device: "cpu".to_string(),
            continue_samples: false,
            path: PathBuf::from("expert_policy"),
            seed: 42,
            env: MazeEnvConfig::default().render(true),
            controller: ControllerConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Configuration of the observation pipeline.
    pub fn obs_config(&self) -> ObsPipelineConfig {
        ObsPipelineConfig::default()
            .frame_size(self.frame_size)
            .history_length(self.history_length)
    }

    /// Configuration of the demonstration buffer.
    pub fn buffer_config(&self) -> DemoBufferConfig {
        DemoBufferConfig::default()
            .capacity(self.buffer_size)
            .obs_config(&self.obs_config())
    }

    /// Constructs [`SessionConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SessionConfig`].
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
    fn test_serde_session_config() -> Result<()> {
        let mut config = SessionConfig::default();
        config.buffer_size = 20_000;
        config.controller = config.controller.save_prefix("pacman");
        config.env = config.env.render(false);

        let dir = TempDir::new("session_config")?;
        let path = dir.path().join("session_config.yaml");
        config.save(&path)?;
        let config_ = SessionConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_buffer_config() {
        let config: SessionConfig =
            serde_yaml::from_str("frame_size: 42\nhistory_length: 4\nbuffer_size: 10\n").unwrap();
        let buffer_config = config.buffer_config();
        assert_eq!(buffer_config.obs_shape(), [4, 42, 42]);
        assert_eq!(buffer_config.capacity, 10);
        assert_eq!(config.env_name, "maze");
        assert!(config.env.render);
    }
}
