//! Configuration of [`DemoBuffer`](super::DemoBuffer).
use crate::ObsPipelineConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`DemoBuffer`](super::DemoBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct DemoBufferConfig {
    /// Maximum number of records that can be stored.
    /// When the buffer is full, new records replace the oldest ones.
    pub capacity: usize,

    /// Side length of the frames in an observation.
    pub frame_size: usize,

    /// Number of frames in an observation.
    pub history_length: usize,
}

impl Default for DemoBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            frame_size: 84,
            history_length: 3,
        }
    }
}

impl DemoBufferConfig {
    /// Sets the capacity of the buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the side length of the frames in an observation.
    pub fn frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Sets the number of frames in an observation.
    pub fn history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    /// Takes the observation shape from a pipeline configuration.
    pub fn obs_config(self, config: &ObsPipelineConfig) -> Self {
        self.frame_size(config.frame_size)
            .history_length(config.history_length)
    }

    /// Shape `[H, S, S]` of a stored observation.
    pub fn obs_shape(&self) -> [usize; 3] {
        [self.history_length, self.frame_size, self.frame_size]
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
