//! Configuration of [`ObsPipeline`](super::ObsPipeline).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ObsPipeline`](super::ObsPipeline).
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct ObsPipelineConfig {
    /// Side length `S` of the normalized frames.
    pub frame_size: usize,

    /// Number of frames `H` in a stacked observation.
    pub history_length: usize,
}

impl Default for ObsPipelineConfig {
    fn default() -> Self {
        Self {
            frame_size: 84,
            history_length: 3,
        }
    }
}

impl ObsPipelineConfig {
    /// Sets the side length of normalized frames.
    pub fn frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Sets the number of stacked frames.
    pub fn history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    /// Constructs [`ObsPipelineConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ObsPipelineConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
