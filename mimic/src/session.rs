use crate::SessionConfig;
use anyhow::{bail, Result};
use log::info;
use mimic_core::{
    DemoBuffer, Env as _, KeySource, ObsPipeline, RecordingController, SessionSummary,
};
use mimic_maze_env::MazeEnv;

/// Creates the buffer of a session, loading it from `config.path` when resuming.
pub fn build_buffer(config: &SessionConfig) -> Result<DemoBuffer> {
    let mut buffer = DemoBuffer::build(&config.buffer_config())?;
    if config.continue_samples {
        buffer.load(&config.path)?;
        info!("Continue with {} samples", buffer.idx());
    }
    Ok(buffer)
}

/// Runs a recording session reading keystrokes from `keys`.
pub fn record<K: KeySource>(config: &SessionConfig, keys: K) -> Result<SessionSummary> {
    let env = match config.env_name.as_str() {
        "maze" => MazeEnv::build(&config.env, config.seed)?,
        name => bail!("unknown environment {:?}", name),
    };
    let pipeline = ObsPipeline::build(&config.obs_config())?;
    let buffer = build_buffer(config)?;
    info!(
        "Recording {} (frame size = {}, history length = {}, capacity = {})",
        config.env_name, config.frame_size, config.history_length, config.buffer_size
    );

    let mut controller =
        RecordingController::new(env, keys, pipeline, buffer, config.controller.clone())?;
    let summary = controller.run()?;
    info!("Samples in buffer: {}", summary.records);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{MimicError, ScriptedKeys};
    use tempdir::TempDir;

    fn config(dir: &TempDir) -> SessionConfig {
        let mut config = SessionConfig::default();
        config.frame_size = 16;
        config.buffer_size = 100;
        config.controller = config.controller.save_dir(dir.path());
        config.env = config.env.render(false);
        config
    }

    #[test]
    fn test_record_and_resume() -> Result<()> {
        let dir = TempDir::new("session")?;
        let mut config = config(&dir);

        let summary = record(&config, ScriptedKeys::new("aawdps"))?;
        assert_eq!(summary.records, 4);
        let saved_to = dir.path().join("expert_policy-5");
        assert_eq!(summary.saved_to, Some(saved_to.clone()));

        config.continue_samples = true;
        config.path = saved_to;
        let summary = record(&config, ScriptedKeys::new("dpsp"))?;
        assert_eq!(summary.steps, 5);
        assert_eq!(summary.records, 5);
        assert!(dir.path().join("expert_policy-6").is_dir());
        Ok(())
    }

    #[test]
    fn test_resume_with_other_shape() -> Result<()> {
        let dir = TempDir::new("session")?;
        let mut config = config(&dir);
        record(&config, ScriptedKeys::new("wps"))?;

        config.continue_samples = true;
        config.path = dir.path().join("expert_policy-2");
        config.frame_size = 8;
        let err = build_buffer(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::Persistence { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_env() -> Result<()> {
        let dir = TempDir::new("session")?;
        let mut config = config(&dir);
        config.env_name = "pong".to_string();
        assert!(record(&config, ScriptedKeys::new("p")).is_err());
        Ok(())
    }
}
