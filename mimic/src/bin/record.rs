use anyhow::Result;
use clap::Parser;
use log::info;
use mimic::{record, SessionConfig, TerminalKeys};
use std::path::PathBuf;

/// Records demonstrations by playing a game with the keyboard.
///
/// Keys: w/d/a/s move, f/space/q auto-play, 1/l take/restore a snapshot, 2/3 take/restore a
/// second snapshot, r rolls back the last commits, m saves the buffer, p asks to save and
/// quits (press s to save).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file of the session configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of the environment [default: maze]
    #[arg(long)]
    env_name: Option<String>,

    /// Side length of the normalized frames [default: 84]
    #[arg(long)]
    size: Option<usize>,

    /// Number of stacked frames [default: 3]
    #[arg(long)]
    history_length: Option<usize>,

    /// Device of the consumer of the recorded data [default: cpu]
    #[arg(long)]
    device: Option<String>,

    /// Capacity of the demonstration buffer [default: 100000]
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Continue recording into the buffer at --path
    #[arg(long, default_value_t = false)]
    continue_samples: bool,

    /// Directory of the buffer to continue from [default: expert_policy]
    #[arg(long)]
    path: Option<PathBuf>,

    /// Directory where the buffer is saved [default: .]
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Random seed of the environment [default: 42]
    #[arg(long)]
    seed: Option<i64>,

    /// Do not draw the game on the terminal, whatever the configuration file says
    #[arg(long, default_value_t = false)]
    no_render: bool,
}

fn session_config(args: Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    if let Some(v) = args.env_name {
        config.env_name = v;
    }
    if let Some(v) = args.size {
        config.frame_size = v;
    }
    if let Some(v) = args.history_length {
        config.history_length = v;
    }
    if let Some(v) = args.device {
        config.device = v;
    }
    if let Some(v) = args.buffer_size {
        config.buffer_size = v;
    }
    if args.continue_samples {
        config.continue_samples = true;
    }
    if let Some(v) = args.path {
        config.path = v;
    }
    if let Some(v) = args.save_dir {
        config.controller = config.controller.save_dir(v);
    }
    if let Some(v) = args.seed {
        config.seed = v;
    }
    if args.no_render {
        config.env = config.env.render(false);
    }

    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = session_config(args)?;

    let summary = {
        let keys = TerminalKeys::new()?;
        record(&config, keys)?
    };
    info!("Steps: {}, score: {}", summary.steps, summary.score);
    if let Some(path) = summary.saved_to {
        info!("Saved to {:?}", path);
    }

    Ok(())
}
