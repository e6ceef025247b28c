use anyhow::Result;
use clap::Parser;
use log::info;
use mimic::tools::merge;
use std::path::PathBuf;

/// Copies records of a recorded buffer into a smaller expert buffer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of the recorded buffer
    #[arg(long)]
    buffer_path: PathBuf,

    /// Directory of the expert buffer
    #[arg(long, default_value = "expert_policy-20k")]
    output: PathBuf,

    /// Capacity of the expert buffer
    #[arg(long, default_value_t = 20_000)]
    expert_buffer_size: usize,

    /// First logical index to copy [default: oldest valid record]
    #[arg(long)]
    start: Option<usize>,

    /// One past the last logical index to copy [default: the buffer cursor]
    #[arg(long)]
    end: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let range = match (args.start, args.end) {
        (None, None) => None,
        (start, end) => {
            let valid = mimic_core::DemoBuffer::from_dir(&args.buffer_path)?.valid_range();
            Some(start.unwrap_or(valid.start)..end.unwrap_or(valid.end))
        }
    };
    let expert = merge(
        &args.buffer_path,
        &args.output,
        args.expert_buffer_size,
        range,
    )?;
    info!("{} records in {:?}", expert.idx(), args.output);

    Ok(())
}
