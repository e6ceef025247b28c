use anyhow::Result;
use clap::Parser;
use mimic::tools::BufferSummary;
use mimic_core::DemoBuffer;
use std::path::PathBuf;

/// Prints the actions recorded in a buffer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of the buffer
    #[arg(long)]
    buffer_path: PathBuf,

    /// Print the action of every record
    #[arg(long, default_value_t = false)]
    actions: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let buffer = DemoBuffer::from_dir(&args.buffer_path)?;
    if args.actions {
        for (ix, a) in buffer.valid_range().zip(buffer.whole_actions()) {
            println!("{} {}", ix, a);
        }
    }

    let summary = BufferSummary::new(&buffer);
    println!(
        "records {} (idx {}, capacity {})",
        summary.records, summary.idx, summary.capacity
    );
    for (a, n) in summary.histogram.iter() {
        println!("action {}: {}", a, n);
    }
    match summary.max_action {
        Some(a) => println!("max {}", a),
        None => println!("max -"),
    }
    println!("done flags {}", summary.done_flags);

    Ok(())
}
