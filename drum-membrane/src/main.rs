use anyhow::{Context, Result};
use clap::Parser;
use drum_membrane::{Config, Simulation};
use log::info;
use std::path::PathBuf;

/// Simulate a struck drum membrane and write frames as PNG images.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    config: Option<PathBuf>,
    /// Override the number of ticks to run.
    #[arg(long, value_name = "TICKS")]
    ticks: Option<u64>,
    /// Override the directory frames are written to.
    #[arg(long, value_name = "DIR")]
    output: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(output) = args.output {
        config.run.output_dir = output;
    }
    config.log_summary();

    let schedule = config.schedule()?;
    let mut sim = Simulation::new(&config)?;
    sim.run_with_visualisation(&config.run, &schedule)?;

    info!("Final status: {}", sim.status_message());
    // "ffmpeg -framerate 30 -pattern_type glob -i 'output/membrane_*.png' -c:v libx264 -pix_fmt yuv420p membrane.mp4"
    Ok(())
}
