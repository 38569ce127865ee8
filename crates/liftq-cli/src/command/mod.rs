use clap::{Parser, Subcommand};
use liftq_world::SimWorldConfig;

mod evaluate;
mod train;

/// Simulated-building parameters shared by the train and evaluate commands.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WorldArg {
    /// Number of floors in the simulated building
    #[arg(long, default_value_t = 6)]
    floors: usize,
    /// Car capacity in passengers
    #[arg(long, default_value_t = 4)]
    capacity: usize,
    /// Mean seconds between passenger arrivals
    #[arg(long, default_value_t = 6.0)]
    arrival_interval: f32,
    /// Episode length in simulated seconds
    #[arg(long, default_value_t = 200.0)]
    episode_duration: f32,
}

impl WorldArg {
    fn sim_config(&self) -> SimWorldConfig {
        SimWorldConfig {
            floor_count: self.floors,
            capacity: self.capacity,
            mean_arrival_interval: self.arrival_interval,
            episode_duration: self.episode_duration,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train the dispatch agent against the simulated building
    Train(#[clap(flatten)] train::TrainArg),
    /// Run a trained model or a baseline policy and report service quality
    Evaluate(#[clap(flatten)] evaluate::EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    match CommandArgs::parse().mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}
