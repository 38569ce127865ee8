use std::path::PathBuf;

use liftq_agent::{ActionSpace, ExplorationPolicy, ObservationEncoder, RewardFunction};
use liftq_stats::SummaryStats;
use liftq_training::EpisodeDriver;
use liftq_world::SimWorld;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{command::WorldArg, model};

/// Evaluation never fits the network; the step size only satisfies the
/// network constructor.
const EVAL_LEARNING_RATE: f32 = 0.01;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum PolicyKind {
    /// Always take the model's best predicted action.
    #[default]
    Greedy,
    /// Uniformly random dispatch, the baseline the original shipped with.
    Random,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    #[clap(flatten)]
    world: WorldArg,
    /// Number of evaluation episodes
    #[arg(long, default_value_t = 20)]
    episodes: usize,
    /// Base RNG seed; episode worlds derive their seeds from it
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Policy to run
    #[arg(long, default_value = "greedy")]
    policy: PolicyKind,
    /// Artifact pair (descriptor + weights) of the model to evaluate
    #[arg(long)]
    model: Vec<PathBuf>,
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let config = arg.world.sim_config();
    let encoder = ObservationEncoder::new(config.floor_count, 1);
    let space = ActionSpace::new(config.floor_count);

    let mut rng = Pcg32::seed_from_u64(arg.seed);
    let (network, _) = model::load_or_fresh(
        &arg.model,
        config.floor_count,
        1,
        encoder.observation_len(),
        space.len(),
        EVAL_LEARNING_RATE,
        &mut rng,
    );
    let explore_rate = match arg.policy {
        PolicyKind::Greedy => 0.0,
        PolicyKind::Random => 1.0,
    };
    let driver = EpisodeDriver::new(
        encoder,
        ExplorationPolicy::new(space),
        RewardFunction::default(),
    );

    let mut rewards = Vec::with_capacity(arg.episodes);
    let mut transported = Vec::with_capacity(arg.episodes);
    let mut average_waits = Vec::with_capacity(arg.episodes);
    let mut max_waits = Vec::with_capacity(arg.episodes);
    for episode in 0..arg.episodes {
        let mut world = SimWorld::new(config.clone(), arg.seed.wrapping_add(episode as u64));
        let (_, report) = driver.run_episode(&mut world, &network, explore_rate, &mut rng)?;
        eprintln!(
            "Episode #{episode}: steps {}, reward {:.1}, transported {}, \
             avg wait {:.1}s, max wait {:.1}s",
            report.steps,
            report.total_reward,
            report.final_metrics.transported_count,
            world.average_wait_time(),
            world.max_wait_time(),
        );
        rewards.push(report.total_reward);
        transported.push(report.final_metrics.transported_count as f32);
        average_waits.push(world.average_wait_time());
        max_waits.push(world.max_wait_time());
    }

    eprintln!();
    eprintln!("{:?} policy over {} episodes:", arg.policy, arg.episodes);
    print_stats("Reward", SummaryStats::from_samples(rewards));
    print_stats("Transported", SummaryStats::from_samples(transported));
    print_stats("Avg wait (s)", SummaryStats::from_samples(average_waits));
    print_stats("Max wait (s)", SummaryStats::from_samples(max_waits));

    Ok(())
}

fn print_stats(label: &str, stats: Option<SummaryStats>) {
    if let Some(stats) = stats {
        eprintln!(
            "  {label}: min {:.1}, mean {:.1}, max {:.1} (std {:.1})",
            stats.min, stats.mean, stats.max, stats.std_dev
        );
    }
}
