use std::path::PathBuf;

use chrono::Utc;
use liftq_agent::{
    ActionSpace, ExplorationPolicy, ExploreSchedule, ObservationEncoder, RewardFunction,
    RewardWeights, TargetNetwork,
};
use liftq_stats::SummaryStats;
use liftq_training::{EpisodeDriver, Trainer};
use liftq_world::SimWorld;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    command::WorldArg,
    model::{self, ModelDescriptor},
};

/// Episodes between printed summary blocks.
const SUMMARY_EVERY: usize = 50;

/// Window of trailing episodes used for the exported mean reward.
const REPORT_WINDOW: usize = 100;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    world: WorldArg,
    /// Number of training episodes
    #[arg(long, default_value_t = 500)]
    episodes: usize,
    /// Base RNG seed; episode worlds derive their seeds from it
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Discount factor for bootstrapped targets
    #[arg(long, default_value_t = 0.9)]
    gamma: f32,
    /// SGD step size of the online network
    #[arg(long, default_value_t = 0.01)]
    learning_rate: f32,
    /// Refresh the target network every this many training calls
    #[arg(long, default_value_t = 10)]
    sync_cadence: usize,
    /// Override the initial exploration rate
    #[arg(long)]
    explore_initial: Option<f32>,
    /// Override the exploration-rate floor
    #[arg(long)]
    explore_floor: Option<f32>,
    /// Override the per-episode exploration decrement
    #[arg(long)]
    explore_decrement: Option<f32>,
    /// Override the per-delivery reward weight
    #[arg(long)]
    reward_transported: Option<f32>,
    /// Override the loaded-travel penalty weight
    #[arg(long)]
    reward_travel: Option<f32>,
    /// Override the button-wait penalty weight
    #[arg(long)]
    reward_waiting: Option<f32>,
    /// Override the idle-with-pending-stops penalty
    #[arg(long)]
    reward_idle: Option<f32>,
    /// Existing artifact pair (descriptor + weights) to continue training from
    #[arg(long)]
    model: Vec<PathBuf>,
    /// Directory the exported artifact pair is written into
    #[arg(long, default_value = "models")]
    output_dir: PathBuf,
}

impl TrainArg {
    fn explore_schedule(&self) -> ExploreSchedule {
        let mut schedule = ExploreSchedule::default();
        if let Some(initial) = self.explore_initial {
            schedule.initial = initial;
        }
        if let Some(floor) = self.explore_floor {
            schedule.floor = floor;
        }
        if let Some(decrement) = self.explore_decrement {
            schedule.decrement = decrement;
        }
        schedule
    }

    fn reward_weights(&self) -> RewardWeights {
        let mut weights = RewardWeights::default();
        if let Some(transported) = self.reward_transported {
            weights.transported = transported;
        }
        if let Some(travel) = self.reward_travel {
            weights.travel = travel;
        }
        if let Some(waiting) = self.reward_waiting {
            weights.waiting = waiting;
        }
        if let Some(idle) = self.reward_idle {
            weights.idle = idle;
        }
        weights
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.world.sim_config();
    let floor_count = config.floor_count;
    let encoder = ObservationEncoder::new(floor_count, 1);
    let space = ActionSpace::new(floor_count);
    let schedule = arg.explore_schedule();

    let mut rng = Pcg32::seed_from_u64(arg.seed);
    let (mut online, resumed) = model::load_or_fresh(
        &arg.model,
        floor_count,
        1,
        encoder.observation_len(),
        space.len(),
        arg.learning_rate,
        &mut rng,
    );
    let mut target = TargetNetwork::new(&online);
    let mut trainer = Trainer::new(arg.gamma, arg.sync_cadence);
    let driver = EpisodeDriver::new(
        encoder,
        ExplorationPolicy::new(space),
        RewardFunction::new(arg.reward_weights()),
    );

    let mut rewards = Vec::with_capacity(arg.episodes);
    let mut average_waits = Vec::with_capacity(arg.episodes);
    for episode in 0..arg.episodes {
        let explore_rate = schedule.rate_for(episode);
        let mut world = SimWorld::new(config.clone(), arg.seed.wrapping_add(episode as u64));
        let (trajectory, report) = driver.run_episode(&mut world, &online, explore_rate, &mut rng)?;
        let outcome = trainer.train(&mut online, &mut target, &trajectory)?;

        rewards.push(report.total_reward);
        average_waits.push(world.average_wait_time());

        let loss = outcome.map_or_else(|| "-".to_owned(), |r| format!("{:.4}", r.loss));
        let synced = if outcome.is_some_and(|r| r.synced) {
            " (target synced)"
        } else {
            ""
        };
        eprintln!(
            "Episode #{episode}: explore {explore_rate:.3}, steps {}, reward {:.1}, \
             transported {}, avg wait {:.1}s, loss {loss}{synced}",
            report.steps,
            report.total_reward,
            report.final_metrics.transported_count,
            world.average_wait_time(),
        );

        if (episode + 1) % SUMMARY_EVERY == 0 {
            print_summary(&rewards, &average_waits);
        }
    }

    let trained_at = Utc::now();
    let recent = &rewards[rewards.len().saturating_sub(REPORT_WINDOW)..];
    let mean_episode_reward =
        SummaryStats::from_samples(recent.iter().copied()).map_or(0.0, |stats| stats.mean);
    let descriptor = ModelDescriptor {
        name: model::export_name(floor_count, 1, trained_at),
        trained_at,
        floor_count,
        elevator_count: 1,
        topology: online.topology().clone(),
        episodes_trained: arg.episodes + resumed.map_or(0, |d| d.episodes_trained),
        final_explore_rate: schedule.rate_for(arg.episodes.saturating_sub(1)),
        mean_episode_reward,
    };
    let (descriptor_path, weights_path) = model::save(&arg.output_dir, &descriptor, &online.params())?;

    eprintln!();
    eprintln!("Model saved successfully");
    eprintln!("  Descriptor: {}", descriptor_path.display());
    eprintln!("  Weights:    {}", weights_path.display());
    eprintln!("  Trained at: {}", descriptor.trained_at);
    eprintln!("  Episodes:   {}", descriptor.episodes_trained);
    eprintln!(
        "  Mean reward over the last {} episodes: {mean_episode_reward:.2}",
        recent.len()
    );

    Ok(())
}

fn print_summary(rewards: &[f32], average_waits: &[f32]) {
    let window = rewards.len().min(SUMMARY_EVERY);
    let reward_stats = SummaryStats::from_samples(rewards[rewards.len() - window..].iter().copied());
    let wait_stats = SummaryStats::from_samples(
        average_waits[average_waits.len() - window..].iter().copied(),
    );
    if let (Some(reward), Some(wait)) = (reward_stats, wait_stats) {
        eprintln!("  Last {window} episodes:");
        eprintln!(
            "    Reward min/mean/max: {:.1} / {:.1} / {:.1} (std {:.1})",
            reward.min, reward.mean, reward.max, reward.std_dev
        );
        eprintln!("    Avg wait mean: {:.1}s", wait.mean);
    }
}
