//! Plays episodes: the observe / select / submit / settle / record loop.

use liftq_agent::{
    ExplorationPolicy, ObservationEncoder, PreconditionViolation, RewardFunction, ValueNetwork,
};
use liftq_world::{StepOutcome, World, WorldMetrics};
use rand::Rng;

use crate::trajectory::Trajectory;

/// Outcome summary of one played episode.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeReport {
    pub total_reward: f32,
    pub final_metrics: WorldMetrics,
    pub steps: usize,
}

/// Orchestrates one playthrough against a world.
///
/// The driver suspends only inside [`World::take_action`], submits at most
/// one action at a time, and stops as soon as the world reports its terminal
/// condition, never submitting past it.
#[derive(Debug, Clone)]
pub struct EpisodeDriver {
    encoder: ObservationEncoder,
    policy: ExplorationPolicy,
    reward: RewardFunction,
}

impl EpisodeDriver {
    #[must_use]
    pub fn new(encoder: ObservationEncoder, policy: ExplorationPolicy, reward: RewardFunction) -> Self {
        Self {
            encoder,
            policy,
            reward,
        }
    }

    /// Plays one full episode and returns the trimmed trajectory.
    ///
    /// `explore_rate` is fixed for the whole episode; the harness decays it
    /// across episodes.
    ///
    /// # Errors
    ///
    /// Propagates any [`PreconditionViolation`] from encoding, prediction or
    /// the reward function.
    pub fn run_episode<W, R>(
        &self,
        world: &mut W,
        network: &ValueNetwork,
        explore_rate: f32,
        rng: &mut R,
    ) -> Result<(Trajectory, EpisodeReport), PreconditionViolation>
    where
        W: World,
        R: Rng + ?Sized,
    {
        let mut trajectory = Trajectory::new();
        let mut before = world.snapshot();

        while !world.is_episode_ended() {
            let observation = self.encoder.encode(&before)?;
            let action = self
                .policy
                .choose_action(rng, network, &observation, explore_rate)?;
            trajectory.record_decision(observation, action);

            match world.take_action(action.floor()) {
                StepOutcome::Settled(after) => {
                    trajectory.record_reward(self.reward.reward(&before, &after)?);
                    before = after;
                }
                StepOutcome::Ended => break,
            }
        }
        trajectory.trim();

        let report = EpisodeReport {
            total_reward: trajectory.total_reward(),
            final_metrics: world.snapshot().metrics,
            steps: trajectory.len(),
        };
        Ok((trajectory, report))
    }
}
