//! Temporal-difference training over whole episodes.
//!
//! Targets are bootstrapped off the *target* network: each step's target
//! vector is the target network's own prediction with only the taken action's
//! slot overwritten by the TD value. The gradient therefore adjusts the value
//! estimate for the action actually taken and leaves the other estimates at
//! the network's current belief (a semi-gradient, single-action update).

use liftq_agent::{Action, PreconditionViolation, TargetNetwork, ValueNetwork};

use crate::trajectory::Trajectory;

/// Result of one training call.
#[derive(Debug, Clone, Copy)]
pub struct TrainingReport {
    /// Mean squared error before the update.
    pub loss: f32,
    /// Whether this call refreshed the target network.
    pub synced: bool,
}

/// Converts trajectories into gradient steps and manages the sync cadence.
#[derive(Debug)]
pub struct Trainer {
    gamma: f32,
    sync_cadence: usize,
    train_calls: usize,
}

impl Trainer {
    /// # Panics
    ///
    /// Panics if `gamma` is outside `[0, 1]` or `sync_cadence` is zero.
    #[must_use]
    pub fn new(gamma: f32, sync_cadence: usize) -> Self {
        assert!((0.0..=1.0).contains(&gamma));
        assert!(sync_cadence >= 1);
        Self {
            gamma,
            sync_cadence,
            train_calls: 0,
        }
    }

    /// Number of completed training calls (empty trajectories do not count).
    #[must_use]
    pub fn train_calls(&self) -> usize {
        self.train_calls
    }

    /// One training pass over a trimmed trajectory.
    ///
    /// An empty trajectory is a no-op (`Ok(None)`), not an error; a
    /// length-one trajectory has no bootstrap step and trains on the terminal
    /// formula alone.
    ///
    /// # Errors
    ///
    /// Propagates [`PreconditionViolation`] from prediction or fitting.
    ///
    /// # Panics
    ///
    /// Panics if the trajectory was not trimmed to alignment.
    pub fn train(
        &mut self,
        online: &mut ValueNetwork,
        target: &mut TargetNetwork,
        trajectory: &Trajectory,
    ) -> Result<Option<TrainingReport>, PreconditionViolation> {
        assert!(trajectory.is_aligned(), "trajectory must be trimmed before training");
        if trajectory.is_empty() {
            return Ok(None);
        }

        let predicted = trajectory
            .observations()
            .iter()
            .map(|observation| target.predict(observation))
            .collect::<Result<Vec<_>, _>>()?;
        let targets = build_targets(&predicted, trajectory.actions(), trajectory.rewards(), self.gamma);

        let loss = online.fit(trajectory.observations(), &targets)?;

        self.train_calls += 1;
        let synced = self.train_calls % self.sync_cadence == 0;
        if synced {
            target.sync_from_online(online);
        }
        Ok(Some(TrainingReport { loss, synced }))
    }
}

/// Builds per-step target vectors from the target network's predictions.
///
/// For step `t`, the vector is `predicted[t]` with the taken action's slot
/// replaced by `reward[t] + gamma * max(predicted[t + 1])`, or by the raw
/// `reward[t]` on the terminal step.
fn build_targets(
    predicted: &[Vec<f32>],
    actions: &[Action],
    rewards: &[f32],
    gamma: f32,
) -> Vec<Vec<f32>> {
    let steps = rewards.len();
    let mut targets = predicted.to_vec();
    for t in 0..steps {
        let value = if t + 1 < steps {
            rewards[t] + gamma * max_value(&predicted[t + 1])
        } else {
            rewards[t]
        };
        targets[t][actions[t].index()] = value;
    }
    targets
}

fn max_value(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}
