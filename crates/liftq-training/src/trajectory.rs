//! Episode memory: three index-aligned sequences.

use liftq_agent::{Action, Observation};

/// Observations, actions and rewards recorded across one episode.
///
/// A decision appends an observation/action pair; the matching reward arrives
/// only after the world settles. When an episode terminates before the last
/// action settles, the trailing unmatched pair is dropped by [`Self::trim`],
/// so by the time training runs all three sequences have equal length.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    observations: Vec<Observation>,
    actions: Vec<Action>,
    rewards: Vec<f32>,
}

impl Trajectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the observation/action pair of a decision step.
    ///
    /// # Panics
    ///
    /// Panics if the previous decision has not received its reward yet;
    /// at most one action is ever pending.
    pub fn record_decision(&mut self, observation: Observation, action: Action) {
        assert_eq!(self.observations.len(), self.rewards.len());
        self.observations.push(observation);
        self.actions.push(action);
    }

    /// Records the reward for the most recent decision.
    ///
    /// # Panics
    ///
    /// Panics if there is no decision awaiting a reward.
    pub fn record_reward(&mut self, reward: f32) {
        assert_eq!(self.observations.len(), self.rewards.len() + 1);
        self.rewards.push(reward);
    }

    /// Drops a trailing observation/action pair that never received a reward.
    pub fn trim(&mut self) {
        self.observations.truncate(self.rewards.len());
        self.actions.truncate(self.rewards.len());
    }

    /// Number of completed (rewarded) steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Whether all three sequences currently have equal length.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.observations.len() == self.rewards.len() && self.actions.len() == self.rewards.len()
    }

    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Sum of all recorded rewards.
    #[must_use]
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use liftq_agent::ActionSpace;

    use super::*;

    fn observation(value: f32) -> Observation {
        Observation::from_values(vec![value])
    }

    #[test]
    fn trim_drops_the_unmatched_trailing_pair() {
        let space = ActionSpace::new(3);
        let mut trajectory = Trajectory::new();
        for step in 0..5 {
            trajectory.record_decision(observation(step as f32), space.action(step % 3));
            if step < 4 {
                trajectory.record_reward(1.0);
            }
        }
        assert!(!trajectory.is_aligned());

        trajectory.trim();
        assert!(trajectory.is_aligned());
        assert_eq!(trajectory.len(), 4);
        assert_eq!(trajectory.observations().len(), 4);
        assert_eq!(trajectory.actions().len(), 4);
        assert_eq!(trajectory.rewards().len(), 4);
    }

    #[test]
    fn trim_is_a_no_op_on_an_aligned_trajectory() {
        let space = ActionSpace::new(2);
        let mut trajectory = Trajectory::new();
        trajectory.record_decision(observation(0.0), space.action(1));
        trajectory.record_reward(-2.5);
        trajectory.trim();
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory.total_reward(), -2.5);
    }

    #[test]
    #[should_panic(expected = "assertion")]
    fn second_pending_decision_is_rejected() {
        let space = ActionSpace::new(2);
        let mut trajectory = Trajectory::new();
        trajectory.record_decision(observation(0.0), space.action(0));
        trajectory.record_decision(observation(1.0), space.action(1));
    }
}
