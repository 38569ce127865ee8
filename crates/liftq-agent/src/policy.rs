//! Epsilon-greedy action selection.
//!
//! The policy itself is stateless: the per-episode exploration rate is owned
//! by the training harness, which walks it down an [`ExploreSchedule`].

use rand::Rng;

use crate::{
    action::{Action, ActionSpace},
    error::PreconditionViolation,
    net::ValueNetwork,
    observation::Observation,
};

/// Linear decay of the exploration rate across episodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExploreSchedule {
    pub initial: f32,
    pub floor: f32,
    pub decrement: f32,
}

impl Default for ExploreSchedule {
    fn default() -> Self {
        Self {
            initial: 0.9,
            floor: 0.25,
            decrement: 0.001,
        }
    }
}

impl ExploreSchedule {
    /// Exploration rate for the given zero-based episode number.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn rate_for(&self, episode: usize) -> f32 {
        (self.initial - self.decrement * episode as f32).max(self.floor)
    }
}

/// Chooses between exploring the action space and exploiting the network.
#[derive(Debug, Clone, Copy)]
pub struct ExplorationPolicy {
    space: ActionSpace,
}

impl ExplorationPolicy {
    #[must_use]
    pub fn new(space: ActionSpace) -> Self {
        Self { space }
    }

    #[must_use]
    pub fn action_space(&self) -> ActionSpace {
        self.space
    }

    /// With probability `explore_rate`, a uniformly random action; otherwise
    /// the argmax of the network's predicted values, ties broken by lowest
    /// index.
    ///
    /// # Errors
    ///
    /// Propagates [`PreconditionViolation`] from the network's prediction.
    pub fn choose_action<R>(
        &self,
        rng: &mut R,
        network: &ValueNetwork,
        observation: &Observation,
        explore_rate: f32,
    ) -> Result<Action, PreconditionViolation>
    where
        R: Rng + ?Sized,
    {
        if rng.random::<f32>() < explore_rate {
            Ok(self.space.sample(rng))
        } else {
            self.greedy_action(network, observation)
        }
    }

    /// The best predicted action, ties broken by lowest index.
    ///
    /// # Errors
    ///
    /// Propagates [`PreconditionViolation`] from the network's prediction.
    pub fn greedy_action(
        &self,
        network: &ValueNetwork,
        observation: &Observation,
    ) -> Result<Action, PreconditionViolation> {
        let values = network.predict(observation)?;
        debug_assert_eq!(values.len(), self.space.len());
        Ok(self.space.action(argmax(&values)))
    }
}

/// Index of the first maximal value.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::net::Topology;

    use super::*;

    /// A linear network whose prediction is exactly its bias vector.
    fn bias_only_network(biases: &[f32], input_len: usize) -> ValueNetwork {
        let topology = Topology {
            input_len,
            hidden: vec![],
            output_len: biases.len(),
        };
        let mut params = vec![0.0; input_len * biases.len()];
        params.extend_from_slice(biases);
        ValueNetwork::from_params(topology, 0.01, &params).unwrap()
    }

    #[test]
    fn forced_exploration_is_close_to_uniform() {
        let policy = ExplorationPolicy::new(ActionSpace::new(5));
        let network = bias_only_network(&[0.0; 5], 2);
        let observation = Observation::from_values(vec![0.0, 0.0]);
        let mut rng = Pcg32::seed_from_u64(21);

        const TRIALS: usize = 10_000;
        let mut counts = [0usize; 5];
        for _ in 0..TRIALS {
            let action = policy
                .choose_action(&mut rng, &network, &observation, 1.0)
                .unwrap();
            counts[action.index()] += 1;
        }

        // chi-square goodness of fit against uniform, df = 4
        let expected = TRIALS as f64 / 5.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        assert!(chi_square < 20.0, "chi_square = {chi_square}, counts = {counts:?}");
    }

    #[test]
    fn zero_explore_rate_always_exploits() {
        let policy = ExplorationPolicy::new(ActionSpace::new(4));
        let network = bias_only_network(&[0.5, 2.0, -1.0, 1.5], 3);
        let observation = Observation::from_values(vec![0.0; 3]);
        let mut rng = Pcg32::seed_from_u64(8);
        for _ in 0..50 {
            let action = policy
                .choose_action(&mut rng, &network, &observation, 0.0)
                .unwrap();
            assert_eq!(action.index(), 1);
        }
    }

    #[test]
    fn ties_break_toward_the_lowest_index() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[5.0, 5.0, 5.0]), 0);
        assert_eq!(argmax(&[-2.0]), 0);
    }

    #[test]
    fn schedule_decays_linearly_to_its_floor() {
        let schedule = ExploreSchedule::default();
        assert_eq!(schedule.rate_for(0), 0.9);
        assert!((schedule.rate_for(100) - 0.8).abs() < 1e-6);
        assert_eq!(schedule.rate_for(650), 0.25);
        assert_eq!(schedule.rate_for(10_000), 0.25);
    }
}
