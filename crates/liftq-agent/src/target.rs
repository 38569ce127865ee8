//! Lagged copy of the online network for stable bootstrap targets.
//!
//! Bootstrapping training targets off the same network being updated chases a
//! moving target and diverges; freezing the target source for a window of
//! training calls is the standard stabilizer for function-approximation
//! Q-learning. The trainer owns the sync cadence.

use crate::{error::PreconditionViolation, net::ValueNetwork, observation::Observation};

/// A frozen copy of the online network's parameters.
///
/// The copy is independently owned and replaced wholesale on sync, as a
/// single owned-value assignment, so a reader can never observe a partially
/// copied layer. Between syncs it is read-only.
#[derive(Debug, Clone)]
pub struct TargetNetwork {
    frozen: ValueNetwork,
}

impl TargetNetwork {
    /// Starts with a copy of the online network's current parameters.
    #[must_use]
    pub fn new(online: &ValueNetwork) -> Self {
        Self {
            frozen: online.clone(),
        }
    }

    /// Replaces the frozen parameter set with the online network's current
    /// one.
    pub fn sync_from_online(&mut self, online: &ValueNetwork) {
        self.frozen = online.clone();
    }

    /// Predicts with the frozen copy.
    ///
    /// # Errors
    ///
    /// Propagates [`PreconditionViolation`] from the frozen network.
    pub fn predict(&self, observation: &Observation) -> Result<Vec<f32>, PreconditionViolation> {
        self.frozen.predict(observation)
    }

    /// The frozen parameter set, in export order.
    #[must_use]
    pub fn params(&self) -> Vec<f32> {
        self.frozen.params()
    }
}
