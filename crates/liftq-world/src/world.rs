//! The interface the decision engine drives a world through.

use crate::snapshot::WorldSnapshot;

/// Result of submitting an action and waiting for the world to settle.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The car reached and serviced the target floor; the snapshot was taken
    /// at the settle instant.
    Settled(WorldSnapshot),
    /// The episode terminated before the action settled. No post-action
    /// equilibrium was observed, so no reward can be attributed to the
    /// submitted action.
    Ended,
}

/// A dispatchable elevator world.
///
/// The driver holds the only mutable handle, submits at most one action at a
/// time, and never submits again until the previous call has returned. A call
/// to [`World::take_action`] blocks cooperatively until the world settles or
/// the episode ends; there is no timeout in this layer.
pub trait World {
    fn floor_count(&self) -> usize;

    fn elevator_count(&self) -> usize;

    /// Captures the current world state. The returned snapshot is owned by
    /// the caller and never mutated by the world afterwards.
    fn snapshot(&self) -> WorldSnapshot;

    /// Sends the car to `target_floor` and blocks until it has arrived and
    /// serviced the floor, or the episode ends first.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `target_floor` is out of range or if the
    /// episode has already ended; both are driver contract violations.
    fn take_action(&mut self, target_floor: usize) -> StepOutcome;

    fn is_episode_ended(&self) -> bool;
}
