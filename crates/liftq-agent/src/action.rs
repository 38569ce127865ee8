//! The discrete action set: one action per target floor.

use rand::Rng;

/// A dispatch decision: send the car to this floor. Immutable once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action(usize);

impl Action {
    /// The targeted floor, equal to the action's index in the space.
    #[must_use]
    pub fn floor(self) -> usize {
        self.0
    }

    /// Index of this action in the predicted value vector.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The set of `floor_count` actions, indexed `0..floor_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    floor_count: usize,
}

impl ActionSpace {
    /// # Panics
    ///
    /// Panics if `floor_count` is zero.
    #[must_use]
    pub fn new(floor_count: usize) -> Self {
        assert!(floor_count > 0);
        Self { floor_count }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.floor_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The action targeting `floor`.
    ///
    /// # Panics
    ///
    /// Panics if `floor` is outside the space.
    #[must_use]
    pub fn action(&self, floor: usize) -> Action {
        assert!(floor < self.floor_count);
        Action(floor)
    }

    /// All actions in index order.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        (0..self.floor_count).map(Action)
    }

    /// A uniformly random action.
    pub fn sample<R>(&self, rng: &mut R) -> Action
    where
        R: Rng + ?Sized,
    {
        Action(rng.random_range(0..self.floor_count))
    }
}
