//! Plain-data captures of world state.
//!
//! A [`WorldSnapshot`] is produced on demand and owned exclusively by the
//! caller that requested it; nothing in this crate keeps a reference to one
//! after handing it out. The reward function works on *pairs* of snapshots
//! (before/after a settled action), so the snapshot carries the cumulative
//! [`WorldMetrics`] counters alongside the per-elevator and per-floor state.

/// Direction the car is currently committed to travel, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TravelDirection {
    Up,
    Down,
    Idle,
}

impl TravelDirection {
    /// Signed code used by the observation encoder: up = 1, down = -1,
    /// idle = 0.
    #[must_use]
    pub fn code(self) -> f32 {
        match self {
            TravelDirection::Up => 1.0,
            TravelDirection::Down => -1.0,
            TravelDirection::Idle => 0.0,
        }
    }
}

/// State of a single elevator car at a snapshot instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevatorState {
    /// Floor the car is currently at (or passing).
    pub current_floor: usize,
    /// Occupancy as a fraction of capacity, in `[0, 1]`.
    pub load_factor: f32,
    /// Direction of the currently committed destination.
    pub destination_direction: TravelDirection,
    /// Floors requested by onboard passengers, ascending, no duplicates.
    pub pressed_floors: Vec<usize>,
    /// Up indicator light.
    pub going_up: bool,
    /// Down indicator light.
    pub going_down: bool,
}

impl ElevatorState {
    /// Returns whether `floor` is among the onboard stop requests.
    #[must_use]
    pub fn has_pressed_floor(&self, floor: usize) -> bool {
        self.pressed_floors.binary_search(&floor).is_ok()
    }
}

/// Call-button state of a single floor at a snapshot instant.
///
/// `None` means the button is not active; `Some(t)` records the simulation
/// time at which it was pressed (the earliest still-waiting passenger).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloorState {
    pub up_pressed_since: Option<f32>,
    pub down_pressed_since: Option<f32>,
}

impl FloorState {
    /// Number of active call buttons on this floor (0, 1 or 2).
    #[must_use]
    pub fn pressed_count(&self) -> usize {
        usize::from(self.up_pressed_since.is_some()) + usize::from(self.down_pressed_since.is_some())
    }
}

/// Cumulative counters maintained by the world across an episode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldMetrics {
    /// Monotonic simulation clock, seconds.
    pub elapsed_time: f32,
    /// Passengers delivered to their destination so far.
    pub transported_count: u64,
    /// Floors the car has traveled so far.
    pub move_count: u64,
}

/// Complete world state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub elevators: Vec<ElevatorState>,
    pub floors: Vec<FloorState>,
    pub metrics: WorldMetrics,
}

impl WorldSnapshot {
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    #[must_use]
    pub fn elevator_count(&self) -> usize {
        self.elevators.len()
    }

    /// Total number of active call buttons across all floors.
    #[must_use]
    pub fn pressed_button_count(&self) -> usize {
        self.floors.iter().map(FloorState::pressed_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_codes_are_signed() {
        assert_eq!(TravelDirection::Up.code(), 1.0);
        assert_eq!(TravelDirection::Down.code(), -1.0);
        assert_eq!(TravelDirection::Idle.code(), 0.0);
        assert!(TravelDirection::Idle.is_idle());
    }

    #[test]
    fn pressed_button_count_sums_both_directions() {
        let snapshot = WorldSnapshot {
            elevators: vec![],
            floors: vec![
                FloorState::default(),
                FloorState {
                    up_pressed_since: Some(3.0),
                    down_pressed_since: None,
                },
                FloorState {
                    up_pressed_since: Some(1.0),
                    down_pressed_since: Some(2.0),
                },
            ],
            metrics: WorldMetrics::default(),
        };
        assert_eq!(snapshot.pressed_button_count(), 3);
    }
}
