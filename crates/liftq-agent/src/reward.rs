//! Shaping reward derived from the change between two settled snapshots.
//!
//! The true objective (low passenger wait) is sparse and delayed, so the
//! trainer learns against a hand-shaped signal instead. All weights are
//! tunable configuration; historical variants of this system shipped with
//! different magnitudes and none of them is authoritative. Relative signs are
//! fixed: delivery pays, loaded travel, waiting buttons and idling with
//! pending stops cost.

use liftq_world::WorldSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::PreconditionViolation;

/// Tunable magnitudes of the reward terms. Signs are applied by the reward
/// function itself, so all weights are non-negative in normal use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    /// Per passenger delivered since the previous step.
    pub transported: f32,
    /// Per floor traveled, scaled by the mean load factor.
    pub travel: f32,
    /// Per active call button per second since the previous step.
    pub waiting: f32,
    /// Flat penalty for sitting idle while onboard stops are pending.
    pub idle: f32,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            transported: 10.0,
            travel: 1.0,
            waiting: 2.0,
            idle: 20.0,
        }
    }
}

/// Computes the scalar shaping reward for one settled decision step.
#[derive(Debug, Clone, Default)]
pub struct RewardFunction {
    weights: RewardWeights,
}

impl RewardFunction {
    #[must_use]
    pub fn new(weights: RewardWeights) -> Self {
        Self { weights }
    }

    /// Reward for the transition `before -> after`.
    ///
    /// Total over every reachable snapshot pair; a non-finite result (for
    /// example from a zero-elevator snapshot) is a fatal precondition
    /// violation, never a clamped value.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation::NonFinite`] if any term degenerates.
    #[expect(clippy::cast_precision_loss)]
    pub fn reward(
        &self,
        before: &WorldSnapshot,
        after: &WorldSnapshot,
    ) -> Result<f32, PreconditionViolation> {
        let transported =
            (after.metrics.transported_count - before.metrics.transported_count) as f32;
        let moved = (after.metrics.move_count - before.metrics.move_count) as f32;
        let time_delta = after.metrics.elapsed_time - before.metrics.elapsed_time;

        let load_sum: f32 = after.elevators.iter().map(|e| e.load_factor).sum();
        let load_avg = load_sum / after.elevators.len() as f32;

        let waiting = after.pressed_button_count() as f32 * time_delta;

        let idle_with_pending = after
            .elevators
            .iter()
            .any(|e| e.destination_direction.is_idle() && !e.pressed_floors.is_empty());

        let mut reward = transported * self.weights.transported;
        reward -= moved * load_avg * self.weights.travel;
        reward -= waiting * self.weights.waiting;
        if idle_with_pending {
            reward -= self.weights.idle;
        }

        if reward.is_finite() {
            Ok(reward)
        } else {
            Err(PreconditionViolation::NonFinite {
                context: "reward function",
                value: reward,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use liftq_world::{ElevatorState, FloorState, TravelDirection, WorldMetrics};

    use super::*;

    fn car(direction: TravelDirection, pressed_floors: Vec<usize>, load: f32) -> ElevatorState {
        ElevatorState {
            current_floor: 0,
            load_factor: load,
            destination_direction: direction,
            pressed_floors,
            going_up: direction.is_up(),
            going_down: direction.is_down(),
        }
    }

    fn snapshot(car_state: ElevatorState, floors: Vec<FloorState>, metrics: WorldMetrics) -> WorldSnapshot {
        WorldSnapshot {
            elevators: vec![car_state],
            floors,
            metrics,
        }
    }

    fn quiet_floors(count: usize) -> Vec<FloorState> {
        vec![FloorState::default(); count]
    }

    #[test]
    fn rewards_deliveries_and_penalizes_loaded_travel() {
        let reward_fn = RewardFunction::default();
        let before = snapshot(
            car(TravelDirection::Idle, vec![], 0.0),
            quiet_floors(3),
            WorldMetrics {
                elapsed_time: 0.0,
                transported_count: 0,
                move_count: 0,
            },
        );
        let after = snapshot(
            car(TravelDirection::Idle, vec![], 0.5),
            quiet_floors(3),
            WorldMetrics {
                elapsed_time: 4.0,
                transported_count: 2,
                move_count: 4,
            },
        );
        // 2 delivered * 10 - 4 moves * 0.5 load * 1
        let reward = reward_fn.reward(&before, &after).unwrap();
        assert!((reward - 18.0).abs() < 1e-6);
    }

    #[test]
    fn identical_snapshot_pairs_yield_identical_rewards() {
        let reward_fn = RewardFunction::default();
        let before = snapshot(
            car(TravelDirection::Up, vec![2], 0.25),
            vec![
                FloorState {
                    up_pressed_since: Some(1.0),
                    down_pressed_since: None,
                },
                FloorState::default(),
            ],
            WorldMetrics {
                elapsed_time: 5.0,
                transported_count: 1,
                move_count: 3,
            },
        );
        let after = snapshot(
            car(TravelDirection::Idle, vec![], 0.0),
            quiet_floors(2),
            WorldMetrics {
                elapsed_time: 9.0,
                transported_count: 2,
                move_count: 6,
            },
        );
        let first = reward_fn.reward(&before, &after).unwrap();
        let second = reward_fn.reward(&before, &after).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn idle_with_pending_stop_costs_the_flat_penalty() {
        let reward_fn = RewardFunction::default();
        let metrics = WorldMetrics {
            elapsed_time: 10.0,
            transported_count: 0,
            move_count: 0,
        };
        let before = snapshot(
            car(TravelDirection::Idle, vec![], 0.0),
            quiet_floors(4),
            WorldMetrics {
                elapsed_time: 9.0,
                transported_count: 0,
                move_count: 0,
            },
        );
        let idle_pending = reward_fn
            .reward(
                &before,
                &snapshot(car(TravelDirection::Idle, vec![3], 0.25), quiet_floors(4), metrics),
            )
            .unwrap();
        let idle_empty = reward_fn
            .reward(
                &before,
                &snapshot(car(TravelDirection::Idle, vec![], 0.25), quiet_floors(4), metrics),
            )
            .unwrap();
        assert!((idle_empty - idle_pending - RewardWeights::default().idle).abs() < 1e-6);
    }

    #[test]
    fn idle_car_with_waiting_floor_scores_below_quiet_scene() {
        // Car parked with a pending stop while floor 2's up button has been
        // waiting ten seconds, against an otherwise identical empty building.
        let reward_fn = RewardFunction::default();
        let before_metrics = WorldMetrics {
            elapsed_time: 10.0,
            transported_count: 0,
            move_count: 0,
        };
        let after_metrics = WorldMetrics {
            elapsed_time: 12.0,
            transported_count: 0,
            move_count: 0,
        };
        let mut pending_floors = quiet_floors(4);
        pending_floors[2].up_pressed_since = Some(2.0);

        let before = snapshot(
            car(TravelDirection::Idle, vec![1], 0.25),
            pending_floors.clone(),
            before_metrics,
        );
        let with_request = reward_fn
            .reward(
                &before,
                &snapshot(
                    car(TravelDirection::Idle, vec![1], 0.25),
                    pending_floors,
                    after_metrics,
                ),
            )
            .unwrap();
        let without_request = reward_fn
            .reward(
                &before,
                &snapshot(
                    car(TravelDirection::Idle, vec![], 0.25),
                    quiet_floors(4),
                    after_metrics,
                ),
            )
            .unwrap();
        assert!(with_request < without_request);
        let expected = -(2.0 * 2.0) - 20.0;
        assert!((with_request - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_elevator_snapshot_is_a_precondition_violation() {
        let reward_fn = RewardFunction::default();
        let empty = WorldSnapshot {
            elevators: vec![],
            floors: quiet_floors(2),
            metrics: WorldMetrics::default(),
        };
        let err = reward_fn.reward(&empty, &empty).unwrap_err();
        assert!(matches!(err, PreconditionViolation::NonFinite { .. }));
    }
}
