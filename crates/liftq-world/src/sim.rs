//! Discrete-step single-car simulation used for training and tests.
//!
//! The simulation has deliberately simple dynamics: the car travels one floor
//! per tick, door service is folded into the arrival tick, and passengers
//! arrive with exponentially distributed inter-arrival times. What matters
//! for the learner is the contract, not kinematic realism: identical seeds
//! and identical action sequences produce identical snapshot sequences.

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use rand::{Rng as _, SeedableRng as _};
use rand_distr::Exp;
use rand_pcg::Pcg32;

use crate::{
    snapshot::{ElevatorState, FloorState, TravelDirection, WorldMetrics, WorldSnapshot},
    world::{StepOutcome, World},
};

/// Hard upper bound on car capacity; the onboard stop list is stack-allocated.
pub const MAX_CAR_CAPACITY: usize = 16;

/// Seconds of simulated time per tick.
const TICK_SECONDS: f32 = 1.0;

/// Parameters of a simulated episode.
#[derive(Debug, Clone)]
pub struct SimWorldConfig {
    pub floor_count: usize,
    /// Passengers the car can hold at once. At most [`MAX_CAR_CAPACITY`].
    pub capacity: usize,
    /// Mean seconds between passenger arrivals (exponential distribution).
    pub mean_arrival_interval: f32,
    /// Episode length in simulated seconds; the terminal condition.
    pub episode_duration: f32,
}

impl Default for SimWorldConfig {
    fn default() -> Self {
        Self {
            floor_count: 6,
            capacity: 4,
            mean_arrival_interval: 6.0,
            episode_duration: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WaitingPassenger {
    destination: usize,
    arrived_at: f32,
}

/// A seedable single-car elevator world.
#[derive(Debug, Clone)]
pub struct SimWorld {
    config: SimWorldConfig,
    rng: Pcg32,
    arrival: Exp<f32>,
    time: f32,
    next_arrival_at: f32,
    car_floor: usize,
    car_destination: Option<usize>,
    /// Destination floors of onboard passengers, one entry per passenger.
    onboard: ArrayVec<usize, MAX_CAR_CAPACITY>,
    waiting: Vec<VecDeque<WaitingPassenger>>,
    transported: u64,
    moves: u64,
    total_wait: f32,
    max_wait: f32,
    boarded: u64,
}

impl SimWorld {
    /// Creates a world with the given parameters and RNG seed.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is degenerate (fewer than two floors,
    /// zero or over-bound capacity, non-positive arrival interval or
    /// duration).
    #[must_use]
    pub fn new(config: SimWorldConfig, seed: u64) -> Self {
        assert!(config.floor_count >= 2, "need at least two floors");
        assert!(
            config.capacity >= 1 && config.capacity <= MAX_CAR_CAPACITY,
            "capacity must be in 1..={MAX_CAR_CAPACITY}"
        );
        assert!(config.mean_arrival_interval > 0.0);
        assert!(config.episode_duration > 0.0);

        let mut rng = Pcg32::seed_from_u64(seed);
        let arrival = Exp::new(1.0 / config.mean_arrival_interval).unwrap();
        let next_arrival_at = rng.sample(arrival);
        let waiting = (0..config.floor_count).map(|_| VecDeque::new()).collect();
        Self {
            config,
            rng,
            arrival,
            time: 0.0,
            next_arrival_at,
            car_floor: 0,
            car_destination: None,
            onboard: ArrayVec::new(),
            waiting,
            transported: 0,
            moves: 0,
            total_wait: 0.0,
            max_wait: 0.0,
            boarded: 0,
        }
    }

    /// Mean wait of passengers that have boarded so far, seconds.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_wait_time(&self) -> f32 {
        if self.boarded == 0 {
            0.0
        } else {
            self.total_wait / self.boarded as f32
        }
    }

    /// Longest wait of any passenger that has boarded so far, seconds.
    #[must_use]
    pub fn max_wait_time(&self) -> f32 {
        self.max_wait
    }

    fn advance_tick(&mut self) {
        self.time += TICK_SECONDS;
        self.spawn_arrivals();
        if let Some(dest) = self.car_destination {
            if dest == self.car_floor {
                self.arrive();
            } else {
                if dest > self.car_floor {
                    self.car_floor += 1;
                } else {
                    self.car_floor -= 1;
                }
                self.moves += 1;
                if self.car_floor == dest {
                    self.arrive();
                }
            }
        }
    }

    fn spawn_arrivals(&mut self) {
        while self.next_arrival_at <= self.time {
            let origin = self.rng.random_range(0..self.config.floor_count);
            // uniform over the other floors
            let mut destination = self.rng.random_range(0..self.config.floor_count - 1);
            if destination >= origin {
                destination += 1;
            }
            self.waiting[origin].push_back(WaitingPassenger {
                destination,
                arrived_at: self.next_arrival_at,
            });
            self.next_arrival_at += self.rng.sample(self.arrival);
        }
    }

    fn arrive(&mut self) {
        let floor = self.car_floor;
        self.car_destination = None;

        let before = self.onboard.len();
        self.onboard.retain(|dest| *dest != floor);
        self.transported += (before - self.onboard.len()) as u64;

        while self.onboard.len() < self.config.capacity {
            let Some(passenger) = self.waiting[floor].pop_front() else {
                break;
            };
            let wait = self.time - passenger.arrived_at;
            self.total_wait += wait;
            self.max_wait = self.max_wait.max(wait);
            self.boarded += 1;
            self.onboard.push(passenger.destination);
        }
    }

    fn elevator_snapshot(&self) -> ElevatorState {
        let direction = match self.car_destination {
            Some(dest) if dest > self.car_floor => TravelDirection::Up,
            Some(dest) if dest < self.car_floor => TravelDirection::Down,
            _ => TravelDirection::Idle,
        };
        let mut pressed_floors: Vec<usize> = self.onboard.to_vec();
        pressed_floors.sort_unstable();
        pressed_floors.dedup();
        #[expect(clippy::cast_precision_loss)]
        let load_factor = self.onboard.len() as f32 / self.config.capacity as f32;
        ElevatorState {
            current_floor: self.car_floor,
            load_factor,
            destination_direction: direction,
            pressed_floors,
            going_up: direction.is_up(),
            going_down: direction.is_down(),
        }
    }

    fn floor_snapshot(&self, floor: usize) -> FloorState {
        let earliest = |upward: bool| {
            self.waiting[floor]
                .iter()
                .filter(|p| (p.destination > floor) == upward)
                .map(|p| p.arrived_at)
                .reduce(f32::min)
        };
        FloorState {
            up_pressed_since: earliest(true),
            down_pressed_since: earliest(false),
        }
    }

    #[cfg(test)]
    fn push_waiting(&mut self, floor: usize, destination: usize, arrived_at: f32) {
        self.waiting[floor].push_back(WaitingPassenger {
            destination,
            arrived_at,
        });
    }
}

impl World for SimWorld {
    fn floor_count(&self) -> usize {
        self.config.floor_count
    }

    fn elevator_count(&self) -> usize {
        1
    }

    fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            elevators: vec![self.elevator_snapshot()],
            floors: (0..self.config.floor_count)
                .map(|floor| self.floor_snapshot(floor))
                .collect(),
            metrics: WorldMetrics {
                elapsed_time: self.time,
                transported_count: self.transported,
                move_count: self.moves,
            },
        }
    }

    fn take_action(&mut self, target_floor: usize) -> StepOutcome {
        assert!(target_floor < self.config.floor_count, "target out of range");
        assert!(!self.is_episode_ended(), "action submitted after episode end");

        self.car_destination = Some(target_floor);
        loop {
            if self.time >= self.config.episode_duration {
                return StepOutcome::Ended;
            }
            self.advance_tick();
            if self.car_destination.is_none() {
                return StepOutcome::Settled(self.snapshot());
            }
        }
    }

    fn is_episode_ended(&self) -> bool {
        self.time >= self.config.episode_duration
    }
}
