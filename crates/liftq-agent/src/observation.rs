//! Fixed-schema numeric encoding of world state.
//!
//! The encoder is a pure function of a snapshot; it keeps no memory between
//! decision steps. Feature order is part of the contract: a trained network
//! is only valid for the exact schema it was trained against, so any change
//! in order or composition invalidates previously exported models.
//!
//! # Schema
//!
//! For each elevator, in ascending index order:
//!
//! 1. current floor
//! 2. load factor
//! 3. going-up indicator (0/1)
//! 4. going-down indicator (0/1)
//! 5. destination direction code (-1/0/1)
//! 6. one pressed-stop flag per floor (0/1)
//!
//! Then for each floor, in ascending index order: seconds since the up call
//! button was pressed and seconds since the down call button was pressed,
//! with [`WAIT_SENTINEL`] standing in when a button is inactive. The sentinel
//! lets the network tell "button off" from "button just pressed" without a
//! separate flag.

use liftq_world::WorldSnapshot;

use crate::error::PreconditionViolation;

/// Value encoded for an inactive call button.
pub const WAIT_SENTINEL: f32 = -5.0;

/// A feature vector for one decision step.
///
/// Produced fresh on every step and owned by the caller that requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    values: Vec<f32>,
}

impl Observation {
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds an observation directly from raw feature values.
    ///
    /// Intended for replaying recorded episodes and for tests; normal
    /// operation goes through [`ObservationEncoder::encode`].
    #[must_use]
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }
}

/// Ordered feature names for one `(floor_count, elevator_count)` shape.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    fn for_shape(floor_count: usize, elevator_count: usize) -> Self {
        let mut names =
            Vec::with_capacity(observation_len(floor_count, elevator_count));
        for e in 0..elevator_count {
            names.push(format!("e{e}_current_floor"));
            names.push(format!("e{e}_load_factor"));
            names.push(format!("e{e}_going_up"));
            names.push(format!("e{e}_going_down"));
            names.push(format!("e{e}_direction"));
            for f in 0..floor_count {
                names.push(format!("e{e}_stop_f{f}"));
            }
        }
        for f in 0..floor_count {
            names.push(format!("f{f}_up_wait"));
            names.push(format!("f{f}_down_wait"));
        }
        Self { names }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

const fn observation_len(floor_count: usize, elevator_count: usize) -> usize {
    2 * floor_count + 5 * elevator_count + floor_count * elevator_count
}

/// Encodes snapshots of a fixed world shape into observations.
#[derive(Debug, Clone)]
pub struct ObservationEncoder {
    floor_count: usize,
    elevator_count: usize,
    schema: FeatureSchema,
}

impl ObservationEncoder {
    /// Creates an encoder for a world with the given shape.
    ///
    /// # Panics
    ///
    /// Panics if either count is zero.
    #[must_use]
    pub fn new(floor_count: usize, elevator_count: usize) -> Self {
        assert!(floor_count > 0 && elevator_count > 0);
        Self {
            floor_count,
            elevator_count,
            schema: FeatureSchema::for_shape(floor_count, elevator_count),
        }
    }

    /// Length of every observation this encoder produces.
    #[must_use]
    pub fn observation_len(&self) -> usize {
        observation_len(self.floor_count, self.elevator_count)
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encodes a snapshot into a fresh observation.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation::SnapshotShape`] if the snapshot was
    /// taken from a world of a different shape.
    pub fn encode(&self, snapshot: &WorldSnapshot) -> Result<Observation, PreconditionViolation> {
        if snapshot.floor_count() != self.floor_count
            || snapshot.elevator_count() != self.elevator_count
        {
            return Err(PreconditionViolation::SnapshotShape {
                floors: self.floor_count,
                elevators: self.elevator_count,
                got_floors: snapshot.floor_count(),
                got_elevators: snapshot.elevator_count(),
            });
        }

        let now = snapshot.metrics.elapsed_time;
        let mut values = Vec::with_capacity(self.observation_len());
        for elevator in &snapshot.elevators {
            #[expect(clippy::cast_precision_loss)]
            values.push(elevator.current_floor as f32);
            values.push(elevator.load_factor);
            values.push(f32::from(elevator.going_up));
            values.push(f32::from(elevator.going_down));
            values.push(elevator.destination_direction.code());
            for floor in 0..self.floor_count {
                values.push(f32::from(elevator.has_pressed_floor(floor)));
            }
        }
        for floor in &snapshot.floors {
            let wait = |pressed_since: Option<f32>| {
                pressed_since.map_or(WAIT_SENTINEL, |since| now - since)
            };
            values.push(wait(floor.up_pressed_since));
            values.push(wait(floor.down_pressed_since));
        }
        debug_assert_eq!(values.len(), self.observation_len());
        Ok(Observation { values })
    }
}
