//! The liftq decision engine: everything that turns world snapshots into
//! dispatch decisions and learns from the outcome.
//!
//! # Architecture
//!
//! ```text
//! WorldSnapshot
//!     ↓ encoded by
//! ObservationEncoder (fixed feature schema)
//!     ↓ consumed by
//! ExplorationPolicy ── explores via ActionSpace
//!     │                exploits via ValueNetwork (argmax)
//!     ↓
//! Action (target floor)
//! ```
//!
//! The [`ValueNetwork`] maps an observation to one predicted return per
//! action. The [`TargetNetwork`] holds a lagged copy of its parameters and is
//! consulted only when the trainer builds bootstrapped targets; syncing it on
//! a cadence keeps those targets from chasing the network being updated.
//! The [`RewardFunction`] derives the shaping signal from the change between
//! two settled snapshots.
//!
//! Contract violations (mismatched observation shapes, non-finite numbers)
//! surface as [`PreconditionViolation`] and abort the operation; they are
//! never silently coerced.

pub use self::{
    action::{Action, ActionSpace},
    error::PreconditionViolation,
    net::{Topology, ValueNetwork},
    observation::{FeatureSchema, Observation, ObservationEncoder, WAIT_SENTINEL},
    policy::{ExplorationPolicy, ExploreSchedule},
    reward::{RewardFunction, RewardWeights},
    target::TargetNetwork,
};

pub mod action;
pub mod error;
pub mod net;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod target;
