//! World contract and training simulation for the liftq dispatch agent.
//!
//! The decision engine never depends on how a world is simulated or rendered;
//! it consumes the [`World`] trait and the plain-data snapshot types defined
//! here. [`SimWorld`] is the seedable discrete-step implementation used by the
//! training harness and tests.

pub use self::{sim::*, snapshot::*, world::*};

pub mod sim;
pub mod snapshot;
pub mod world;
