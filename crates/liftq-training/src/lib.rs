//! Episode orchestration and temporal-difference training.
//!
//! # How an episode becomes a gradient step
//!
//! 1. [`EpisodeDriver`] plays one episode: observe, select an action, submit
//!    it, wait for the world to settle, record, until the world reports its
//!    terminal condition. The recorded [`Trajectory`] is trimmed so every
//!    observation/action pair has a matching reward.
//! 2. [`Trainer`] converts the trajectory into supervised targets by
//!    bootstrapping off the lagged target network, fits the online network
//!    once over the episode batch, and syncs the target network on its
//!    cadence.
//!
//! Exactly one action is ever pending: the driver never submits again before
//! the previous outcome has been observed, so `reward[t]` always corresponds
//! to `action[t]`. Training runs only between episodes, never interleaved
//! with stepping.

pub use self::{
    driver::{EpisodeDriver, EpisodeReport},
    trainer::{Trainer, TrainingReport},
    trajectory::Trajectory,
};

pub mod driver;
pub mod trainer;
pub mod trajectory;
