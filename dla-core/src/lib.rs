//! Core 3-D diffusion-limited aggregation library.
//!
//! Free ions random-walk with a bias towards the nearest bonded particle
//! until they touch the cluster growing from a seed electrode at the origin.
//!
//! Main components:
//! - [`layout`] — initial ion placement policies.
//! - [`particle`] — ion and electrode states.
//! - [`cluster`] — the electrode tree and nearest-electrode lookup.
//! - [`engine`] — sweeps: bonding test, bond snapping and biased steps.
//! - [`gyration`] — radius of gyration of the final particle set.
//! - [`simulation`] — one complete run, the entry point for consumers.
//! - [`results`] — per-atom-count storage of gyration results.
//! - [`fractal`] — fractal dimension fit over stored results.
//! - [`config`] — tunable engine parameters.
//! - [`error`] — error types.
//! - [`types`] — shared type aliases and IDs.

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod fractal;
pub mod gyration;
pub mod layout;
pub mod particle;
pub mod results;
pub mod simulation;
pub mod types;

pub use config::{Config, SweepMode};
pub use engine::RunOutcome;
pub use error::{ConfigError, DlaError, FitError, GyrationError, StoreError};
pub use layout::Layout;
pub use results::{GyrationSample, GyrationSink, GyrationTable, JsonStore};
pub use simulation::{ParticleKind, ParticleView, SimState, SimulationRun};
