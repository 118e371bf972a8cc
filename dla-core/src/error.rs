//! Error taxonomy for the aggregation core.
//!
//! - [`ConfigError`] — rejected parameters, raised before any stepping.
//! - [`GyrationError`] — gyration requested over an empty particle set.
//! - [`StoreError`] — failures of the file-backed result store.
//! - [`FitError`] — not enough usable samples for a fractal-dimension fit.
//!
//! [`DlaError`] wraps all of them for callers that do not care which stage failed.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("atom count must be at least 1")]
    InvalidAtomCount,
    #[error("direction bias {0} must be between 0.0 and 1.0")]
    InvalidProbability(f64),
    #[error("{name} must be finite and positive, got {value}")]
    InvalidLength { name: &'static str, value: f64 },
    #[error("sweep budget must allow at least one sweep")]
    InvalidSweepBudget,
    #[error("unknown layout `{0}` (expected cube, sphere or random)")]
    UnknownLayout(String),
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GyrationError {
    #[error("radius of gyration is undefined for zero particles")]
    Empty,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("result store is not valid JSON")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("need at least 2 samples to fit a line, found {found}")]
    NotEnoughSamples { found: usize },
    #[error("sample (atoms = {atoms}, radius = {radius}) has no logarithm")]
    NonPositive { atoms: usize, radius: f64 },
    #[error("all samples share the same radius of gyration")]
    Degenerate,
}

#[derive(Debug, Error)]
pub enum DlaError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gyration(#[from] GyrationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Fit(#[from] FitError),
}
