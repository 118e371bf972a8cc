use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How bonds formed during a sweep affect the ions evaluated after them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Bonds are committed as soon as they happen, so an ion bonding early in a
    /// sweep can already be the nearest electrode for ions processed later.
    #[default]
    Immediate,
    /// Every ion of a sweep is evaluated against the electrodes that existed
    /// when the sweep started; bonds become visible from the next sweep on.
    Snapshot,
}

/// Tunable parameters of the aggregation engine.
///
/// Lengths are in the same arbitrary units as the generated layouts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Collision radius of a single particle.
    pub atom_radius: f64,
    /// Distance an ion travels in one sweep.
    pub step: f64,
    /// Weight of the pull towards the nearest electrode, in `[0, 1]`.
    pub direc_prob: f64,
    pub sweep_mode: SweepMode,
    /// Upper bound on sweeps before a run is reported as aborted.
    pub max_sweeps: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            atom_radius: 0.7,
            step: 0.25,
            direc_prob: 0.1,
            sweep_mode: SweepMode::Immediate,
            max_sweeps: None,
        }
    }
}

impl Config {
    /// Parses a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_length("atom_radius", self.atom_radius)?;
        check_length("step", self.step)?;
        if !(0.0..=1.0).contains(&self.direc_prob) {
            return Err(ConfigError::InvalidProbability(self.direc_prob));
        }
        if self.max_sweeps == Some(0) {
            return Err(ConfigError::InvalidSweepBudget);
        }
        Ok(())
    }

    /// Distance from the nearest electrode at or below which an ion bonds.
    pub fn bonding_radius(&self) -> f64 {
        2.0 * self.atom_radius + self.step / 2.0
    }

    /// Distance between a freshly bonded electrode and its parent.
    pub fn bond_length(&self) -> f64 {
        2.0 * self.atom_radius
    }
}

fn check_length(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLength { name, value })
    }
}
