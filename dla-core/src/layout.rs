//! Initial placement of free ions.
//!
//! A [`Layout`] names one of three placement policies; [`generate`] turns it
//! into `count` starting positions using a caller-owned random source.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Points on the surface of an axis-aligned cube.
    Cube,
    /// Points on a sphere, using an angle parametrization that is not
    /// area-uniform (points cluster towards the poles).
    Sphere,
    /// Integer lattice points drawn uniformly from a cube volume.
    Random,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Cube, Layout::Sphere, Layout::Random];

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Cube => "cube",
            Layout::Sphere => "sphere",
            Layout::Random => "random",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cube" => Ok(Layout::Cube),
            "sphere" => Ok(Layout::Sphere),
            "random" => Ok(Layout::Random),
            _ => Err(ConfigError::UnknownLayout(s.to_string())),
        }
    }
}

/// Half edge of the cube layout for `count` particles: `count^0.56`.
pub fn cube_half_edge(count: usize) -> f64 {
    (count as f64).powf(0.56)
}

/// Radius of the sphere layout for `count` particles: `2 * sqrt(count)`.
pub fn sphere_radius(count: usize) -> f64 {
    2.0 * (count as f64).sqrt()
}

/// Half extent of the random layout volume: `ceil(sqrt(count))`.
pub fn random_half_extent(count: usize) -> i64 {
    (count as f64).sqrt().ceil() as i64
}

/// Generates `count` starting positions for the given layout.
///
/// `count == 0` yields an empty vector.
pub fn generate(layout: Layout, count: usize, rng: &mut impl Rng) -> Vec<DVec3> {
    match layout {
        Layout::Cube => cube_surface(count, rng),
        Layout::Sphere => sphere_surface(count, rng),
        Layout::Random => random_volume(count, rng),
    }
}

fn cube_surface(count: usize, rng: &mut impl Rng) -> Vec<DVec3> {
    let half_edge = cube_half_edge(count);
    (0..count)
        .map(|_| {
            let pinned = rng.random_range(0..3);
            let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

            let mut pos = DVec3::ZERO;
            for axis in 0..3 {
                pos[axis] = if axis == pinned {
                    half_edge * side
                } else {
                    rng.random_range(-half_edge..=half_edge)
                };
            }
            pos
        })
        .collect()
}

fn sphere_surface(count: usize, rng: &mut impl Rng) -> Vec<DVec3> {
    let r = sphere_radius(count);
    (0..count)
        .map(|_| {
            let phi: f64 = rng.random_range(0.0..PI);
            let theta: f64 = rng.random_range(0.0..TAU);
            DVec3::new(
                r * phi.cos() * theta.sin(),
                r * phi.sin() * theta.sin(),
                r * theta.cos(),
            )
        })
        .collect()
}

fn random_volume(count: usize, rng: &mut impl Rng) -> Vec<DVec3> {
    let m = random_half_extent(count);
    (0..count)
        .map(|_| {
            let x = rng.random_range(-m..=m);
            let y = rng.random_range(-m..=m);
            let z = rng.random_range(-m..=m);
            DVec3::new(x as f64, y as f64, z as f64)
        })
        .collect()
}
