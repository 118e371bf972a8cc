use glam::DVec3;

use crate::error::GyrationError;

/// Arithmetic mean of `positions`.
pub fn center_of_mass(positions: &[DVec3]) -> Result<DVec3, GyrationError> {
    if positions.is_empty() {
        return Err(GyrationError::Empty);
    }
    Ok(positions.iter().copied().sum::<DVec3>() / positions.len() as f64)
}

/// Root-mean-square distance of `positions` from their center of mass.
///
/// Every particle has unit mass.
pub fn radius_of_gyration(positions: &[DVec3]) -> Result<f64, GyrationError> {
    let com = center_of_mass(positions)?;
    let sum_sq: f64 = positions.iter().map(|p| p.distance_squared(com)).sum();
    Ok((sum_sq / positions.len() as f64).sqrt())
}
