//! Fractal dimension estimate from `(atom count, radius of gyration)` pairs.
//!
//! For a fractal aggregate `N ~ Rg^Df`, so a straight line fitted through
//! `(log10 Rg, log10 N)` has slope `Df`.

use crate::error::FitError;

/// `y = slope * x + intercept`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FractalFit {
    pub dimension: f64,
    pub intercept: f64,
    /// `(log10 Rg, log10 N)` for every sample, in input order.
    pub points: Vec<(f64, f64)>,
}

impl FractalFit {
    pub fn line(&self) -> LineFit {
        LineFit {
            slope: self.dimension,
            intercept: self.intercept,
        }
    }
}

/// Ordinary least-squares line through `points`.
pub fn linear_fit(points: &[(f64, f64)]) -> Result<LineFit, FitError> {
    if points.len() < 2 {
        return Err(FitError::NotEnoughSamples {
            found: points.len(),
        });
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for &(x, y) in points {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return Err(FitError::Degenerate);
    }

    let slope = sxy / sxx;
    Ok(LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Fits `log10 N = Df * log10 Rg + c` over `(atoms, radius)` samples.
pub fn fractal_dimension(samples: &[(usize, f64)]) -> Result<FractalFit, FitError> {
    let points = samples
        .iter()
        .map(|&(atoms, radius)| {
            if atoms > 0 && radius.is_finite() && radius > 0.0 {
                Ok((radius.log10(), (atoms as f64).log10()))
            } else {
                Err(FitError::NonPositive { atoms, radius })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let line = linear_fit(&points)?;
    Ok(FractalFit {
        dimension: line.slope,
        intercept: line.intercept,
        points,
    })
}
