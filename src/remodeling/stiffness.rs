/// Density to stiffness mapping
///
/// Young's modulus follows a Currey-type power law of the apparent density:
///
/// ```text
/// E = CC · ρ^GC
/// ```
///
/// # References
/// - Currey (1988), "The effect of porosity and mineral content on the
///   Young's modulus of elasticity of compact bone"
/// - Weinans, Huiskes & Grootenboer (1992), "The behavior of adaptive
///   bone-remodeling simulation models"

use crate::error::RemodelResult;
use crate::field::ensure_finite;
use crate::remodeling::parameters::{require_positive, DensityBounds};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StiffnessLaw {
    /// Linear constant CC (modulus per density^GC)
    pub cc: f64,
    /// Exponent GC (dimensionless)
    pub gc: f64,
}

impl StiffnessLaw {
    /// Create a power law, both constants must be finite and > 0
    pub fn new(cc: f64, gc: f64) -> RemodelResult<Self> {
        require_positive("cc", cc)?;
        require_positive("gc", gc)?;
        Ok(Self { cc, gc })
    }

    /// Young's modulus for a single density
    #[inline]
    pub fn youngs_modulus(&self, rho: f64) -> f64 {
        self.cc * rho.powf(self.gc)
    }

    /// Young's modulus for every element
    ///
    /// Fails without computing anything if the density holds a non-finite value.
    pub fn apply(&self, density: &[f64]) -> RemodelResult<Vec<f64>> {
        ensure_finite("density", density)?;
        let young: Vec<f64> = density
            .par_iter()
            .map(|&rho| self.youngs_modulus(rho))
            .collect();
        // Overflow of CC·ρ^GC for extreme inputs
        ensure_finite("stiffness", &young)?;
        Ok(young)
    }

    /// Modulus range reachable from densities inside `bounds`
    pub fn modulus_range(&self, bounds: &DensityBounds) -> (f64, f64) {
        (self.youngs_modulus(bounds.min), self.youngs_modulus(bounds.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemodelError;
    use approx::assert_relative_eq;

    #[test]
    fn test_currey_reference_value() {
        let law = StiffnessLaw::new(100.0, 2.0).unwrap();
        assert_relative_eq!(law.youngs_modulus(0.8), 64.0, epsilon = 1e-12);
    }

    #[test]
    fn test_large_magnitudes() {
        let law = StiffnessLaw::new(2.0e8, 2.0).unwrap();
        assert_relative_eq!(law.youngs_modulus(1.2e8), 2.88e24, max_relative = 1e-12);
    }

    #[test]
    fn test_fractional_exponent() {
        let law = StiffnessLaw::new(3790.0, 3.0).unwrap();
        assert_relative_eq!(law.youngs_modulus(0.5), 3790.0 / 8.0, epsilon = 1e-9);

        let law = StiffnessLaw::new(10.0, 0.5).unwrap();
        assert_relative_eq!(law.youngs_modulus(4.0), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_constants() {
        assert!(matches!(
            StiffnessLaw::new(0.0, 2.0),
            Err(RemodelError::InvalidParameter { name: "cc", .. })
        ));
        assert!(matches!(
            StiffnessLaw::new(100.0, -1.0),
            Err(RemodelError::InvalidParameter { name: "gc", .. })
        ));
        assert!(matches!(
            StiffnessLaw::new(f64::NAN, 2.0),
            Err(RemodelError::InvalidParameter { name: "cc", .. })
        ));
    }

    #[test]
    fn test_monotone_in_density() {
        let law = StiffnessLaw::new(100.0, 2.0).unwrap();
        let rho: Vec<f64> = (1..=50).map(|i| i as f64 * 0.04).collect();
        let young = law.apply(&rho).unwrap();
        assert!(young.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_apply_rejects_nan_density() {
        let law = StiffnessLaw::new(100.0, 2.0).unwrap();
        assert!(matches!(
            law.apply(&[0.5, f64::NAN]),
            Err(RemodelError::NonFinite { field: "density", index: 1, .. })
        ));
    }

    #[test]
    fn test_clamped_density_stays_in_modulus_range() {
        let law = StiffnessLaw::new(100.0, 2.0).unwrap();
        let bounds = DensityBounds::new(0.01, 1.74).unwrap();
        let (e_min, e_max) = law.modulus_range(&bounds);

        let rho: Vec<f64> = [-3.0, 0.0, 0.005, 0.9, 1.74, 25.0]
            .iter()
            .map(|&r: &f64| r.clamp(bounds.min, bounds.max))
            .collect();
        for e in law.apply(&rho).unwrap() {
            assert!(e >= e_min && e <= e_max, "{} outside [{}, {}]", e, e_min, e_max);
        }
    }
}
