//! Remodeling stimulus
//!
//! The driving signal of the Huiskes-family models is the strain energy
//! density per unit mass:
//!
//! ```text
//! S_i = U_i / ρ_i
//! ```

use crate::error::{RemodelError, RemodelResult};
use crate::field::{ensure_finite, ensure_len, ElementField};
use rayon::prelude::*;

/// Stateless stimulus computation
#[derive(Debug, Clone, Copy, Default)]
pub struct StimulusEngine;

impl StimulusEngine {
    pub fn new() -> Self {
        Self
    }

    /// Stimulus of a single element
    ///
    /// A zero density is reported as [`RemodelError::DivisionByZero`] rather
    /// than producing an infinite stimulus.
    pub fn element_stimulus(&self, index: usize, energy: f64, density: f64) -> RemodelResult<f64> {
        if !energy.is_finite() {
            return Err(RemodelError::NonFinite {
                field: "energy",
                index,
                value: energy,
            });
        }
        if !density.is_finite() {
            return Err(RemodelError::NonFinite {
                field: "density",
                index,
                value: density,
            });
        }
        if density == 0.0 {
            return Err(RemodelError::DivisionByZero { index });
        }
        if density < 0.0 {
            return Err(RemodelError::NonPositiveDensity { index, value: density });
        }
        Ok(energy / density)
    }

    /// Element-wise stimulus for the whole mesh
    pub fn compute(&self, energy: &[f64], density: &[f64]) -> RemodelResult<ElementField> {
        ensure_len("stimulus (energy vs density)", density.len(), energy.len())?;
        ensure_finite("energy", energy)?;
        ensure_finite("density", density)?;
        // Report the lowest bad index, like the finiteness checks
        if let Some(index) = density.iter().position(|&rho| rho <= 0.0) {
            self.element_stimulus(index, energy[index], density[index])?;
        }

        let stimulus = energy
            .par_iter()
            .zip(density.par_iter())
            .enumerate()
            .map(|(index, (&u, &rho))| self.element_stimulus(index, u, rho))
            .collect::<RemodelResult<Vec<f64>>>()?;

        Ok(ElementField::new("stimulus", stimulus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_values() {
        let engine = StimulusEngine::new();
        assert_relative_eq!(engine.element_stimulus(0, 0.25, 0.8).unwrap(), 0.3125, epsilon = 1e-15);
        assert_relative_eq!(engine.element_stimulus(0, 10.0, 2.0).unwrap(), 5.0);
        assert_relative_eq!(engine.element_stimulus(0, 2.7e8, 1.2e8).unwrap(), 2.25, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_density_is_division_by_zero() {
        let engine = StimulusEngine::new();
        assert!(matches!(
            engine.compute(&[1.0, 1.0], &[0.5, 0.0]),
            Err(RemodelError::DivisionByZero { index: 1 })
        ));
    }

    #[test]
    fn test_first_bad_density_is_reported() {
        let engine = StimulusEngine::new();
        let density: Vec<f64> = (0..4096).map(|i| if i % 7 == 3 { 0.0 } else { 1.0 }).collect();
        let energy = vec![0.5; density.len()];
        assert!(matches!(
            engine.compute(&energy, &density),
            Err(RemodelError::DivisionByZero { index: 3 })
        ));

        assert!(matches!(
            engine.compute(&[0.5, 0.5, 0.5], &[1.0, -2.0, 0.0]),
            Err(RemodelError::NonPositiveDensity { index: 1, .. })
        ));
    }

    #[test]
    fn test_negative_density_rejected() {
        let engine = StimulusEngine::new();
        assert!(matches!(
            engine.compute(&[0.5], &[-2.0]),
            Err(RemodelError::NonPositiveDensity { index: 0, .. })
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let engine = StimulusEngine::new();
        assert!(matches!(
            engine.compute(&[1.0, 2.0, 3.0], &[1.0, 1.0]),
            Err(RemodelError::ShapeMismatch { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn test_non_finite_inputs() {
        let engine = StimulusEngine::new();
        assert!(matches!(
            engine.compute(&[1.0, f64::NAN], &[1.0, 1.0]),
            Err(RemodelError::NonFinite { field: "energy", index: 1, .. })
        ));
        assert!(matches!(
            engine.compute(&[1.0, 1.0], &[f64::INFINITY, 1.0]),
            Err(RemodelError::NonFinite { field: "density", index: 0, .. })
        ));
    }

    #[test]
    fn test_negative_energy_passes_through() {
        let engine = StimulusEngine::new();
        let s = engine.compute(&[-0.5], &[2.0]).unwrap();
        assert_relative_eq!(s[0], -0.25);
    }

    #[test]
    fn test_linear_in_energy() {
        let engine = StimulusEngine::new();
        let energy = [0.1, 0.25, 3.0, 0.0];
        let density = [0.8, 1.2, 0.05, 1.74];
        let k = 3.5;

        let base = engine.compute(&energy, &density).unwrap();
        let scaled_energy: Vec<f64> = energy.iter().map(|u| k * u).collect();
        let scaled = engine.compute(&scaled_energy, &density).unwrap();

        for (a, b) in base.data.iter().zip(&scaled.data) {
            assert_relative_eq!(*b, k * a, max_relative = 1e-14);
        }
    }
}
