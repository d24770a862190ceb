/// Load-controlled stand-in for an external solver
///
/// Every element carries a prescribed uniaxial stress σᵢ that does not depend
/// on the material state, so the strain energy density of a linear elastic
/// element is known in closed form:
///
/// ```text
/// U_i = σ_i² / (2 E_i)
/// ```
///
/// With the power law E = CC ρ^GC the local rule has the equilibrium density
///
/// ```text
/// ρ* = (σ² / (2 CC K))^(1 / (GC + 1))
/// ```
///
/// which makes this session useful for checking the loop against an exact
/// answer. It is not a finite-element solver: there is no load sharing
/// between elements.

use crate::error::{RemodelError, RemodelResult};
use crate::field::ensure_finite;
use crate::session::{ElementResult, MaterialProperty, SolveStatus, SolverSession};

#[derive(Debug, Clone)]
pub struct PrescribedStressSession {
    stress: Vec<f64>,
    youngs_modulus: Vec<f64>,
    poisson_ratio: Vec<f64>,
    energy: Option<Vec<f64>>,
    solves: usize,
}

impl PrescribedStressSession {
    /// Session with one prescribed stress per element
    ///
    /// Material properties start unset (zero) and must be pushed before the
    /// first solve.
    pub fn new(stress: Vec<f64>) -> RemodelResult<Self> {
        ensure_finite("stress", &stress)?;
        let n = stress.len();
        Ok(Self {
            stress,
            youngs_modulus: vec![0.0; n],
            poisson_ratio: vec![0.0; n],
            energy: None,
            solves: 0,
        })
    }

    /// Stress varying linearly with x across a structured grid of centroids
    ///
    /// Mimics a plate loaded by a pressure that grows from `sigma_left` at
    /// x = 0 to `sigma_right` at x = lx.
    pub fn linear_gradient(
        centroids_x: impl IntoIterator<Item = f64>,
        lx: f64,
        sigma_left: f64,
        sigma_right: f64,
    ) -> RemodelResult<Self> {
        let stress = centroids_x
            .into_iter()
            .map(|x| sigma_left + (sigma_right - sigma_left) * x / lx)
            .collect();
        Self::new(stress)
    }

    pub fn stress(&self) -> &[f64] {
        &self.stress
    }

    pub fn youngs_modulus(&self) -> &[f64] {
        &self.youngs_modulus
    }

    pub fn poisson_ratio(&self) -> &[f64] {
        &self.poisson_ratio
    }

    /// Number of static solves run so far
    pub fn solves(&self) -> usize {
        self.solves
    }

    fn check_index(&self, index: usize) -> RemodelResult<()> {
        if index >= self.stress.len() {
            return Err(RemodelError::ElementOutOfRange {
                index,
                nelem: self.stress.len(),
            });
        }
        Ok(())
    }
}

impl SolverSession for PrescribedStressSession {
    fn num_elements(&self) -> RemodelResult<usize> {
        Ok(self.stress.len())
    }

    fn solve_static(&mut self) -> RemodelResult<SolveStatus> {
        self.solves += 1;
        self.energy = None;

        if let Some(i) = self
            .youngs_modulus
            .iter()
            .position(|&e| !(e.is_finite() && e > 0.0))
        {
            return Ok(SolveStatus::NotConverged {
                reason: format!(
                    "element {} has no positive Young's modulus ({})",
                    i, self.youngs_modulus[i]
                ),
            });
        }

        self.energy = Some(
            self.stress
                .iter()
                .zip(&self.youngs_modulus)
                .map(|(&sigma, &e)| sigma * sigma / (2.0 * e))
                .collect(),
        );
        Ok(SolveStatus::Converged)
    }

    fn element_field(&mut self, result: ElementResult) -> RemodelResult<Vec<f64>> {
        match (result, &self.energy) {
            (ElementResult::StrainEnergyDensity, Some(energy)) => Ok(energy.clone()),
            (_, None) => Err(RemodelError::MissingResult(format!(
                "{} (no solution available)",
                result
            ))),
        }
    }

    fn set_material_property(
        &mut self,
        element: usize,
        property: MaterialProperty,
        value: f64,
    ) -> RemodelResult<()> {
        self.check_index(element)?;
        match property {
            MaterialProperty::YoungsModulus => self.youngs_modulus[element] = value,
            MaterialProperty::PoissonRatio => self.poisson_ratio[element] = value,
        }
        Ok(())
    }

    fn set_material_properties(
        &mut self,
        property: MaterialProperty,
        values: &[f64],
    ) -> RemodelResult<()> {
        if values.len() != self.stress.len() {
            return Err(RemodelError::shape_mismatch(
                "material property push",
                self.stress.len(),
                values.len(),
            ));
        }
        let target = match property {
            MaterialProperty::YoungsModulus => &mut self.youngs_modulus,
            MaterialProperty::PoissonRatio => &mut self.poisson_ratio,
        };
        target.copy_from_slice(values);
        Ok(())
    }

    fn name(&self) -> &str {
        "prescribed-stress"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_energy_density() {
        let mut session = PrescribedStressSession::new(vec![2.0, 0.0]).unwrap();
        session
            .set_material_properties(MaterialProperty::YoungsModulus, &[4.0, 10.0])
            .unwrap();

        assert_eq!(session.solve_static().unwrap(), SolveStatus::Converged);
        let sed = session.element_field(ElementResult::StrainEnergyDensity).unwrap();
        assert_relative_eq!(sed[0], 0.5);
        assert_eq!(sed[1], 0.0);
        assert_eq!(session.solves(), 1);
    }

    #[test]
    fn test_solve_without_material_does_not_converge() {
        let mut session = PrescribedStressSession::new(vec![1.0, 1.0]).unwrap();
        session
            .set_material_property(0, MaterialProperty::YoungsModulus, 5.0)
            .unwrap();

        let status = session.solve_static().unwrap();
        assert!(!status.is_converged());
        assert!(matches!(
            session.element_field(ElementResult::StrainEnergyDensity),
            Err(RemodelError::MissingResult(_))
        ));
    }

    #[test]
    fn test_index_and_length_checks() {
        let mut session = PrescribedStressSession::new(vec![1.0; 3]).unwrap();
        assert!(matches!(
            session.set_material_property(3, MaterialProperty::PoissonRatio, 0.3),
            Err(RemodelError::ElementOutOfRange { index: 3, nelem: 3 })
        ));
        assert!(matches!(
            session.set_material_properties(MaterialProperty::PoissonRatio, &[0.3; 2]),
            Err(RemodelError::ShapeMismatch { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn test_linear_gradient() {
        let session =
            PrescribedStressSession::linear_gradient([0.0, 0.5, 1.0], 1.0, 10.0, 0.0).unwrap();
        assert_relative_eq!(session.stress()[0], 10.0);
        assert_relative_eq!(session.stress()[1], 5.0);
        assert_relative_eq!(session.stress()[2], 0.0);
    }

    #[test]
    fn test_rejects_non_finite_stress() {
        assert!(PrescribedStressSession::new(vec![1.0, f64::NAN]).is_err());
    }
}
