//! Boundary to the external finite-element solver
//!
//! The remodeling loop never sees a mesh or a stiffness matrix. It talks to a
//! [`SolverSession`] that owns the model (geometry, mesh, supports, loads), runs
//! static solves, reports per-element results and accepts per-element material
//! properties. Elements are addressed 0..N-1; any offset to the solver's own
//! numbering belongs inside the session implementation.

pub mod prescribed;

pub use prescribed::PrescribedStressSession;

use crate::error::RemodelResult;
use std::fmt;

/// Outcome of a static solve
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    Converged,
    NotConverged { reason: String },
}

impl SolveStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }
}

/// Per-element results the loop reads back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementResult {
    /// Elastic strain energy density
    StrainEnergyDensity,
}

impl ElementResult {
    /// Result label in the solver's vocabulary
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrainEnergyDensity => "SEND",
        }
    }
}

impl fmt::Display for ElementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-element material properties the loop writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialProperty {
    YoungsModulus,
    PoissonRatio,
}

impl MaterialProperty {
    pub fn label(&self) -> &'static str {
        match self {
            Self::YoungsModulus => "EX",
            Self::PoissonRatio => "PRXY",
        }
    }
}

impl fmt::Display for MaterialProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// RPC-like handle on a running solver
///
/// Boundary conditions and loads are registered by whoever builds the session;
/// they stay fixed for the whole run. Transport-level retries, if any, live in
/// the implementation: an `Err` returned here ends the run.
pub trait SolverSession {
    /// Number of elements N, fixed for the lifetime of the session
    fn num_elements(&self) -> RemodelResult<usize>;

    /// Run a static analysis with the current material state
    fn solve_static(&mut self) -> RemodelResult<SolveStatus>;

    /// Read one scalar per element from the last solution step
    fn element_field(&mut self, result: ElementResult) -> RemodelResult<Vec<f64>>;

    /// Set a material property of one element
    fn set_material_property(
        &mut self,
        element: usize,
        property: MaterialProperty,
        value: f64,
    ) -> RemodelResult<()>;

    /// Set a material property for every element, `values[i]` on element i
    ///
    /// Sessions with a vectorised API should override this.
    fn set_material_properties(
        &mut self,
        property: MaterialProperty,
        values: &[f64],
    ) -> RemodelResult<()> {
        for (element, &value) in values.iter().enumerate() {
            self.set_material_property(element, property, value)?;
        }
        Ok(())
    }

    /// Solver name for log messages
    fn name(&self) -> &str {
        "solver"
    }
}

impl<S: SolverSession + ?Sized> SolverSession for &mut S {
    fn num_elements(&self) -> RemodelResult<usize> {
        (**self).num_elements()
    }

    fn solve_static(&mut self) -> RemodelResult<SolveStatus> {
        (**self).solve_static()
    }

    fn element_field(&mut self, result: ElementResult) -> RemodelResult<Vec<f64>> {
        (**self).element_field(result)
    }

    fn set_material_property(
        &mut self,
        element: usize,
        property: MaterialProperty,
        value: f64,
    ) -> RemodelResult<()> {
        (**self).set_material_property(element, property, value)
    }

    fn set_material_properties(
        &mut self,
        property: MaterialProperty,
        values: &[f64],
    ) -> RemodelResult<()> {
        (**self).set_material_properties(property, values)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
