//! Per-run remodeling state
//!
//! The current material fields, one summary record per completed iteration,
//! and the reason the loop stopped.

use crate::field::ElementField;
use serde::Serialize;

/// Material state carried between iterations
///
/// Owned by the controller, which is its only writer. `density` persists
/// across iterations; `stimulus` and `stiffness` are recomputed from scratch
/// every iteration.
#[derive(Debug, Clone, Serialize)]
pub struct RemodelingState {
    pub density: ElementField,
    pub stimulus: ElementField,
    pub stiffness: ElementField,
    /// Completed iterations
    pub iteration: usize,
}

impl RemodelingState {
    /// Initial state: uniform density, no stimulus computed yet
    pub fn seeded(density: Vec<f64>, stiffness: Vec<f64>) -> Self {
        let n = density.len();
        Self {
            density: ElementField::new("density", density),
            stimulus: ElementField::new("stimulus", vec![0.0; n]),
            stiffness: ElementField::new("stiffness", stiffness),
            iteration: 0,
        }
    }

    pub fn num_elements(&self) -> usize {
        self.density.len()
    }

    /// Replace all fields with the results of one completed iteration
    pub(crate) fn commit(&mut self, density: Vec<f64>, stimulus: ElementField, stiffness: Vec<f64>) {
        self.density.data = density;
        self.stimulus = stimulus;
        self.stiffness.data = stiffness;
        self.iteration += 1;
    }
}

/// Summary of one completed iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    pub density_min: f64,
    pub density_mean: f64,
    pub density_max: f64,
    pub stimulus_mean: f64,
    /// ||ρ_new - ρ_old|| / ||ρ_new||
    pub relative_change: f64,
    /// Elements with Δρ > 0
    pub forming: usize,
    /// Elements with Δρ < 0
    pub resorbing: usize,
    /// Elements with Δρ = 0
    pub quiescent: usize,
}

impl IterationRecord {
    pub fn new(
        iteration: usize,
        density: &ElementField,
        stimulus: &ElementField,
        delta: &[f64],
        relative_change: f64,
    ) -> Self {
        let forming = delta.iter().filter(|&&d| d > 0.0).count();
        let resorbing = delta.iter().filter(|&&d| d < 0.0).count();

        Self {
            iteration,
            density_min: density.min(),
            density_mean: density.mean(),
            density_max: density.max(),
            stimulus_mean: stimulus.mean(),
            relative_change,
            forming,
            resorbing,
            quiescent: delta.len() - forming - resorbing,
        }
    }
}

/// Per-iteration records of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemodelingHistory {
    pub records: Vec<IterationRecord>,
}

impl RemodelingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Termination {
    /// The configured iteration count was reached
    IterationLimit { iterations: usize },
    /// The optional density-change criterion was met
    Converged { iterations: usize, relative_change: f64 },
}

impl Termination {
    pub fn iterations(&self) -> usize {
        match *self {
            Self::IterationLimit { iterations } | Self::Converged { iterations, .. } => iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_commit_advances_iteration() {
        let mut state = RemodelingState::seeded(vec![0.8; 2], vec![64.0; 2]);
        assert_eq!(state.iteration, 0);
        assert_eq!(state.stimulus.data, vec![0.0, 0.0]);

        state.commit(
            vec![0.9, 0.7],
            ElementField::new("stimulus", vec![0.3, 0.2]),
            vec![81.0, 49.0],
        );
        assert_eq!(state.iteration, 1);
        assert_eq!(state.density.name, "density");
        assert_relative_eq!(state.stiffness[1], 49.0);
    }

    #[test]
    fn test_record_counts() {
        let density = ElementField::new("density", vec![0.5, 1.0, 1.5]);
        let stimulus = ElementField::new("stimulus", vec![0.1, 0.25, 0.4]);
        let record = IterationRecord::new(3, &density, &stimulus, &[-0.1, 0.0, 0.2], 0.05);

        assert_eq!(record.iteration, 3);
        assert_eq!((record.forming, record.resorbing, record.quiescent), (1, 1, 1));
        assert_relative_eq!(record.density_mean, 1.0);
        assert_relative_eq!(record.density_min, 0.5);
        assert_relative_eq!(record.density_max, 1.5);
    }

    #[test]
    fn test_termination_iterations() {
        assert_eq!(Termination::IterationLimit { iterations: 50 }.iterations(), 50);
        let t = Termination::Converged { iterations: 7, relative_change: 1e-9 };
        assert_eq!(t.iterations(), 7);
    }
}
