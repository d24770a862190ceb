//! Error types for the remodeling loop
//!
//! Every failure is fatal to the run: configuration problems are raised before
//! the first solve, numeric problems at the operation that detects them, and
//! solver failures terminate the loop. Failures inside the loop are wrapped in
//! [`RemodelError::Iteration`] so the report carries the iteration number.

use thiserror::Error;

/// Result alias used throughout the crate
pub type RemodelResult<T> = Result<T, RemodelError>;

#[derive(Error, Debug)]
pub enum RemodelError {
    /// Two per-element fields that must line up have different lengths
    #[error("shape mismatch in {context}: expected {expected} elements, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// A value that is not a finite number (NaN or ±inf)
    #[error("field '{field}' holds a non-numeric value at element {index}: {value}")]
    NonFinite {
        field: &'static str,
        index: usize,
        value: f64,
    },

    /// Zero density reached the stimulus division
    #[error("division by zero: density is 0 at element {index}")]
    DivisionByZero { index: usize },

    /// Negative density passed to the stimulus computation
    #[error("density must be positive, found {value} at element {index}")]
    NonPositiveDensity { index: usize, value: f64 },

    /// The solver reports a mesh without elements
    #[error("the solver mesh has no elements")]
    EmptyMesh,

    /// Element index outside 0..nelem
    #[error("element {index} out of range for a mesh of {nelem} elements")]
    ElementOutOfRange { index: usize, nelem: usize },

    /// The spatial rule was selected but no element centroids were supplied
    #[error("the spatial update rule needs element centroids")]
    MissingGeometry,

    /// A configuration parameter violates its contract
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// The solver session could not be reached or launched
    #[error("solver connection failed: {0}")]
    SolverConnection(String),

    /// The static solve did not produce a usable solution
    #[error("static solve failed: {reason}")]
    SolveFailed { reason: String },

    /// The solver has no result under the requested name
    #[error("solver has no element result '{0}'")]
    MissingResult(String),

    /// The controller already failed and will not continue
    #[error("remodeling run halted after a failure at iteration {iteration}")]
    Halted { iteration: usize },

    /// Failure inside the remodeling loop, tagged with the 1-based iteration
    #[error("remodeling failed at iteration {iteration}: {source}")]
    Iteration {
        iteration: usize,
        #[source]
        source: Box<RemodelError>,
    },
}

impl RemodelError {
    pub fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }

    pub fn shape_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            context,
            expected,
            found,
        }
    }

    /// Tag an error with the iteration it occurred in
    pub fn at_iteration(self, iteration: usize) -> Self {
        match self {
            // Never nest iteration tags
            already @ Self::Iteration { .. } => already,
            other => Self::Iteration {
                iteration,
                source: Box::new(other),
            },
        }
    }

    /// Iteration number, if the error came from inside the loop
    pub fn iteration(&self) -> Option<usize> {
        match self {
            Self::Iteration { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }

    /// Innermost error, with any iteration tag stripped
    pub fn root(&self) -> &RemodelError {
        match self {
            Self::Iteration { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_tag_reports_number_and_cause() {
        let err = RemodelError::DivisionByZero { index: 3 }.at_iteration(7);
        assert_eq!(err.iteration(), Some(7));
        assert!(matches!(err.root(), RemodelError::DivisionByZero { index: 3 }));

        let msg = err.to_string();
        assert!(msg.contains("iteration 7"), "{}", msg);
        assert!(msg.contains("element 3"), "{}", msg);
    }

    #[test]
    fn test_iteration_tag_is_not_nested() {
        let err = RemodelError::MissingResult("SEND".into())
            .at_iteration(2)
            .at_iteration(5);
        assert_eq!(err.iteration(), Some(2));
    }

    #[test]
    fn test_parameter_message_names_field() {
        let err = RemodelError::invalid_parameter("cc", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'cc' = -1: must be positive"
        );
    }
}
