//! Per-element field data
//!
//! An [`ElementField`] holds one value per finite element, indexed 0..N-1 in
//! the solver's element order. The free functions at the bottom are the
//! validation checks applied at every operation boundary.

use crate::error::{RemodelError, RemodelResult};
use serde::Serialize;

/// Named per-element data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementField<T = f64> {
    pub name: &'static str,
    pub data: Vec<T>,
}

impl<T> ElementField<T> {
    pub fn new(name: &'static str, data: Vec<T>) -> Self {
        Self { name, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

impl<T: Clone> ElementField<T> {
    /// Field with the same value on every element
    pub fn uniform(name: &'static str, nelem: usize, value: T) -> Self {
        Self::new(name, vec![value; nelem])
    }
}

impl ElementField<f64> {
    /// Fail on the first non-finite entry
    pub fn ensure_finite(&self) -> RemodelResult<()> {
        ensure_finite(self.name, &self.data)
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Arithmetic mean, 0 for an empty field
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }
}

impl<T> std::ops::Index<usize> for ElementField<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}

/// Check that every value is a finite number
pub fn ensure_finite(field: &'static str, values: &[f64]) -> RemodelResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(RemodelError::NonFinite {
            field,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Check that a field has the expected number of elements
pub fn ensure_len(context: &'static str, expected: usize, found: usize) -> RemodelResult<()> {
    if expected != found {
        return Err(RemodelError::shape_mismatch(context, expected, found));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_field() {
        let rho = ElementField::uniform("density", 4, 0.8);
        assert_eq!(rho.len(), 4);
        assert_relative_eq!(rho.mean(), 0.8, epsilon = 1e-15);
        assert_relative_eq!(rho[3], 0.8);
    }

    #[test]
    fn test_statistics() {
        let f = ElementField::new("stimulus", vec![0.5, -1.0, 2.5]);
        assert_eq!(f.min(), -1.0);
        assert_eq!(f.max(), 2.5);
        assert_relative_eq!(f.mean(), 2.0 / 3.0, epsilon = 1e-15);

        let empty: ElementField = ElementField::new("stimulus", Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.mean(), 0.0);
    }

    #[test]
    fn test_ensure_finite_reports_first_bad_index() {
        let f = ElementField::new("energy", vec![1.0, f64::NAN, f64::INFINITY]);
        match f.ensure_finite() {
            Err(RemodelError::NonFinite { field, index, .. }) => {
                assert_eq!(field, "energy");
                assert_eq!(index, 1);
            }
            other => panic!("expected NonFinite, got {:?}", other),
        }
        assert!(ensure_finite("energy", &[0.0, -3.0, 1e300]).is_ok());
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("stimulus", 3, 3).is_ok());
        assert!(matches!(
            ensure_len("stimulus", 3, 2),
            Err(RemodelError::ShapeMismatch { expected: 3, found: 2, .. })
        ));
    }
}
