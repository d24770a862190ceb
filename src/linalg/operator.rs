use sprs::CsMat;

/// Trait for a linear operator A that can be applied to a vector x to get Ax
pub trait LinearOperator {
    /// Apply the operator to vector v: out = A * v
    fn apply(&self, v: &[f64]) -> Vec<f64>;

    /// Apply the operator to vector v and add to out: out += A * v
    fn apply_add(&self, v: &[f64], out: &mut [f64]) {
        let result = self.apply(v);
        for (o, val) in out.iter_mut().zip(result) {
            *o += val;
        }
    }

    /// Number of rows (output dimension)
    fn rows(&self) -> usize;

    /// Number of columns (input dimension)
    fn cols(&self) -> usize;
}

impl LinearOperator for CsMat<f64> {
    fn apply(&self, v: &[f64]) -> Vec<f64> {
        let mut result = vec![0.0; self.rows()];
        self.apply_add(v, &mut result);
        result
    }

    fn apply_add(&self, v: &[f64], out: &mut [f64]) {
        // Row sums are accumulated in a fixed order so results are reproducible
        for (row_idx, row) in self.outer_iterator().enumerate() {
            let mut sum = 0.0;
            for (col_idx, &val) in row.iter() {
                sum += val * v[col_idx];
            }
            out[row_idx] += sum;
        }
    }

    fn rows(&self) -> usize {
        CsMat::rows(self)
    }

    fn cols(&self) -> usize {
        CsMat::cols(self)
    }
}

/// L2 norm of a vector
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Relative change ||new - old|| / ||new||
///
/// Falls back to the absolute change when ||new|| is below `abs_tolerance`.
pub fn relative_change(old: &[f64], new: &[f64], abs_tolerance: f64) -> f64 {
    let delta_norm = old
        .iter()
        .zip(new)
        .map(|(&a, &b)| (b - a) * (b - a))
        .sum::<f64>()
        .sqrt();
    let new_norm = norm(new);

    if new_norm > abs_tolerance {
        delta_norm / new_norm
    } else {
        delta_norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sprs::TriMat;

    #[test]
    fn test_norm() {
        let v = vec![3.0, 4.0];
        assert_relative_eq!(norm(&v), 5.0, epsilon = 1e-14);
    }

    #[test]
    fn test_csmat_apply() {
        // [2 1; 0 3] * [1; 2] = [4; 6]
        let mut triplets = TriMat::new((2, 2));
        triplets.add_triplet(0, 0, 2.0);
        triplets.add_triplet(0, 1, 1.0);
        triplets.add_triplet(1, 1, 3.0);
        let a: CsMat<f64> = triplets.to_csr();

        let y = a.apply(&[1.0, 2.0]);
        assert_relative_eq!(y[0], 4.0);
        assert_relative_eq!(y[1], 6.0);

        let mut out = vec![1.0, 1.0];
        a.apply_add(&[1.0, 2.0], &mut out);
        assert_relative_eq!(out[0], 5.0);
        assert_relative_eq!(out[1], 7.0);
        assert_eq!(LinearOperator::rows(&a), 2);
        assert_eq!(LinearOperator::cols(&a), 2);
    }

    #[test]
    fn test_relative_change() {
        assert_relative_eq!(relative_change(&[1.0, 1.0], &[1.0, 1.0], 1e-15), 0.0);
        // delta = (0, 4), new = (3, 4) -> 4/5
        assert_relative_eq!(
            relative_change(&[3.0, 0.0], &[3.0, 4.0], 1e-15),
            0.8,
            epsilon = 1e-14
        );
        // tiny new vector: absolute change
        assert_relative_eq!(relative_change(&[1.0], &[0.0], 1e-12), 1.0);
    }
}
