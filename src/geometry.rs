use crate::error::{RemodelError, RemodelResult};
use nalgebra::Point3;

/// Element centroids supplied by the mesh owner
///
/// Read-only for the whole run. Only the spatial update rule needs it, to
/// compute distances between elements.
#[derive(Debug, Clone)]
pub struct ElementGeometry {
    centroids: Vec<Point3<f64>>,
}

impl ElementGeometry {
    /// Wrap externally supplied centroids
    ///
    /// Fails if any coordinate is not finite.
    pub fn new(centroids: Vec<Point3<f64>>) -> RemodelResult<Self> {
        for (index, c) in centroids.iter().enumerate() {
            if let Some(&value) = c.coords.iter().find(|v| !v.is_finite()) {
                return Err(RemodelError::NonFinite {
                    field: "centroid",
                    index,
                    value,
                });
            }
        }
        Ok(Self { centroids })
    }

    /// Cell centroids of a structured nx × ny × nz grid over [0,lx]×[0,ly]×[0,lz]
    ///
    /// Elements are numbered x fastest, then y, then z. A 2D plate is a grid
    /// with `nz = 1` and `lz` set to the thickness.
    pub fn structured_grid(nx: usize, ny: usize, nz: usize, lx: f64, ly: f64, lz: f64) -> Self {
        let dx = lx / nx as f64;
        let dy = ly / ny as f64;
        let dz = lz / nz as f64;

        let mut centroids = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    centroids.push(Point3::new(
                        (i as f64 + 0.5) * dx,
                        (j as f64 + 0.5) * dy,
                        (k as f64 + 0.5) * dz,
                    ));
                }
            }
        }

        Self { centroids }
    }

    pub fn num_elements(&self) -> usize {
        self.centroids.len()
    }

    pub fn centroids(&self) -> &[Point3<f64>] {
        &self.centroids
    }

    pub fn centroid(&self, idx: usize) -> Option<&Point3<f64>> {
        self.centroids.get(idx)
    }

    /// Euclidean distance between the centroids of elements i and j
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        nalgebra::distance(&self.centroids[i], &self.centroids[j])
    }
}
