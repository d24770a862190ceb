//! Local (Weinans 1992) update rule and the shared density clamp
//!
//! The element-wise law is written once as a scalar function; the batched form
//! maps it over the stimulus field.

use crate::error::RemodelResult;
use crate::field::{ensure_finite, ensure_len};
use crate::remodeling::parameters::{DensityBounds, LazyZone};
use rayon::prelude::*;
use serde::Serialize;

/// Which branch of the lazy-zone law an element falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Response {
    Formation,
    Resorption,
    Lazy,
}

impl Response {
    /// Classify a stimulus; the zone edges belong to `Lazy`
    pub fn classify(stimulus: f64, zone: &LazyZone) -> Self {
        if stimulus > zone.formation_limit() {
            Self::Formation
        } else if stimulus < zone.resorption_limit() {
            Self::Resorption
        } else {
            Self::Lazy
        }
    }
}

/// Density change of one element for the given stimulus
///
/// Equal to dρ/dt when the time step is folded into the slopes.
#[inline]
pub fn delta_rho_local(stimulus: f64, zone: &LazyZone) -> f64 {
    match Response::classify(stimulus, zone) {
        Response::Formation => zone.formation_rate * (stimulus - zone.formation_limit()),
        Response::Resorption => zone.resorption_rate * (stimulus - zone.resorption_limit()),
        Response::Lazy => 0.0,
    }
}

/// Local rule over the whole mesh
pub fn local_delta(stimulus: &[f64], zone: &LazyZone) -> RemodelResult<Vec<f64>> {
    ensure_finite("stimulus", stimulus)?;
    Ok(stimulus
        .par_iter()
        .map(|&s| delta_rho_local(s, zone))
        .collect())
}

/// Limit a density to its physical bounds
#[inline]
pub fn clamp_density(rho: f64, bounds: &DensityBounds) -> f64 {
    rho.clamp(bounds.min, bounds.max)
}

/// ρ_new = clamp(ρ + Δρ, ρ_min, ρ_max)
///
/// Returns a new field; the caller decides when to commit it.
pub fn apply_delta(density: &[f64], delta: &[f64], bounds: &DensityBounds) -> RemodelResult<Vec<f64>> {
    ensure_len("density update (delta vs density)", density.len(), delta.len())?;
    ensure_finite("density", density)?;
    ensure_finite("delta", delta)?;

    Ok(density
        .par_iter()
        .zip(delta.par_iter())
        .map(|(&rho, &d)| clamp_density(rho + d, bounds))
        .collect())
}
