//! Huiskes-family bone remodeling
//!
//! Strain energy density from an external solver drives an element-wise
//! density update; density maps back to stiffness through a power law.
//!
//! - [`stimulus`]: S = U / ρ
//! - [`local`]: lazy-zone rule (Weinans 1992) and the density clamp
//! - [`spatial`]: distance-weighted rule (Mullender 1993)
//! - [`stiffness`]: E = CC ρ^GC
//! - [`controller`]: the solve/update loop

pub mod parameters;
pub mod stimulus;
pub mod local;
pub mod spatial;
pub mod stiffness;
pub mod state;
pub mod controller;

pub use parameters::{
    ConvergenceCriterion, DensityBounds, LazyZone, RemodelingParameters, SpatialParameters,
    UpdateRule,
};
pub use stimulus::StimulusEngine;
pub use local::{apply_delta, clamp_density, delta_rho_local, local_delta, Response};
pub use spatial::{influence_weight, spatial_delta, InfluenceOperator};
pub use stiffness::StiffnessLaw;
pub use state::{IterationRecord, RemodelingHistory, RemodelingState, Termination};
pub use controller::{Phase, RemodelingController};
