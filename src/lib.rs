pub mod error;
pub mod field;
pub mod geometry;
pub mod linalg;
pub mod session;
pub mod remodeling;
pub mod config;

pub use error::{RemodelError, RemodelResult};
pub use field::ElementField;
pub use geometry::ElementGeometry;
pub use linalg::{norm, relative_change, LinearOperator};
pub use session::{ElementResult, MaterialProperty, PrescribedStressSession, SolveStatus, SolverSession};
pub use remodeling::{ConvergenceCriterion, DensityBounds, LazyZone, RemodelingParameters, SpatialParameters, UpdateRule, StimulusEngine, Response, apply_delta, clamp_density, delta_rho_local, local_delta, influence_weight, spatial_delta, InfluenceOperator, StiffnessLaw, IterationRecord, RemodelingHistory, RemodelingState, Termination, Phase, RemodelingController};
pub use config::{RemodelingConfig, RuleKind};
