//! Configuration management for remodeling runs
//!
//! Reads TOML configuration files and turns them into validated
//! [`RemodelingParameters`]. Parsing only checks structure; every physical
//! constraint is enforced by [`RemodelingConfig::to_parameters`].

use crate::error::{RemodelError, RemodelResult};
use crate::remodeling::{
    ConvergenceCriterion, DensityBounds, LazyZone, RemodelingParameters, SpatialParameters,
    StiffnessLaw, UpdateRule,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main remodeling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemodelingConfig {
    pub control: ControlConfig,
    pub material: MaterialConfig,
    pub remodeling: RemodelingLawConfig,
    pub spatial: Option<SpatialConfig>,
    pub convergence: Option<ConvergenceConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    #[default]
    Local,
    Spatial,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Number of remodeling iterations
    pub niter: usize,
    /// Density update rule
    #[serde(default)]
    pub rule: RuleKind,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaterialConfig {
    /// Initial density of every element
    pub rho_ini: f64,
    /// Poisson's ratio pushed to the solver
    #[serde(default = "default_poisson")]
    pub poisson: f64,
    /// Power law constant CC in E = CC ρ^GC
    pub cc: f64,
    /// Power law exponent GC
    pub gc: f64,
}

fn default_poisson() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemodelingLawConfig {
    /// Setpoint K (energy per unit mass)
    pub setpoint: f64,
    /// Lazy zone half-width s
    #[serde(default)]
    pub lazy_zone: f64,
    pub formation_rate: f64,
    pub resorption_rate: f64,
    pub rho_min: f64,
    pub rho_max: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpatialConfig {
    /// Decay length D of exp(-d/D)
    pub influence_distance: f64,
    /// Proportionality factor τ
    pub tau: f64,
    /// Optional interaction radius
    pub cutoff_distance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConvergenceConfig {
    /// Relative density change below which the loop stops early
    pub tolerance: f64,
}

impl RemodelingConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RemodelResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RemodelError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> RemodelResult<Self> {
        toml::from_str(contents)
            .map_err(|e| RemodelError::Config(format!("failed to parse config: {}", e)))
    }

    /// Validate and build the immutable parameter record
    pub fn to_parameters(&self) -> RemodelResult<RemodelingParameters> {
        let law = &self.remodeling;
        let lazy_zone = LazyZone::new(
            law.setpoint,
            law.lazy_zone,
            law.formation_rate,
            law.resorption_rate,
        )?;
        let bounds = DensityBounds::new(law.rho_min, law.rho_max)?;
        let stiffness = StiffnessLaw::new(self.material.cc, self.material.gc)?;

        let rule = match (self.control.rule, &self.spatial) {
            (RuleKind::Local, spatial) => {
                if spatial.is_some() {
                    log::warn!("[spatial] section ignored: rule is 'local'");
                }
                UpdateRule::Local
            }
            (RuleKind::Spatial, Some(sp)) => UpdateRule::Spatial(SpatialParameters::new(
                sp.influence_distance,
                sp.tau,
                sp.cutoff_distance,
            )?),
            (RuleKind::Spatial, None) => {
                return Err(RemodelError::Config(
                    "rule = \"spatial\" requires a [spatial] section".to_string(),
                ))
            }
        };

        let convergence = self
            .convergence
            .as_ref()
            .map(|c| ConvergenceCriterion::new(c.tolerance))
            .transpose()?;

        RemodelingParameters::new(
            lazy_zone,
            bounds,
            stiffness,
            rule,
            self.material.rho_ini,
            self.material.poisson,
            self.control.niter,
            convergence,
        )
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        log::info!("Remodeling configuration");
        log::info!(
            "  control: niter = {}, rule = {:?}",
            self.control.niter,
            self.control.rule
        );
        log::info!(
            "  material: rho_ini = {}, nu = {}, E = {} * rho^{}",
            self.material.rho_ini,
            self.material.poisson,
            self.material.cc,
            self.material.gc
        );
        log::info!(
            "  law: K = {}, s = {}, f_fac = {}, r_fac = {}, rho in [{}, {}]",
            self.remodeling.setpoint,
            self.remodeling.lazy_zone,
            self.remodeling.formation_rate,
            self.remodeling.resorption_rate,
            self.remodeling.rho_min,
            self.remodeling.rho_max
        );
        if let Some(sp) = &self.spatial {
            log::info!(
                "  spatial: D = {}, tau = {}, cutoff = {:?}",
                sp.influence_distance,
                sp.tau,
                sp.cutoff_distance
            );
        }
        if let Some(c) = &self.convergence {
            log::info!("  convergence: tolerance = {:e}", c.tolerance);
        }
    }
}
