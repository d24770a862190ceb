//! Validated remodeling parameters
//!
//! All checks run at construction; a `RemodelingParameters` value that exists
//! is known to satisfy every contract the update rules rely on.

use crate::error::{RemodelError, RemodelResult};
use crate::remodeling::stiffness::StiffnessLaw;
use serde::Serialize;

/// Lazy-zone formation/resorption law (Weinans 1992)
///
/// ```text
/// f_lim = (1 + s) K        r_lim = (1 - s) K
/// Δρ = f_fac (S - f_lim)   if S > f_lim
///    = r_fac (S - r_lim)   if S < r_lim
///    = 0                   otherwise
/// ```
///
/// The zone is closed: a stimulus exactly at `r_lim` or `f_lim` gives Δρ = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LazyZone {
    /// Setpoint K (energy per unit mass)
    pub setpoint: f64,
    /// Half-width s, dimensionless
    pub half_width: f64,
    /// Formation slope f_fac
    pub formation_rate: f64,
    /// Resorption slope r_fac
    pub resorption_rate: f64,
}

impl LazyZone {
    pub fn new(
        setpoint: f64,
        half_width: f64,
        formation_rate: f64,
        resorption_rate: f64,
    ) -> RemodelResult<Self> {
        require_positive("setpoint", setpoint)?;
        require_finite("lazy_zone", half_width)?;
        if !(0.0..1.0).contains(&half_width) {
            return Err(RemodelError::invalid_parameter(
                "lazy_zone",
                half_width,
                "must lie in [0, 1)",
            ));
        }
        require_positive("formation_rate", formation_rate)?;
        require_positive("resorption_rate", resorption_rate)?;

        Ok(Self {
            setpoint,
            half_width,
            formation_rate,
            resorption_rate,
        })
    }

    /// Upper edge of the lazy zone
    pub fn formation_limit(&self) -> f64 {
        (1.0 + self.half_width) * self.setpoint
    }

    /// Lower edge of the lazy zone
    pub fn resorption_limit(&self) -> f64 {
        (1.0 - self.half_width) * self.setpoint
    }
}

/// Physical bounds on density
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityBounds {
    pub min: f64,
    pub max: f64,
}

impl DensityBounds {
    pub fn new(min: f64, max: f64) -> RemodelResult<Self> {
        require_positive("rho_min", min)?;
        require_finite("rho_max", max)?;
        if max <= min {
            return Err(RemodelError::invalid_parameter(
                "rho_max",
                max,
                "must be greater than rho_min",
            ));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, rho: f64) -> bool {
        rho >= self.min && rho <= self.max
    }
}

/// Parameters of the non-local (Mullender 1993) rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialParameters {
    /// Decay length D of the influence weight exp(-d/D)
    pub influence_distance: f64,
    /// Proportionality factor τ between the influence sum and Δρ
    pub tau: f64,
    /// Pairs farther apart than this are treated as non-interacting
    pub cutoff_distance: Option<f64>,
}

impl SpatialParameters {
    pub fn new(
        influence_distance: f64,
        tau: f64,
        cutoff_distance: Option<f64>,
    ) -> RemodelResult<Self> {
        require_positive("influence_distance", influence_distance)?;
        require_positive("tau", tau)?;
        if let Some(cutoff) = cutoff_distance {
            require_positive("cutoff_distance", cutoff)?;
        }
        Ok(Self {
            influence_distance,
            tau,
            cutoff_distance,
        })
    }
}

/// Density update rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UpdateRule {
    /// Each element responds to its own stimulus only. O(N) per iteration.
    Local,
    /// Each element responds to a distance-weighted sum over all elements.
    /// O(N²) per iteration unless a cutoff distance sparsifies the influence.
    Spatial(SpatialParameters),
}

impl UpdateRule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Spatial(_) => "spatial",
        }
    }
}

/// Optional early exit on density stagnation
///
/// The loop stops once ||ρ_new - ρ_old|| / ||ρ_new|| falls below `tolerance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergenceCriterion {
    pub tolerance: f64,
}

impl ConvergenceCriterion {
    pub fn new(tolerance: f64) -> RemodelResult<Self> {
        require_positive("tolerance", tolerance)?;
        Ok(Self { tolerance })
    }
}

/// Full, immutable configuration of a remodeling run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemodelingParameters {
    lazy_zone: LazyZone,
    bounds: DensityBounds,
    stiffness: StiffnessLaw,
    rule: UpdateRule,
    rho_ini: f64,
    poisson: f64,
    niter: usize,
    convergence: Option<ConvergenceCriterion>,
}

impl RemodelingParameters {
    /// Combine the validated pieces, checking cross-field constraints
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lazy_zone: LazyZone,
        bounds: DensityBounds,
        stiffness: StiffnessLaw,
        rule: UpdateRule,
        rho_ini: f64,
        poisson: f64,
        niter: usize,
        convergence: Option<ConvergenceCriterion>,
    ) -> RemodelResult<Self> {
        require_finite("rho_ini", rho_ini)?;
        if !bounds.contains(rho_ini) {
            return Err(RemodelError::invalid_parameter(
                "rho_ini",
                rho_ini,
                "must lie within [rho_min, rho_max]",
            ));
        }
        require_finite("poisson", poisson)?;
        if !(poisson > -1.0 && poisson < 0.5) {
            return Err(RemodelError::invalid_parameter(
                "poisson",
                poisson,
                "must lie in (-1, 0.5)",
            ));
        }
        if niter == 0 {
            return Err(RemodelError::invalid_parameter(
                "niter",
                0.0,
                "at least one iteration is required",
            ));
        }

        Ok(Self {
            lazy_zone,
            bounds,
            stiffness,
            rule,
            rho_ini,
            poisson,
            niter,
            convergence,
        })
    }

    pub fn lazy_zone(&self) -> &LazyZone {
        &self.lazy_zone
    }

    pub fn bounds(&self) -> &DensityBounds {
        &self.bounds
    }

    pub fn stiffness(&self) -> &StiffnessLaw {
        &self.stiffness
    }

    pub fn rule(&self) -> &UpdateRule {
        &self.rule
    }

    pub fn rho_ini(&self) -> f64 {
        self.rho_ini
    }

    pub fn poisson(&self) -> f64 {
        self.poisson
    }

    pub fn niter(&self) -> usize {
        self.niter
    }

    pub fn convergence(&self) -> Option<&ConvergenceCriterion> {
        self.convergence.as_ref()
    }
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> RemodelResult<()> {
    if !value.is_finite() {
        return Err(RemodelError::invalid_parameter(name, value, "must be a finite number"));
    }
    Ok(())
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> RemodelResult<()> {
    require_finite(name, value)?;
    if value <= 0.0 {
        return Err(RemodelError::invalid_parameter(name, value, "must be positive"));
    }
    Ok(())
}
