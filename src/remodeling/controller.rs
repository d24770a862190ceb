/// Remodeling iteration driver
///
/// Alternates external static solves with density updates:
///
/// ```text
/// Uninitialized ──► Solving ──► Postprocessing ──► Updating ──┬──► Solving
///                      ▲                                      │
///                      └──────────────────────────────────────┘
///                                                             └──► Terminated
/// ```
///
/// One iteration:
///   1. Solve: static analysis with the current stiffness field
///   2. Postprocess: read the strain energy density of every element
///   3. Update: stimulus → Δρ (local or spatial rule) → clamp → E = CC ρ^GC
///   4. Push the new moduli into the solver for the next solve
///
/// The loop stops after `niter` iterations, or earlier when an optional
/// density-change criterion is met. Any failure ends the run; density is only
/// written once every step of the update has succeeded.
///
/// # References
/// - Huiskes et al. (1987), "Adaptive bone-remodeling theory applied to
///   prosthetic-design analysis"
/// - Weinans, Huiskes & Grootenboer (1992)

use crate::error::{RemodelError, RemodelResult};
use crate::field::ensure_len;
use crate::geometry::ElementGeometry;
use crate::linalg::relative_change;
use crate::remodeling::local::{apply_delta, local_delta};
use crate::remodeling::parameters::{RemodelingParameters, UpdateRule};
use crate::remodeling::spatial::{spatial_delta, InfluenceOperator};
use crate::remodeling::state::{IterationRecord, RemodelingHistory, RemodelingState, Termination};
use crate::remodeling::stimulus::StimulusEngine;
use crate::session::{ElementResult, MaterialProperty, SolveStatus, SolverSession};

/// Guard for the relative density change when ||ρ|| is tiny
const DENSITY_NORM_FLOOR: f64 = 1e-15;

/// Where the controller is in its state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Uninitialized,
    Solving,
    Postprocessing,
    Updating,
    Terminated(Termination),
    /// A step failed; `iteration` is 0 when initialization failed
    Failed { iteration: usize },
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated(_) | Self::Failed { .. })
    }
}

pub struct RemodelingController<S: SolverSession> {
    params: RemodelingParameters,
    session: S,
    geometry: Option<ElementGeometry>,
    engine: StimulusEngine,
    influence: Option<InfluenceOperator>,
    state: RemodelingState,
    history: RemodelingHistory,
    phase: Phase,
}

impl<S: SolverSession> RemodelingController<S> {
    pub fn new(params: RemodelingParameters, session: S) -> Self {
        Self {
            params,
            session,
            geometry: None,
            engine: StimulusEngine::new(),
            influence: None,
            state: RemodelingState::seeded(Vec::new(), Vec::new()),
            history: RemodelingHistory::new(),
            phase: Phase::Uninitialized,
        }
    }

    /// Supply element centroids (required by the spatial rule)
    pub fn with_geometry(mut self, geometry: ElementGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn params(&self) -> &RemodelingParameters {
        &self.params
    }

    pub fn state(&self) -> &RemodelingState {
        &self.state
    }

    pub fn history(&self) -> &RemodelingHistory {
        &self.history
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn into_parts(self) -> (RemodelingState, RemodelingHistory, S) {
        (self.state, self.history, self.session)
    }

    /// Seed density and push the initial material into the solver
    ///
    /// Does nothing once the controller has left `Uninitialized`.
    pub fn initialize(&mut self) -> RemodelResult<()> {
        if self.phase != Phase::Uninitialized {
            return Ok(());
        }
        match self.setup() {
            Ok(()) => {
                self.phase = Phase::Solving;
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Failed { iteration: 0 };
                Err(err)
            }
        }
    }

    /// Advance the state machine by one transition
    ///
    /// From `Uninitialized` this initializes; from `Solving` it runs one full
    /// iteration. Terminal phases are returned unchanged.
    pub fn step(&mut self) -> RemodelResult<Phase> {
        match self.phase {
            Phase::Uninitialized => {
                self.initialize()?;
                return Ok(self.phase);
            }
            Phase::Terminated(_) | Phase::Failed { .. } => return Ok(self.phase),
            Phase::Solving | Phase::Postprocessing | Phase::Updating => {}
        }

        let iteration = self.state.iteration + 1;
        match self.iterate(iteration) {
            Ok(next) => {
                self.phase = next;
                Ok(next)
            }
            Err(err) => {
                self.phase = Phase::Failed { iteration };
                Err(err.at_iteration(iteration))
            }
        }
    }

    /// Run until termination
    pub fn run(&mut self) -> RemodelResult<Termination> {
        loop {
            match self.step()? {
                Phase::Terminated(termination) => return Ok(termination),
                Phase::Failed { iteration } => return Err(RemodelError::Halted { iteration }),
                _ => {}
            }
        }
    }

    fn setup(&mut self) -> RemodelResult<()> {
        let nelem = self.session.num_elements()?;
        if nelem == 0 {
            return Err(RemodelError::EmptyMesh);
        }

        if let UpdateRule::Spatial(spatial) = self.params.rule() {
            let geometry = self.geometry.as_ref().ok_or(RemodelError::MissingGeometry)?;
            ensure_len("element centroids", nelem, geometry.num_elements())?;
            let operator = InfluenceOperator::assemble(geometry, spatial);
            log::info!(
                "Influence operator assembled: {} elements, {} interacting pairs",
                nelem,
                operator.nnz()
            );
            self.influence = Some(operator);
        }

        let density = vec![self.params.rho_ini(); nelem];
        let stiffness = self.params.stiffness().apply(&density)?;
        self.session
            .set_material_properties(MaterialProperty::YoungsModulus, &stiffness)?;
        self.session
            .set_material_properties(MaterialProperty::PoissonRatio, &vec![self.params.poisson(); nelem])?;

        log::info!(
            "Seeded {} elements on '{}': rho = {}, E = {:.4e}, rule = {}",
            nelem,
            self.session.name(),
            self.params.rho_ini(),
            stiffness[0],
            self.params.rule().name()
        );

        self.state = RemodelingState::seeded(density, stiffness);
        Ok(())
    }

    fn iterate(&mut self, iteration: usize) -> RemodelResult<Phase> {
        let niter = self.params.niter();
        log::info!("Remodeling iteration {} of {}", iteration, niter);

        self.phase = Phase::Solving;
        if let SolveStatus::NotConverged { reason } = self.session.solve_static()? {
            log::warn!("Static solve did not converge: {}", reason);
            return Err(RemodelError::SolveFailed { reason });
        }

        self.phase = Phase::Postprocessing;
        let energy = self
            .session
            .element_field(ElementResult::StrainEnergyDensity)?;
        ensure_len("solver energy field", self.state.num_elements(), energy.len())?;

        self.phase = Phase::Updating;
        let stimulus = self.engine.compute(&energy, &self.state.density.data)?;
        let delta = self.density_delta(&stimulus.data)?;
        let density = apply_delta(&self.state.density.data, &delta, self.params.bounds())?;
        let stiffness = self.params.stiffness().apply(&density)?;
        let change = relative_change(&self.state.density.data, &density, DENSITY_NORM_FLOOR);

        // A failed push leaves the previous density in place
        self.session
            .set_material_properties(MaterialProperty::YoungsModulus, &stiffness)?;
        self.state.commit(density, stimulus, stiffness);

        let record = IterationRecord::new(
            iteration,
            &self.state.density,
            &self.state.stimulus,
            &delta,
            change,
        );
        log::debug!(
            "  rho [{:.4}, {:.4}, {:.4}] rel_change = {:.3e} forming/resorbing/quiescent = {}/{}/{}",
            record.density_min,
            record.density_mean,
            record.density_max,
            record.relative_change,
            record.forming,
            record.resorbing,
            record.quiescent
        );
        self.history.push(record);

        if let Some(criterion) = self.params.convergence() {
            if change < criterion.tolerance {
                log::info!(
                    "Density converged after {} iterations (rel_change = {:.3e})",
                    iteration,
                    change
                );
                return Ok(Phase::Terminated(Termination::Converged {
                    iterations: iteration,
                    relative_change: change,
                }));
            }
        }

        if iteration >= niter {
            return Ok(Phase::Terminated(Termination::IterationLimit {
                iterations: iteration,
            }));
        }
        Ok(Phase::Solving)
    }

    fn density_delta(&self, stimulus: &[f64]) -> RemodelResult<Vec<f64>> {
        let zone = self.params.lazy_zone();
        match self.params.rule() {
            UpdateRule::Local => local_delta(stimulus, zone),
            UpdateRule::Spatial(spatial) => {
                let operator = self.influence.as_ref().ok_or(RemodelError::MissingGeometry)?;
                spatial_delta(stimulus, zone.setpoint, operator, spatial)
            }
        }
    }
}
