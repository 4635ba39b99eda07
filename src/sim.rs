//! Time-step orchestration: configuration, the step cycle and the run
//! loop with output and diagnostics hooks.

use std::ops::ControlFlow;

use log::{debug, info, warn};

use crate::boundary::BoundaryList;
use crate::collision::{collide_field, CollisionModel, CollisionOperator};
use crate::diagnostics::{BoundaryForce, StepDiagnostics};
use crate::error::{ConfigError, RunError};
use crate::field::{DistributionField, MacroscopicFields};
use crate::grid::Grid;
use crate::lattice::{Lattice, LatticeFamily};
use crate::precision::{PrecisionConfig, PrecisionPolicy, Scalar};
use crate::streaming::stream;
use crate::types::Omega;

/// Construction parameters for a [`Simulation`].
///
/// Built with [`SimulationConfig::new`] plus `with_*` methods; validated
/// when the simulation is constructed. Cadences of zero disable the
/// corresponding hook.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Grid extent along x.
    pub nx: usize,
    /// Grid extent along y.
    pub ny: usize,
    /// Grid extent along z; 0 selects a 2D domain.
    pub nz: usize,
    /// Relaxation parameter.
    pub omega: Omega,
    /// Collision strategy.
    pub collision: CollisionModel,
    /// Stencil family.
    pub lattice: LatticeFamily,
    /// Requested compute/storage precision; must match the compiled
    /// policy.
    pub precision: PrecisionConfig,
    /// Steps between output-hook invocations (0 = never).
    pub output_every: usize,
    /// Steps between diagnostics-hook invocations (0 = never).
    pub diagnostics_every: usize,
    /// Steps between full-field finiteness scans (None = never).
    pub check_finite_every: Option<usize>,
    /// Retain the pre/post-streaming populations of each step so surface
    /// forces can be queried.
    pub track_forces: bool,
}

impl SimulationConfig {
    /// Configuration with the given grid extent and relaxation rate.
    pub fn new(nx: usize, ny: usize, omega: Omega) -> Self {
        Self {
            nx,
            ny,
            nz: 0,
            omega,
            collision: CollisionModel::default(),
            lattice: LatticeFamily::D2Q9,
            precision: PrecisionConfig::default(),
            output_every: 0,
            diagnostics_every: 0,
            check_finite_every: None,
            track_forces: false,
        }
    }

    /// Select the collision strategy.
    pub fn with_collision(mut self, model: CollisionModel) -> Self {
        self.collision = model;
        self
    }

    /// Select the stencil family.
    pub fn with_lattice(mut self, family: LatticeFamily) -> Self {
        self.lattice = family;
        self
    }

    /// Select compute/storage precision.
    pub fn with_precision(mut self, precision: PrecisionConfig) -> Self {
        self.precision = precision;
        self
    }

    /// Invoke the output hook every `n` steps.
    pub fn with_output_every(mut self, n: usize) -> Self {
        self.output_every = n;
        self
    }

    /// Invoke the diagnostics hook every `n` steps.
    pub fn with_diagnostics_every(mut self, n: usize) -> Self {
        self.diagnostics_every = n;
        self
    }

    /// Scan the field for non-finite values every `n` steps and abort the
    /// run when one appears.
    pub fn with_finiteness_check(mut self, n: usize) -> Self {
        self.check_finite_every = if n == 0 { None } else { Some(n) };
        self
    }

    /// Retain per-step population snapshots for force computation.
    pub fn with_force_tracking(mut self) -> Self {
        self.track_forces = true;
        self
    }

    /// The grid these parameters describe. Boundary conditions are
    /// constructed against this grid before the simulation is built.
    pub fn grid(&self) -> Result<Grid, ConfigError> {
        Grid::new(self.nx, self.ny, self.nz)
    }
}

/// Optional callbacks invoked by [`Simulation::run`] on their configured
/// cadences.
///
/// The output hook receives a view over solver-owned macroscopic fields;
/// it must copy anything it wants to keep. The diagnostics hook may stop
/// the run between steps by returning [`ControlFlow::Break`].
#[derive(Default)]
pub struct RunHooks<'h, C: Scalar> {
    on_output: Option<Box<dyn FnMut(usize, &MacroscopicFields<C>) + 'h>>,
    on_diagnostics: Option<Box<dyn FnMut(&StepDiagnostics) -> ControlFlow<()> + 'h>>,
}

impl<'h, C: Scalar> RunHooks<'h, C> {
    /// No hooks; the run is compute-only.
    pub fn none() -> Self {
        Self {
            on_output: None,
            on_diagnostics: None,
        }
    }

    /// Attach an output hook.
    pub fn with_output<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize, &MacroscopicFields<C>) + 'h,
    {
        self.on_output = Some(Box::new(hook));
        self
    }

    /// Attach a diagnostics hook.
    pub fn with_diagnostics<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&StepDiagnostics) -> ControlFlow<()> + 'h,
    {
        self.on_diagnostics = Some(Box::new(hook));
        self
    }
}

/// Outcome of a [`Simulation::run`] call.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Steps actually executed by this call.
    pub steps_completed: usize,
    /// Step counter after the run.
    pub final_step: usize,
    /// Whether the diagnostics hook stopped the run early.
    pub stopped_early: bool,
}

/// The time-step orchestrator.
///
/// Owns the distribution field and drives the
/// collide -> stream -> boundary-correction cycle. A step is atomic from
/// the caller's perspective: hooks and early termination only run between
/// steps, never inside one.
pub struct Simulation<P: PrecisionPolicy> {
    config: SimulationConfig,
    grid: Grid,
    lattice: Lattice,
    collision: CollisionOperator,
    boundaries: BoundaryList<P>,
    /// Current populations. After a step: the corrected post-streaming
    /// state.
    f: DistributionField<P>,
    /// Double buffer. After a step: the post-collision (pre-streaming)
    /// state of that step, which force computation reads.
    scratch: DistributionField<P>,
    step: usize,
    prev_speeds: Option<Vec<f64>>,
}

impl<P: PrecisionPolicy> Simulation<P> {
    /// Validate the configuration and allocate the field buffers.
    ///
    /// The boundary list is applied in order each step; later entries win
    /// where index sets overlap.
    pub fn new(config: SimulationConfig, boundaries: BoundaryList<P>) -> Result<Self, ConfigError> {
        let grid = config.grid()?;

        if !config.precision.matches::<P>() {
            return Err(ConfigError::PrecisionMismatch {
                requested: config.precision.label(),
                policy: P::LABEL,
            });
        }

        if config.omega.is_near_stability_bound() {
            warn!(
                "omega = {} sits near a stability bound; expect a marginal run",
                config.omega.get()
            );
        }

        let lattice = Lattice::new(config.lattice);
        let collision = CollisionOperator::from_model(config.collision, config.omega);
        let mut f = DistributionField::new(&grid)?;
        let scratch = DistributionField::new(&grid)?;
        f.init_equilibrium(&lattice, 1.0, [0.0, 0.0]);

        Ok(Self {
            config,
            grid,
            lattice,
            collision,
            boundaries,
            f,
            scratch,
            step: 0,
            prev_speeds: None,
        })
    }

    /// Reset the field to a uniform equilibrium.
    pub fn initialize(&mut self, rho: f64, u: [f64; 2]) {
        self.f.init_equilibrium(&self.lattice, rho, u);
        self.step = 0;
        self.prev_speeds = None;
    }

    /// Reset the field to the equilibrium of a position-dependent state.
    pub fn initialize_with<F>(&mut self, state: F)
    where
        F: FnMut(usize, usize) -> (f64, [f64; 2]),
    {
        self.f.init_with(&self.lattice, &self.grid, state);
        self.step = 0;
        self.prev_speeds = None;
    }

    /// Advance one time step: collide, stream, apply boundary conditions.
    pub fn step(&mut self) {
        collide_field(&self.lattice, &self.collision, &mut self.f);
        stream(&self.lattice, &self.grid, &self.f, &mut self.scratch);
        for bc in &self.boundaries {
            bc.apply(&self.lattice, &self.grid, &mut self.scratch, &self.f);
        }
        std::mem::swap(&mut self.f, &mut self.scratch);
        self.step += 1;
    }

    /// Steps taken since initialization.
    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current macroscopic fields, derived on demand.
    pub fn macroscopics(&self) -> MacroscopicFields<P::Compute> {
        self.f.macroscopics(&self.lattice)
    }

    /// Total population mass of the current state.
    pub fn total_mass(&self) -> f64 {
        self.f.total_mass()
    }

    /// Direct access to the current distribution field.
    pub fn field(&self) -> &DistributionField<P> {
        &self.f
    }

    /// Momentum-exchange force from boundary `index` for the last
    /// completed step.
    ///
    /// Requires force tracking (see
    /// [`SimulationConfig::with_force_tracking`]) and at least one
    /// completed step; `None` otherwise, or when the boundary does not
    /// track a force.
    pub fn boundary_force(&self, index: usize) -> Option<[f64; 2]> {
        if !self.config.track_forces || self.step == 0 {
            return None;
        }
        self.boundaries
            .get(index)?
            .momentum_exchange_force(&self.lattice, &self.scratch, &self.f)
    }

    /// Sample diagnostics at the current step.
    ///
    /// Updates the stored velocity sample, so the convergence error
    /// always refers to the previous call.
    pub fn sample_diagnostics(&mut self) -> StepDiagnostics {
        let m = self.macroscopics();
        let speeds = m.speeds_f64();
        let convergence_l1 = match &self.prev_speeds {
            Some(prev) => m.speed_change_l1(prev),
            None => f64::INFINITY,
        };
        self.prev_speeds = Some(speeds);

        let forces = if self.config.track_forces && self.step > 0 {
            self.boundaries
                .iter()
                .filter_map(|bc| {
                    bc.momentum_exchange_force(&self.lattice, &self.scratch, &self.f)
                        .map(|force| BoundaryForce {
                            name: bc.name(),
                            force,
                        })
                })
                .collect()
        } else {
            Vec::new()
        };

        StepDiagnostics {
            step: self.step,
            convergence_l1,
            forces,
        }
    }

    /// Run `n_steps` steps, invoking hooks on their cadences.
    ///
    /// Terminates early when the diagnostics hook breaks or when an
    /// enabled finiteness check finds a non-finite population. The field
    /// is never left mid-step.
    pub fn run(
        &mut self,
        n_steps: usize,
        mut hooks: RunHooks<'_, P::Compute>,
    ) -> Result<RunSummary, RunError> {
        info!(
            "run: {} steps from step {} ({} boundary conditions, omega = {})",
            n_steps,
            self.step,
            self.boundaries.len(),
            self.config.omega.get()
        );

        let mut steps_completed = 0;
        let mut stopped_early = false;
        for _ in 0..n_steps {
            self.step();
            steps_completed += 1;
            let t = self.step;

            if let Some(k) = self.config.check_finite_every {
                if t % k == 0 && !self.f.is_finite() {
                    warn!("aborting: non-finite population at step {}", t);
                    return Err(RunError::NonFinite { step: t });
                }
            }

            if self.config.output_every > 0 && t % self.config.output_every == 0 {
                if let Some(hook) = hooks.on_output.as_mut() {
                    let m = self.f.macroscopics(&self.lattice);
                    hook(t, &m);
                }
            }

            if self.config.diagnostics_every > 0 && t % self.config.diagnostics_every == 0 {
                let diag = self.sample_diagnostics();
                debug!("{}", diag.summary_line());
                if let Some(hook) = hooks.on_diagnostics.as_mut() {
                    if hook(&diag).is_break() {
                        stopped_early = true;
                        break;
                    }
                }
            }
        }

        info!(
            "run finished at step {}{}",
            self.step,
            if stopped_early { " (stopped early)" } else { "" }
        );
        Ok(RunSummary {
            steps_completed,
            final_step: self.step,
            stopped_early,
        })
    }
}
