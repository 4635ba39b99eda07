//! Runtime diagnostics: surface forces, convergence error and run
//! monitoring.
//!
//! The solver reports instantaneous values only; smoothing or selection
//! over a run window (peak lift, averaged drag) is a caller concern.

use crate::field::MacroscopicFields;
use crate::precision::Scalar;

/// Momentum-exchange force reported by one boundary condition.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryForce {
    /// Name of the reporting boundary condition.
    pub name: &'static str,
    /// Net force on the surface, (x, y) components.
    pub force: [f64; 2],
}

/// Diagnostics sampled at one step.
#[derive(Debug, Clone)]
pub struct StepDiagnostics {
    /// Step the sample was taken at.
    pub step: usize,
    /// L1 norm of the velocity-magnitude change since the previous
    /// sample. Infinite on the first sample of a run.
    pub convergence_l1: f64,
    /// Instantaneous forces from boundaries that track one. Empty when
    /// force tracking is disabled.
    pub forces: Vec<BoundaryForce>,
}

impl StepDiagnostics {
    /// One-line summary for logging.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "step {:>8}  err={:.6e}",
            self.step, self.convergence_l1
        );
        for bf in &self.forces {
            line.push_str(&format!(
                "  {}: Fx={:.6e} Fy={:.6e}",
                bf.name, bf.force[0], bf.force[1]
            ));
        }
        line
    }
}

/// Dimensionless force coefficient `c = 2 F / (u_ref^2 * length)`.
///
/// With the x force component and the obstacle diameter this is the drag
/// coefficient; with the y component, the lift coefficient.
pub fn force_coefficient(force_component: f64, u_ref: f64, length: f64) -> f64 {
    2.0 * force_component / (u_ref * u_ref * length)
}

/// L1 convergence error between two sampled velocity fields.
pub fn velocity_change_l1<C: Scalar>(current: &MacroscopicFields<C>, previous: &[f64]) -> f64 {
    current.speed_change_l1(previous)
}

/// Tracks conservation drift and extrema across a run.
///
/// Mirrors what a caller needs to watch for stability: the initial and
/// current total mass, the largest force magnitudes seen, and the latest
/// convergence error.
#[derive(Debug, Clone)]
pub struct RunTracker {
    initial_mass: f64,
    current_mass: f64,
    last_convergence: f64,
    peak_force: [f64; 2],
    n_updates: usize,
}

impl RunTracker {
    /// Start tracking from the initial total mass.
    pub fn new(initial_mass: f64) -> Self {
        Self {
            initial_mass,
            current_mass: initial_mass,
            last_convergence: f64::INFINITY,
            peak_force: [0.0; 2],
            n_updates: 0,
        }
    }

    /// Record one diagnostics sample and the current total mass.
    pub fn update(&mut self, total_mass: f64, diag: &StepDiagnostics) {
        self.current_mass = total_mass;
        self.last_convergence = diag.convergence_l1;
        for bf in &diag.forces {
            self.peak_force[0] = self.peak_force[0].max(bf.force[0].abs());
            self.peak_force[1] = self.peak_force[1].max(bf.force[1].abs());
        }
        self.n_updates += 1;
    }

    /// Relative mass drift against the initial state.
    pub fn mass_drift(&self) -> f64 {
        if self.initial_mass.abs() > f64::EPSILON {
            (self.current_mass - self.initial_mass).abs() / self.initial_mass.abs()
        } else {
            self.current_mass.abs()
        }
    }

    /// Largest absolute force components seen so far.
    pub fn peak_force(&self) -> [f64; 2] {
        self.peak_force
    }

    /// Most recent convergence error.
    pub fn last_convergence(&self) -> f64 {
        self.last_convergence
    }

    /// Number of samples recorded.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// False once mass becomes non-finite or drifts by more than 10%.
    pub fn is_stable(&self) -> bool {
        self.current_mass.is_finite() && self.mass_drift() < 0.1
    }
}
