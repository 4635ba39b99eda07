//! # lbm-rs
//!
//! A lattice Boltzmann method library for incompressible viscous flow.
//!
//! This crate provides the core building blocks of an LBM solver:
//! - Lattice models (D2Q9) with equilibrium-distribution evaluation
//! - Mixed-precision policies (compute and storage widths chosen
//!   independently)
//! - The distribution field with derived macroscopic density and velocity
//! - Collision operators (BGK single-relaxation, KBC entropic
//!   multi-relaxation)
//! - Pull-scheme streaming
//! - Boundary conditions: halfway bounce-back, interpolated (Bouzidi)
//!   bounce-back with momentum-exchange forces, extrapolation outflow and
//!   regularized velocity/pressure
//! - A time-step orchestrator with output and diagnostics hooks
//!
//! Problem setup (geometry, inlet profiles), visualization and parameter
//! sweeps live outside this crate; the orchestrator hands macroscopic
//! fields and force diagnostics to caller-supplied hooks instead.
//!
//! # Example
//!
//! ```
//! use lbm_rs::{
//!     BoundaryCondition, DoublePrecision, HalfwayBounceBack, Omega, RunHooks, Side,
//!     Simulation, SimulationConfig,
//! };
//!
//! let omega = Omega::new(1.2)?;
//! let config = SimulationConfig::new(32, 16, omega);
//! let grid = config.grid()?;
//! let lattice = lbm_rs::Lattice::new(config.lattice);
//!
//! // A closed box of no-slip walls.
//! let boundaries: Vec<Box<dyn BoundaryCondition<DoublePrecision>>> =
//!     [Side::Left, Side::Right, Side::Bottom, Side::Top]
//!         .into_iter()
//!         .map(|s| {
//!             Box::new(HalfwayBounceBack::from_side(&lattice, &grid, s))
//!                 as Box<dyn BoundaryCondition<DoublePrecision>>
//!         })
//!         .collect();
//!
//! let mut sim = Simulation::<DoublePrecision>::new(config, boundaries)?;
//! sim.initialize(1.0, [0.0, 0.0]);
//! sim.run(10, RunHooks::none())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod boundary;
pub mod collision;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod grid;
pub mod lattice;
pub mod precision;
pub mod sim;
pub mod streaming;
pub mod types;

// Re-export the main types for convenience.
pub use boundary::{
    BoundaryCondition, BoundaryList, ExtrapolationOutflow, HalfwayBounceBack,
    InterpolatedBounceBack, Regularized, Target,
};
pub use collision::{collide_field, Bgk, CollisionModel, CollisionOperator, Kbc};
pub use diagnostics::{
    force_coefficient, velocity_change_l1, BoundaryForce, RunTracker, StepDiagnostics,
};
pub use error::{ConfigError, RunError};
pub use field::{DistributionField, MacroscopicFields};
pub use grid::{Grid, Side};
pub use lattice::{Lattice, LatticeFamily};
pub use precision::{
    DoublePrecision, MixedPrecision, PrecisionConfig, PrecisionPolicy, Scalar, SinglePrecision,
    Width,
};
pub use sim::{RunHooks, RunSummary, Simulation, SimulationConfig};
pub use streaming::stream;
pub use types::{Omega, Viscosity};
