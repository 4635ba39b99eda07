//! Boundary condition engine.
//!
//! After streaming, nodes next to a domain edge or an immersed surface
//! hold stale populations in the directions that have no upstream fluid
//! source. Each boundary condition owns a set of governed node indices and
//! a rule for correcting those populations so the intended macroscopic
//! condition holds.
//!
//! Available boundary conditions:
//! - [`HalfwayBounceBack`]: no-slip wall half a lattice spacing outside
//!   the governed nodes
//! - [`InterpolatedBounceBack`]: curved immersed surface via linear
//!   (Bouzidi) interpolation of the wall distance; also computes the
//!   momentum-exchange force on the surface
//! - [`ExtrapolationOutflow`]: zero-gradient open exit
//! - [`Regularized`]: prescribed velocity or density with regularized
//!   non-equilibrium reconstruction
//!
//! Conditions are applied in list order; a later condition may overwrite
//! nodes written by an earlier one when index sets overlap (the caller is
//! responsible for avoiding conflicting overlaps). A condition governing
//! zero nodes is a no-op, not an error.

mod bounce_back;
mod bouzidi;
mod outflow;
mod regularized;

pub use bounce_back::HalfwayBounceBack;
pub use bouzidi::InterpolatedBounceBack;
pub use outflow::ExtrapolationOutflow;
pub use regularized::{Regularized, Target};

use crate::field::DistributionField;
use crate::grid::Grid;
use crate::lattice::Lattice;
use crate::precision::PrecisionPolicy;

/// Post-streaming correction rule over a fixed set of node indices.
///
/// Implementations are immutable once configured, except for time-varying
/// prescribed values updated between steps. They hold no per-step state,
/// so applying them is a pure function of the two field buffers.
pub trait BoundaryCondition<P: PrecisionPolicy>: Send + Sync {
    /// Correct the post-streaming populations at the governed nodes.
    ///
    /// `f_post` is the post-streaming field being corrected; `f_pre` is
    /// the post-collision (pre-streaming) field of the same step.
    fn apply(
        &self,
        lattice: &Lattice,
        grid: &Grid,
        f_post: &mut DistributionField<P>,
        f_pre: &DistributionField<P>,
    );

    /// Momentum exchanged with the surface this step, from the
    /// pre-streaming and corrected post-streaming populations.
    ///
    /// `None` for conditions that do not track a surface force.
    fn momentum_exchange_force(
        &self,
        lattice: &Lattice,
        f_pre: &DistributionField<P>,
        f_post: &DistributionField<P>,
    ) -> Option<[f64; 2]> {
        let _ = (lattice, f_pre, f_post);
        None
    }

    /// Name for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Number of governed nodes.
    fn n_nodes(&self) -> usize;
}

/// Ordered list of boundary conditions as held by the orchestrator.
pub type BoundaryList<P> = Vec<Box<dyn BoundaryCondition<P>>>;
