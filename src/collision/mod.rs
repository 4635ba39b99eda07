//! Collision operators: relaxation of local populations toward
//! equilibrium.
//!
//! Both operators share one contract: a pure function of the local
//! populations and the lattice model, with no per-node state retained
//! between calls. That makes collision safe to apply to all nodes
//! independently (and in parallel).
//!
//! Dispatch is by enum rather than trait object: the variant set is closed
//! and the call sits in the hot loop.

mod bgk;
mod kbc;

pub use bgk::Bgk;
pub use kbc::Kbc;

use crate::field::DistributionField;
use crate::lattice::{Lattice, Q};
use crate::precision::{PrecisionPolicy, Scalar};
use crate::types::Omega;

/// Collision strategy selector used by the simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionModel {
    /// Single-relaxation-time BGK.
    #[default]
    Bgk,
    /// Entropic multi-relaxation KBC.
    Kbc,
}

/// One of the interchangeable collision strategies.
#[derive(Debug, Clone, Copy)]
pub enum CollisionOperator {
    /// Single-relaxation-time BGK.
    Bgk(Bgk),
    /// Entropic multi-relaxation KBC.
    Kbc(Kbc),
}

impl CollisionOperator {
    /// BGK operator with the given relaxation rate.
    pub fn bgk(omega: Omega) -> Self {
        CollisionOperator::Bgk(Bgk::new(omega))
    }

    /// KBC operator with the given relaxation rate.
    pub fn kbc(omega: Omega) -> Self {
        CollisionOperator::Kbc(Kbc::new(omega))
    }

    /// Relaxation rate shared by both variants.
    pub fn omega(&self) -> f64 {
        match self {
            CollisionOperator::Bgk(op) => op.omega(),
            CollisionOperator::Kbc(op) => op.omega(),
        }
    }

    /// Build the operator a model selector names.
    pub fn from_model(model: CollisionModel, omega: Omega) -> Self {
        match model {
            CollisionModel::Bgk => Self::bgk(omega),
            CollisionModel::Kbc => Self::kbc(omega),
        }
    }

    /// Relax the populations of one node in place.
    #[inline(always)]
    pub fn relax<C: Scalar>(&self, lattice: &Lattice, f: &mut [C; Q]) {
        match self {
            CollisionOperator::Bgk(op) => op.relax(lattice, f),
            CollisionOperator::Kbc(op) => op.relax(lattice, f),
        }
    }
}

/// Relax one node-major storage chunk in compute precision.
#[inline(always)]
fn collide_chunk<P: PrecisionPolicy>(
    lattice: &Lattice,
    op: &CollisionOperator,
    chunk: &mut [P::Storage],
) {
    let mut f: [P::Compute; Q] = std::array::from_fn(|q| P::load(chunk[q]));
    op.relax(lattice, &mut f);
    for q in 0..Q {
        chunk[q] = P::store(f[q]);
    }
}

/// Apply the collision operator to every node of the field in place.
///
/// Collision is node-local, so nodes are processed independently (and in
/// parallel when the `parallel` feature is enabled).
pub fn collide_field<P: PrecisionPolicy>(
    lattice: &Lattice,
    op: &CollisionOperator,
    field: &mut DistributionField<P>,
) {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        field
            .data_mut()
            .par_chunks_mut(Q)
            .for_each(|chunk| collide_chunk::<P>(lattice, op, chunk));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for chunk in field.data_mut().chunks_mut(Q) {
            collide_chunk::<P>(lattice, op, chunk);
        }
    }
}
