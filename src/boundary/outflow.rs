//! Zero-gradient outflow by extrapolation from the interior.

use crate::boundary::BoundaryCondition;
use crate::error::ConfigError;
use crate::field::DistributionField;
use crate::grid::{Grid, Side};
use crate::lattice::{Lattice, Q};
use crate::precision::PrecisionPolicy;

/// Open exit boundary.
///
/// The populations entering the domain at an outlet node are unknown
/// after streaming; this condition copies them from the interior neighbor
/// one node inward along the outward normal, approximating a zero-gradient
/// (free) exit. Neither density nor velocity is prescribed.
pub struct ExtrapolationOutflow {
    nodes: Vec<usize>,
    interior: Vec<usize>,
    /// Directions entering the domain through this face.
    unknown: Vec<usize>,
}

impl ExtrapolationOutflow {
    /// Outflow across one face of the domain.
    pub fn from_side(lattice: &Lattice, grid: &Grid, side: Side) -> Result<Self, ConfigError> {
        Self::from_nodes(lattice, grid, grid.side_nodes(side), side.outward_normal())
    }

    /// Outflow over an explicit node set with the given outward normal.
    ///
    /// Every node must have an interior neighbor along the inward normal.
    pub fn from_nodes(
        lattice: &Lattice,
        grid: &Grid,
        nodes: Vec<usize>,
        normal: [i32; 2],
    ) -> Result<Self, ConfigError> {
        grid.check_nodes(&nodes)?;

        let inward = [-normal[0], -normal[1]];
        let mut interior = Vec::with_capacity(nodes.len());
        for &n in &nodes {
            let m = grid
                .neighbor(n, inward)
                .ok_or(ConfigError::NoInteriorNeighbor { index: n })?;
            interior.push(m);
        }

        let unknown = (0..Q)
            .filter(|&q| {
                let c = lattice.velocities()[q];
                c[0] * normal[0] + c[1] * normal[1] < 0
            })
            .collect();

        Ok(Self {
            nodes,
            interior,
            unknown,
        })
    }
}

impl<P: PrecisionPolicy> BoundaryCondition<P> for ExtrapolationOutflow {
    fn apply(
        &self,
        _lattice: &Lattice,
        _grid: &Grid,
        f_post: &mut DistributionField<P>,
        _f_pre: &DistributionField<P>,
    ) {
        for (&n, &m) in self.nodes.iter().zip(&self.interior) {
            for &q in &self.unknown {
                let v = f_post.get(m, q);
                f_post.set(n, q, v);
            }
        }
    }

    fn name(&self) -> &'static str {
        "extrapolation_outflow"
    }

    fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}
