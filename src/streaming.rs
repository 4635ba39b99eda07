//! Streaming: propagation of post-collision populations to neighbors.
//!
//! Implemented as a pull into a fresh buffer: every destination slot
//! `(node, q)` reads the upstream neighbor `node - c_q`, so no two writes
//! collide and the operator parallelizes over destination nodes. A node
//! whose upstream source lies outside the grid keeps its own
//! post-collision value for that direction; the boundary condition engine
//! overwrites those slots afterwards. No periodic wrap.

use crate::field::DistributionField;
use crate::grid::Grid;
use crate::lattice::{Lattice, Q};
use crate::precision::PrecisionPolicy;

/// Pull the populations for one destination node out of `src`.
#[inline(always)]
fn pull_node<P: PrecisionPolicy>(
    lattice: &Lattice,
    grid: &Grid,
    src: &DistributionField<P>,
    node: usize,
    out: &mut [P::Storage],
) {
    let data = src.data();
    let velocities = lattice.velocities();
    for q in 0..Q {
        let c = velocities[q];
        let upstream = grid.neighbor(node, [-c[0], -c[1]]).unwrap_or(node);
        out[q] = data[upstream * Q + q];
    }
}

/// Propagate `src` into `dst` along every discrete velocity direction.
///
/// `dst` is fully overwritten. Reads and writes touch disjoint buffers,
/// satisfying the read-before-write ordering the step requires.
pub fn stream<P: PrecisionPolicy>(
    lattice: &Lattice,
    grid: &Grid,
    src: &DistributionField<P>,
    dst: &mut DistributionField<P>,
) {
    debug_assert_eq!(src.n_nodes(), dst.n_nodes());

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        dst.data_mut()
            .par_chunks_mut(Q)
            .enumerate()
            .for_each(|(node, out)| pull_node(lattice, grid, src, node, out));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (node, out) in dst.data_mut().chunks_mut(Q).enumerate() {
            pull_node(lattice, grid, src, node, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::LatticeFamily;
    use crate::precision::DoublePrecision;

    const TOL: f64 = 1e-14;

    fn setup(nx: usize, ny: usize) -> (Grid, Lattice) {
        (
            Grid::new(nx, ny, 0).unwrap(),
            Lattice::new(LatticeFamily::D2Q9),
        )
    }

    #[test]
    fn test_interior_advection() {
        // A single population travelling east must move one node east.
        let (grid, lattice) = setup(5, 5);
        let mut src = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        let mut dst = DistributionField::<DoublePrecision>::new(&grid).unwrap();

        let start = grid.index(2, 2);
        src.set(start, 1, 0.7); // direction 1 = (1, 0)

        stream(&lattice, &grid, &src, &mut dst);

        let moved = grid.index(3, 2);
        assert!((dst.get(moved, 1) - 0.7).abs() < TOL);
        assert!(dst.get(start, 1).abs() < TOL);
    }

    #[test]
    fn test_rest_population_stays() {
        let (grid, lattice) = setup(3, 3);
        let mut src = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        let mut dst = DistributionField::<DoublePrecision>::new(&grid).unwrap();

        let node = grid.index(1, 1);
        src.set(node, 0, 0.4);
        stream(&lattice, &grid, &src, &mut dst);
        assert!((dst.get(node, 0) - 0.4).abs() < TOL);
    }

    #[test]
    fn test_edge_keeps_own_value_for_missing_upstream() {
        // At the left edge the east-bound population has no upstream
        // source; the node keeps its own value for that slot.
        let (grid, lattice) = setup(4, 4);
        let mut src = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        let mut dst = DistributionField::<DoublePrecision>::new(&grid).unwrap();

        let edge = grid.index(0, 2);
        src.set(edge, 1, 0.3);
        stream(&lattice, &grid, &src, &mut dst);
        assert!((dst.get(edge, 1) - 0.3).abs() < TOL);
    }

    #[test]
    fn test_uniform_field_is_invariant() {
        // A uniform equilibrium field is unchanged by streaming.
        let (grid, lattice) = setup(6, 4);
        let mut src = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        src.init_equilibrium(&lattice, 1.0, [0.0, 0.0]);
        let mut dst = DistributionField::<DoublePrecision>::new(&grid).unwrap();

        stream(&lattice, &grid, &src, &mut dst);
        for node in 0..grid.n_nodes() {
            for q in 0..Q {
                assert!((dst.get(node, q) - src.get(node, q)).abs() < TOL);
            }
        }
    }

    #[test]
    fn test_diagonal_advection() {
        let (grid, lattice) = setup(5, 5);
        let mut src = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        let mut dst = DistributionField::<DoublePrecision>::new(&grid).unwrap();

        let start = grid.index(1, 1);
        src.set(start, 5, 0.2); // direction 5 = (1, 1)
        stream(&lattice, &grid, &src, &mut dst);
        assert!((dst.get(grid.index(2, 2), 5) - 0.2).abs() < TOL);
    }
}
