//! Halfway bounce-back: no-slip wall at half a lattice spacing.

use std::collections::HashSet;

use crate::boundary::BoundaryCondition;
use crate::error::ConfigError;
use crate::field::DistributionField;
use crate::grid::{Grid, Side};
use crate::lattice::{Lattice, Q};
use crate::precision::PrecisionPolicy;

/// Halfway bounce-back wall.
///
/// Owns the set of cut links (fluid node, direction into the wall). After
/// streaming, each cut population is returned to its source node in the
/// opposite direction:
///
/// `f_post[n][opp(q)] = f_pre[n][q]`
///
/// which enforces zero velocity at a wall located half a lattice spacing
/// beyond the governed node. The slots written are exactly the slots
/// streaming could not fill from a fluid upstream source, so a closed box
/// of these walls conserves total mass to machine precision.
pub struct HalfwayBounceBack {
    links: Vec<(usize, usize)>,
    n_nodes: usize,
}

impl HalfwayBounceBack {
    /// Wall along one face of the domain.
    ///
    /// Governs every node of the face; the cut links are all directions
    /// leaving the grid there (corner nodes contribute links through both
    /// adjacent faces).
    pub fn from_side(lattice: &Lattice, grid: &Grid, side: Side) -> Self {
        let nodes = grid.side_nodes(side);
        let mut links = Vec::new();
        for &n in &nodes {
            for q in 1..Q {
                if grid.neighbor(n, lattice.velocities()[q]).is_none() {
                    links.push((n, q));
                }
            }
        }
        Self {
            links,
            n_nodes: nodes.len(),
        }
    }

    /// Wall around an immersed solid described by a node mask
    /// (`true` = solid).
    ///
    /// Governs the fluid nodes adjacent to the solid; the cut links are
    /// the directions pointing into it.
    pub fn from_mask(lattice: &Lattice, grid: &Grid, mask: &[bool]) -> Result<Self, ConfigError> {
        if mask.len() != grid.n_nodes() {
            return Err(ConfigError::ShapeMismatch {
                n_nodes: grid.n_nodes(),
                n_values: mask.len(),
            });
        }

        let mut links = Vec::new();
        let mut governed = HashSet::new();
        for n in 0..grid.n_nodes() {
            if mask[n] {
                continue;
            }
            for q in 1..Q {
                if let Some(s) = grid.neighbor(n, lattice.velocities()[q]) {
                    if mask[s] {
                        links.push((n, q));
                        governed.insert(n);
                    }
                }
            }
        }
        Ok(Self {
            links,
            n_nodes: governed.len(),
        })
    }

    /// Cut links (fluid node, direction into the wall).
    pub fn links(&self) -> &[(usize, usize)] {
        &self.links
    }
}

impl<P: PrecisionPolicy> BoundaryCondition<P> for HalfwayBounceBack {
    fn apply(
        &self,
        lattice: &Lattice,
        _grid: &Grid,
        f_post: &mut DistributionField<P>,
        f_pre: &DistributionField<P>,
    ) {
        let opposite = lattice.opposite();
        for &(n, q) in &self.links {
            f_post.set(n, opposite[q], f_pre.get(n, q));
        }
    }

    fn name(&self) -> &'static str {
        "halfway_bounce_back"
    }

    fn n_nodes(&self) -> usize {
        self.n_nodes
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
    fn test_side_wall_reflects_cut_populations() {
        let (grid, lattice) = setup(4, 4);
        let bc = HalfwayBounceBack::from_side(&lattice, &grid, Side::Bottom);

        let mut f_pre = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        let mut f_post = DistributionField::<DoublePrecision>::new(&grid).unwrap();

        // Population heading south (q = 4) at a bottom node must come back
        // heading north (q = 2).
        let n = grid.index(2, 0);
        f_pre.set(n, 4, 0.3);

        BoundaryCondition::<DoublePrecision>::apply(&bc, &lattice, &grid, &mut f_post, &f_pre);
        assert!((f_post.get(n, 2) - 0.3).abs() < TOL);
    }

    #[test]
    fn test_corner_links_cover_both_faces() {
        let (grid, lattice) = setup(3, 3);
        let bc = HalfwayBounceBack::from_side(&lattice, &grid, Side::Left);

        // Bottom-left corner: west, south-west, north-west and south,
        // south-east all leave the grid (5 cut links); a mid-face node
        // only has 3.
        let corner = grid.index(0, 0);
        let mid = grid.index(0, 1);
        let corner_links = bc.links().iter().filter(|&&(n, _)| n == corner).count();
        let mid_links = bc.links().iter().filter(|&&(n, _)| n == mid).count();
        assert_eq!(corner_links, 5);
        assert_eq!(mid_links, 3);
    }

    #[test]
    fn test_mask_wall_links_point_into_solid() {
        let (grid, lattice) = setup(5, 5);
        let mut mask = vec![false; grid.n_nodes()];
        mask[grid.index(2, 2)] = true;

        let bc = HalfwayBounceBack::from_mask(&lattice, &grid, &mask).unwrap();

        // The 8 neighbors of the solid node each carry exactly one link.
        assert_eq!(bc.links().len(), 8);
        assert_eq!(BoundaryCondition::<DoublePrecision>::n_nodes(&bc), 8);
        for &(n, q) in bc.links() {
            let s = grid.neighbor(n, lattice.velocities()[q]).unwrap();
            assert_eq!(s, grid.index(2, 2));
        }
    }

    #[test]
    fn test_mask_shape_validated() {
        let (grid, lattice) = setup(3, 3);
        let err = HalfwayBounceBack::from_mask(&lattice, &grid, &[false; 4]);
        assert!(matches!(err, Err(ConfigError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_empty_mask_is_noop() {
        let (grid, lattice) = setup(3, 3);
        let mask = vec![false; grid.n_nodes()];
        let bc = HalfwayBounceBack::from_mask(&lattice, &grid, &mask).unwrap();
        assert_eq!(bc.links().len(), 0);
        assert_eq!(BoundaryCondition::<DoublePrecision>::n_nodes(&bc), 0);

        // Applying a zero-link condition changes nothing.
        let mut f_pre = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        f_pre.init_equilibrium(&lattice, 1.0, [0.0, 0.0]);
        let mut f_post = DistributionField::<DoublePrecision>::new(&grid).unwrap();
        f_post.copy_from(&f_pre);
        let before = f_post.total_mass();
        BoundaryCondition::<DoublePrecision>::apply(&bc, &lattice, &grid, &mut f_post, &f_pre);
        assert!((f_post.total_mass() - before).abs() < TOL);
    }
}
