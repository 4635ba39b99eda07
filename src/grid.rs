//! Structured grid: dimensions, node indexing and boundary index sets.
//!
//! Nodes are addressed by a flat index `idx = x * ny + y`. The grid is
//! immutable after construction; the per-side boundary index sets are
//! derived once from the dimensions (the equivalent of the original
//! bounding-box index sets).

use crate::error::ConfigError;

/// One face of the rectangular domain boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// x = 0 plane.
    Left,
    /// x = nx - 1 plane.
    Right,
    /// y = 0 plane.
    Bottom,
    /// y = ny - 1 plane.
    Top,
}

impl Side {
    /// Outward unit normal of this side.
    pub fn outward_normal(self) -> [i32; 2] {
        match self {
            Side::Left => [-1, 0],
            Side::Right => [1, 0],
            Side::Bottom => [0, -1],
            Side::Top => [0, 1],
        }
    }
}

/// Logical grid dimensions. `nz = 0` denotes a 2D domain, the only mode
/// currently supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl Grid {
    /// Create a 2D grid. Rejects zero extents and 3D domains.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self, ConfigError> {
        if nz != 0 {
            return Err(ConfigError::UnsupportedDimension { nz });
        }
        if nx == 0 || ny == 0 {
            return Err(ConfigError::EmptyGrid { nx, ny });
        }
        Ok(Self { nx, ny, nz })
    }

    #[inline(always)]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline(always)]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline(always)]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Total number of nodes.
    #[inline(always)]
    pub fn n_nodes(&self) -> usize {
        self.nx * self.ny
    }

    /// Flat index of node (x, y).
    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.nx && y < self.ny);
        x * self.ny + y
    }

    /// Coordinates (x, y) of a flat node index.
    #[inline(always)]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        debug_assert!(idx < self.n_nodes());
        (idx / self.ny, idx % self.ny)
    }

    /// Flat index of the neighbor of `idx` offset by a discrete velocity,
    /// or `None` when the neighbor falls outside the grid.
    #[inline(always)]
    pub fn neighbor(&self, idx: usize, c: [i32; 2]) -> Option<usize> {
        let (x, y) = self.coords(idx);
        let xn = x as i64 + c[0] as i64;
        let yn = y as i64 + c[1] as i64;
        if xn < 0 || yn < 0 || xn >= self.nx as i64 || yn >= self.ny as i64 {
            None
        } else {
            Some(xn as usize * self.ny + yn as usize)
        }
    }

    /// Node indices of one boundary plane, ordered by the running
    /// coordinate.
    pub fn side_nodes(&self, side: Side) -> Vec<usize> {
        match side {
            Side::Left => (0..self.ny).map(|y| self.index(0, y)).collect(),
            Side::Right => (0..self.ny).map(|y| self.index(self.nx - 1, y)).collect(),
            Side::Bottom => (0..self.nx).map(|x| self.index(x, 0)).collect(),
            Side::Top => (0..self.nx).map(|x| self.index(x, self.ny - 1)).collect(),
        }
    }

    /// Validate that every index in a boundary node set lies on the grid.
    pub fn check_nodes(&self, nodes: &[usize]) -> Result<(), ConfigError> {
        let n_nodes = self.n_nodes();
        match nodes.iter().find(|&&n| n >= n_nodes) {
            Some(&index) => Err(ConfigError::IndexOutOfBounds { index, n_nodes }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_construction() {
        assert!(Grid::new(4, 3, 0).is_ok());
        assert!(matches!(
            Grid::new(0, 3, 0),
            Err(ConfigError::EmptyGrid { .. })
        ));
        assert!(matches!(
            Grid::new(4, 3, 2),
            Err(ConfigError::UnsupportedDimension { nz: 2 })
        ));
    }

    #[test]
    fn test_index_round_trip() {
        let grid = Grid::new(5, 7, 0).unwrap();
        for x in 0..5 {
            for y in 0..7 {
                let idx = grid.index(x, y);
                assert_eq!(grid.coords(idx), (x, y));
            }
        }
        assert_eq!(grid.n_nodes(), 35);
    }

    #[test]
    fn test_neighbor_bounds() {
        let grid = Grid::new(4, 3, 0).unwrap();
        let corner = grid.index(0, 0);
        assert_eq!(grid.neighbor(corner, [-1, 0]), None);
        assert_eq!(grid.neighbor(corner, [0, -1]), None);
        assert_eq!(grid.neighbor(corner, [1, 1]), Some(grid.index(1, 1)));

        let far = grid.index(3, 2);
        assert_eq!(grid.neighbor(far, [1, 0]), None);
        assert_eq!(grid.neighbor(far, [0, 1]), None);
        assert_eq!(grid.neighbor(far, [-1, -1]), Some(grid.index(2, 1)));
    }

    #[test]
    fn test_side_nodes() {
        let grid = Grid::new(4, 3, 0).unwrap();
        let left = grid.side_nodes(Side::Left);
        assert_eq!(left.len(), 3);
        assert!(left.iter().all(|&n| grid.coords(n).0 == 0));

        let top = grid.side_nodes(Side::Top);
        assert_eq!(top.len(), 4);
        assert!(top.iter().all(|&n| grid.coords(n).1 == 2));
    }

    #[test]
    fn test_check_nodes() {
        let grid = Grid::new(2, 2, 0).unwrap();
        assert!(grid.check_nodes(&[0, 1, 2, 3]).is_ok());
        assert!(matches!(
            grid.check_nodes(&[0, 4]),
            Err(ConfigError::IndexOutOfBounds { index: 4, .. })
        ));
    }

    #[test]
    fn test_outward_normals() {
        assert_eq!(Side::Left.outward_normal(), [-1, 0]);
        assert_eq!(Side::Right.outward_normal(), [1, 0]);
        assert_eq!(Side::Bottom.outward_normal(), [0, -1]);
        assert_eq!(Side::Top.outward_normal(), [0, 1]);
    }
}
