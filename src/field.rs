//! Distribution field storage and macroscopic moment fields.
//!
//! The distribution field is the primary simulation state: one population
//! per discrete velocity per node, stored node-major (`idx = node * Q + q`)
//! in storage precision. All per-node arithmetic happens in compute
//! precision through the [`PrecisionPolicy`].

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::lattice::{Lattice, Q};
use crate::precision::{PrecisionPolicy, Scalar};

/// Dense population storage, one value per (node, velocity) pair.
pub struct DistributionField<P: PrecisionPolicy> {
    data: Vec<P::Storage>,
    n_nodes: usize,
}

impl<P: PrecisionPolicy> DistributionField<P> {
    /// Allocate a zeroed field for a grid.
    ///
    /// Allocation failure is reported as a [`ConfigError::Allocation`]
    /// instead of aborting, so oversized grids fail at setup time.
    pub fn new(grid: &Grid) -> Result<Self, ConfigError> {
        let n_nodes = grid.n_nodes();
        let n_values = n_nodes * Q;
        let mut data = Vec::new();
        data.try_reserve_exact(n_values)
            .map_err(|_| ConfigError::Allocation { n_values })?;
        data.resize(n_values, <P::Storage as Scalar>::ZERO);
        Ok(Self { data, n_nodes })
    }

    /// Number of nodes covered by the field.
    #[inline(always)]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Populations at one node, widened to compute precision.
    #[inline(always)]
    pub fn load_node(&self, node: usize) -> [P::Compute; Q] {
        let base = node * Q;
        std::array::from_fn(|q| P::load(self.data[base + q]))
    }

    /// Overwrite the populations at one node.
    #[inline(always)]
    pub fn store_node(&mut self, node: usize, f: &[P::Compute; Q]) {
        let base = node * Q;
        for q in 0..Q {
            self.data[base + q] = P::store(f[q]);
        }
    }

    /// Single population value in compute precision.
    #[inline(always)]
    pub fn get(&self, node: usize, q: usize) -> P::Compute {
        P::load(self.data[node * Q + q])
    }

    /// Set a single population value.
    #[inline(always)]
    pub fn set(&mut self, node: usize, q: usize, v: P::Compute) {
        self.data[node * Q + q] = P::store(v);
    }

    /// Raw storage, node-major.
    pub(crate) fn data(&self) -> &[P::Storage] {
        &self.data
    }

    /// Raw mutable storage, node-major.
    pub(crate) fn data_mut(&mut self) -> &mut [P::Storage] {
        &mut self.data
    }

    /// Set every node to the equilibrium for a uniform (rho, u).
    pub fn init_equilibrium(&mut self, lattice: &Lattice, rho: f64, u: [f64; 2]) {
        let feq = lattice.equilibrium(
            P::constant(rho),
            [P::constant(u[0]), P::constant(u[1])],
        );
        for node in 0..self.n_nodes {
            self.store_node(node, &feq);
        }
    }

    /// Set every node to the equilibrium of a position-dependent (rho, u).
    pub fn init_with<F>(&mut self, lattice: &Lattice, grid: &Grid, mut state: F)
    where
        F: FnMut(usize, usize) -> (f64, [f64; 2]),
    {
        for node in 0..self.n_nodes {
            let (x, y) = grid.coords(node);
            let (rho, u) = state(x, y);
            let feq = lattice.equilibrium(
                P::constant(rho),
                [P::constant(u[0]), P::constant(u[1])],
            );
            self.store_node(node, &feq);
        }
    }

    /// Total population mass, accumulated in f64 regardless of policy.
    pub fn total_mass(&self) -> f64 {
        self.data.iter().map(|&v| v.to_f64()).sum()
    }

    /// Scan for NaN or infinite values. O(nodes * Q); intended to run on
    /// an opt-in cadence, not every step.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Copy all populations from another field of the same shape.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.data.len(), other.data.len());
        self.data.copy_from_slice(&other.data);
    }

    /// Derive density and velocity per node (zeroth and first moments).
    pub fn macroscopics(&self, lattice: &Lattice) -> MacroscopicFields<P::Compute> {
        let zero = P::constant(0.0);
        let mut density = Vec::with_capacity(self.n_nodes);
        let mut velocity = Vec::with_capacity(self.n_nodes);
        for node in 0..self.n_nodes {
            let f = self.load_node(node);
            let (rho, j) = lattice.moments(&f);
            density.push(rho);
            if rho > zero {
                velocity.push([j[0] / rho, j[1] / rho]);
            } else {
                velocity.push([zero; 2]);
            }
        }
        MacroscopicFields { density, velocity }
    }
}

/// Density and velocity derived from the distribution field.
///
/// Recomputed on demand; never persisted across steps by the solver.
pub struct MacroscopicFields<C: Scalar> {
    density: Vec<C>,
    velocity: Vec<[C; 2]>,
}

impl<C: Scalar> MacroscopicFields<C> {
    /// Density per node.
    pub fn density(&self) -> &[C] {
        &self.density
    }

    /// Velocity vector per node.
    pub fn velocity(&self) -> &[[C; 2]] {
        &self.velocity
    }

    /// Velocity magnitude at one node.
    #[inline]
    pub fn speed(&self, node: usize) -> C {
        let [ux, uy] = self.velocity[node];
        (ux * ux + uy * uy).sqrt()
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.density.len()
    }

    /// L1 norm of the change in velocity magnitude against a previous
    /// sample. Used as the convergence error between sampled steps.
    pub fn speed_change_l1(&self, previous: &[f64]) -> f64 {
        debug_assert_eq!(previous.len(), self.n_nodes());
        (0..self.n_nodes())
            .map(|n| (self.speed(n).to_f64() - previous[n]).abs())
            .sum()
    }

    /// Velocity magnitudes widened to f64, for convergence sampling.
    pub fn speeds_f64(&self) -> Vec<f64> {
        (0..self.n_nodes()).map(|n| self.speed(n).to_f64()).collect()
    }
}
