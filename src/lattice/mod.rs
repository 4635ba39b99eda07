//! Lattice models: discrete velocity sets, weights and moment closures.
//!
//! A [`Lattice`] is pure lookup data plus the equilibrium-distribution
//! evaluation shared by the collision operators and by the boundary
//! conditions that reconstruct missing populations (regularized inlets,
//! interpolated bounce-back).

pub mod d2q9;

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::precision::Scalar;

pub use d2q9::{D, Q};

/// Identifier of a supported stencil family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatticeFamily {
    /// 2D, 9 velocities.
    D2Q9,
}

impl FromStr for LatticeFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "D2Q9" => Ok(LatticeFamily::D2Q9),
            _ => Err(ConfigError::UnsupportedLattice(s.to_string())),
        }
    }
}

impl fmt::Display for LatticeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeFamily::D2Q9 => write!(f, "D2Q9"),
        }
    }
}

/// A lattice model: velocity set, weights, sound speed and opposite map.
///
/// Immutable and stateless; cheap to copy around.
#[derive(Debug, Clone, Copy)]
pub struct Lattice {
    family: LatticeFamily,
}

impl Lattice {
    /// Build the model for a given family.
    pub fn new(family: LatticeFamily) -> Self {
        Self { family }
    }

    /// Family this model was built for.
    pub fn family(&self) -> LatticeFamily {
        self.family
    }

    /// Discrete velocity vectors.
    #[inline(always)]
    pub fn velocities(&self) -> &'static [[i32; 2]; Q] {
        &d2q9::VELOCITIES
    }

    /// Quadrature weights.
    #[inline(always)]
    pub fn weights(&self) -> &'static [f64; Q] {
        &d2q9::WEIGHTS
    }

    /// Opposite-direction index map.
    #[inline(always)]
    pub fn opposite(&self) -> &'static [usize; Q] {
        &d2q9::OPPOSITE
    }

    /// Speed of sound squared.
    #[inline(always)]
    pub fn cs2(&self) -> f64 {
        d2q9::CS2
    }

    /// Equilibrium distribution for one direction.
    ///
    /// Second-order truncated Maxwellian:
    /// `feq_i = w_i rho (1 + c.u/cs2 + (c.u)^2/(2 cs4) - u.u/(2 cs2))`.
    #[inline(always)]
    pub fn equilibrium_direction<C: Scalar>(&self, q: usize, rho: C, u: [C; 2]) -> C {
        let c = d2q9::VELOCITIES[q];
        let w = C::from_f64(d2q9::WEIGHTS[q]);
        let cs2 = C::from_f64(d2q9::CS2);
        let half = C::from_f64(0.5);

        let cu = C::from_f64(c[0] as f64) * u[0] + C::from_f64(c[1] as f64) * u[1];
        let usq = u[0] * u[0] + u[1] * u[1];

        let cu_cs2 = cu / cs2;
        w * rho * (C::ONE + cu_cs2 + half * cu_cs2 * cu_cs2 - half * usq / cs2)
    }

    /// Equilibrium distribution for all directions.
    #[inline]
    pub fn equilibrium<C: Scalar>(&self, rho: C, u: [C; 2]) -> [C; Q] {
        std::array::from_fn(|q| self.equilibrium_direction(q, rho, u))
    }

    /// Zeroth and first moments of a local population set: (rho, momentum).
    #[inline]
    pub fn moments<C: Scalar>(&self, f: &[C; Q]) -> (C, [C; 2]) {
        let mut rho = C::ZERO;
        let mut jx = C::ZERO;
        let mut jy = C::ZERO;
        for q in 0..Q {
            let c = d2q9::VELOCITIES[q];
            rho = rho + f[q];
            jx = jx + f[q] * C::from_f64(c[0] as f64);
            jy = jy + f[q] * C::from_f64(c[1] as f64);
        }
        (rho, [jx, jy])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-14;

    #[test]
    fn test_family_parse() {
        assert_eq!("D2Q9".parse::<LatticeFamily>().unwrap(), LatticeFamily::D2Q9);
        assert_eq!("d2q9".parse::<LatticeFamily>().unwrap(), LatticeFamily::D2Q9);
        assert!("D3Q19".parse::<LatticeFamily>().is_err());
        assert!("nonsense".parse::<LatticeFamily>().is_err());
    }

    #[test]
    fn test_equilibrium_at_rest_equals_weights() {
        let lattice = Lattice::new(LatticeFamily::D2Q9);
        let feq = lattice.equilibrium(1.0f64, [0.0, 0.0]);
        for q in 0..Q {
            assert!((feq[q] - lattice.weights()[q]).abs() < TOL);
        }
    }

    #[test]
    fn test_equilibrium_moments_recover_inputs() {
        let lattice = Lattice::new(LatticeFamily::D2Q9);
        let rho = 1.2f64;
        let u = [0.05, -0.02];
        let feq = lattice.equilibrium(rho, u);

        let (rho_m, j) = lattice.moments(&feq);
        assert!((rho_m - rho).abs() < TOL);
        assert!((j[0] - rho * u[0]).abs() < TOL);
        assert!((j[1] - rho * u[1]).abs() < TOL);
    }

    #[test]
    fn test_equilibrium_single_precision() {
        let lattice = Lattice::new(LatticeFamily::D2Q9);
        let feq = lattice.equilibrium(1.0f32, [0.1, 0.0]);
        let (rho, j) = lattice.moments(&feq);
        assert!((rho - 1.0).abs() < 1e-6);
        assert!((j[0] - 0.1).abs() < 1e-6);
    }
}
