//! Single-relaxation-time (BGK) collision.

use crate::lattice::{Lattice, Q};
use crate::precision::Scalar;
use crate::types::Omega;

/// BGK collision: `f' = f - omega * (f - feq)`.
///
/// The relaxation rate is validated once through [`Omega`]; values near
/// the stability bounds are the caller's responsibility to flag, never
/// corrected here.
#[derive(Debug, Clone, Copy)]
pub struct Bgk {
    omega: f64,
}

impl Bgk {
    pub fn new(omega: Omega) -> Self {
        Self {
            omega: omega.get(),
        }
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Relax one node toward its local equilibrium.
    #[inline(always)]
    pub fn relax<C: Scalar>(&self, lattice: &Lattice, f: &mut [C; Q]) {
        let (rho, j) = lattice.moments(f);
        let u = if rho > C::ZERO {
            [j[0] / rho, j[1] / rho]
        } else {
            [C::ZERO; 2]
        };
        let feq = lattice.equilibrium(rho, u);
        let omega = C::from_f64(self.omega);
        for q in 0..Q {
            f[q] = f[q] - omega * (f[q] - feq[q]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::LatticeFamily;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_full_relaxation_reaches_equilibrium() {
        // omega = 1 replaces f by feq in a single step.
        let lattice = Lattice::new(LatticeFamily::D2Q9);
        let op = Bgk::new(Omega::new(1.0).unwrap());

        let mut f = lattice.equilibrium(1.0f64, [0.05, 0.0]);
        f[2] += 0.02;
        f[4] -= 0.01;

        let (rho, j) = lattice.moments(&f);
        let u = [j[0] / rho, j[1] / rho];
        let feq = lattice.equilibrium(rho, u);

        op.relax(&lattice, &mut f);
        for q in 0..Q {
            assert!((f[q] - feq[q]).abs() < TOL);
        }
    }

    #[test]
    fn test_partial_relaxation_interpolates() {
        let lattice = Lattice::new(LatticeFamily::D2Q9);
        let omega = 0.6;
        let op = Bgk::new(Omega::new(omega).unwrap());

        let mut f = lattice.equilibrium(1.0f64, [0.0, 0.0]);
        f[1] += 0.01;
        let before = f;

        let (rho, j) = lattice.moments(&f);
        let u = [j[0] / rho, j[1] / rho];
        let feq = lattice.equilibrium(rho, u);

        op.relax(&lattice, &mut f);
        for q in 0..Q {
            let expected = before[q] - omega * (before[q] - feq[q]);
            assert!((f[q] - expected).abs() < TOL);
        }
    }
}
