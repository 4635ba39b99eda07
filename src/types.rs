//! Strongly-typed physical parameters.
//!
//! Newtypes prevent parameter mix-ups (a relaxation rate is not a
//! viscosity) and centralize the validity checks the rest of the solver
//! relies on.

use crate::error::ConfigError;

/// Kinematic viscosity in lattice units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Viscosity(f64);

impl Viscosity {
    /// Create a viscosity. Must be strictly positive.
    pub fn new(nu: f64) -> Result<Self, ConfigError> {
        // A non-positive viscosity maps to omega >= 2, outside the stable
        // range; report it in terms of the derived relaxation rate.
        if !(nu > 0.0 && nu.is_finite()) {
            return Err(ConfigError::OmegaOutOfRange {
                omega: 1.0 / (3.0 * nu + 0.5),
            });
        }
        Ok(Self(nu))
    }

    /// Raw value in lattice units.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

/// BGK relaxation parameter, valid in the open interval (0, 2).
///
/// Derived from kinematic viscosity by `omega = 1 / (3 nu + 1/2)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Omega(f64);

impl Omega {
    /// Margin below which a valid omega is still considered suspicious.
    const STABILITY_MARGIN: f64 = 0.05;

    /// Create a relaxation parameter, rejecting values outside (0, 2).
    pub fn new(omega: f64) -> Result<Self, ConfigError> {
        if !(omega > 0.0 && omega < 2.0) || !omega.is_finite() {
            return Err(ConfigError::OmegaOutOfRange { omega });
        }
        Ok(Self(omega))
    }

    /// Derive omega from kinematic viscosity: `omega = 1 / (3 nu + 1/2)`.
    pub fn from_viscosity(nu: Viscosity) -> Result<Self, ConfigError> {
        Self::new(1.0 / (3.0 * nu.get() + 0.5))
    }

    /// Raw value.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Kinematic viscosity implied by this relaxation rate.
    pub fn viscosity(self) -> f64 {
        (1.0 / self.0 - 0.5) / 3.0
    }

    /// True when omega sits within [`Self::STABILITY_MARGIN`] of either
    /// stability bound. Valid but worth flagging to the caller.
    pub fn is_near_stability_bound(self) -> bool {
        self.0 < Self::STABILITY_MARGIN || self.0 > 2.0 - Self::STABILITY_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_omega_range() {
        assert!(Omega::new(1.0).is_ok());
        assert!(Omega::new(1.99).is_ok());
        assert!(Omega::new(0.0).is_err());
        assert!(Omega::new(2.0).is_err());
        assert!(Omega::new(-0.3).is_err());
        assert!(Omega::new(f64::NAN).is_err());
    }

    #[test]
    fn test_omega_from_viscosity() {
        // nu = 1/6 gives omega = 1 exactly.
        let nu = Viscosity::new(1.0 / 6.0).unwrap();
        let omega = Omega::from_viscosity(nu).unwrap();
        assert!((omega.get() - 1.0).abs() < TOL);

        // Round trip back to viscosity.
        assert!((omega.viscosity() - 1.0 / 6.0).abs() < TOL);
    }

    #[test]
    fn test_viscosity_positive() {
        assert!(Viscosity::new(0.1).is_ok());
        assert!(Viscosity::new(0.0).is_err());
        assert!(Viscosity::new(-1.0).is_err());
    }

    #[test]
    fn test_near_bound_flag() {
        assert!(Omega::new(1.97).unwrap().is_near_stability_bound());
        assert!(Omega::new(0.01).unwrap().is_near_stability_bound());
        assert!(!Omega::new(1.2).unwrap().is_near_stability_bound());
    }
}
