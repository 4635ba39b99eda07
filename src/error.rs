//! Error types for solver construction and execution.
//!
//! Two layers of failure exist:
//! - [`ConfigError`]: rejected at construction time (bad lattice family,
//!   unstable relaxation rate, out-of-range boundary indices, mismatched
//!   prescription shapes, allocation failure). Nothing is clamped or
//!   repaired silently.
//! - [`RunError`]: fatal conditions detected while stepping (non-finite
//!   populations). The time loop is deterministic, so nothing is retried.

use thiserror::Error;

/// Errors detected while constructing a simulation or one of its parts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Lattice family identifier not recognized.
    #[error("unsupported lattice family '{0}'")]
    UnsupportedLattice(String),

    /// Relaxation parameter outside the linearly stable range (0, 2).
    #[error("relaxation parameter omega = {omega} outside stable range (0, 2)")]
    OmegaOutOfRange { omega: f64 },

    /// Grid with a zero extent along an active axis.
    #[error("grid extent must be nonzero, got {nx}x{ny}")]
    EmptyGrid { nx: usize, ny: usize },

    /// Only 2D domains (nz = 0) are supported.
    #[error("3D domains are not supported, got nz = {nz}")]
    UnsupportedDimension { nz: usize },

    /// A boundary node index falls outside the grid.
    #[error("boundary node index {index} out of range for grid with {n_nodes} nodes")]
    IndexOutOfBounds { index: usize, n_nodes: usize },

    /// A prescribed-value array does not match its node set.
    #[error("prescription shape mismatch: {n_nodes} boundary nodes but {n_values} values")]
    ShapeMismatch { n_nodes: usize, n_values: usize },

    /// Precision label in the configuration disagrees with the compiled
    /// precision policy.
    #[error("precision mismatch: configuration requests '{requested}' but the policy is '{policy}'")]
    PrecisionMismatch {
        requested: String,
        policy: &'static str,
    },

    /// Precision label could not be parsed.
    #[error("invalid precision label '{0}', expected '<compute>/<storage>' with f32 or f64")]
    InvalidPrecision(String),

    /// Field allocation failed (grid too large for available memory).
    #[error("failed to allocate distribution field of {n_values} values")]
    Allocation { n_values: usize },

    /// Signed-distance field does not cover the whole grid.
    #[error("distance field has {n_values} values but the grid has {n_nodes} nodes")]
    DistanceFieldMismatch { n_values: usize, n_nodes: usize },

    /// A boundary node lacks the interior neighbor its rule extrapolates
    /// from.
    #[error("boundary node {index} has no interior neighbor along the inward normal")]
    NoInteriorNeighbor { index: usize },

    /// A prescribed-value update named the wrong target kind.
    #[error("prescribed {requested} update does not match the boundary's {actual} target")]
    TargetMismatch {
        requested: &'static str,
        actual: &'static str,
    },
}

/// Fatal conditions detected during a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A population value became NaN or infinite.
    #[error("non-finite population detected at step {step}")]
    NonFinite { step: usize },
}
