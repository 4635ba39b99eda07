//! Precision policies for mixed-precision simulation.
//!
//! Every array allocation and arithmetic reduction in the solver requests
//! its numeric width through a [`PrecisionPolicy`] instead of hardcoding
//! `f32` or `f64`. This lets the same kernels run with cheap storage and
//! accurate arithmetic ("mixed" mode) without duplicating code.
//!
//! Three policies are provided:
//! - [`DoublePrecision`]: compute f64, store f64 (`"f64/f64"`)
//! - [`SinglePrecision`]: compute f32, store f32 (`"f32/f32"`)
//! - [`MixedPrecision`]: compute f64, store f32 (`"f64/f32"`)
//!
//! The label format is `"<compute>/<storage>"`; [`PrecisionConfig`] parses
//! it so a configuration value can be checked against the compiled policy.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::ConfigError;

/// Scalar type usable for population storage or arithmetic.
///
/// Implemented for `f32` and `f64`. The `from_f64`/`to_f64` round trips
/// are the only sanctioned way to move values between widths.
pub trait Scalar:
    Copy
    + Clone
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// Machine epsilon of this width.
    const EPSILON: Self;

    /// Absolute value.
    fn abs(self) -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Larger of two values.
    fn max(self, other: Self) -> Self;
    /// Smaller of two values.
    fn min(self, other: Self) -> Self;
    /// Neither NaN nor infinite.
    fn is_finite(self) -> bool;
    /// Widen or narrow from f64.
    fn from_f64(v: f64) -> Self;
    /// Widen to f64 (exact for both supported widths).
    fn to_f64(self) -> f64;
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const EPSILON: Self = f32::EPSILON;

    #[inline(always)]
    fn abs(self) -> Self {
        f32::abs(self)
    }
    #[inline(always)]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
    #[inline(always)]
    fn max(self, other: Self) -> Self {
        f32::max(self, other)
    }
    #[inline(always)]
    fn min(self, other: Self) -> Self {
        f32::min(self, other)
    }
    #[inline(always)]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
    #[inline(always)]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const EPSILON: Self = f64::EPSILON;

    #[inline(always)]
    fn abs(self) -> Self {
        f64::abs(self)
    }
    #[inline(always)]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    #[inline(always)]
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }
    #[inline(always)]
    fn min(self, other: Self) -> Self {
        f64::min(self, other)
    }
    #[inline(always)]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
    #[inline(always)]
    fn from_f64(v: f64) -> Self {
        v
    }
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Compile-time selection of compute and storage widths.
///
/// `Storage` is what the distribution field allocates; `Compute` is what
/// kernels (collision, boundary closures, moment reductions) operate in.
pub trait PrecisionPolicy: Send + Sync + 'static {
    /// Width of values held in the distribution field.
    type Storage: Scalar;
    /// Width used for per-node arithmetic.
    type Compute: Scalar;

    /// `"<compute>/<storage>"` label, matching the configuration format.
    const LABEL: &'static str;

    /// Narrow a computed value for storage.
    #[inline(always)]
    fn store(v: Self::Compute) -> Self::Storage {
        <Self::Storage as Scalar>::from_f64(v.to_f64())
    }

    /// Widen a stored value for computation.
    #[inline(always)]
    fn load(v: Self::Storage) -> Self::Compute {
        <Self::Compute as Scalar>::from_f64(v.to_f64())
    }

    /// Lift an f64 constant into compute precision.
    #[inline(always)]
    fn constant(v: f64) -> Self::Compute {
        <Self::Compute as Scalar>::from_f64(v)
    }
}

/// Compute f64, store f64.
pub struct DoublePrecision;

impl PrecisionPolicy for DoublePrecision {
    type Storage = f64;
    type Compute = f64;
    const LABEL: &'static str = "f64/f64";
}

/// Compute f32, store f32.
pub struct SinglePrecision;

impl PrecisionPolicy for SinglePrecision {
    type Storage = f32;
    type Compute = f32;
    const LABEL: &'static str = "f32/f32";
}

/// Compute f64, store f32. Halves field memory while keeping reductions
/// and equilibrium evaluation in double precision.
pub struct MixedPrecision;

impl PrecisionPolicy for MixedPrecision {
    type Storage = f32;
    type Compute = f64;
    const LABEL: &'static str = "f64/f32";
}

/// One of the two supported scalar widths, as named in a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    F32,
    F64,
}

impl Width {
    /// Short name as used in precision labels.
    pub fn name(self) -> &'static str {
        match self {
            Width::F32 => "f32",
            Width::F64 => "f64",
        }
    }

    /// Size of one value in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            Width::F32 => 4,
            Width::F64 => 8,
        }
    }
}

impl FromStr for Width {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f32" | "single" => Ok(Width::F32),
            "f64" | "double" => Ok(Width::F64),
            _ => Err(ConfigError::InvalidPrecision(s.to_string())),
        }
    }
}

/// Parsed `"<compute>/<storage>"` precision selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionConfig {
    pub compute: Width,
    pub storage: Width,
}

impl PrecisionConfig {
    pub fn new(compute: Width, storage: Width) -> Self {
        Self { compute, storage }
    }

    /// Label in the `"<compute>/<storage>"` format.
    pub fn label(&self) -> String {
        format!("{}/{}", self.compute.name(), self.storage.name())
    }

    /// Check that this configuration names the same widths as a compiled
    /// policy `P`.
    pub fn matches<P: PrecisionPolicy>(&self) -> bool {
        self.label() == P::LABEL
    }

    /// Bytes needed per stored population value.
    pub fn storage_bytes(&self) -> usize {
        self.storage.size_bytes()
    }
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self::new(Width::F64, Width::F64)
    }
}

impl FromStr for PrecisionConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (compute, storage) = s
            .split_once('/')
            .ok_or_else(|| ConfigError::InvalidPrecision(s.to_string()))?;
        Ok(Self {
            compute: compute.parse()?,
            storage: storage.parse()?,
        })
    }
}

impl fmt::Display for PrecisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.compute.name(), self.storage.name())
    }
}
