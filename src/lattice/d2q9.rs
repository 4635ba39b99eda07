//! D2Q9 stencil constants.
//!
//! Direction ordering (index shown at the head of each arrow):
//!
//! ```text
//!   6   2   5
//!     \ | /
//!   3 - 0 - 1
//!     / | \
//!   7   4   8
//! ```

/// Number of discrete velocities.
pub const Q: usize = 9;

/// Spatial dimension.
pub const D: usize = 2;

/// Discrete velocity vectors.
pub const VELOCITIES: [[i32; 2]; Q] = [
    [0, 0],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
    [1, 1],
    [-1, 1],
    [-1, -1],
    [1, -1],
];

/// Quadrature weights. Sum to 1.
pub const WEIGHTS: [f64; Q] = [
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

/// Opposite-direction map: `VELOCITIES[OPPOSITE[i]] == -VELOCITIES[i]`.
pub const OPPOSITE: [usize; Q] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

/// Speed of sound squared.
pub const CS2: f64 = 1.0 / 3.0;
