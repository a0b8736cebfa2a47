//! Numeric precision and complex helpers for the per-event hot path.
//!
//! `Float` is `f64` by default and `f32` when the crate is built with the
//! `f32` feature. All wave dynamics, event columns, and intensities use
//! `Float`; optimizer parameters and log-likelihood accumulation stay in
//! `f64` regardless of the feature.

/// Working precision for dynamics and per-event quantities.
#[cfg(not(feature = "f32"))]
pub type Float = f64;

/// Working precision for dynamics and per-event quantities.
#[cfg(feature = "f32")]
pub type Float = f32;

/// Mathematical constants at working precision.
#[cfg(not(feature = "f32"))]
pub use std::f64::consts;

/// Mathematical constants at working precision.
#[cfg(feature = "f32")]
pub use std::f32::consts;

/// Complex number at working precision.
pub type Complex = num_complex::Complex<Float>;

/// Complex zero.
pub const C_ZERO: Complex = Complex::new(0.0, 0.0);

/// Complex one.
pub const C_ONE: Complex = Complex::new(1.0, 0.0);

/// Replace a signed zero imaginary part with `+0`.
///
/// Principal-branch `sqrt` and `ln` resolve a negative real argument by the
/// sign of the zero imaginary part; `-0i` lands on the lower side of the cut.
/// Every branch-sensitive call in this crate goes through this helper first so
/// sub-threshold quantities come out with `Im > 0`.
#[inline]
pub fn with_upper_zero(z: Complex) -> Complex {
    if z.im == 0.0 { Complex::new(z.re, 0.0) } else { z }
}

/// Widen a working-precision value to `f64`.
#[inline]
pub fn to_f64(x: Float) -> f64 {
    x as f64
}

/// Narrow an `f64` to working precision.
#[inline]
pub fn from_f64(x: f64) -> Float {
    x as Float
}
