//! Wave spin and Blatt–Weisskopf barrier factors.
//!
//! The barrier branch is a closed enum chosen once when a wave is built, so the
//! set of supported spins is checked exhaustively at compile time and any other
//! `J` is rejected at construction with [`KMatrixError::UnsupportedSpin`].
use crate::kmatrix::{
    core::numeric::{Complex, Float},
    errors::KMatrixError,
};

/// Hadronic scale `ħc` (GeV·fm) entering the barrier argument `z = q²/scale²`.
pub const BARRIER_SCALE: Float = 0.1973;

/// Total angular momentum of a partial wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    /// S-wave: no centrifugal barrier.
    Zero,
    /// D-wave: `sqrt(13 z² / ((z − 3)² + 9 z))`.
    Two,
}

impl Spin {
    /// Numeric `J`.
    pub fn j(&self) -> u32 {
        match self {
            Spin::Zero => 0,
            Spin::Two => 2,
        }
    }

    /// Blatt–Weisskopf factor for breakup momentum `q`.
    ///
    /// Uses `z = Re(q²)/BARRIER_SCALE²`. Below threshold `q` is imaginary and
    /// `z < 0`; the denominator `z² + 3z + 9` has no real roots, so the factor
    /// stays real and positive there.
    #[inline]
    pub fn barrier(&self, q: Complex) -> Float {
        match self {
            Spin::Zero => 1.0,
            Spin::Two => {
                let z = (q * q).re / (BARRIER_SCALE * BARRIER_SCALE);
                (13.0 * z * z / ((z - 3.0).powi(2) + 9.0 * z)).sqrt()
            }
        }
    }
}

impl TryFrom<u32> for Spin {
    type Error = KMatrixError;

    fn try_from(j: u32) -> Result<Self, Self::Error> {
        match j {
            0 => Ok(Spin::Zero),
            2 => Ok(Spin::Two),
            spin => Err(KMatrixError::UnsupportedSpin { spin }),
        }
    }
}
