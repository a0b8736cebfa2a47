//! Two-body decay channels and their phase-space kinematics.
//!
//! Purpose
//! -------
//! Represent a single two-body channel `(m1, m2)` and evaluate the kinematic
//! building blocks of the K-matrix at an invariant `s`: the threshold
//! factors `χ±(s)`, the phase-space factor `ρ(s)`, the breakup momentum
//! `q(s)`, and the channel's Chew–Mandelstam function.
//!
//! Key behaviors
//! -------------
//! - All quantities are complex so that the same formulas continue below
//!   threshold without special-casing.
//! - `ρ(s)` uses the principal square root of a product whose imaginary part
//!   is forced to `+0`; below threshold it is purely imaginary with `Im > 0`.
//! - The Chew–Mandelstam log ratio is likewise moved off the lower side of
//!   the branch cut before taking `ln`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `m1` and `m2` are finite and strictly positive; this is checked by
//!   [`WaveConfig`](crate::kmatrix::core::config::WaveConfig), not here.
//! - `s` is a finite, strictly positive invariant mass squared (GeV²).
//!
//! Conventions
//! -----------
//! - Masses in GeV, `s` in GeV².
//! - Threshold is `(m1 + m2)²`, pseudo-threshold `(m1 − m2)²`.
//!
//! Testing notes
//! -------------
//! - Reference values for the a2 channel set live in
//!   `models::resonance` tests; here we check branch behavior per channel.
use crate::kmatrix::core::numeric::{C_ZERO, Complex, Float, consts::PI, with_upper_zero};

/// A two-body final state with fixed daughter masses (GeV).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub m1: Float,
    pub m2: Float,
}

impl Channel {
    pub const fn new(m1: Float, m2: Float) -> Self {
        Self { m1, m2 }
    }

    /// Threshold `(m1 + m2)²` in GeV².
    pub fn threshold(&self) -> Float {
        (self.m1 + self.m2).powi(2)
    }

    /// `χ+(s) = 1 − (m1 + m2)²/s`.
    #[inline]
    pub fn chi_plus(&self, s: Float) -> Complex {
        Complex::new(1.0 - (self.m1 + self.m2).powi(2) / s, 0.0)
    }

    /// `χ−(s) = 1 − (m1 − m2)²/s`.
    #[inline]
    pub fn chi_minus(&self, s: Float) -> Complex {
        Complex::new(1.0 - (self.m1 - self.m2).powi(2) / s, 0.0)
    }

    /// Phase-space factor `ρ(s) = sqrt(χ+ χ−)` on the principal branch.
    #[inline]
    pub fn rho(&self, s: Float) -> Complex {
        with_upper_zero(self.chi_plus(s) * self.chi_minus(s)).sqrt()
    }

    /// Breakup momentum `q(s) = sqrt(s) ρ(s) / 2`.
    #[inline]
    pub fn q(&self, s: Float) -> Complex {
        self.rho(s) * (s.sqrt() / 2.0)
    }

    /// Diagonal Chew–Mandelstam entry for this channel.
    ///
    /// `ρ/π · ln((χ+ + ρ)/(χ+ − ρ)) − χ+/π · ((m2 − m1)/(m1 + m2)) · ln(m2/m1)`
    ///
    /// At `ρ = 0` (threshold or pseudo-threshold) the log term takes its
    /// limit `0`.
    pub fn chew_mandelstam(&self, s: Float) -> Complex {
        let chi_p = self.chi_plus(s);
        let rho = self.rho(s);
        let log_term = if rho == C_ZERO {
            C_ZERO
        } else {
            rho / PI * with_upper_zero((chi_p + rho) / (chi_p - rho)).ln()
        };
        let mass_term = (self.m2 - self.m1) / (self.m1 + self.m2) * (self.m2 / self.m1).ln();
        log_term - chi_p / PI * mass_term
    }
}
