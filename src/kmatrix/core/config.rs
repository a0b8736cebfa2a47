//! Validated wave configuration for a single K-matrix partial wave.
//!
//! Purpose
//! -------
//! Hold the immutable parameterization of one wave (spin, channels, poles,
//! background, output channel, optional Adler zero) and reject malformed
//! tables before any dynamics are evaluated.
//!
//! Key behaviors
//! -------------
//! - [`WaveConfig::new`] checks every shape and value invariant in one pass
//!   and returns a [`KMatrixError`] for the first violation.
//! - Accessors expose the coupling matrix `g` as `C × A` (channel-major), the
//!   layout used by the dynamics code.
//!
//! Invariants & assumptions
//! ------------------------
//! - `C ≥ 1` channels and `A ≥ 1` resonances.
//! - Every resonance has exactly `C` finite couplings and a finite mass > 0.
//! - All daughter masses are finite and > 0.
//! - The background is a finite, exactly symmetric `C × C` matrix.
//! - `output_channel < C`.
//! - If present, the Adler zero has a finite `s0` and a finite, non-zero
//!   `s_norm`.
//!
//! Conventions
//! -----------
//! - Resonance couplings are listed per resonance (one row per pole), as in
//!   published K-matrix tables; [`WaveConfig::couplings`] transposes them.
//!
//! Downstream usage
//! ----------------
//! - [`ResonanceModel::new`](crate::kmatrix::models::resonance::ResonanceModel::new)
//!   consumes a `WaveConfig` and precomputes pole-mass barrier factors.
//! - The fixed analysis tables are built in `kmatrix::models::tables`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each rejection path of [`WaveConfig::new`] and the
//!   happy path on a small two-channel wave.
use crate::kmatrix::{
    core::{channel::Channel, numeric::Float, spin::Spin},
    errors::{KMatrixError, KMatrixResult},
};
use nalgebra::DMatrix;

/// A K-matrix pole: bare mass and real couplings to each channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Resonance {
    /// Display label, e.g. `"f0(980)"`.
    pub name: String,
    /// Bare pole mass (GeV).
    pub mass: Float,
    /// Coupling to each channel, in channel order.
    pub couplings: Vec<Float>,
}

impl Resonance {
    pub fn new(name: impl Into<String>, mass: Float, couplings: Vec<Float>) -> Self {
        Self { name: name.into(), mass, couplings }
    }
}

/// Adler-zero rescaling `(s − s0)/s_norm` applied to `K(s)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdlerZero {
    pub s0: Float,
    pub s_norm: Float,
}

impl AdlerZero {
    pub const fn new(s0: Float, s_norm: Float) -> Self {
        Self { s0, s_norm }
    }

    /// Rescaling factor at `s`.
    #[inline]
    pub fn factor(&self, s: Float) -> Float {
        (s - self.s0) / self.s_norm
    }
}

/// Immutable, validated parameterization of one partial wave.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    spin: Spin,
    channels: Vec<Channel>,
    resonances: Vec<Resonance>,
    background: DMatrix<Float>,
    output_channel: usize,
    adler_zero: Option<AdlerZero>,
}

impl WaveConfig {
    /// Construct a validated wave configuration.
    ///
    /// Parameters
    /// ----------
    /// - `j`: `u32`
    ///   Total angular momentum; only 0 and 2 are supported.
    /// - `channels`: `Vec<Channel>`
    ///   Ordered two-body channels (`C` entries).
    /// - `resonances`: `Vec<Resonance>`
    ///   Ordered poles (`A` entries), each with `C` couplings.
    /// - `background`: `DMatrix<Float>`
    ///   Symmetric `C × C` non-resonant term added to every pole term.
    /// - `output_channel`: `usize`
    ///   Channel whose row of `(I + KC)⁻¹` feeds the production amplitude.
    /// - `adler_zero`: `Option<AdlerZero>`
    ///   Optional rescaling of `K(s)`.
    ///
    /// Errors
    /// ------
    /// - `KMatrixError::UnsupportedSpin` for `j ∉ {0, 2}`.
    /// - `KMatrixError::EmptyWave` when `C == 0` or `A == 0`.
    /// - `KMatrixError::InvalidChannelMass` / `InvalidResonanceMass` for
    ///   non-finite or non-positive masses.
    /// - `KMatrixError::CouplingCountMismatch` when a resonance does not have
    ///   `C` couplings.
    /// - `KMatrixError::BackgroundDimMismatch` / `AsymmetricBackground` for a
    ///   malformed background.
    /// - `KMatrixError::NonFiniteEntry` for non-finite couplings or background.
    /// - `KMatrixError::OutputChannelOutOfRange` when `output_channel >= C`.
    /// - `KMatrixError::InvalidAdlerZero` for a degenerate Adler normalization.
    pub fn new(
        j: u32, channels: Vec<Channel>, resonances: Vec<Resonance>, background: DMatrix<Float>,
        output_channel: usize, adler_zero: Option<AdlerZero>,
    ) -> KMatrixResult<Self> {
        let spin = Spin::try_from(j)?;
        let n_ch = channels.len();
        let n_res = resonances.len();
        if n_ch == 0 || n_res == 0 {
            return Err(KMatrixError::EmptyWave { channels: n_ch, resonances: n_res });
        }

        for (channel, ch) in channels.iter().enumerate() {
            for value in [ch.m1, ch.m2] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(KMatrixError::InvalidChannelMass { channel, value });
                }
            }
        }

        for (resonance, res) in resonances.iter().enumerate() {
            if !res.mass.is_finite() || res.mass <= 0.0 {
                return Err(KMatrixError::InvalidResonanceMass { resonance, value: res.mass });
            }
            if res.couplings.len() != n_ch {
                return Err(KMatrixError::CouplingCountMismatch {
                    resonance,
                    expected: n_ch,
                    found: res.couplings.len(),
                });
            }
            if let Some((col, &value)) =
                res.couplings.iter().enumerate().find(|(_, g)| !g.is_finite())
            {
                return Err(KMatrixError::NonFiniteEntry {
                    what: "coupling",
                    row: resonance,
                    col,
                    value,
                });
            }
        }

        validate_background(&background, n_ch)?;

        if output_channel >= n_ch {
            return Err(KMatrixError::OutputChannelOutOfRange {
                index: output_channel,
                channels: n_ch,
            });
        }

        if let Some(adler) = adler_zero {
            if !adler.s0.is_finite() || !adler.s_norm.is_finite() || adler.s_norm == 0.0 {
                return Err(KMatrixError::InvalidAdlerZero { s0: adler.s0, s_norm: adler.s_norm });
            }
        }

        Ok(Self { spin, channels, resonances, background, output_channel, adler_zero })
    }

    pub fn spin(&self) -> Spin {
        self.spin
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn resonances(&self) -> &[Resonance] {
        &self.resonances
    }

    pub fn background(&self) -> &DMatrix<Float> {
        &self.background
    }

    pub fn output_channel(&self) -> usize {
        self.output_channel
    }

    pub fn adler_zero(&self) -> Option<AdlerZero> {
        self.adler_zero
    }

    /// Number of channels `C`.
    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of resonances `A`.
    pub fn n_resonances(&self) -> usize {
        self.resonances.len()
    }

    /// Coupling matrix `g` with shape `C × A`.
    pub fn couplings(&self) -> DMatrix<Float> {
        DMatrix::from_fn(self.n_channels(), self.n_resonances(), |i, a| {
            self.resonances[a].couplings[i]
        })
    }
}

// ---- Helper methods ----

fn validate_background(background: &DMatrix<Float>, n_ch: usize) -> KMatrixResult<()> {
    if background.nrows() != n_ch || background.ncols() != n_ch {
        return Err(KMatrixError::BackgroundDimMismatch {
            expected: n_ch,
            found: (background.nrows(), background.ncols()),
        });
    }
    for i in 0..n_ch {
        for j in 0..n_ch {
            let value = background[(i, j)];
            if !value.is_finite() {
                return Err(KMatrixError::NonFiniteEntry { what: "background", row: i, col: j, value });
            }
            if j > i && value != background[(j, i)] {
                return Err(KMatrixError::AsymmetricBackground { row: i, col: j });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Successful construction of a small two-channel wave and the `C × A`
    //   coupling transpose.
    // - Each rejection path of `WaveConfig::new`.
    //
    // They intentionally DO NOT cover:
    // - Dynamics built on top of the configuration (see `models::resonance`).
    // -------------------------------------------------------------------------

    fn two_channels() -> Vec<Channel> {
        vec![Channel::new(0.13498, 0.54786), Channel::new(0.49368, 0.49761)]
    }

    fn two_poles() -> Vec<Resonance> {
        vec![
            Resonance::new("a0(980)", 0.95395, vec![0.43215, -0.28825]),
            Resonance::new("a0(1450)", 1.26767, vec![0.19000, 0.43372]),
        ]
    }

    #[test]
    // Purpose
    // -------
    // Verify the happy path and the coupling-matrix orientation.
    //
    // Given
    // -----
    // - Two channels, two poles, zero background, output channel 1.
    //
    // Expect
    // ------
    // - Construction succeeds; `couplings()[(i, a)]` equals pole `a`'s
    //   coupling to channel `i`.
    fn new_accepts_valid_wave_and_transposes_couplings() {
        // Arrange
        let bkg = DMatrix::zeros(2, 2);

        // Act
        let cfg = WaveConfig::new(0, two_channels(), two_poles(), bkg, 1, None)
            .expect("valid wave should construct");

        // Assert
        let g = cfg.couplings();
        assert_eq!(g.shape(), (2, 2));
        assert_eq!(g[(1, 0)], -0.28825);
        assert_eq!(g[(0, 1)], 0.19000);
        assert_eq!(cfg.spin(), Spin::Zero);
        assert_eq!(cfg.output_channel(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Ensure unsupported spins are fatal at construction.
    //
    // Given
    // -----
    // - J = 1 with an otherwise valid wave.
    //
    // Expect
    // ------
    // - `Err(UnsupportedSpin { spin: 1 })`.
    fn new_rejects_unsupported_spin() {
        // Arrange
        let bkg = DMatrix::zeros(2, 2);

        // Act
        let err = WaveConfig::new(1, two_channels(), two_poles(), bkg, 1, None).unwrap_err();

        // Assert
        assert_eq!(err, KMatrixError::UnsupportedSpin { spin: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Check dimension validation for couplings and background.
    //
    // Given
    // -----
    // - A pole with three couplings for two channels.
    // - A 3×3 background for two channels.
    //
    // Expect
    // ------
    // - `CouplingCountMismatch` and `BackgroundDimMismatch` respectively.
    fn new_rejects_dimension_mismatches() {
        // Arrange
        let mut poles = two_poles();
        poles[1].couplings.push(0.1);

        // Act
        let coupling_err =
            WaveConfig::new(0, two_channels(), poles, DMatrix::zeros(2, 2), 0, None).unwrap_err();
        let bkg_err =
            WaveConfig::new(0, two_channels(), two_poles(), DMatrix::zeros(3, 3), 0, None)
                .unwrap_err();

        // Assert
        assert_eq!(
            coupling_err,
            KMatrixError::CouplingCountMismatch { resonance: 1, expected: 2, found: 3 }
        );
        assert_eq!(bkg_err, KMatrixError::BackgroundDimMismatch { expected: 2, found: (3, 3) });
    }

    #[test]
    // Purpose
    // -------
    // Ensure a non-symmetric background is rejected.
    //
    // Given
    // -----
    // - Background with b[0,1] = 0.1 and b[1,0] = 0.2.
    //
    // Expect
    // ------
    // - `Err(AsymmetricBackground { row: 0, col: 1 })`.
    fn new_rejects_asymmetric_background() {
        // Arrange
        let bkg = DMatrix::from_row_slice(2, 2, &[0.0, 0.1, 0.2, 0.0]);

        // Act
        let err = WaveConfig::new(0, two_channels(), two_poles(), bkg, 0, None).unwrap_err();

        // Assert
        assert_eq!(err, KMatrixError::AsymmetricBackground { row: 0, col: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Cover value checks: masses, output channel, empty wave, Adler zero.
    //
    // Given
    // -----
    // - A zero daughter mass, a negative pole mass, output channel 2 of 2,
    //   no resonances, and an Adler zero with s_norm = 0.
    //
    // Expect
    // ------
    // - The matching error variant for each case.
    fn new_rejects_invalid_values() {
        // Arrange
        let bkg = || DMatrix::zeros(2, 2);
        let mut bad_channels = two_channels();
        bad_channels[1].m1 = 0.0;
        let mut bad_poles = two_poles();
        bad_poles[0].mass = -1.0;

        // Act / Assert
        assert!(matches!(
            WaveConfig::new(0, bad_channels, two_poles(), bkg(), 0, None),
            Err(KMatrixError::InvalidChannelMass { channel: 1, .. })
        ));
        assert!(matches!(
            WaveConfig::new(0, two_channels(), bad_poles, bkg(), 0, None),
            Err(KMatrixError::InvalidResonanceMass { resonance: 0, .. })
        ));
        assert_eq!(
            WaveConfig::new(0, two_channels(), two_poles(), bkg(), 2, None),
            Err(KMatrixError::OutputChannelOutOfRange { index: 2, channels: 2 })
        );
        assert_eq!(
            WaveConfig::new(0, two_channels(), Vec::new(), bkg(), 0, None),
            Err(KMatrixError::EmptyWave { channels: 2, resonances: 0 })
        );
        assert!(matches!(
            WaveConfig::new(0, two_channels(), two_poles(), bkg(), 0, Some(AdlerZero::new(0.01, 0.0))),
            Err(KMatrixError::InvalidAdlerZero { .. })
        ));
    }
}
