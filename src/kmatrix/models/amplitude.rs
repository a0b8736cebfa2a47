//! Composite amplitude — four K-matrix waves combined with angular factors.
//!
//! Purpose
//! -------
//! Combine the f0, f2, a0, and a2 waves into the total amplitude
//! `A = S0 (F_f0 + F_a0) + D2(θ, φ) (F_f2 + F_a2)` and its intensity `|A|²`,
//! and precompute the β-independent parts of each event once.
//!
//! Key behaviors
//! -------------
//! - [`CompositeAmplitude::precompute`] evaluates, per wave, the output-channel
//!   row of `(I + KC)⁻¹` and (for spin-2 waves) the barrier matrix `B(s)`.
//!   The first wave whose inversion fails aborts the event.
//! - [`CompositeAmplitude::intensity_with`] is the hot path used by the
//!   likelihood: it only multiplies cached rows with freshly built
//!   production vectors.
//! - [`CompositeAmplitude::coupling_coefficients`] returns `d_k` such that
//!   `A = Σ_k β_k d_k`, which drives the analytic gradient.
//!
//! Invariants & assumptions
//! ------------------------
//! - The coupling vector has one entry per resonance of all four waves, in
//!   wave order f0, f2, a0, a2 and table order within each wave (13 entries
//!   for the built-in tables).
//! - `θ`, `φ` are helicity angles in radians.
//! - An [`EventContext`] is only valid for the `s` it was computed at.
//!
//! Conventions
//! -----------
//! - `S0 = sqrt(1/π)/2`, `D2(θ, φ) = sin²θ · e^{2iφ} · sqrt(15/(2π))/4`.
//! - `WaveContext::barrier == None` stands for the unit barrier of a spin-0
//!   wave.
//!
//! Downstream usage
//! ----------------
//! - `likelihood::setup` calls `precompute` once per event and stores the
//!   contexts; `likelihood::evaluator` calls `intensity_with` and
//!   `coupling_coefficients` for every parameter vector.
//!
//! Testing notes
//! -------------
//! - Tests cover the coupling layout, agreement of both intensity overloads,
//!   the angular factors, the coefficient decomposition, and failure on a
//!   pole.
use crate::kmatrix::{
    core::{
        config::WaveConfig,
        numeric::{C_ZERO, Complex, Float, consts::PI},
        spin::Spin,
    },
    errors::{InversionResult, KMatrixError, KMatrixResult},
    models::{resonance::ResonanceModel, tables},
};
use nalgebra::{DMatrix, DVector};
use std::ops::Range;

/// The four partial waves of the composite amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wave {
    F0,
    F2,
    A0,
    A2,
}

impl Wave {
    /// All waves in coupling order.
    pub const ALL: [Wave; 4] = [Wave::F0, Wave::F2, Wave::A0, Wave::A2];

    pub fn index(self) -> usize {
        match self {
            Wave::F0 => 0,
            Wave::F2 => 1,
            Wave::A0 => 2,
            Wave::A2 => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Wave::F0 => "f0",
            Wave::F2 => "f2",
            Wave::A0 => "a0",
            Wave::A2 => "a2",
        }
    }

    /// Spin the angular factor of this wave assumes.
    pub fn expected_spin(self) -> Spin {
        match self {
            Wave::F0 | Wave::A0 => Spin::Zero,
            Wave::F2 | Wave::A2 => Spin::Two,
        }
    }
}

/// β-independent invariants of one wave at one `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveContext {
    /// Output-channel row of `(I + KC)⁻¹`.
    pub row: DVector<Complex>,
    /// `B(s)` for spin-2 waves; `None` means unit barrier.
    pub barrier: Option<DMatrix<Float>>,
}

/// Precomputed invariants of one event, one entry per [`Wave`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    waves: [WaveContext; 4],
}

impl EventContext {
    pub fn wave(&self, wave: Wave) -> &WaveContext {
        &self.waves[wave.index()]
    }
}

/// Four-wave amplitude with S- and D-wave angular factors.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeAmplitude {
    models: [ResonanceModel; 4],
    offsets: [usize; 5],
}

impl CompositeAmplitude {
    /// Build the composite amplitude from four wave configurations.
    ///
    /// Errors
    /// ------
    /// - `KMatrixError::WaveSpinMismatch` if a wave's spin does not match the
    ///   angular factor it is combined with (J = 0 for f0/a0, J = 2 for f2/a2).
    /// - Any error from [`ResonanceModel::new`].
    pub fn new(f0: WaveConfig, f2: WaveConfig, a0: WaveConfig, a2: WaveConfig) -> KMatrixResult<Self> {
        let models = [
            ResonanceModel::new(f0)?,
            ResonanceModel::new(f2)?,
            ResonanceModel::new(a0)?,
            ResonanceModel::new(a2)?,
        ];
        for wave in Wave::ALL {
            let found = models[wave.index()].spin();
            if found != wave.expected_spin() {
                return Err(KMatrixError::WaveSpinMismatch {
                    wave: wave.name(),
                    expected: wave.expected_spin().j(),
                    found: found.j(),
                });
            }
        }
        let mut offsets = [0usize; 5];
        for (k, model) in models.iter().enumerate() {
            offsets[k + 1] = offsets[k] + model.n_resonances();
        }
        Ok(Self { models, offsets })
    }

    /// The amplitude built from the fixed analysis tables.
    pub fn standard() -> KMatrixResult<Self> {
        Self::new(tables::f0_config()?, tables::f2_config()?, tables::a0_config()?, tables::a2_config()?)
    }

    pub fn model(&self, wave: Wave) -> &ResonanceModel {
        &self.models[wave.index()]
    }

    /// Total number of complex couplings (13 for the built-in tables).
    pub fn n_couplings(&self) -> usize {
        self.offsets[4]
    }

    /// Slice of the coupling vector belonging to `wave`.
    pub fn coupling_range(&self, wave: Wave) -> Range<usize> {
        let k = wave.index();
        self.offsets[k]..self.offsets[k + 1]
    }

    /// Resonance labels in coupling order.
    pub fn resonance_names(&self) -> Vec<&str> {
        self.models
            .iter()
            .flat_map(|m| m.config().resonances().iter().map(|r| r.name.as_str()))
            .collect()
    }

    // ---- Per-wave invariants ----

    pub fn ikc_row(&self, wave: Wave, s: Float) -> InversionResult<DVector<Complex>> {
        self.model(wave).ikc_row(s)
    }

    /// `B(s)` for spin-2 waves, `None` for spin-0 waves.
    pub fn barrier_matrix(&self, wave: Wave, s: Float) -> Option<DMatrix<Float>> {
        let model = self.model(wave);
        match model.spin() {
            Spin::Zero => None,
            Spin::Two => Some(model.barrier_ratios(s)),
        }
    }

    /// Compute the β-independent context of one event.
    ///
    /// Errors
    /// ------
    /// - The first `InversionFailure` encountered, in wave order.
    pub fn precompute(&self, s: Float) -> InversionResult<EventContext> {
        let context = |wave: Wave| -> InversionResult<WaveContext> {
            Ok(WaveContext { row: self.ikc_row(wave, s)?, barrier: self.barrier_matrix(wave, s) })
        };
        Ok(EventContext {
            waves: [context(Wave::F0)?, context(Wave::F2)?, context(Wave::A0)?, context(Wave::A2)?],
        })
    }

    // ---- Angular factors ----

    /// `S0 = sqrt(1/π)/2`.
    pub fn s_wave_factor() -> Complex {
        Complex::new((1.0 / PI).sqrt() / 2.0, 0.0)
    }

    /// `D2(θ, φ) = sin²θ · e^{2iφ} · sqrt(15/(2π))/4`.
    pub fn d_wave_factor(theta: Float, phi: Float) -> Complex {
        let norm = (15.0 / (2.0 * PI)).sqrt() / 4.0;
        Complex::from_polar(theta.sin().powi(2) * norm, 2.0 * phi)
    }

    fn angular_factor(wave: Wave, theta: Float, phi: Float) -> Complex {
        match wave.expected_spin() {
            Spin::Zero => Self::s_wave_factor(),
            Spin::Two => Self::d_wave_factor(theta, phi),
        }
    }

    // ---- Amplitude and intensity ----

    /// `A = S0 (F_f0 + F_a0) + D2 (F_f2 + F_a2)` from a precomputed context.
    pub fn amplitude_sum(
        &self, betas: &[Complex], s: Float, theta: Float, phi: Float, ctx: &EventContext,
    ) -> KMatrixResult<Complex> {
        self.check_betas(betas)?;
        let mut total = C_ZERO;
        for wave in Wave::ALL {
            let wc = ctx.wave(wave);
            let f = self.model(wave).amplitude_with(
                s,
                &betas[self.coupling_range(wave)],
                &wc.row,
                wc.barrier.as_ref(),
            )?;
            total += Self::angular_factor(wave, theta, phi) * f;
        }
        Ok(total)
    }

    /// `|A|²` from inverse rows only; barrier matrices are recomputed.
    ///
    /// `rows` holds the output-channel inverse row of each wave in
    /// [`Wave::ALL`] order.
    pub fn intensity(
        &self, betas: &[Complex], s: Float, theta: Float, phi: Float, rows: &[DVector<Complex>; 4],
    ) -> KMatrixResult<Float> {
        let ctx = EventContext {
            waves: Wave::ALL.map(|wave| WaveContext {
                row: rows[wave.index()].clone(),
                barrier: self.barrier_matrix(wave, s),
            }),
        };
        self.intensity_with(betas, s, theta, phi, &ctx)
    }

    /// `|A|²` from a full precomputed context (hot path).
    pub fn intensity_with(
        &self, betas: &[Complex], s: Float, theta: Float, phi: Float, ctx: &EventContext,
    ) -> KMatrixResult<Float> {
        Ok(self.amplitude_sum(betas, s, theta, phi, ctx)?.norm_sqr())
    }

    /// Coefficients `d_k` with `A = Σ_k β_k d_k`, in coupling order.
    pub fn coupling_coefficients(
        &self, s: Float, theta: Float, phi: Float, ctx: &EventContext,
    ) -> KMatrixResult<DVector<Complex>> {
        let mut out = DVector::from_element(self.n_couplings(), C_ZERO);
        for wave in Wave::ALL {
            let wc = ctx.wave(wave);
            let angular = Self::angular_factor(wave, theta, phi);
            let terms = self.model(wave).resonance_terms(s, &wc.row, wc.barrier.as_ref())?;
            for (k, c) in self.coupling_range(wave).zip(terms.iter()) {
                out[k] = angular * c;
            }
        }
        Ok(out)
    }

    fn check_betas(&self, betas: &[Complex]) -> KMatrixResult<()> {
        if betas.len() != self.n_couplings() {
            return Err(KMatrixError::CouplingLengthMismatch {
                expected: self.n_couplings(),
                found: betas.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmatrix::core::channel::Channel;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The 13-entry coupling layout and resonance naming order.
    // - Agreement of `intensity` and `intensity_with`.
    // - Angular factors (S0 constant, D2 vanishing at θ = 0).
    // - The coefficient decomposition A = Σ β_k d_k.
    // - Failure of `precompute` on a pole and spin validation.
    //
    // They intentionally DO NOT cover:
    // - Per-wave reference kinematics (see `models::resonance`).
    // - Likelihood accumulation (see `likelihood::evaluator`).
    // -------------------------------------------------------------------------

    fn betas() -> Vec<Complex> {
        (0..13)
            .map(|k| Complex::from_polar(1.0 + 0.1 * k as Float, 0.3 * k as Float))
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Verify the coupling layout of the built-in amplitude.
    //
    // Given
    // -----
    // - `CompositeAmplitude::standard()`.
    //
    // Expect
    // ------
    // - 13 couplings split 5/4/2/2 across f0, f2, a0, a2, with names in
    //   table order.
    fn standard_amplitude_has_thirteen_couplings() {
        // Arrange / Act
        let amp = CompositeAmplitude::standard().unwrap();

        // Assert
        assert_eq!(amp.n_couplings(), 13);
        assert_eq!(amp.coupling_range(Wave::F0), 0..5);
        assert_eq!(amp.coupling_range(Wave::F2), 5..9);
        assert_eq!(amp.coupling_range(Wave::A0), 9..11);
        assert_eq!(amp.coupling_range(Wave::A2), 11..13);
        let names = amp.resonance_names();
        assert_eq!(names[0], "f0(500)");
        assert_eq!(names[5], "f2(1270)");
        assert_eq!(names[9], "a0(980)");
        assert_eq!(names[12], "a2(1700)");
    }

    #[test]
    // Purpose
    // -------
    // Ensure both intensity overloads agree.
    //
    // Given
    // -----
    // - s = 1.3, θ = 0.7, φ = −1.1, a generic β.
    //
    // Expect
    // ------
    // - `intensity(rows)` == `intensity_with(ctx)` up to 1e-9 relative, and
    //   both are non-negative.
    fn intensity_overloads_agree() {
        // Arrange
        let amp = CompositeAmplitude::standard().unwrap();
        let (s, theta, phi) = (1.3, 0.7, -1.1);
        let ctx = amp.precompute(s).expect("precompute should succeed at s = 1.3");
        let rows = Wave::ALL.map(|w| ctx.wave(w).row.clone());

        // Act
        let slow = amp.intensity(&betas(), s, theta, phi, &rows).unwrap();
        let fast = amp.intensity_with(&betas(), s, theta, phi, &ctx).unwrap();

        // Assert
        assert!(fast >= 0.0);
        assert!((slow - fast).abs() <= 1e-9 * fast.max(1.0));
    }

    #[test]
    // Purpose
    // -------
    // Check the angular factors.
    //
    // Given
    // -----
    // - θ = 0 and θ = π/2 at φ = 0.3.
    //
    // Expect
    // ------
    // - S0 = 0.2820948 (= 1/(2√π)).
    // - D2 = 0 at θ = 0; |D2| = sqrt(15/(2π))/4 at θ = π/2 with arg 2φ.
    fn angular_factors_match_definitions() {
        // Arrange
        let phi = 0.3;

        // Act
        let s0 = CompositeAmplitude::s_wave_factor();
        let d_forward = CompositeAmplitude::d_wave_factor(0.0, phi);
        let d_side = CompositeAmplitude::d_wave_factor(PI / 2.0, phi);

        // Assert
        assert!((s0.re - 0.2820948).abs() < 1e-6 && s0.im == 0.0);
        assert!(d_forward.norm() < 1e-12);
        assert!((d_side.norm() - (15.0 / (2.0 * PI)).sqrt() / 4.0).abs() < 1e-9);
        assert!((d_side.arg() - 2.0 * phi).abs() < 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Confirm that D-wave couplings do not contribute in the forward
    // direction.
    //
    // Given
    // -----
    // - β with only the f2 and a2 entries non-zero, θ = 0.
    //
    // Expect
    // ------
    // - Intensity is exactly zero.
    fn d_waves_vanish_at_zero_polar_angle() {
        // Arrange
        let amp = CompositeAmplitude::standard().unwrap();
        let s = 1.6;
        let ctx = amp.precompute(s).unwrap();
        let mut b = vec![C_ZERO; 13];
        for k in amp.coupling_range(Wave::F2).chain(amp.coupling_range(Wave::A2)) {
            b[k] = Complex::new(3.0, -1.0);
        }

        // Act
        let intensity = amp.intensity_with(&b, s, 0.0, 0.4, &ctx).unwrap();

        // Assert
        assert_eq!(intensity, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify the linear decomposition used by the analytic gradient.
    //
    // Given
    // -----
    // - Several (s, θ, φ) points and a generic β.
    //
    // Expect
    // ------
    // - Σ_k β_k d_k equals `amplitude_sum` within √ε relative, ε being the
    //   working precision.
    fn coupling_coefficients_reproduce_amplitude() {
        // Arrange
        let amp = CompositeAmplitude::standard().unwrap();
        let b = betas();
        let tol = Float::EPSILON.sqrt();

        for (s, theta, phi) in [(0.8, 0.2, 0.1), (1.3, 1.4, -2.0), (2.9, 2.5, 3.0)] {
            let ctx = amp.precompute(s).unwrap();

            // Act
            let direct = amp.amplitude_sum(&b, s, theta, phi, &ctx).unwrap();
            let d = amp.coupling_coefficients(s, theta, phi, &ctx).unwrap();
            let linear: Complex = d.iter().zip(&b).map(|(dk, bk)| dk * bk).sum();

            // Assert
            assert!((direct - linear).norm() <= tol * direct.norm().max(1.0), "s = {s}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure an event exactly on a pole fails precomputation recoverably.
    //
    // Given
    // -----
    // - s = m² of the a0(980) pole.
    //
    // Expect
    // ------
    // - `precompute` returns `Err` carrying that s.
    fn precompute_fails_on_pole() {
        // Arrange
        let amp = CompositeAmplitude::standard().unwrap();
        let s = 0.95395 * 0.95395;

        // Act
        let result = amp.precompute(s);

        // Assert
        assert_eq!(result.expect_err("pole should fail").s, s);
    }

    #[test]
    // Purpose
    // -------
    // Ensure an event exactly at the KK̄ threshold is a legal input.
    //
    // Given
    // -----
    // - s = (m_K± + m_K0)², where ρ and χ+ of that channel vanish.
    //
    // Expect
    // ------
    // - `precompute` succeeds and the intensity is finite.
    fn precompute_succeeds_at_kk_threshold() {
        // Arrange
        let amp = CompositeAmplitude::standard().unwrap();
        let s = Channel::new(0.49368, 0.49761).threshold();

        // Act
        let ctx = amp.precompute(s).expect("threshold is not a failure");
        let intensity = amp.intensity_with(&betas(), s, 0.7, 0.2, &ctx).unwrap();

        // Assert
        assert!(intensity.is_finite() && intensity >= 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure wrong coupling lengths and wave spins are rejected.
    //
    // Given
    // -----
    // - A 12-entry β; an amplitude with the f2 and a2 slots swapped with
    //   spin-0 tables.
    //
    // Expect
    // ------
    // - `CouplingLengthMismatch { expected: 13, found: 12 }`.
    // - `WaveSpinMismatch` for the f2 slot.
    fn rejects_bad_lengths_and_spins() {
        // Arrange
        let amp = CompositeAmplitude::standard().unwrap();
        let ctx = amp.precompute(1.3).unwrap();
        let short = vec![C_ZERO; 12];

        // Act
        let len_err = amp.intensity_with(&short, 1.3, 0.5, 0.5, &ctx);
        let spin_err = CompositeAmplitude::new(
            tables::f0_config().unwrap(),
            tables::a0_config().unwrap(),
            tables::a0_config().unwrap(),
            tables::a2_config().unwrap(),
        );

        // Assert
        assert_eq!(len_err, Err(KMatrixError::CouplingLengthMismatch { expected: 13, found: 12 }));
        assert_eq!(
            spin_err.unwrap_err(),
            KMatrixError::WaveSpinMismatch { wave: "f2", expected: 2, found: 0 }
        );
    }
}
