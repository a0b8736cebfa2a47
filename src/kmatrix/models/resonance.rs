//! Resonance model — unitarized K-matrix dynamics for one partial wave.
//!
//! Purpose
//! -------
//! Turn a kinematic invariant `s` and a vector of production couplings `β`
//! into the wave's production amplitude
//! `F(s, β) = Σ_i [(I + K(s) C(s))⁻¹]_{c,i} P_i(s, β)`, where `c` is the
//! configured output channel.
//!
//! Key behaviors
//! -------------
//! - Vector quantities per channel: `χ±(s)`, `ρ(s)`, `q(s)` and the
//!   Blatt–Weisskopf factors `bw(s)`.
//! - Barrier ratios `B(s)` (`C × A`) and their per-pole outer products
//!   `B2(s)` (`A` slices of `C × C`), normalized by `bw(m_α²)` computed once
//!   in [`ResonanceModel::new`].
//! - `K(s)` with optional Adler-zero rescaling, the diagonal Chew–Mandelstam
//!   matrix `C(s)`, and `(I + KC)⁻¹` with explicit failure reporting.
//! - Production vector `P(s, β)` and amplitude `F` in two call shapes: one
//!   recomputes `B(s)`, the other takes a cached `B(s)` and a cached inverse
//!   row.
//!
//! Invariants & assumptions
//! ------------------------
//! - The wave configuration is validated and immutable; `C` and `A` never
//!   change after construction.
//! - `s` is finite and strictly positive. Sub-threshold values are legal and
//!   produce finite complex outputs.
//! - Pole terms use the `(m_α² − s)` sign convention in both `K` and `P`.
//!
//! Conventions
//! -----------
//! - `K(s)` is real for real `s`; it is returned as a complex matrix because
//!   it is immediately combined with the complex `C(s)`.
//! - A `None` barrier in the fast-path calls means the unit barrier; the
//!   composite amplitude uses it for spin-0 waves.
//! - `F` uses the non-conjugating dot product.
//!
//! Downstream usage
//! ----------------
//! - [`CompositeAmplitude`](crate::kmatrix::models::amplitude::CompositeAmplitude)
//!   owns one model per wave, precomputes inverse rows and barrier matrices
//!   per event, and calls [`ResonanceModel::amplitude_with`] in the hot path.
//!
//! Testing notes
//! -------------
//! - Unit tests pin `χ±`, `ρ`, `q`, `bw`, `B`, and `B2` to reference values
//!   for the a2 channel set above and below threshold, check the inverse
//!   identity, linearity in `β`, and agreement of the two call shapes.
use crate::kmatrix::{
    core::{
        channel::Channel,
        config::{AdlerZero, WaveConfig},
        numeric::{C_ZERO, Complex, Float},
        spin::Spin,
    },
    errors::{
        InversionFailure, InversionFailureKind, InversionResult, KMatrixError, KMatrixResult,
    },
};
use nalgebra::{DMatrix, DVector};

/// Immutable K-matrix dynamics engine for one wave.
#[derive(Debug, Clone, PartialEq)]
pub struct ResonanceModel {
    config: WaveConfig,
    /// `g`, shape `C × A`.
    couplings: DMatrix<Float>,
    /// `m_α²` per pole.
    pole_s: DVector<Float>,
    /// `bw_i(m_α²)`, shape `C × A`.
    pole_barriers: DMatrix<Float>,
}

impl ResonanceModel {
    /// Build the model and precompute pole-mass barrier factors.
    ///
    /// Errors
    /// ------
    /// - `KMatrixError::DegenerateBarrier` if some `bw_i(m_α²)` is zero or
    ///   non-finite, which would make `B(s)` undefined. This can only happen
    ///   for spin 2 when a pole sits exactly on a channel threshold.
    pub fn new(config: WaveConfig) -> KMatrixResult<Self> {
        let couplings = config.couplings();
        let pole_s = DVector::from_iterator(
            config.n_resonances(),
            config.resonances().iter().map(|r| r.mass * r.mass),
        );
        let spin = config.spin();
        let pole_barriers = DMatrix::from_fn(config.n_channels(), config.n_resonances(), |i, a| {
            spin.barrier(config.channels()[i].q(pole_s[a]))
        });
        for (resonance, col) in pole_barriers.column_iter().enumerate() {
            for (channel, &value) in col.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(KMatrixError::DegenerateBarrier { channel, resonance, value });
                }
            }
        }
        Ok(Self { config, couplings, pole_s, pole_barriers })
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn spin(&self) -> Spin {
        self.config.spin()
    }

    pub fn n_channels(&self) -> usize {
        self.config.n_channels()
    }

    pub fn n_resonances(&self) -> usize {
        self.config.n_resonances()
    }

    // ---- Kinematics ----

    pub fn chi_plus(&self, s: Float) -> DVector<Complex> {
        self.per_channel(|ch| ch.chi_plus(s))
    }

    pub fn chi_minus(&self, s: Float) -> DVector<Complex> {
        self.per_channel(|ch| ch.chi_minus(s))
    }

    pub fn rho(&self, s: Float) -> DVector<Complex> {
        self.per_channel(|ch| ch.rho(s))
    }

    pub fn q(&self, s: Float) -> DVector<Complex> {
        self.per_channel(|ch| ch.q(s))
    }

    /// Blatt–Weisskopf factor per channel; all ones for spin 0.
    pub fn blatt_weisskopf(&self, s: Float) -> DVector<Float> {
        let spin = self.spin();
        DVector::from_iterator(
            self.n_channels(),
            self.config.channels().iter().map(|ch| spin.barrier(ch.q(s))),
        )
    }

    /// Barrier ratios `B[i, α] = bw_i(s) / bw_i(m_α²)`.
    pub fn barrier_ratios(&self, s: Float) -> DMatrix<Float> {
        let bw = self.blatt_weisskopf(s);
        DMatrix::from_fn(self.n_channels(), self.n_resonances(), |i, a| {
            bw[i] / self.pole_barriers[(i, a)]
        })
    }

    /// Per-pole outer products `B2[α][i, j] = B[i, α] B[j, α]`.
    pub fn barrier_ratio_tensor(&self, s: Float) -> Vec<DMatrix<Float>> {
        let b = self.barrier_ratios(s);
        b.column_iter()
            .map(|col| {
                let col = col.into_owned();
                &col * col.transpose()
            })
            .collect()
    }

    // ---- Production matrices ----

    /// `K(s) = Σ_α [g_α g_αᵀ / (m_α² − s) + background] ⊙ B2_α`.
    pub fn k_matrix(&self, s: Float) -> DMatrix<Complex> {
        self.k_matrix_real(s).map(|x| Complex::new(x, 0.0))
    }

    /// `K(s)` rescaled by the Adler factor `(s − s0)/s_norm`.
    pub fn k_matrix_with_adler(&self, s: Float, adler: AdlerZero) -> DMatrix<Complex> {
        let factor = adler.factor(s);
        self.k_matrix_real(s).map(|x| Complex::new(x * factor, 0.0))
    }

    /// `K(s)` with the wave's configured Adler zero, if any.
    pub fn adler_k_matrix(&self, s: Float) -> DMatrix<Complex> {
        match self.config.adler_zero() {
            Some(adler) => self.k_matrix_with_adler(s, adler),
            None => self.k_matrix(s),
        }
    }

    /// Diagonal Chew–Mandelstam matrix `C(s)`.
    pub fn chew_mandelstam(&self, s: Float) -> DMatrix<Complex> {
        DMatrix::from_diagonal(&self.per_channel(|ch| ch.chew_mandelstam(s)))
    }

    /// `(I + K(s) C(s))⁻¹`, using the Adler-rescaled `K` when configured.
    ///
    /// Errors
    /// ------
    /// - `InversionFailureKind::NonFinite` if `I + KC` or its inverse has a
    ///   NaN/±∞ entry (e.g. `s` exactly on a pole).
    /// - `InversionFailureKind::Singular` if LU finds a zero pivot.
    /// - `InversionFailureKind::IllConditioned` if the 1-norm reciprocal
    ///   condition number is below `Float::EPSILON`.
    pub fn ikc_inverse(&self, s: Float) -> InversionResult<DMatrix<Complex>> {
        let n = self.n_channels();
        let ikc = DMatrix::<Complex>::identity(n, n) + self.adler_k_matrix(s) * self.chew_mandelstam(s);
        if !all_finite(&ikc) {
            return Err(InversionFailure::new(s, InversionFailureKind::NonFinite));
        }
        let norm = one_norm(&ikc);
        let inv = ikc
            .try_inverse()
            .ok_or(InversionFailure::new(s, InversionFailureKind::Singular))?;
        if !all_finite(&inv) {
            return Err(InversionFailure::new(s, InversionFailureKind::NonFinite));
        }
        let rcond = 1.0 / (norm * one_norm(&inv));
        if rcond.is_nan() || rcond < Float::EPSILON {
            return Err(InversionFailure::new(s, InversionFailureKind::IllConditioned { rcond }));
        }
        Ok(inv)
    }

    /// Row of `(I + KC)⁻¹` for the configured output channel.
    pub fn ikc_row(&self, s: Float) -> InversionResult<DVector<Complex>> {
        let inv = self.ikc_inverse(s)?;
        Ok(inv.row(self.config.output_channel()).transpose())
    }

    // ---- Production amplitude ----

    /// `P_i(s, β) = Σ_α β_α g_{iα} B_{iα}(s) / (m_α² − s)`, recomputing `B(s)`.
    pub fn production_vector(&self, s: Float, betas: &[Complex]) -> KMatrixResult<DVector<Complex>> {
        let barrier = self.barrier_ratios(s);
        self.production_vector_with(s, betas, Some(&barrier))
    }

    /// Production vector with a caller-supplied `B(s)`; `None` means unit barrier.
    pub fn production_vector_with(
        &self, s: Float, betas: &[Complex], barrier: Option<&DMatrix<Float>>,
    ) -> KMatrixResult<DVector<Complex>> {
        self.check_betas(betas)?;
        self.check_barrier(barrier)?;
        let mut p = DVector::from_element(self.n_channels(), C_ZERO);
        for (a, &beta) in betas.iter().enumerate() {
            let pole = beta / (self.pole_s[a] - s);
            for i in 0..self.n_channels() {
                let b = barrier.map_or(1.0, |m| m[(i, a)]);
                p[i] += pole * (self.couplings[(i, a)] * b);
            }
        }
        Ok(p)
    }

    /// `F(s, β)` for a given inverse row, recomputing `B(s)`.
    pub fn amplitude(&self, s: Float, betas: &[Complex], row: &DVector<Complex>) -> KMatrixResult<Complex> {
        let barrier = self.barrier_ratios(s);
        self.amplitude_with(s, betas, row, Some(&barrier))
    }

    /// `F(s, β)` from a cached inverse row and cached `B(s)` (fast path).
    pub fn amplitude_with(
        &self, s: Float, betas: &[Complex], row: &DVector<Complex>, barrier: Option<&DMatrix<Float>>,
    ) -> KMatrixResult<Complex> {
        self.check_row(row)?;
        let p = self.production_vector_with(s, betas, barrier)?;
        Ok(row.dot(&p))
    }

    /// Per-pole coefficients `c_α` such that `F(s, β) = Σ_α β_α c_α`.
    ///
    /// `F` is linear in `β`, so these coefficients carry all β-independent
    /// information of one event; the analytic likelihood gradient is built
    /// from them.
    pub fn resonance_terms(
        &self, s: Float, row: &DVector<Complex>, barrier: Option<&DMatrix<Float>>,
    ) -> KMatrixResult<DVector<Complex>> {
        self.check_row(row)?;
        self.check_barrier(barrier)?;
        let terms = (0..self.n_resonances()).map(|a| {
            let mut c = C_ZERO;
            for i in 0..self.n_channels() {
                let b = barrier.map_or(1.0, |m| m[(i, a)]);
                c += row[i] * (self.couplings[(i, a)] * b);
            }
            c / (self.pole_s[a] - s)
        });
        Ok(DVector::from_iterator(self.n_resonances(), terms))
    }

    // ---- Helper methods ----

    fn per_channel<F: Fn(&Channel) -> Complex>(&self, f: F) -> DVector<Complex> {
        DVector::from_iterator(self.n_channels(), self.config.channels().iter().map(f))
    }

    fn k_matrix_real(&self, s: Float) -> DMatrix<Float> {
        let n = self.n_channels();
        let background = self.config.background();
        let mut k = DMatrix::<Float>::zeros(n, n);
        for (a, b2) in self.barrier_ratio_tensor(s).iter().enumerate() {
            let g = self.couplings.column(a).into_owned();
            let pole = (&g * g.transpose()) / (self.pole_s[a] - s) + background;
            k += pole.component_mul(b2);
        }
        k
    }

    fn check_betas(&self, betas: &[Complex]) -> KMatrixResult<()> {
        if betas.len() != self.n_resonances() {
            return Err(KMatrixError::CouplingLengthMismatch {
                expected: self.n_resonances(),
                found: betas.len(),
            });
        }
        Ok(())
    }

    fn check_barrier(&self, barrier: Option<&DMatrix<Float>>) -> KMatrixResult<()> {
        if let Some(b) = barrier {
            let expected = (self.n_channels(), self.n_resonances());
            if b.shape() != expected {
                return Err(KMatrixError::BarrierDimMismatch { expected, found: b.shape() });
            }
        }
        Ok(())
    }

    fn check_row(&self, row: &DVector<Complex>) -> KMatrixResult<()> {
        if row.len() != self.n_channels() {
            return Err(KMatrixError::RowLengthMismatch {
                expected: self.n_channels(),
                found: row.len(),
            });
        }
        Ok(())
    }
}

fn all_finite(m: &DMatrix<Complex>) -> bool {
    m.iter().all(|z| z.re.is_finite() && z.im.is_finite())
}

/// Maximum absolute column sum.
fn one_norm(m: &DMatrix<Complex>) -> Float {
    m.column_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<Float>())
        .fold(0.0, Float::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmatrix::core::config::Resonance;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Reference values of χ±, ρ, q, bw, B, and B2 for the a2 channel set
    //   at s = 1.3 (above all thresholds) and s = 0.9 (below two of them),
    //   for both spin 0 and spin 2.
    // - The identity (I + KC) · (I + KC)⁻¹ ≈ I.
    // - Linearity of F in β and agreement between the two call shapes and
    //   the per-pole decomposition.
    // - Length/shape validation of couplings, rows, and barrier matrices.
    //
    // They intentionally DO NOT cover:
    // - The composite four-wave intensity (see `models::amplitude`).
    // - Configuration validation (see `core::config`).
    // -------------------------------------------------------------------------

    const REL_TOL: Float = 1e-5;

    fn a2_like(j: u32) -> ResonanceModel {
        let channels = vec![
            Channel::new(0.13498, 0.54786),
            Channel::new(0.49368, 0.49761),
            Channel::new(0.13498, 0.95778),
        ];
        let resonances = vec![
            Resonance::new("a2(1320)", 1.30080, vec![0.30073, 0.21426, -0.09162]),
            Resonance::new("a2(1700)", 1.75351, vec![0.68567, 0.12543, 0.00184]),
        ];
        let background = DMatrix::from_row_slice(
            3,
            3,
            &[-0.40184, 0.00033, -0.08707, 0.00033, -0.21416, -0.06193, -0.08707, -0.06193, -0.17435],
        );
        let cfg = WaveConfig::new(j, channels, resonances, background, 1, None)
            .expect("a2 table should be valid");
        ResonanceModel::new(cfg).expect("a2 barriers should normalize")
    }

    fn assert_close(actual: Float, expected: Float, what: &str) {
        let tol = REL_TOL * expected.abs() + 1e-9;
        assert!((actual - expected).abs() <= tol, "{what}: got {actual}, expected {expected}");
    }

    fn assert_real_vec(actual: &DVector<Complex>, expected: &[Float], what: &str) {
        assert_eq!(actual.len(), expected.len());
        for (i, (z, &e)) in actual.iter().zip(expected).enumerate() {
            assert_close(z.re, e, &format!("{what}[{i}].re"));
            assert!(z.im.abs() < 1e-9, "{what}[{i}] should be real, got {z}");
        }
    }

    fn betas(scale: Float) -> Vec<Complex> {
        vec![Complex::new(1.5, -0.3) * scale, Complex::new(-0.4, 2.2) * scale]
    }

    #[test]
    // Purpose
    // -------
    // Pin the kinematic vectors above threshold to reference values.
    //
    // Given
    // -----
    // - The a2 channel set at s = 1.3.
    //
    // Expect
    // ------
    // - χ+, χ−, ρ, q match the reference vectors and are real.
    fn kinematics_match_reference_above_threshold() {
        // Arrange
        let model = a2_like(2);
        let s = 1.3;

        // Act / Assert
        assert_real_vec(&model.chi_plus(s), &[0.6413304, 0.2441109, 0.08144276], "chi+");
        assert_real_vec(&model.chi_minus(s), &[0.8688693, 0.9999881, 0.4792309], "chi-");
        assert_real_vec(&model.rho(s), &[0.7464799, 0.4940728, 0.1975598], "rho");
        assert_real_vec(&model.q(s), &[0.4255590, 0.2816649, 0.1126264], "q");
    }

    #[test]
    // Purpose
    // -------
    // Check analytic continuation of ρ and q below threshold.
    //
    // Given
    // -----
    // - The a2 channel set at s = 0.9 (KK̄ and πη' channels closed).
    //
    // Expect
    // ------
    // - ρ ≈ [0.6250123, 0.3030483i, 0.2845612i] and
    //   q ≈ [0.2964694, 0.1437484i, 0.1349792i], imaginary parts positive.
    fn kinematics_continue_below_threshold() {
        // Arrange
        let model = a2_like(2);
        let s = 0.9;

        // Act
        let rho = model.rho(s);
        let q = model.q(s);

        // Assert
        assert_close(rho[0].re, 0.6250123, "rho[0]");
        assert_close(q[0].re, 0.2964694, "q[0]");
        for (i, e) in [(1, 0.3030483), (2, 0.2845612)] {
            assert_eq!(rho[i].re, 0.0, "rho[{i}] should be imaginary");
            assert!(rho[i].im > 0.0);
            assert_close(rho[i].im, e, &format!("rho[{i}].im"));
        }
        for (i, e) in [(1, 0.1437484), (2, 0.1349792)] {
            assert_eq!(q[i].re, 0.0);
            assert_close(q[i].im, e, &format!("q[{i}].im"));
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the spin-0 barrier, B and B2 are identically one.
    //
    // Given
    // -----
    // - The a2 channel set configured with J = 0, at s = 1.3 and s = 0.9.
    //
    // Expect
    // ------
    // - bw, B (3×2), and every B2 slice (3×3) contain only ones.
    fn spin_zero_barriers_are_unity() {
        // Arrange
        let model = a2_like(0);

        for s in [1.3, 0.9] {
            // Act
            let bw = model.blatt_weisskopf(s);
            let b = model.barrier_ratios(s);
            let b2 = model.barrier_ratio_tensor(s);

            // Assert
            assert!(bw.iter().all(|&x| x == 1.0));
            assert_eq!(b.shape(), (3, 2));
            assert!(b.iter().all(|&x| x == 1.0));
            assert_eq!(b2.len(), 2);
            assert!(b2.iter().all(|m| m.shape() == (3, 3) && m.iter().all(|&x| x == 1.0)));
        }
    }

    #[test]
    // Purpose
    // -------
    // Pin the spin-2 barrier factors and ratios to reference values.
    //
    // Given
    // -----
    // - The a2 channel set with J = 2 at s = 1.3 and s = 0.9.
    //
    // Expect
    // ------
    // - bw and B match the reference tables within 1e-5 relative.
    fn spin_two_barriers_match_reference() {
        // Arrange
        let model = a2_like(2);
        let cases: [(Float, [Float; 3], [[Float; 2]; 3]); 2] = [
            (
                1.3,
                [2.511697, 1.674049, 0.3699875],
                [[0.8820837, 0.7711838], [0.6715552, 0.5238816], [0.2296635, 0.1222795]],
            ),
            (
                0.9,
                [1.781955, 0.6902086, 0.6036541],
                [[0.6258054, 0.5471261], [0.2768815, 0.2159958], [0.3747081, 0.1995055]],
            ),
        ];

        for (s, bw_ref, b_ref) in cases {
            // Act
            let bw = model.blatt_weisskopf(s);
            let b = model.barrier_ratios(s);

            // Assert
            for i in 0..3 {
                assert_close(bw[i], bw_ref[i], &format!("bw[{i}] at s = {s}"));
                for a in 0..2 {
                    assert_close(b[(i, a)], b_ref[i][a], &format!("B[{i},{a}] at s = {s}"));
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Pin the first B2 slice to reference values above and below threshold.
    //
    // Given
    // -----
    // - The a2 channel set with J = 2.
    //
    // Expect
    // ------
    // - B2[0] matches the reference outer products and is symmetric.
    fn spin_two_barrier_tensor_matches_reference() {
        // Arrange
        let model = a2_like(2);
        let cases: [(Float, [[Float; 3]; 3]); 2] = [
            (
                1.3,
                [
                    [0.7780716, 0.5923679, 0.2025824],
                    [0.5923679, 0.4509864, 0.1542317],
                    [0.2025824, 0.1542317, 0.05274532],
                ],
            ),
            (
                0.9,
                [
                    [0.3916324, 0.1732739, 0.2344944],
                    [0.1732739, 0.07666336, 0.1037497],
                    [0.2344944, 0.1037497, 0.1404062],
                ],
            ),
        ];

        for (s, slice_ref) in cases {
            // Act
            let b2 = model.barrier_ratio_tensor(s);

            // Assert
            for i in 0..3 {
                for j in 0..3 {
                    assert_close(b2[0][(i, j)], slice_ref[i][j], &format!("B2[0][{i},{j}] at s = {s}"));
                    assert_eq!(b2[0][(i, j)], b2[0][(j, i)]);
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that the returned inverse actually inverts I + KC.
    //
    // Given
    // -----
    // - The a2 wave (J = 2) on a grid of s values spanning sub-threshold
    //   and physical regions.
    //
    // Expect
    // ------
    // - max |(I + KC)·inv − I| ≤ 1e-4 · max(1, ‖inv‖₁) wherever inversion succeeds.
    fn ikc_inverse_inverts_matrix() {
        // Arrange
        let model = a2_like(2);

        for s in [0.2, 0.5, 0.9, 1.1, 1.3, 2.0, 3.5] {
            // Act
            let inv = match model.ikc_inverse(s) {
                Ok(inv) => inv,
                Err(_) => continue,
            };
            let ikc = DMatrix::<Complex>::identity(3, 3) + model.k_matrix(s) * model.chew_mandelstam(s);
            let product = ikc * &inv;

            // Assert
            let scale = one_norm(&inv).max(1.0);
            for i in 0..3 {
                for j in 0..3 {
                    let target = if i == j { 1.0 } else { 0.0 };
                    let err = (product[(i, j)] - Complex::new(target, 0.0)).norm();
                    assert!(err <= 1e-4 * scale, "identity violated at s = {s}: ({i},{j}) err {err}");
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Check that the Adler factor rescales K exactly.
    //
    // Given
    // -----
    // - The a2 wave and an Adler zero (s0 = 0.0091125, s_norm = 1).
    //
    // Expect
    // ------
    // - k_matrix_with_adler(s) = (s − s0) · k_matrix(s) entrywise.
    fn adler_zero_rescales_k_matrix() {
        // Arrange
        let model = a2_like(0);
        let adler = AdlerZero::new(0.0091125, 1.0);
        let s = 1.1;

        // Act
        let k = model.k_matrix(s);
        let ka = model.k_matrix_with_adler(s, adler);

        // Assert
        for (x, y) in k.iter().zip(ka.iter()) {
            assert!((x * (s - 0.0091125) - y).norm() < 1e-9);
        }
        assert!(model.adler_k_matrix(s) == k);
    }

    #[test]
    // Purpose
    // -------
    // Verify linearity of F in β and agreement of all call shapes.
    //
    // Given
    // -----
    // - The a2 wave (J = 2) at s = 1.3 with its output-channel inverse row.
    // - β and a·β for a = 2.5 − 0.7i.
    //
    // Expect
    // ------
    // - F(aβ) = a F(β).
    // - `amplitude` equals `amplitude_with` given the same B(s).
    // - Σ β_α c_α from `resonance_terms` equals F.
    fn amplitude_is_linear_and_call_shapes_agree() {
        // Arrange
        let model = a2_like(2);
        let s = 1.3;
        let row = model.ikc_row(s).expect("inversion should succeed at s = 1.3");
        let b = model.barrier_ratios(s);
        let a = Complex::new(2.5, -0.7);
        let base = betas(1.0);
        let scaled: Vec<Complex> = base.iter().map(|z| z * a).collect();

        // Act
        let f = model.amplitude(s, &base, &row).unwrap();
        let f_fast = model.amplitude_with(s, &base, &row, Some(&b)).unwrap();
        let f_scaled = model.amplitude_with(s, &scaled, &row, Some(&b)).unwrap();
        let terms = model.resonance_terms(s, &row, Some(&b)).unwrap();
        let f_terms: Complex = terms.iter().zip(&base).map(|(c, beta)| c * beta).sum();

        // Assert
        assert!((f - f_fast).norm() < 1e-9 * f.norm().max(1.0));
        assert!((f_scaled - a * f).norm() < 1e-6 * f_scaled.norm().max(1.0));
        assert!((f_terms - f).norm() < 1e-6 * f.norm().max(1.0));
    }

    #[test]
    // Purpose
    // -------
    // Ensure length and shape mismatches are reported, not panicked on.
    //
    // Given
    // -----
    // - Three couplings for a two-pole wave, a 2-entry row for a 3-channel
    //   wave, and a 2×2 barrier matrix.
    //
    // Expect
    // ------
    // - `CouplingLengthMismatch`, `RowLengthMismatch`, `BarrierDimMismatch`.
    fn evaluation_rejects_mismatched_inputs() {
        // Arrange
        let model = a2_like(2);
        let s = 1.3;
        let row = model.ikc_row(s).unwrap();
        let short_row = DVector::from_element(2, Complex::new(1.0, 0.0));
        let bad_barrier = DMatrix::from_element(2, 2, 1.0);
        let too_many = vec![Complex::new(1.0, 0.0); 3];

        // Act / Assert
        assert_eq!(
            model.amplitude(s, &too_many, &row),
            Err(KMatrixError::CouplingLengthMismatch { expected: 2, found: 3 })
        );
        assert_eq!(
            model.amplitude_with(s, &betas(1.0), &short_row, None),
            Err(KMatrixError::RowLengthMismatch { expected: 3, found: 2 })
        );
        assert_eq!(
            model.production_vector_with(s, &betas(1.0), Some(&bad_barrier)),
            Err(KMatrixError::BarrierDimMismatch { expected: (3, 2), found: (2, 2) })
        );
    }

    #[test]
    // Purpose
    // -------
    // Ensure evaluation exactly on a pole is a recoverable inversion failure.
    //
    // Given
    // -----
    // - s = m² of the first a2 pole, where K(s) diverges.
    //
    // Expect
    // ------
    // - `ikc_inverse` returns `Err` with the offending s; no panic.
    fn ikc_inverse_reports_failure_on_pole() {
        // Arrange
        let model = a2_like(2);
        let s = 1.30080 * 1.30080;

        // Act
        let result = model.ikc_inverse(s);

        // Assert
        let err = result.expect_err("pole should not invert cleanly");
        assert_eq!(err.s, s);
    }
}
