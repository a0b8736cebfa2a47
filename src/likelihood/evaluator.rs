//! Extended maximum-likelihood evaluator over precomputed samples.
//!
//! Purpose
//! -------
//! Evaluate
//!
//! ```text
//! ℓ(θ) = Σ_data w_i ln I(β(θ); e_i) − (1 / n_gen) Σ_acc w_j I(β(θ); e_j)
//! ```
//!
//! where `I = |A|²` is the composite intensity, `data` and `acc` are the
//! observed and accepted-MC samples, and `n_gen` is the number of generated
//! MC events. Also provides `∇ℓ`, fitting, and standard errors.
//!
//! Key behaviors
//! -------------
//! - Type-state construction: [`UnconfiguredLikelihood::new`] reads the event
//!   sources; [`UnconfiguredLikelihood::setup`] precomputes contexts (dropping
//!   events that fail inversion) and yields a [`ReadyLikelihood`].
//! - Sums use the deterministic chunked reductions from
//!   `optimization::numerical_stability`, so values do not depend on the
//!   rayon thread count.
//! - [`DomainPolicy`] decides what a non-positive data intensity means.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`LikelihoodState`] is immutable after setup; evaluation takes `&self`
//!   and may run concurrently.
//! - Evaluation never logs; only setup and `fit` do.
//!
//! Conventions
//! -----------
//! - Parameters, gradients, and sums are `f64`; per-event work runs at
//!   working precision and is widened before accumulation.
//! - Gradients are taken with respect to the free parameters of the
//!   [`CouplingLayout`], using `∂I/∂θ_p = 2 Re(conj(A) d_k ∂β_k/∂θ_p)` with
//!   `A = Σ_k β_k d_k`.
//!
//! Testing notes
//! -------------
//! - Unit tests compare against direct per-event sums, check permutation
//!   invariance, both domain policies, and the analytic gradient against
//!   finite differences. End-to-end fitting lives in `tests/`.
use crate::{
    inference::hessian::calc_standard_errors,
    kmatrix::{
        core::numeric::{Complex, Float, to_f64},
        errors::KMatrixError,
        models::{CompositeAmplitude, EventContext},
    },
    likelihood::{
        couplings::CouplingLayout,
        data::{EventCount, EventSample, EventSource},
        errors::{LikelihoodError, LikelihoodResult},
        setup::{PrecomputedSample, SetupReport, precompute_sample},
    },
    optimization::{
        errors::OptResult,
        loglik_optimizer::{Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, maximize},
        numerical_stability::{try_chunked_sum, try_chunked_sum_vec},
    },
};
use ndarray::Array1;
use slog::{Discard, Logger, info, o};

const DATA: &str = "data";
const ACCEPTED: &str = "accepted MC";

/// Treatment of data events whose intensity is zero or negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DomainPolicy {
    /// Return `LikelihoodError::NonPositiveIntensity`.
    #[default]
    Fail,
    /// `ℓ = −∞`. The gradient is undefined there and still errors.
    NegativeInfinity,
}

/// Evaluator configuration.
#[derive(Debug, Clone)]
pub struct LikelihoodOptions {
    pub policy: DomainPolicy,
    /// Receives setup diagnostics and fit summaries.
    pub logger: Logger,
}

impl Default for LikelihoodOptions {
    fn default() -> Self {
        Self { policy: DomainPolicy::default(), logger: Logger::root(Discard, o!()) }
    }
}

impl LikelihoodOptions {
    pub fn new(policy: DomainPolicy, logger: Logger) -> Self {
        Self { policy, logger }
    }
}

/// Precomputed data and accepted-MC samples plus the generated count.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodState {
    pub data: PrecomputedSample,
    pub mc: PrecomputedSample,
    pub n_generated: usize,
}

/// The objective itself: amplitude, coupling layout, and domain policy.
///
/// Implements [`LogLikelihood`] against a [`LikelihoodState`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedLikelihood {
    amplitude: CompositeAmplitude,
    layout: CouplingLayout,
    policy: DomainPolicy,
}

impl ExtendedLikelihood {
    pub fn new(
        amplitude: CompositeAmplitude, layout: CouplingLayout, policy: DomainPolicy,
    ) -> LikelihoodResult<Self> {
        if layout.n_couplings() != amplitude.n_couplings() {
            return Err(KMatrixError::CouplingLengthMismatch {
                expected: amplitude.n_couplings(),
                found: layout.n_couplings(),
            }
            .into());
        }
        Ok(Self { amplitude, layout, policy })
    }

    pub fn amplitude(&self) -> &CompositeAmplitude {
        &self.amplitude
    }

    pub fn layout(&self) -> &CouplingLayout {
        &self.layout
    }

    pub fn policy(&self) -> DomainPolicy {
        self.policy
    }

    /// Extended log-likelihood at `params`.
    ///
    /// Errors
    /// ------
    /// - Parameter layout errors (`ThetaLengthMismatch`, `NonFiniteParameter`).
    /// - `NonFiniteIntensity` for any data or MC event.
    /// - `NonPositiveIntensity` for a data event under [`DomainPolicy::Fail`].
    ///
    /// Under [`DomainPolicy::NegativeInfinity`] a non-positive data intensity
    /// yields `Ok(f64::NEG_INFINITY)`.
    pub fn log_likelihood(&self, params: &[f64], state: &LikelihoodState) -> LikelihoodResult<f64> {
        let betas = self.layout.betas(params)?;
        let data = &state.data;
        let data_sum = try_chunked_sum(data.len(), |i| -> LikelihoodResult<f64> {
            let (s, theta, phi, w) = data.events().event(i);
            let intensity =
                to_f64(self.amplitude.intensity_with(&betas, s, theta, phi, &data.contexts()[i])?);
            match self.checked_data_intensity(i, intensity)? {
                Some(intensity) => Ok(to_f64(w) * intensity.ln()),
                None => Ok(f64::NEG_INFINITY),
            }
        })?;
        let mc_sum = self.mc_sum(&betas, &state.mc)?;
        Ok(data_sum - mc_sum / state.n_generated as f64)
    }

    /// `∇ℓ` with respect to the layout's free parameters.
    ///
    /// Errors
    /// ------
    /// - As [`ExtendedLikelihood::log_likelihood`], except that a
    ///   non-positive data intensity is an error under both policies.
    pub fn gradient(&self, params: &[f64], state: &LikelihoodState) -> LikelihoodResult<Grad> {
        let betas = self.layout.betas(params)?;
        let derivs = self.layout.derivatives(params)?;
        let dim = derivs.len();

        let data = &state.data;
        let data_grad = try_chunked_sum_vec(data.len(), dim, |i| -> LikelihoodResult<Grad> {
            let (s, theta, phi, w) = data.events().event(i);
            let (intensity, d_intensity) =
                self.intensity_and_derivatives(&betas, &derivs, s, theta, phi, &data.contexts()[i])?;
            match self.checked_data_intensity(i, intensity)? {
                Some(intensity) => Ok(d_intensity * (to_f64(w) / intensity)),
                None => Err(LikelihoodError::NonPositiveIntensity { index: i, value: intensity }),
            }
        })?;

        let mc = &state.mc;
        let mc_grad = try_chunked_sum_vec(mc.len(), dim, |j| -> LikelihoodResult<Grad> {
            let (s, theta, phi, w) = mc.events().event(j);
            let (intensity, d_intensity) =
                self.intensity_and_derivatives(&betas, &derivs, s, theta, phi, &mc.contexts()[j])?;
            if !intensity.is_finite() {
                return Err(LikelihoodError::NonFiniteIntensity {
                    sample: ACCEPTED,
                    index: j,
                    value: intensity,
                });
            }
            Ok(d_intensity * to_f64(w))
        })?;

        Ok(data_grad - mc_grad / state.n_generated as f64)
    }

    fn mc_sum(&self, betas: &[Complex], mc: &PrecomputedSample) -> LikelihoodResult<f64> {
        try_chunked_sum(mc.len(), |j| -> LikelihoodResult<f64> {
            let (s, theta, phi, w) = mc.events().event(j);
            let intensity =
                to_f64(self.amplitude.intensity_with(betas, s, theta, phi, &mc.contexts()[j])?);
            if !intensity.is_finite() {
                return Err(LikelihoodError::NonFiniteIntensity {
                    sample: ACCEPTED,
                    index: j,
                    value: intensity,
                });
            }
            Ok(to_f64(w) * intensity)
        })
    }

    /// `Some(I)` for a usable data intensity, `None` for a non-positive one
    /// tolerated by the policy.
    fn checked_data_intensity(&self, index: usize, intensity: f64) -> LikelihoodResult<Option<f64>> {
        if !intensity.is_finite() {
            return Err(LikelihoodError::NonFiniteIntensity { sample: DATA, index, value: intensity });
        }
        if intensity > 0.0 {
            return Ok(Some(intensity));
        }
        match self.policy {
            DomainPolicy::Fail => {
                Err(LikelihoodError::NonPositiveIntensity { index, value: intensity })
            }
            DomainPolicy::NegativeInfinity => Ok(None),
        }
    }

    /// `I` and `∂I/∂θ_p` for one event.
    fn intensity_and_derivatives(
        &self, betas: &[Complex], derivs: &[(usize, Complex)], s: Float,
        theta: Float, phi: Float, ctx: &EventContext,
    ) -> LikelihoodResult<(f64, Array1<f64>)> {
        let coeffs = self.amplitude.coupling_coefficients(s, theta, phi, ctx)?;
        let amp: Complex = betas.iter().zip(coeffs.iter()).map(|(b, d)| b * d).sum();
        let conj = amp.conj();
        let d_intensity = derivs
            .iter()
            .map(|&(k, d_beta)| 2.0 * to_f64((conj * coeffs[k] * d_beta).re))
            .collect::<Array1<f64>>();
        Ok((to_f64(amp.norm_sqr()), d_intensity))
    }
}

impl LogLikelihood for ExtendedLikelihood {
    type Data = LikelihoodState;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        Ok(self.log_likelihood(&theta.to_vec(), data)?)
    }

    fn check(&self, theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        Ok(self.layout.check(&theta.to_vec())?)
    }

    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        Ok(self.gradient(&theta.to_vec(), data)?)
    }
}

/// Evaluator before the setup pass; holds loaded samples only.
#[derive(Debug, Clone)]
pub struct UnconfiguredLikelihood {
    objective: ExtendedLikelihood,
    logger: Logger,
    data: EventSample,
    accepted: EventSample,
    n_generated: usize,
}

impl UnconfiguredLikelihood {
    /// Load the data and accepted-MC samples and record the generated count.
    ///
    /// Parameters
    /// ----------
    /// - `amplitude`: `CompositeAmplitude`
    ///   Intensity model.
    /// - `layout`: `CouplingLayout`
    ///   Parameter → coupling mapping; must cover every amplitude coupling.
    /// - `options`: `LikelihoodOptions`
    ///   Domain policy and logger.
    /// - `data`, `accepted`: `&impl EventSource`
    ///   Loaded in full.
    /// - `generated`: `&impl EventCount`
    ///   Only its event count is used; a full sample works too.
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::NoGeneratedEvents` if the generated count is zero.
    /// - `LikelihoodError::EmptySample` if data or accepted MC is empty.
    /// - `LikelihoodError::KMatrix(CouplingLengthMismatch)` if the layout and
    ///   amplitude disagree on the number of couplings.
    /// - Any loader error.
    pub fn new<D, A, G>(
        amplitude: CompositeAmplitude, layout: CouplingLayout, options: LikelihoodOptions,
        data: &D, accepted: &A, generated: &G,
    ) -> LikelihoodResult<Self>
    where
        D: EventSource + ?Sized,
        A: EventSource + ?Sized,
        G: EventCount + ?Sized,
    {
        let n_generated = generated.n_events();
        if n_generated == 0 {
            return Err(LikelihoodError::NoGeneratedEvents);
        }
        let objective = ExtendedLikelihood::new(amplitude, layout, options.policy)?;
        let data = data.load()?;
        if data.is_empty() {
            return Err(LikelihoodError::EmptySample { sample: DATA });
        }
        let accepted = accepted.load()?;
        if accepted.is_empty() {
            return Err(LikelihoodError::EmptySample { sample: ACCEPTED });
        }
        info!(options.logger, "samples loaded";
            "data" => data.len(), "accepted" => accepted.len(), "generated" => n_generated);
        Ok(Self { objective, logger: options.logger, data, accepted, n_generated })
    }

    /// Precompute per-event contexts and return the ready evaluator.
    ///
    /// Never fails: events whose inversion fails are dropped, logged, and
    /// listed in [`ReadyLikelihood::report`].
    pub fn setup(self) -> ReadyLikelihood {
        let amplitude = self.objective.amplitude();
        let (data, mut failures) = precompute_sample(amplitude, &self.data, DATA, &self.logger);
        let (mc, mc_failures) = precompute_sample(amplitude, &self.accepted, ACCEPTED, &self.logger);
        failures.extend(mc_failures);
        let report = SetupReport {
            n_data_loaded: self.data.len(),
            n_mc_loaded: self.accepted.len(),
            failures,
        };
        info!(self.logger, "setup complete";
            "data" => data.len(), "accepted" => mc.len(), "dropped" => report.n_dropped());
        ReadyLikelihood {
            objective: self.objective,
            state: LikelihoodState { data, mc, n_generated: self.n_generated },
            report,
            logger: self.logger,
        }
    }
}

/// Evaluator after setup. All methods take `&self`.
#[derive(Debug, Clone)]
pub struct ReadyLikelihood {
    objective: ExtendedLikelihood,
    state: LikelihoodState,
    report: SetupReport,
    logger: Logger,
}

impl ReadyLikelihood {
    /// `ℓ(params)`; see [`ExtendedLikelihood::log_likelihood`].
    pub fn extended_log_likelihood(&self, params: &[f64]) -> LikelihoodResult<f64> {
        self.objective.log_likelihood(params, &self.state)
    }

    /// `∇ℓ(params)`; see [`ExtendedLikelihood::gradient`].
    pub fn gradient(&self, params: &[f64]) -> LikelihoodResult<Grad> {
        self.objective.gradient(params, &self.state)
    }

    /// Maximize `ℓ` from `theta0` with L-BFGS.
    ///
    /// Errors
    /// ------
    /// - Any `OptError` from [`maximize`], including likelihood errors raised
    ///   at trial points.
    pub fn fit(&self, theta0: Theta, opts: &MLEOptions) -> OptResult<OptimOutcome> {
        let outcome = maximize(&self.objective, theta0, &self.state, opts)?;
        info!(self.logger, "fit finished";
            "value" => outcome.value, "converged" => outcome.converged,
            "status" => &outcome.status, "iterations" => outcome.iterations);
        Ok(outcome)
    }

    /// Classical standard errors at `theta_hat` from the observed information.
    pub fn standard_errors(&self, theta_hat: &Theta) -> OptResult<Array1<f64>> {
        calc_standard_errors(&self.objective, &self.state, theta_hat)
    }

    pub fn objective(&self) -> &ExtendedLikelihood {
        &self.objective
    }

    pub fn state(&self) -> &LikelihoodState {
        &self.state
    }

    pub fn report(&self) -> &SetupReport {
        &self.report
    }

    pub fn n_data(&self) -> usize {
        self.state.data.len()
    }

    pub fn n_mc(&self) -> usize {
        self.state.mc.len()
    }

    pub fn n_generated(&self) -> usize {
        self.state.n_generated
    }

    pub fn n_params(&self) -> usize {
        self.objective.layout.n_params()
    }

    /// Labels of the free parameters, e.g. `"f2(1270) phase"`.
    pub fn parameter_names(&self) -> Vec<String> {
        let names = self.objective.amplitude.resonance_names();
        self.objective.layout.parameter_names(&names)
    }
}
