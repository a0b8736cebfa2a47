//! Event samples and the loader contract.
//!
//! Purpose
//! -------
//! Hold the per-event columns the extended likelihood consumes (invariant
//! mass squared `s`, helicity angles `θ`, `φ`, and an event weight) and
//! validate them once at the boundary where they enter the crate.
//!
//! Key behaviors
//! -------------
//! - [`EventSample::new`] checks equal column lengths, finiteness, and
//!   `s > 0`.
//! - [`EventSample::from_masses`] accepts invariant masses in GeV and squares
//!   them.
//! - [`EventSource`] is the contract any loader (file reader, generator,
//!   Python array view) satisfies; [`EventSample`] implements it for data
//!   already in memory.
//!
//! Invariants & assumptions
//! ------------------------
//! - Columns are index-aligned: event `i` is `(s[i], theta[i], phi[i],
//!   weight[i])`.
//! - An `EventSample` may be empty; the evaluator decides whether an empty
//!   sample is acceptable.
//!
//! Conventions
//! -----------
//! - Values are stored at working precision [`Float`].
//! - Weights are not required to be positive (sWeights can be negative).
use crate::{
    kmatrix::core::numeric::{Float, to_f64},
    likelihood::errors::{LikelihoodError, LikelihoodResult},
};
use ndarray::Array1;

/// Column-wise, validated event sample.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSample {
    s: Array1<Float>,
    theta: Array1<Float>,
    phi: Array1<Float>,
    weight: Array1<Float>,
}

impl EventSample {
    /// Build a sample from invariant mass squared and angle columns.
    ///
    /// Parameters
    /// ----------
    /// - `s`: `Array1<Float>`
    ///   Invariant mass squared in GeV²; strictly positive.
    /// - `theta`, `phi`: `Array1<Float>`
    ///   Helicity angles in radians.
    /// - `weight`: `Array1<Float>`
    ///   Per-event weight.
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::ColumnLengthMismatch` if any column length differs
    ///   from `s`.
    /// - `LikelihoodError::NonFiniteValue` for the first NaN/∞, scanning the
    ///   columns in the order `s`, `theta`, `phi`, `weight`.
    /// - `LikelihoodError::NonPositiveInvariant` for the first `s ≤ 0`.
    pub fn new(
        s: Array1<Float>, theta: Array1<Float>, phi: Array1<Float>, weight: Array1<Float>,
    ) -> LikelihoodResult<Self> {
        let n = s.len();
        for (column, values) in [("theta", &theta), ("phi", &phi), ("weight", &weight)] {
            if values.len() != n {
                return Err(LikelihoodError::ColumnLengthMismatch {
                    column,
                    expected: n,
                    found: values.len(),
                });
            }
        }
        for (column, values) in [("s", &s), ("theta", &theta), ("phi", &phi), ("weight", &weight)] {
            if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(LikelihoodError::NonFiniteValue { column, index, value: to_f64(value) });
            }
        }
        if let Some((index, &value)) = s.iter().enumerate().find(|(_, v)| **v <= 0.0) {
            return Err(LikelihoodError::NonPositiveInvariant { index, value: to_f64(value) });
        }
        Ok(Self { s, theta, phi, weight })
    }

    /// Build a sample from invariant masses in GeV; `s = m²`.
    ///
    /// Errors
    /// ------
    /// - As [`EventSample::new`]; a mass `≤ 0` is reported as
    ///   `NonPositiveInvariant` with the mass itself as the value.
    pub fn from_masses(
        mass: Array1<Float>, theta: Array1<Float>, phi: Array1<Float>, weight: Array1<Float>,
    ) -> LikelihoodResult<Self> {
        if let Some((index, &value)) = mass.iter().enumerate().find(|(_, m)| **m <= 0.0) {
            return Err(LikelihoodError::NonPositiveInvariant { index, value: to_f64(value) });
        }
        Self::new(mass.mapv(|m| m * m), theta, phi, weight)
    }

    /// Unit-weight sample.
    pub fn unweighted(
        s: Array1<Float>, theta: Array1<Float>, phi: Array1<Float>,
    ) -> LikelihoodResult<Self> {
        let weight = Array1::ones(s.len());
        Self::new(s, theta, phi, weight)
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn s(&self) -> &Array1<Float> {
        &self.s
    }

    pub fn theta(&self) -> &Array1<Float> {
        &self.theta
    }

    pub fn phi(&self) -> &Array1<Float> {
        &self.phi
    }

    pub fn weight(&self) -> &Array1<Float> {
        &self.weight
    }

    /// `(s, θ, φ, w)` of event `i`. Panics if `i >= len()`.
    pub fn event(&self, i: usize) -> (Float, Float, Float, Float) {
        (self.s[i], self.theta[i], self.phi[i], self.weight[i])
    }

    /// New sample holding the events at `indices`, in that order.
    ///
    /// Indices come from this sample's own range; values were validated on
    /// construction, so no re-validation happens.
    pub fn select(&self, indices: &[usize]) -> Self {
        let pick = |col: &Array1<Float>| indices.iter().map(|&i| col[i]).collect::<Array1<Float>>();
        Self {
            s: pick(&self.s),
            theta: pick(&self.theta),
            phi: pick(&self.phi),
            weight: pick(&self.weight),
        }
    }
}

/// Anything that knows how many events a sample holds.
///
/// The generated MC sample only ever needs this: its events are never
/// evaluated.
pub trait EventCount {
    fn n_events(&self) -> usize;
}

/// Source of events for one likelihood sample.
///
/// `n_events` must equal `load()?.len()` when loading succeeds.
pub trait EventSource: EventCount {
    fn load(&self) -> LikelihoodResult<EventSample>;
}

impl EventCount for EventSample {
    fn n_events(&self) -> usize {
        self.len()
    }
}

impl EventSource for EventSample {
    fn load(&self) -> LikelihoodResult<EventSample> {
        Ok(self.clone())
    }
}

/// Count-only stand-in for the generated MC sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedCount(pub usize);

impl EventCount for GeneratedCount {
    fn n_events(&self) -> usize {
        self.0
    }
}
