//! Setup pass: per-event precomputation and survivor accounting.
//!
//! Purpose
//! -------
//! Compute every β-independent quantity of the extended likelihood exactly
//! once per event, before any parameter vector is evaluated. Events whose
//! `(I + KC)⁻¹` cannot be formed are dropped and reported, never fatal.
//!
//! Key behaviors
//! -------------
//! - [`precompute_sample`] runs [`CompositeAmplitude::precompute`] over all
//!   events in parallel (rayon), then keeps survivors in original order.
//! - Each failure is logged with `warn!` and collected as an
//!   [`EventFailure`]; a per-sample summary is logged with `info!`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `PrecomputedSample::events` and `PrecomputedSample::contexts` have
//!   equal length and are index-aligned. Only [`precompute_sample`] builds a
//!   `PrecomputedSample`, so the fields stay private.
//! - Survivor order is the input order with failed events removed, so the
//!   result does not depend on the rayon thread count.
use crate::{
    kmatrix::{
        core::numeric::to_f64,
        errors::InversionFailure,
        models::{CompositeAmplitude, EventContext},
    },
    likelihood::data::EventSample,
};
use rayon::prelude::*;
use slog::{Logger, info, warn};

/// Surviving events of one sample together with their contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedSample {
    events: EventSample,
    contexts: Vec<EventContext>,
}

impl PrecomputedSample {
    pub fn events(&self) -> &EventSample {
        &self.events
    }

    /// Contexts aligned with [`PrecomputedSample::events`].
    pub fn contexts(&self) -> &[EventContext] {
        &self.contexts
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// One event dropped during setup.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFailure {
    /// `"data"` or `"accepted MC"`.
    pub sample: &'static str,
    /// Position in the loaded sample, before any events were dropped.
    pub index: usize,
    pub s: f64,
    pub failure: InversionFailure,
}

/// Outcome of setup: input sizes and every dropped event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupReport {
    pub n_data_loaded: usize,
    pub n_mc_loaded: usize,
    pub failures: Vec<EventFailure>,
}

impl SetupReport {
    pub fn n_dropped(&self) -> usize {
        self.failures.len()
    }

    pub fn n_dropped_in(&self, sample: &str) -> usize {
        self.failures.iter().filter(|f| f.sample == sample).count()
    }
}

/// Precompute contexts for `sample`, dropping events whose inversion fails.
///
/// Returns the aligned survivors and the failures in input order.
pub fn precompute_sample(
    amplitude: &CompositeAmplitude, sample: &EventSample, label: &'static str, logger: &Logger,
) -> (PrecomputedSample, Vec<EventFailure>) {
    let s_values = sample.s().to_vec();
    let results: Vec<Result<EventContext, InversionFailure>> =
        s_values.par_iter().map(|&s| amplitude.precompute(s)).collect();

    let mut keep = Vec::with_capacity(results.len());
    let mut contexts = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(ctx) => {
                keep.push(index);
                contexts.push(ctx);
            }
            Err(failure) => {
                let s = to_f64(s_values[index]);
                warn!(logger, "dropping event";
                    "sample" => label, "index" => index, "s" => s, "reason" => %failure);
                failures.push(EventFailure { sample: label, index, s, failure });
            }
        }
    }

    info!(logger, "precomputed sample";
        "sample" => label, "loaded" => sample.len(), "kept" => keep.len(),
        "dropped" => failures.len());

    let events = if failures.is_empty() { sample.clone() } else { sample.select(&keep) };
    (PrecomputedSample { events, contexts }, failures)
}
