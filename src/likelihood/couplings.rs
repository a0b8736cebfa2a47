//! Mapping from the flat fit-parameter vector to complex couplings.
//!
//! Purpose
//! -------
//! Make the relation between the optimizer's real parameters and the
//! composite amplitude's complex couplings `β` explicit. Each coupling slot
//! is either fixed, a free magnitude at a fixed phase, or a free polar pair
//! `(magnitude, phase)`.
//!
//! Key behaviors
//! -------------
//! - [`CouplingLayout::free_f0_980`]: 23 parameters; f0(500) fixed at 0,
//!   f0(980) real with a free magnitude, all other couplings polar.
//! - [`CouplingLayout::fixed_f0_980`]: 22 parameters; as above but with the
//!   f0(980) magnitude fixed (conventionally 100).
//! - [`CouplingLayout::betas`] builds `β` from parameters;
//!   [`CouplingLayout::derivatives`] gives `∂β_k/∂θ_p` for the analytic
//!   gradient.
//!
//! Conventions
//! -----------
//! - Parameters stay `f64`; couplings are produced at working precision.
//! - Negative magnitudes are allowed; `r e^{iφ}` with `r < 0` is the same
//!   coupling as `|r| e^{i(φ+π)}`.
use crate::{
    kmatrix::core::numeric::{Complex, from_f64},
    likelihood::errors::{LikelihoodError, LikelihoodResult},
};

/// How one complex coupling is obtained from the parameter vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouplingSlot {
    /// `β = mag · e^{i·phase}`; consumes no parameters.
    Fixed { mag: f64, phase: f64 },
    /// `β = θ_p · e^{i·phase}`; consumes one parameter.
    Magnitude { phase: f64 },
    /// `β = θ_p · e^{i·θ_{p+1}}`; consumes two parameters.
    Polar,
}

impl CouplingSlot {
    fn n_params(self) -> usize {
        match self {
            CouplingSlot::Fixed { .. } => 0,
            CouplingSlot::Magnitude { .. } => 1,
            CouplingSlot::Polar => 2,
        }
    }
}

/// Ordered coupling slots, one per resonance in the amplitude's coupling order.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingLayout {
    slots: Vec<CouplingSlot>,
    offsets: Vec<usize>,
    n_params: usize,
}

/// Couplings after the two leading f0 slots: f0(1370), f0(1500), f0(1710),
/// four f2, two a0, two a2.
const N_POLAR_TAIL: usize = 11;

impl CouplingLayout {
    pub fn new(slots: Vec<CouplingSlot>) -> Self {
        let mut offsets = Vec::with_capacity(slots.len());
        let mut n_params = 0;
        for slot in &slots {
            offsets.push(n_params);
            n_params += slot.n_params();
        }
        Self { slots, offsets, n_params }
    }

    /// 23-parameter layout with a free, real f0(980) magnitude.
    pub fn free_f0_980() -> Self {
        let mut slots = vec![
            CouplingSlot::Fixed { mag: 0.0, phase: 0.0 },
            CouplingSlot::Magnitude { phase: 0.0 },
        ];
        slots.extend([CouplingSlot::Polar; N_POLAR_TAIL]);
        Self::new(slots)
    }

    /// 22-parameter layout with the f0(980) coupling fixed to `mag` (real).
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::InvalidFixedMagnitude` if `mag` is not finite and
    ///   strictly positive.
    pub fn fixed_f0_980(mag: f64) -> LikelihoodResult<Self> {
        if !mag.is_finite() || mag <= 0.0 {
            return Err(LikelihoodError::InvalidFixedMagnitude { value: mag });
        }
        let mut slots = vec![
            CouplingSlot::Fixed { mag: 0.0, phase: 0.0 },
            CouplingSlot::Fixed { mag, phase: 0.0 },
        ];
        slots.extend([CouplingSlot::Polar; N_POLAR_TAIL]);
        Ok(Self::new(slots))
    }

    pub fn n_params(&self) -> usize {
        self.n_params
    }

    pub fn n_couplings(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[CouplingSlot] {
        &self.slots
    }

    /// Length and finiteness of a parameter vector.
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::ThetaLengthMismatch`
    /// - `LikelihoodError::NonFiniteParameter` for the first non-finite entry.
    pub fn check(&self, params: &[f64]) -> LikelihoodResult<()> {
        if params.len() != self.n_params {
            return Err(LikelihoodError::ThetaLengthMismatch {
                expected: self.n_params,
                found: params.len(),
            });
        }
        match params.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            Some((index, &value)) => Err(LikelihoodError::NonFiniteParameter { index, value }),
            None => Ok(()),
        }
    }

    /// Complex couplings `β` for `params`, in slot order.
    pub fn betas(&self, params: &[f64]) -> LikelihoodResult<Vec<Complex>> {
        self.check(params)?;
        Ok(self
            .slots
            .iter()
            .zip(&self.offsets)
            .map(|(slot, &p)| match *slot {
                CouplingSlot::Fixed { mag, phase } => polar(mag, phase),
                CouplingSlot::Magnitude { phase } => polar(params[p], phase),
                CouplingSlot::Polar => polar(params[p], params[p + 1]),
            })
            .collect())
    }

    /// `(k, ∂β_k/∂θ_p)` for every parameter `p`, in parameter order.
    ///
    /// Each parameter moves exactly one coupling: `∂β/∂r = e^{iφ}` and
    /// `∂β/∂φ = iβ`.
    pub fn derivatives(&self, params: &[f64]) -> LikelihoodResult<Vec<(usize, Complex)>> {
        self.check(params)?;
        let mut out = Vec::with_capacity(self.n_params);
        for (k, (slot, &p)) in self.slots.iter().zip(&self.offsets).enumerate() {
            match *slot {
                CouplingSlot::Fixed { .. } => {}
                CouplingSlot::Magnitude { phase } => out.push((k, polar(1.0, phase))),
                CouplingSlot::Polar => {
                    let beta = polar(params[p], params[p + 1]);
                    out.push((k, polar(1.0, params[p + 1])));
                    out.push((k, Complex::new(-beta.im, beta.re)));
                }
            }
        }
        Ok(out)
    }

    /// Labels such as `"f0(980) mag"` and `"f2(1270) phase"` for each free
    /// parameter. `names` are the resonance labels in coupling order.
    pub fn parameter_names(&self, names: &[&str]) -> Vec<String> {
        let mut out = Vec::with_capacity(self.n_params);
        for (k, slot) in self.slots.iter().enumerate() {
            let name = names.get(k).copied().unwrap_or("?");
            match slot {
                CouplingSlot::Fixed { .. } => {}
                CouplingSlot::Magnitude { .. } => out.push(format!("{name} mag")),
                CouplingSlot::Polar => {
                    out.push(format!("{name} mag"));
                    out.push(format!("{name} phase"));
                }
            }
        }
        out
    }
}

fn polar(mag: f64, phase: f64) -> Complex {
    Complex::from_polar(from_f64(mag), from_f64(phase))
}
