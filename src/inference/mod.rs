//! inference — uncertainty estimates for fitted couplings.
//!
//! Provides classical (inverse observed information) covariance and
//! standard errors for any `LogLikelihood`, used by
//! `ReadyLikelihood::standard_errors` and the Python bindings.

pub mod hessian;

pub use self::hessian::{calc_covariance, calc_standard_errors};

pub mod prelude {
    pub use super::hessian::{calc_covariance, calc_standard_errors};
}
