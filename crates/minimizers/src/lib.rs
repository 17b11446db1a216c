//! Minimizers for fitkit losses.
//!
//! A minimizer is configured with a [`Config`] and a NaN [`Strategy`], then
//! asked to [`minimize`](Minimizer::minimize) a [`Loss`](fitkit_core::Loss)
//! over a slice of [`Parameter`](fitkit_core::Parameter)s. On success the
//! parameters are left at their best-fit values and a [`FitResult`] records
//! the outcome.
//!
//! # Example
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use fitkit_core::{Parameter, SimpleLoss};
//! use fitkit_minimizers::{Bfgs, Config, Minimizer};
//!
//! let loss = SimpleLoss::new(|x: &[f64]| Ok::<_, Infallible>((x[0] - 2.0).powi(2)));
//! let mu = Parameter::new("mu", 0.0);
//!
//! let result = Bfgs::new(Config::default())
//!     .minimize(&loss, &[mu.clone()])
//!     .unwrap();
//!
//! assert!(result.converged());
//! assert!((mu.value() - 2.0).abs() < 1e-4);
//! ```

mod config;
mod error;
mod fit_result;
mod minimizer;

pub mod bfgs;
pub mod strategy;

pub use bfgs::Bfgs;
pub use config::{Config, ConfigError, OptionValue, Options, VERBOSE_THRESHOLD};
pub use error::Error;
pub use fit_result::{FitResult, Info};
pub use minimizer::Minimizer;
pub use strategy::{
    FailStrategy, NanInfo, PushbackStrategy, Strategy, StrategyError, ToyStrategy,
};
