//! Policies for recovering from NaN loss evaluations.
//!
//! When an evaluation is numerically invalid, minimizers ask their
//! [`Strategy`] for a replacement loss value. The strategy sees the loss,
//! the parameters, the minimizer's [`Config`] and a [`NanInfo`] bundle with
//! the running count of consecutive NaN evaluations. Escalation (giving up
//! after too many NaNs) is the strategy's decision.
//!
//! # Strategies
//!
//! - [`PushbackStrategy`] (the default): returns the last good loss plus a
//!   penalty, pushing the minimizer back out of the NaN region
//! - [`FailStrategy`]: aborts on the first NaN
//! - [`ToyStrategy`]: aborts on the first NaN and records where it happened
//!
//! Closures of the form `Fn(&NanInfo) -> Result<f64, StrategyError>` are
//! strategies too.

mod fail;
mod pushback;
mod toy;

pub use fail::FailStrategy;
pub use pushback::PushbackStrategy;
pub use toy::ToyStrategy;

use fitkit_core::{Loss, Parameter};
use thiserror::Error;
use tracing::warn;

use crate::Config;

/// Diagnostics passed to a [`Strategy`] for a NaN evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NanInfo {
    /// The NaN-flagged loss value, or `None` if the loss signalled
    /// invalidity without producing a value.
    pub loss: Option<f64>,

    /// The last loss value that was not NaN, if any.
    pub old_loss: Option<f64>,

    /// Consecutive NaN evaluations, including this one.
    pub nan_counter: usize,
}

/// Errors a strategy returns to abort the minimization.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("loss is NaN before any valid evaluation, cannot minimize")]
    NanAtStart,

    #[error("minimization failed after {nan_counter} consecutive NaN evaluations")]
    TooManyNans { nan_counter: usize },
}

/// Decides how a minimizer continues after a NaN evaluation.
pub trait Strategy {
    /// Returns the loss value to use in place of the NaN evaluation.
    ///
    /// # Errors
    ///
    /// Returns an error to abort the minimization.
    fn minimize_nan<L: Loss + ?Sized>(
        &self,
        loss: &L,
        params: &[Parameter],
        minimizer: &Config,
        values: &NanInfo,
    ) -> Result<f64, StrategyError>;
}

/// Blanket implementation for strategy closures.
impl<F> Strategy for F
where
    F: Fn(&NanInfo) -> Result<f64, StrategyError>,
{
    fn minimize_nan<L: Loss + ?Sized>(
        &self,
        _loss: &L,
        _params: &[Parameter],
        _minimizer: &Config,
        values: &NanInfo,
    ) -> Result<f64, StrategyError> {
        self(values)
    }
}

/// Logs the failure and returns the error that aborts the run.
fn fail(minimizer: &Config, values: &NanInfo) -> StrategyError {
    warn!(
        minimizer = minimizer.name(),
        nan_counter = values.nan_counter,
        "The minimization failed due to too many NaNs being produced in the loss. \
         This is most probably caused by negative values returned from the PDF. \
         Changes to the model are probably needed."
    );
    StrategyError::TooManyNans {
        nan_counter: values.nan_counter,
    }
}
