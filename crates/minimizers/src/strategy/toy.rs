use fitkit_core::{Loss, Parameter};
use parking_lot::Mutex;

use crate::Config;

use super::{NanInfo, Strategy, StrategyError, fail};

/// Aborts on the first NaN evaluation and records where it happened.
///
/// Useful for toy studies, where a failed fit is tallied rather than
/// investigated: after the run, [`failed_values`](Self::failed_values)
/// holds the parameter values at the failing evaluation.
#[derive(Debug, Default)]
pub struct ToyStrategy {
    failed: Mutex<Option<Vec<(Parameter, f64)>>>,
}

impl ToyStrategy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parameter values of the last failing evaluation.
    #[must_use]
    pub fn failed_values(&self) -> Option<Vec<(Parameter, f64)>> {
        self.failed.lock().clone()
    }
}

impl Strategy for ToyStrategy {
    fn minimize_nan<L: Loss + ?Sized>(
        &self,
        _loss: &L,
        params: &[Parameter],
        minimizer: &Config,
        values: &NanInfo,
    ) -> Result<f64, StrategyError> {
        let snapshot = params
            .iter()
            .map(|param| (param.clone(), param.value()))
            .collect();
        *self.failed.lock() = Some(snapshot);

        Err(fail(minimizer, values))
    }
}
