use fitkit_core::{Loss, Parameter};

use crate::Config;

use super::{NanInfo, Strategy, StrategyError, fail};

/// Aborts the minimization on the first NaN evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailStrategy;

impl Strategy for FailStrategy {
    fn minimize_nan<L: Loss + ?Sized>(
        &self,
        _loss: &L,
        _params: &[Parameter],
        minimizer: &Config,
        values: &NanInfo,
    ) -> Result<f64, StrategyError> {
        Err(fail(minimizer, values))
    }
}
