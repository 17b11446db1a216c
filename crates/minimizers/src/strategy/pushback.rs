use fitkit_core::{Loss, Parameter};

use crate::Config;

use super::{NanInfo, Strategy, StrategyError, fail};

/// Replaces a NaN loss with the last good loss plus a penalty.
///
/// The penalty makes the NaN region look worse than where the minimizer
/// came from, so the line search backs off. After `nan_tolerance`
/// consecutive NaN evaluations the strategy gives up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushbackStrategy {
    nan_penalty: f64,
    nan_tolerance: usize,
}

impl Default for PushbackStrategy {
    fn default() -> Self {
        Self {
            nan_penalty: 100.0,
            nan_tolerance: 30,
        }
    }
}

impl PushbackStrategy {
    #[must_use]
    pub fn new(nan_penalty: f64, nan_tolerance: usize) -> Self {
        Self {
            nan_penalty,
            nan_tolerance,
        }
    }

    #[must_use]
    pub fn nan_penalty(&self) -> f64 {
        self.nan_penalty
    }

    #[must_use]
    pub fn nan_tolerance(&self) -> usize {
        self.nan_tolerance
    }
}

impl Strategy for PushbackStrategy {
    fn minimize_nan<L: Loss + ?Sized>(
        &self,
        _loss: &L,
        _params: &[Parameter],
        minimizer: &Config,
        values: &NanInfo,
    ) -> Result<f64, StrategyError> {
        if values.nan_counter >= self.nan_tolerance {
            return Err(fail(minimizer, values));
        }

        values
            .old_loss
            .map(|old_loss| old_loss + self.nan_penalty)
            .ok_or(StrategyError::NanAtStart)
    }
}
