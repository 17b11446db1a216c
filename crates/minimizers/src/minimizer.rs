use fitkit_core::{Loss, Parameter};

use crate::{Config, Error, FitResult};

/// A backend that minimizes a [`Loss`] over a set of parameters.
///
/// Implementations set the parameters to their best-fit values before
/// returning, and report the outcome as a [`FitResult`].
pub trait Minimizer {
    /// The backend's own result, kept in [`Info::original`](crate::Info::original).
    type Report;

    /// Returns the configuration this minimizer runs with.
    fn config(&self) -> &Config;

    /// Minimizes `loss` with respect to `params`.
    ///
    /// The order of `params` defines the layout of the position vector and
    /// the order of [`FitResult::params`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the loss fails with
    /// anything other than numerical invalidity, or the NaN strategy aborts.
    fn minimize<'a, L: Loss>(
        &self,
        loss: &'a L,
        params: &[Parameter],
    ) -> Result<FitResult<'a, L, Self::Report>, Error>;
}
