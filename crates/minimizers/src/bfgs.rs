//! Quasi-Newton minimization with the BFGS method.
//!
//! # Algorithm
//!
//! BFGS keeps an estimate of the inverse Hessian and moves along the
//! quasi-Newton direction `-H g`. Each step length is chosen by a line search
//! satisfying the strong Wolfe conditions, and the estimate is refined from
//! the observed change in gradient. The initial estimate is diagonal, built
//! from the parameters' step sizes.
//!
//! # Options
//!
//! The defaults below can be overridden through [`Config::with_options`]:
//!
//! | Key | Default |
//! |-----|---------|
//! | `x_tolerance` | [`Config::tolerance`] |
//! | `gradient_tolerance` | `1e-8` |
//! | `f_relative_tolerance` | `0.0` (disabled) |
//! | `f_absolute_tolerance` | `0.0` (disabled) |
//! | `max_iterations` | [`Config::max_calls`] |
//! | `max_line_search_iterations` | `50` |
//! | `parallel_iterations` | `1` |
//!
//! The run converges as soon as one criterion holds: the largest gradient
//! component is within `gradient_tolerance`, the largest position change
//! within `x_tolerance`, or the change in loss within one of the enabled
//! loss tolerances.
//!
//! # NaN Handling
//!
//! Evaluations whose value is NaN, or that the loss marks as
//! [`Invalid`](fitkit_core::Invalid), are passed to the minimizer's
//! [`Strategy`]. Only the value is replaced by what the strategy returns;
//! gradients go to the line search unchanged, and a missing gradient is
//! filled with NaNs so the line search treats the point as an overshoot.

mod line_search;
mod objective;
mod report;
mod search;
mod settings;


pub use report::{Report, Status};

use fitkit_core::{Loss, Parameter, parameter, warnings};
use ndarray::{Array1, Array2};
use tracing::debug;

use crate::{Config, Error, FitResult, Info, Minimizer, PushbackStrategy, Strategy};

use objective::Objective;
use search::search;
use settings::Settings;

/// The BFGS minimizer.
///
/// Generic over the NaN [`Strategy`], which defaults to [`PushbackStrategy`].
#[derive(Debug, Clone)]
pub struct Bfgs<S = PushbackStrategy> {
    config: Config,
    strategy: S,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Bfgs {
    /// Creates a minimizer with the default NaN strategy.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            strategy: PushbackStrategy::default(),
        }
    }
}

impl<S: Strategy> Bfgs<S> {
    /// Replaces the NaN strategy.
    #[must_use]
    pub fn with_strategy<T: Strategy>(self, strategy: T) -> Bfgs<T> {
        Bfgs {
            config: self.config,
            strategy,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<S: Strategy> Minimizer for Bfgs<S> {
    type Report = Report;

    fn config(&self) -> &Config {
        &self.config
    }

    /// Minimizes `loss` with BFGS, leaving `params` at the final position.
    ///
    /// The final position is written back even if the run did not converge.
    /// If the run aborts with an error, the parameters hold the values of
    /// the last evaluation.
    fn minimize<'a, L: Loss>(
        &self,
        loss: &'a L,
        params: &[Parameter],
    ) -> Result<FitResult<'a, L, Report>, Error> {
        warnings::warn_experimental("BFGS minimizer");

        if params.is_empty() {
            return Err(Error::NoParameters);
        }

        let settings = Settings::resolve(&self.config)?;
        if !self.config.options().is_empty() {
            warnings::warn_advanced(
                "bfgs_options",
                "BFGS options were overridden; the defaults are usually a good choice",
            );
        }

        let x0 = Array1::from(parameter::values(params));
        let h0 = Array2::from_diag(&params.iter().map(Parameter::step_size).collect::<Array1<_>>());

        debug!(
            minimizer = self.config.name(),
            n_params = params.len(),
            "starting minimization"
        );

        let mut objective = Objective::new(loss, params, &self.strategy, &self.config);
        let report = search(
            |values: &Array1<f64>| objective.evaluate(values),
            x0,
            h0,
            &settings,
        )?;

        parameter::set_values(params, report.position.iter().copied());

        debug!(
            status = ?report.status,
            n_iter = report.n_iter,
            n_eval = report.n_eval,
            fmin = report.objective_value,
            "minimization finished"
        );

        let info = Info {
            n_eval: report.n_eval,
            n_iter: report.n_iter,
            grad: report.objective_gradient.to_vec(),
            original: report.clone(),
        };
        let values = params
            .iter()
            .cloned()
            .zip(report.position.iter().copied())
            .collect();

        Ok(FitResult::new(
            values,
            report.objective_value,
            report.converged(),
            info,
            loss,
            self.config.clone(),
        ))
    }
}
