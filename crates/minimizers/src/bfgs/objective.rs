use fitkit_core::{Loss, LossError, Parameter, ValueGradients, parameter};
use ndarray::Array1;
use tracing::{debug, info};

use crate::{Config, Error, NanInfo, Strategy};

/// Printed in place of a value or gradient the loss did not produce.
const PLACEHOLDER: &str = "invalid, NaNs";

/// The function the line search minimizes.
///
/// Each evaluation writes the candidate position into the parameters, asks
/// the loss for its value and gradients, and routes NaN results through the
/// strategy. Only the value is replaced on a NaN; the gradients are passed on
/// as the loss produced them.
pub(super) struct Objective<'a, L, S> {
    loss: &'a L,
    params: &'a [Parameter],
    strategy: &'a S,
    config: &'a Config,
    nan_counter: usize,
    old_loss: Option<f64>,
}

impl<'a, L, S> Objective<'a, L, S>
where
    L: Loss,
    S: Strategy,
{
    pub(super) fn new(
        loss: &'a L,
        params: &'a [Parameter],
        strategy: &'a S,
        config: &'a Config,
    ) -> Self {
        Self {
            loss,
            params,
            strategy,
            config,
            nan_counter: 0,
            old_loss: None,
        }
    }

    /// Evaluates the loss at `values`.
    ///
    /// # Errors
    ///
    /// Fails if the loss fails for a reason other than numerical invalidity,
    /// returns gradients of the wrong length, or if the strategy aborts.
    pub(super) fn evaluate(&mut self, values: &Array1<f64>) -> Result<(f64, Array1<f64>), Error> {
        parameter::set_values(self.params, values.iter().copied());

        let (value, gradients) = match self.loss.value_gradients(self.params) {
            Ok(ValueGradients { value, gradients }) => (Some(value), Some(gradients)),
            Err(LossError::Invalid(invalid)) => {
                debug!(reason = %invalid.reason, "numerically invalid evaluation");
                (None, invalid.gradients)
            }
            Err(LossError::Failed(error)) => return Err(Error::Loss(Box::new(error))),
        };

        if let Some(gradients) = &gradients {
            if gradients.len() != self.params.len() {
                return Err(Error::GradientLength {
                    expected: self.params.len(),
                    got: gradients.len(),
                });
            }
        }

        if self.config.is_verbose() {
            log_evaluation(self.params, values, value, gradients.as_deref());
        }

        let value = match value.filter(|value| !value.is_nan()) {
            Some(value) => {
                self.nan_counter = 0;
                self.old_loss = Some(value);
                value
            }
            None => {
                self.nan_counter += 1;
                let info = NanInfo {
                    loss: value,
                    old_loss: self.old_loss,
                    nan_counter: self.nan_counter,
                };
                self.strategy
                    .minimize_nan(self.loss, self.params, self.config, &info)?
            }
        };

        let gradients = gradients.unwrap_or_else(|| vec![f64::NAN; self.params.len()]);
        Ok((value, Array1::from(gradients)))
    }

    #[cfg(test)]
    pub(super) fn nan_counter(&self) -> usize {
        self.nan_counter
    }
}

fn log_evaluation(
    params: &[Parameter],
    values: &Array1<f64>,
    loss: Option<f64>,
    gradients: Option<&[f64]>,
) {
    for (i, (param, value)) in params.iter().zip(values).enumerate() {
        let gradient = gradients
            .and_then(|gradients| gradients.get(i))
            .map_or_else(|| PLACEHOLDER.to_owned(), |gradient| format!("{gradient:.6e}"));
        info!(param = param.name(), value, %gradient, "parameter");
    }

    let loss = loss.map_or_else(|| PLACEHOLDER.to_owned(), |loss| loss.to_string());
    info!(%loss, "loss evaluated");
}
