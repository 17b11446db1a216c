use thiserror::Error;

use crate::Parameter;

/// A loss value with its gradient at the current parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGradients {
    pub value: f64,

    /// One entry per parameter, in the order the parameters were passed.
    pub gradients: Vec<f64>,
}

impl ValueGradients {
    #[must_use]
    pub fn new(value: f64, gradients: Vec<f64>) -> Self {
        Self { value, gradients }
    }
}

/// Diagnostic for a numerically invalid evaluation.
///
/// Minimizers treat this as recoverable. Gradients computed before the
/// failure can be attached so callers still see them.
#[derive(Debug, Clone, PartialEq)]
pub struct Invalid {
    pub reason: String,
    pub gradients: Option<Vec<f64>>,
}

impl Invalid {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            gradients: None,
        }
    }

    /// Attaches the raw gradients of the failed evaluation.
    #[must_use]
    pub fn with_gradients(mut self, gradients: Vec<f64>) -> Self {
        self.gradients = Some(gradients);
        self
    }
}

/// Errors a [`Loss`] can return from an evaluation.
#[derive(Debug, Error)]
pub enum LossError<E> {
    /// The evaluation produced NaN or hit an invalid argument.
    #[error("numerically invalid evaluation: {}", .0.reason)]
    Invalid(Invalid),

    /// The evaluation failed for any other reason.
    #[error("loss evaluation failed")]
    Failed(#[source] E),
}

/// A scalar objective over a set of parameters.
///
/// The loss reads the current parameter values; it does not change them.
pub trait Loss {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the loss and its gradient at the current parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`LossError::Invalid`] when the evaluation is numerically
    /// invalid and [`LossError::Failed`] for any other failure.
    fn value_gradients(
        &self,
        params: &[Parameter],
    ) -> Result<ValueGradients, LossError<Self::Error>>;
}

impl<L: Loss + ?Sized> Loss for &L {
    type Error = L::Error;

    fn value_gradients(
        &self,
        params: &[Parameter],
    ) -> Result<ValueGradients, LossError<Self::Error>> {
        (**self).value_gradients(params)
    }
}
