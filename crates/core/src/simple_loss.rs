use crate::{Loss, LossError, Parameter, ValueGradients, parameter};

type GradientFn<E> = Box<dyn Fn(&[f64]) -> Result<Vec<f64>, E> + Send + Sync>;

/// A loss built from a closure over the parameter values.
///
/// Gradients come from the closure passed to [`with_gradient`] when one is
/// set and analytic gradients are enabled (see [`fitkit_run::numerical_grad`]).
/// Otherwise they are computed with central finite differences.
///
/// [`with_gradient`]: SimpleLoss::with_gradient
pub struct SimpleLoss<F, E> {
    func: F,
    gradient: Option<GradientFn<E>>,
}

impl<F, E> SimpleLoss<F, E>
where
    F: Fn(&[f64]) -> Result<f64, E>,
{
    #[must_use]
    pub fn new(func: F) -> Self {
        Self {
            func,
            gradient: None,
        }
    }

    /// Sets an analytic gradient.
    #[must_use]
    pub fn with_gradient<G>(mut self, gradient: G) -> Self
    where
        G: Fn(&[f64]) -> Result<Vec<f64>, E> + Send + Sync + 'static,
    {
        self.gradient = Some(Box::new(gradient));
        self
    }

    fn numerical_gradients(&self, x: &[f64]) -> Result<Vec<f64>, E> {
        let scale = f64::EPSILON.cbrt();
        let mut shifted = x.to_vec();
        let mut gradients = Vec::with_capacity(x.len());

        for i in 0..x.len() {
            let h = scale * x[i].abs().max(1.0);

            shifted[i] = x[i] + h;
            let upper = (self.func)(&shifted)?;
            shifted[i] = x[i] - h;
            let lower = (self.func)(&shifted)?;
            shifted[i] = x[i];

            gradients.push((upper - lower) / (2.0 * h));
        }

        Ok(gradients)
    }
}

impl<F, E> Loss for SimpleLoss<F, E>
where
    F: Fn(&[f64]) -> Result<f64, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn value_gradients(
        &self,
        params: &[Parameter],
    ) -> Result<ValueGradients, LossError<Self::Error>> {
        let x = parameter::values(params);
        let value = (self.func)(&x).map_err(LossError::Failed)?;

        let gradients = match &self.gradient {
            Some(gradient) if !fitkit_run::numerical_grad() => gradient(&x),
            _ => self.numerical_gradients(&x),
        }
        .map_err(LossError::Failed)?;

        Ok(ValueGradients::new(value, gradients))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    fn paraboloid(x: &[f64]) -> Result<f64, Infallible> {
        Ok((x[0] - 1.0).powi(2) + 3.0 * (x[1] + 2.0).powi(2))
    }

    #[test]
    fn numerical_gradients_match_analytic() {
        let loss = SimpleLoss::new(paraboloid);
        let params = [Parameter::new("a", 2.0), Parameter::new("b", 0.0)];

        let result = loss.value_gradients(&params).unwrap();

        assert_relative_eq!(result.value, 13.0);
        assert_relative_eq!(result.gradients[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(result.gradients[1], 12.0, epsilon = 1e-6);
    }

    #[test]
    fn analytic_gradient_is_used_when_set() {
        let loss = SimpleLoss::new(paraboloid).with_gradient(|_x: &[f64]| Ok(vec![7.0, 8.0]));
        let params = [Parameter::new("a", 2.0), Parameter::new("b", 0.0)];

        let result = loss.value_gradients(&params).unwrap();

        // Only true while autograd is enabled, which is the default mode and
        // is not changed by any test in this crate.
        assert_eq!(result.gradients, vec![7.0, 8.0]);
    }

    #[test]
    fn closure_errors_are_fatal() {
        #[derive(Debug, thiserror::Error)]
        #[error("out of range")]
        struct OutOfRange;

        let loss = SimpleLoss::new(|_x: &[f64]| Err::<f64, _>(OutOfRange));
        let params = [Parameter::new("a", 0.0)];

        let error = loss.value_gradients(&params).unwrap_err();

        assert!(matches!(error, LossError::Failed(OutOfRange)));
    }

    #[test]
    fn nan_values_pass_through() {
        let loss = SimpleLoss::new(|x: &[f64]| Ok::<_, Infallible>(x[0].ln()));
        let params = [Parameter::new("a", -1.0)];

        let result = loss.value_gradients(&params).unwrap();

        assert!(result.value.is_nan());
    }
}
