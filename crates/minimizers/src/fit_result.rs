use std::fmt;

use fitkit_core::Parameter;

use crate::Config;

/// Diagnostics reported by a minimizer backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Info<R> {
    /// Number of loss evaluations.
    pub n_eval: usize,

    /// Number of minimizer iterations.
    pub n_iter: usize,

    /// Gradient at the final position.
    pub grad: Vec<f64>,

    /// The backend's own result.
    pub original: R,
}

/// The outcome of one minimization run.
///
/// A `FitResult` is built once at the end of a run and cannot be changed
/// afterwards. It keeps a copy of the minimizer [`Config`], so later changes
/// to the minimizer do not affect it.
#[derive(Debug)]
pub struct FitResult<'a, L, R> {
    params: Vec<(Parameter, f64)>,
    edm: Option<f64>,
    fmin: f64,
    status: Option<i32>,
    converged: bool,
    info: Info<R>,
    loss: &'a L,
    minimizer: Config,
}

impl<'a, L, R> FitResult<'a, L, R> {
    /// Creates a result with `edm` and `status` not computed.
    ///
    /// `params` pairs each parameter with its final value, in the order the
    /// parameters were passed to the minimizer.
    #[must_use]
    pub fn new(
        params: Vec<(Parameter, f64)>,
        fmin: f64,
        converged: bool,
        info: Info<R>,
        loss: &'a L,
        minimizer: Config,
    ) -> Self {
        Self {
            params,
            edm: None,
            fmin,
            status: None,
            converged,
            info,
            loss,
            minimizer,
        }
    }

    /// Sets the expected distance to the minimum.
    #[must_use]
    pub fn with_edm(mut self, edm: f64) -> Self {
        self.edm = Some(edm);
        self
    }

    /// Sets the backend status code.
    #[must_use]
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns each parameter with its final value, in minimization order.
    #[must_use]
    pub fn params(&self) -> &[(Parameter, f64)] {
        &self.params
    }

    /// Returns the final value of `param`, if it was minimized.
    #[must_use]
    pub fn value(&self, param: &Parameter) -> Option<f64> {
        self.params
            .iter()
            .find(|(p, _)| p == param)
            .map(|(_, value)| *value)
    }

    /// Returns the expected distance to the minimum; `None` if not computed.
    #[must_use]
    pub fn edm(&self) -> Option<f64> {
        self.edm
    }

    /// Returns the loss value at the final position.
    #[must_use]
    pub fn fmin(&self) -> f64 {
        self.fmin
    }

    /// Returns the backend status code; `None` if not computed.
    #[must_use]
    pub fn status(&self) -> Option<i32> {
        self.status
    }

    #[must_use]
    pub fn converged(&self) -> bool {
        self.converged
    }

    #[must_use]
    pub fn info(&self) -> &Info<R> {
        &self.info
    }

    #[must_use]
    pub fn loss(&self) -> &'a L {
        self.loss
    }

    /// Returns the configuration of the minimizer that produced this result.
    #[must_use]
    pub fn minimizer(&self) -> &Config {
        &self.minimizer
    }
}

impl<L, R> fmt::Display for FitResult<'_, L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_not_computed<T: fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "not computed".to_owned(), |v| v.to_string())
        }

        writeln!(f, "FitResult of `{}`", self.minimizer.name())?;
        writeln!(
            f,
            "  converged: {}  fmin: {}  edm: {}  status: {}",
            self.converged,
            self.fmin,
            or_not_computed(self.edm),
            or_not_computed(self.status),
        )?;
        writeln!(
            f,
            "  n_eval: {}  n_iter: {}",
            self.info.n_eval, self.info.n_iter
        )?;
        for (param, value) in &self.params {
            writeln!(f, "  {:<16} {value}", param.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result<'a>(loss: &'a (), params: Vec<(Parameter, f64)>) -> FitResult<'a, (), ()> {
        let info = Info {
            n_eval: 7,
            n_iter: 3,
            grad: vec![0.0; params.len()],
            original: (),
        };
        FitResult::new(params, 1.25, true, info, loss, Config::default())
    }

    #[test]
    fn edm_and_status_default_to_not_computed() {
        let fit = result(&(), vec![]);

        assert_eq!(fit.edm(), None);
        assert_eq!(fit.status(), None);

        let fit = fit.with_edm(1e-4).with_status(0);
        assert_eq!(fit.edm(), Some(1e-4));
        assert_eq!(fit.status(), Some(0));
    }

    #[test]
    fn looks_up_values_by_parameter_identity() {
        let a = Parameter::new("a", 0.0);
        let b = Parameter::new("a", 0.0);
        let fit = result(&(), vec![(a.clone(), 1.0), (b.clone(), 2.0)]);

        assert_eq!(fit.value(&a), Some(1.0));
        assert_eq!(fit.value(&b), Some(2.0));
        assert_eq!(fit.value(&Parameter::new("a", 0.0)), None);
    }

    #[test]
    fn display_lists_parameters() {
        let fit = result(&(), vec![(Parameter::new("mu", 0.0), 0.5)]);

        let text = fit.to_string();

        assert!(text.contains("FitResult of `BFGS`"));
        assert!(text.contains("edm: not computed"));
        assert!(text.contains("mu"));
    }
}
