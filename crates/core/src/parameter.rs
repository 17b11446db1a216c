use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use thiserror::Error;

/// Step size used when a parameter is created without one.
pub const DEFAULT_STEP_SIZE: f64 = 0.001;

/// Errors that can occur when constructing a [`Parameter`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ParameterError {
    #[error("step_size must be finite and positive, got {0}")]
    StepSize(f64),
}

struct Inner {
    name: String,
    value: AtomicU64,
    step_size: f64,
}

/// A named, mutable scalar that a loss depends on.
///
/// `Parameter` is a shared handle: clones refer to the same scalar, and a
/// value set through one clone is seen through all of them. Equality and
/// hashing follow the handle, not the value, so two parameters with the same
/// name and value are still distinct.
#[derive(Clone)]
pub struct Parameter(Arc<Inner>);

impl Parameter {
    /// Creates a parameter with the [`DEFAULT_STEP_SIZE`].
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self(Arc::new(Inner {
            name: name.into(),
            value: AtomicU64::new(value.to_bits()),
            step_size: DEFAULT_STEP_SIZE,
        }))
    }

    /// Creates a parameter with an explicit step size.
    ///
    /// # Errors
    ///
    /// Returns an error if `step_size` is not finite and positive.
    pub fn with_step_size(
        name: impl Into<String>,
        value: f64,
        step_size: f64,
    ) -> Result<Self, ParameterError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(ParameterError::StepSize(step_size));
        }

        Ok(Self(Arc::new(Inner {
            name: name.into(),
            value: AtomicU64::new(value.to_bits()),
            step_size,
        })))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.0.value.load(Ordering::Relaxed))
    }

    /// Sets the value, visible through every clone of this handle.
    pub fn set_value(&self, value: f64) {
        self.0.value.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Returns the initial scale a minimizer should use for this parameter.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.0.step_size
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name())
            .field("value", &self.value())
            .field("step_size", &self.step_size())
            .finish()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name(), self.value())
    }
}

/// Returns the current values of `params`, in order.
#[must_use]
pub fn values(params: &[Parameter]) -> Vec<f64> {
    params.iter().map(Parameter::value).collect()
}

/// Writes `values[i]` into `params[i]`.
///
/// Extra entries on either side are ignored.
pub fn set_values<I>(params: &[Parameter], values: I)
where
    I: IntoIterator<Item = f64>,
{
    for (param, value) in params.iter().zip(values) {
        param.set_value(value);
    }
}
