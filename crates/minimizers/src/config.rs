use std::collections::BTreeMap;

use thiserror::Error;

/// Verbosity above which minimizers log every evaluation.
pub const VERBOSE_THRESHOLD: u8 = 8;

/// Configuration shared by all minimizers.
///
/// Backend-specific settings go into [`Options`], which are merged over the
/// backend's defaults key by key.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    name: String,
    tolerance: f64,
    verbosity: u8,
    max_calls: usize,
    options: Options,
}

/// Errors that can occur when validating a minimizer config.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("tolerance must be finite and non-negative, got {0}")]
    Tolerance(f64),

    #[error("max_calls must be positive")]
    MaxCalls,

    #[error("unknown option `{key}`")]
    UnknownOption { key: String },

    #[error("option `{key}` must be {expected}")]
    OptionType { key: String, expected: &'static str },

    #[error("option `{key}` is invalid: {reason}")]
    InvalidOption { key: String, reason: &'static str },
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new("BFGS", 1e-5, 5, 3000).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated values.
    ///
    /// # Errors
    ///
    /// Returns an error if `tolerance` is negative or non-finite, or if
    /// `max_calls` is zero.
    pub fn new(
        name: impl Into<String>,
        tolerance: f64,
        verbosity: u8,
        max_calls: usize,
    ) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Tolerance(tolerance));
        }
        if max_calls == 0 {
            return Err(ConfigError::MaxCalls);
        }

        Ok(Self {
            name: name.into(),
            tolerance,
            verbosity,
            max_calls,
            options: Options::new(),
        })
    }

    /// Sets the backend option overrides.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Returns the display name of the minimizer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stopping tolerance on the change in position.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Returns `true` if every evaluation should be logged.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity > VERBOSE_THRESHOLD
    }

    /// Returns the approximate budget of loss evaluations.
    #[must_use]
    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Returns the user-supplied option overrides.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }
}

/// A single backend option value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Float(f64),
    Int(usize),
}

impl OptionValue {
    /// Returns the value as a float; integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Float(value) => Some(value),
            Self::Int(value) => Some(value as f64),
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<usize> {
        match *self {
            Self::Int(value) => Some(value),
            Self::Float(_) => None,
        }
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<usize> for OptionValue {
    fn from(value: usize) -> Self {
        Self::Int(value)
    }
}

/// Backend options keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(BTreeMap<String, OptionValue>);

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the options with `key` set to `value`.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<OptionValue> {
        self.0.get(key).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns `defaults` overlaid with these options; keys set here win.
    #[must_use]
    pub fn merged_over(&self, defaults: &Options) -> Options {
        let mut merged = defaults.clone();
        merged
            .0
            .extend(self.0.iter().map(|(key, value)| (key.clone(), *value)));
        merged
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
