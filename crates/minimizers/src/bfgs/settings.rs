use crate::{Config, ConfigError, OptionValue, Options};

const X_TOLERANCE: &str = "x_tolerance";
const GRADIENT_TOLERANCE: &str = "gradient_tolerance";
const F_RELATIVE_TOLERANCE: &str = "f_relative_tolerance";
const F_ABSOLUTE_TOLERANCE: &str = "f_absolute_tolerance";
const MAX_ITERATIONS: &str = "max_iterations";
const MAX_LINE_SEARCH_ITERATIONS: &str = "max_line_search_iterations";
const PARALLEL_ITERATIONS: &str = "parallel_iterations";

/// Resolved BFGS settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Settings {
    pub(super) x_tolerance: f64,
    pub(super) gradient_tolerance: f64,
    pub(super) f_relative_tolerance: f64,
    pub(super) f_absolute_tolerance: f64,
    pub(super) max_iterations: usize,
    pub(super) max_line_search_iterations: usize,
}

/// Returns the default option table for `config`.
pub(super) fn defaults(config: &Config) -> Options {
    Options::new()
        .set(X_TOLERANCE, config.tolerance())
        .set(GRADIENT_TOLERANCE, 1e-8)
        .set(F_RELATIVE_TOLERANCE, 0.0)
        .set(F_ABSOLUTE_TOLERANCE, 0.0)
        .set(MAX_ITERATIONS, config.max_calls())
        .set(MAX_LINE_SEARCH_ITERATIONS, 50_usize)
        .set(PARALLEL_ITERATIONS, 1_usize)
}

impl Settings {
    /// Merges the user options of `config` over the defaults and validates them.
    pub(super) fn resolve(config: &Config) -> Result<Self, ConfigError> {
        let merged = config.options().merged_over(&defaults(config));

        if let Some(key) = merged.keys().find(|key| !is_known(key)) {
            return Err(ConfigError::UnknownOption {
                key: key.to_owned(),
            });
        }

        // Evaluations run one at a time; the value is only validated.
        positive_int(&merged, PARALLEL_ITERATIONS)?;

        Ok(Self {
            x_tolerance: tolerance(&merged, X_TOLERANCE)?,
            gradient_tolerance: tolerance(&merged, GRADIENT_TOLERANCE)?,
            f_relative_tolerance: tolerance(&merged, F_RELATIVE_TOLERANCE)?,
            f_absolute_tolerance: tolerance(&merged, F_ABSOLUTE_TOLERANCE)?,
            max_iterations: positive_int(&merged, MAX_ITERATIONS)?,
            max_line_search_iterations: positive_int(&merged, MAX_LINE_SEARCH_ITERATIONS)?,
        })
    }
}

fn is_known(key: &str) -> bool {
    matches!(
        key,
        X_TOLERANCE
            | GRADIENT_TOLERANCE
            | F_RELATIVE_TOLERANCE
            | F_ABSOLUTE_TOLERANCE
            | MAX_ITERATIONS
            | MAX_LINE_SEARCH_ITERATIONS
            | PARALLEL_ITERATIONS
    )
}

fn tolerance(options: &Options, key: &str) -> Result<f64, ConfigError> {
    let value = options
        .get(key)
        .as_ref()
        .and_then(OptionValue::as_float)
        .ok_or_else(|| ConfigError::OptionType {
            key: key.to_owned(),
            expected: "a number",
        })?;

    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidOption {
            key: key.to_owned(),
            reason: "must be finite and non-negative",
        });
    }
    Ok(value)
}

fn positive_int(options: &Options, key: &str) -> Result<usize, ConfigError> {
    let value = options
        .get(key)
        .as_ref()
        .and_then(OptionValue::as_int)
        .ok_or_else(|| ConfigError::OptionType {
            key: key.to_owned(),
            expected: "an integer",
        })?;

    if value == 0 {
        return Err(ConfigError::InvalidOption {
            key: key.to_owned(),
            reason: "must be positive",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_config() {
        let config = Config::new("m", 1e-4, 5, 200).unwrap();

        let settings = Settings::resolve(&config).unwrap();

        assert_eq!(settings.x_tolerance, 1e-4);
        assert_eq!(settings.max_iterations, 200);
        assert_eq!(settings.gradient_tolerance, 1e-8);
        assert_eq!(settings.max_line_search_iterations, 50);
    }

    #[test]
    fn user_options_override_defaults() {
        let config = Config::new("m", 1e-4, 5, 200)
            .unwrap()
            .with_options(Options::new().set("max_iterations", 7_usize).set("x_tolerance", 0.0));

        let settings = Settings::resolve(&config).unwrap();

        assert_eq!(settings.max_iterations, 7);
        assert_eq!(settings.x_tolerance, 0.0);
        assert_eq!(settings.gradient_tolerance, 1e-8);
    }

    #[test]
    fn rejects_unknown_and_mistyped_options() {
        let unknown = Config::default().with_options(Options::new().set("x_tol", 1e-3));
        assert_eq!(
            Settings::resolve(&unknown),
            Err(ConfigError::UnknownOption {
                key: "x_tol".to_owned()
            })
        );

        let mistyped = Config::default().with_options(Options::new().set("max_iterations", 2.5));
        assert!(matches!(
            Settings::resolve(&mistyped),
            Err(ConfigError::OptionType { .. })
        ));

        let negative = Config::default().with_options(Options::new().set("gradient_tolerance", -1.0));
        assert!(matches!(
            Settings::resolve(&negative),
            Err(ConfigError::InvalidOption { .. })
        ));
    }
}
