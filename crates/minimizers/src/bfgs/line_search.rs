use ndarray::Array1;

use crate::Error;

/// Sufficient decrease (Armijo) constant.
const C1: f64 = 1e-4;

/// Curvature constant of the strong Wolfe conditions.
const C2: f64 = 0.9;

/// Smallest bracket width the zoom phase keeps refining.
const MIN_BRACKET: f64 = 1e-12;

/// A position with its loss value and gradient.
#[derive(Debug, Clone)]
pub(super) struct Point {
    pub(super) x: Array1<f64>,
    pub(super) f: f64,
    pub(super) g: Array1<f64>,
}

/// Counts loss evaluations made through it.
pub(super) struct Evaluator<F> {
    objective: F,
    n_eval: usize,
}

impl<F> Evaluator<F>
where
    F: FnMut(&Array1<f64>) -> Result<(f64, Array1<f64>), Error>,
{
    pub(super) fn new(objective: F) -> Self {
        Self {
            objective,
            n_eval: 0,
        }
    }

    pub(super) fn n_eval(&self) -> usize {
        self.n_eval
    }

    pub(super) fn eval(&mut self, x: Array1<f64>) -> Result<Point, Error> {
        self.n_eval += 1;
        let (f, g) = (self.objective)(&x)?;
        Ok(Point { x, f, g })
    }
}

/// Step length with the value and directional derivative found there.
#[derive(Debug, Clone, Copy)]
struct Sample {
    alpha: f64,
    f: f64,
    dg: f64,
}

/// Searches along `direction` for a step satisfying the strong Wolfe conditions.
///
/// Returns `Ok(None)` if no step improving on `start` is found within
/// `max_evals` evaluations. Trial points with a non-finite value or
/// directional derivative are treated as overshooting.
///
/// Follows Algorithm 3.5 of Nocedal & Wright.
pub(super) fn line_search<F>(
    evaluator: &mut Evaluator<F>,
    start: &Point,
    direction: &Array1<f64>,
    max_evals: usize,
) -> Result<Option<Point>, Error>
where
    F: FnMut(&Array1<f64>) -> Result<(f64, Array1<f64>), Error>,
{
    let dg0 = start.g.dot(direction);
    let mut prev = Sample {
        alpha: 0.0,
        f: start.f,
        dg: dg0,
    };
    let mut prev_point = None;
    let mut alpha = 1.0;

    for evals in 1..=max_evals {
        let trial = evaluator.eval(&start.x + &(alpha * direction))?;
        let sample = Sample {
            alpha,
            f: trial.f,
            dg: trial.g.dot(direction),
        };
        let budget = max_evals - evals;

        if !sample.f.is_finite()
            || !sample.dg.is_finite()
            || sample.f > start.f + C1 * alpha * dg0
            || (evals > 1 && sample.f >= prev.f)
        {
            return zoom(evaluator, start, direction, prev, prev_point, sample, budget);
        }

        if sample.dg.abs() <= -C2 * dg0 {
            return Ok(Some(trial));
        }

        if sample.dg >= 0.0 {
            return zoom(evaluator, start, direction, sample, Some(trial), prev, budget);
        }

        prev = sample;
        prev_point = Some(trial);
        alpha *= 2.0;
    }

    Ok(prev_point)
}

/// Refines a bracket known to contain an acceptable step (Algorithm 3.6).
///
/// `lo` is the best step so far, `lo_point` its evaluation (`None` for the
/// start). If the budget runs out, the best step found is returned even if
/// it only satisfies sufficient decrease.
fn zoom<F>(
    evaluator: &mut Evaluator<F>,
    start: &Point,
    direction: &Array1<f64>,
    mut lo: Sample,
    mut lo_point: Option<Point>,
    mut hi: Sample,
    budget: usize,
) -> Result<Option<Point>, Error>
where
    F: FnMut(&Array1<f64>) -> Result<(f64, Array1<f64>), Error>,
{
    let dg0 = start.g.dot(direction);

    for _ in 0..budget {
        if (hi.alpha - lo.alpha).abs() < MIN_BRACKET {
            break;
        }

        let alpha = interpolate(&lo, &hi);
        let trial = evaluator.eval(&start.x + &(alpha * direction))?;
        let sample = Sample {
            alpha,
            f: trial.f,
            dg: trial.g.dot(direction),
        };

        if !sample.f.is_finite()
            || !sample.dg.is_finite()
            || sample.f > start.f + C1 * alpha * dg0
            || sample.f >= lo.f
        {
            hi = sample;
            continue;
        }

        if sample.dg.abs() <= -C2 * dg0 {
            return Ok(Some(trial));
        }

        if sample.dg * (hi.alpha - lo.alpha) >= 0.0 {
            hi = lo;
        }
        lo = sample;
        lo_point = Some(trial);
    }

    Ok(lo_point)
}

/// Picks a trial step inside the bracket by cubic interpolation.
///
/// Falls back to bisection when the cubic is undefined or its minimizer lies
/// too close to either end.
fn interpolate(lo: &Sample, hi: &Sample) -> f64 {
    let (a, b) = (lo.alpha.min(hi.alpha), lo.alpha.max(hi.alpha));
    let midpoint = 0.5 * (a + b);

    if ![lo.f, hi.f, lo.dg, hi.dg].iter().all(|v| v.is_finite()) {
        return midpoint;
    }

    let d1 = lo.dg + hi.dg - 3.0 * (lo.f - hi.f) / (lo.alpha - hi.alpha);
    let d2_squared = d1 * d1 - lo.dg * hi.dg;
    if d2_squared < 0.0 {
        return midpoint;
    }

    let d2 = d2_squared.sqrt().copysign(hi.alpha - lo.alpha);
    let trial = hi.alpha - (hi.alpha - lo.alpha) * (hi.dg + d2 - d1) / (hi.dg - lo.dg + 2.0 * d2);

    let margin = 0.1 * (b - a);
    if trial.is_finite() && trial >= a + margin && trial <= b - margin {
        trial
    } else {
        midpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    fn parabola(x: &Array1<f64>) -> Result<(f64, Array1<f64>), Error> {
        Ok(((x[0] - 3.0).powi(2), array![2.0 * (x[0] - 3.0)]))
    }

    #[test]
    fn accepts_full_step_when_wolfe_holds() {
        let mut evaluator = Evaluator::new(parabola);
        let start = evaluator.eval(array![0.0]).unwrap();

        // Newton direction reaches the minimum with a unit step.
        let point = line_search(&mut evaluator, &start, &array![3.0], 50)
            .unwrap()
            .unwrap();

        assert_relative_eq!(point.x[0], 3.0);
        assert_eq!(evaluator.n_eval(), 2);
    }

    #[test]
    fn expands_short_steps() {
        let mut evaluator = Evaluator::new(parabola);
        let start = evaluator.eval(array![0.0]).unwrap();

        let point = line_search(&mut evaluator, &start, &array![0.1], 50)
            .unwrap()
            .unwrap();

        assert!(point.f < start.f);
        assert!(point.x[0] > 0.1);
    }

    #[test]
    fn backs_off_from_non_finite_values() {
        let mut evaluator = Evaluator::new(|x: &Array1<f64>| {
            if x[0] > 4.0 {
                Ok((f64::INFINITY, array![f64::NAN]))
            } else {
                parabola(x)
            }
        });
        let start = evaluator.eval(array![0.0]).unwrap();

        let point = line_search(&mut evaluator, &start, &array![100.0], 50)
            .unwrap()
            .unwrap();

        assert!(point.x[0] <= 4.0);
        assert!(point.f < start.f);
    }

    #[test]
    fn ascent_direction_finds_no_step() {
        let mut evaluator = Evaluator::new(parabola);
        let start = evaluator.eval(array![0.0]).unwrap();

        let point = line_search(&mut evaluator, &start, &array![-1.0], 10).unwrap();

        assert!(point.is_none());
    }

    #[test]
    fn interpolation_stays_inside_bracket() {
        // Samples of 4 (α - 1.5)², which the cubic reproduces exactly.
        let lo = Sample {
            alpha: 0.0,
            f: 9.0,
            dg: -12.0,
        };
        let hi = Sample {
            alpha: 2.0,
            f: 1.0,
            dg: 4.0,
        };

        let alpha = interpolate(&lo, &hi);

        assert_relative_eq!(alpha, 1.5, epsilon = 1e-12);
        assert_eq!(interpolate(&lo, &Sample { dg: f64::NAN, ..hi }), 1.0);
    }
}
