use ndarray::{Array1, Array2, Axis};
use tracing::trace;

use crate::Error;

use super::{
    Report, Status,
    line_search::{Evaluator, Point, line_search},
    settings::Settings,
};

/// Curvature below which the inverse Hessian update is skipped.
const MIN_CURVATURE: f64 = 1e-10;

/// Core BFGS iteration.
///
/// Starts from `x0` with `h0` as the inverse Hessian estimate and runs until
/// a convergence criterion of `settings` holds, the iteration limit is hit,
/// or the line search fails to make progress.
pub(super) fn search<F>(
    objective: F,
    x0: Array1<f64>,
    h0: Array2<f64>,
    settings: &Settings,
) -> Result<Report, Error>
where
    F: FnMut(&Array1<f64>) -> Result<(f64, Array1<f64>), Error>,
{
    let mut evaluator = Evaluator::new(objective);
    let mut current = evaluator.eval(x0)?;
    let mut h = h0.clone();

    if sup_norm(&current.g) <= settings.gradient_tolerance {
        return Ok(report(Status::Converged, current, h, 0, &evaluator));
    }

    for iter in 1..=settings.max_iterations {
        let Some(direction) = descent_direction(&mut h, &h0, &current.g) else {
            return Ok(report(Status::LineSearchFailed, current, h, iter - 1, &evaluator));
        };

        let Some(next) = line_search(
            &mut evaluator,
            &current,
            &direction,
            settings.max_line_search_iterations,
        )?
        else {
            return Ok(report(Status::LineSearchFailed, current, h, iter - 1, &evaluator));
        };

        let s = &next.x - &current.x;
        let y = &next.g - &current.g;
        update_inverse_hessian(&mut h, &s, &y);

        trace!(iter, loss = next.f, "bfgs iteration");

        let converged = is_converged(&current, &next, &s, settings);
        current = next;
        if converged {
            return Ok(report(Status::Converged, current, h, iter, &evaluator));
        }
    }

    Ok(report(
        Status::MaxIters,
        current,
        h,
        settings.max_iterations,
        &evaluator,
    ))
}

/// Returns `-H g`, resetting `h` to `h0` once if that is not a descent direction.
fn descent_direction(h: &mut Array2<f64>, h0: &Array2<f64>, g: &Array1<f64>) -> Option<Array1<f64>> {
    let is_descent = |d: &Array1<f64>| {
        let slope = g.dot(d);
        slope.is_finite() && slope < 0.0
    };

    let direction = -h.dot(g);
    if is_descent(&direction) {
        return Some(direction);
    }

    h.assign(h0);
    let direction = -h.dot(g);
    is_descent(&direction).then_some(direction)
}

/// Applies the BFGS update to the inverse Hessian estimate.
///
/// Skipped when the curvature `sᵀy` is too small or not finite, which keeps
/// `h` positive definite.
fn update_inverse_hessian(h: &mut Array2<f64>, s: &Array1<f64>, y: &Array1<f64>) {
    let sy = s.dot(y);
    if !sy.is_finite() || sy <= MIN_CURVATURE {
        return;
    }

    let hy = h.dot(y);
    let yhy = y.dot(&hy);

    let s_col = s.view().insert_axis(Axis(1));
    let s_row = s.view().insert_axis(Axis(0));
    let hy_col = hy.view().insert_axis(Axis(1));
    let hy_row = hy.view().insert_axis(Axis(0));

    let ss = s_col.dot(&s_row);
    let hys = hy_col.dot(&s_row);
    let shy = s_col.dot(&hy_row);

    h.scaled_add((sy + yhy) / (sy * sy), &ss);
    h.scaled_add(-1.0 / sy, &hys);
    h.scaled_add(-1.0 / sy, &shy);
}

fn is_converged(previous: &Point, next: &Point, step: &Array1<f64>, settings: &Settings) -> bool {
    if sup_norm(&next.g) <= settings.gradient_tolerance {
        return true;
    }

    if sup_norm(step) <= settings.x_tolerance {
        return true;
    }

    let df = (next.f - previous.f).abs();
    if settings.f_absolute_tolerance > 0.0 && df <= settings.f_absolute_tolerance {
        return true;
    }

    settings.f_relative_tolerance > 0.0 && df <= settings.f_relative_tolerance * previous.f.abs()
}

/// Largest absolute element, or infinity if any element is NaN.
fn sup_norm(v: &Array1<f64>) -> f64 {
    v.iter().try_fold(0.0_f64, |max, &x| {
        if x.is_nan() { None } else { Some(max.max(x.abs())) }
    })
    .unwrap_or(f64::INFINITY)
}

fn report<F>(
    status: Status,
    point: Point,
    inverse_hessian_estimate: Array2<f64>,
    n_iter: usize,
    evaluator: &Evaluator<F>,
) -> Report
where
    F: FnMut(&Array1<f64>) -> Result<(f64, Array1<f64>), Error>,
{
    Report {
        status,
        position: point.x,
        objective_value: point.f,
        objective_gradient: point.g,
        inverse_hessian_estimate,
        n_iter,
        n_eval: evaluator.n_eval(),
    }
}
