use approx::assert_relative_eq;
use fitkit_core::Parameter;
use fitkit_minimizers::{Bfgs, Config, Minimizer};
use integration_tests::{GaussianNll, serial};

const DATA: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

fn params() -> [Parameter; 2] {
    [Parameter::new("mu", 0.0), Parameter::new("sigma", 1.0)]
}

#[test]
fn fits_gaussian_with_one_trace() {
    let _guard = serial();
    let loss = GaussianNll::new("gaussian-graph", DATA.to_vec());
    let [mu, sigma] = params();

    let result = Bfgs::new(Config::default())
        .minimize(&loss, &[mu.clone(), sigma.clone()])
        .expect("fit should succeed");

    assert!(result.converged());
    assert_relative_eq!(mu.value(), 3.0, epsilon = 1e-3);
    assert_relative_eq!(sigma.value(), 2.0_f64.sqrt(), epsilon = 1e-3);

    // Every evaluation shares one signature, so the body ran once.
    assert!(result.info().n_eval > 1);
    assert_eq!(loss.traces(), 1);
}

#[test]
fn eager_mode_runs_body_every_evaluation() {
    let _guard = serial();
    fitkit_run::set_mode(false, None);
    let loss = GaussianNll::new("gaussian-eager", DATA.to_vec());
    let [mu, sigma] = params();

    let result = Bfgs::new(Config::default())
        .minimize(&loss, &[mu.clone(), sigma.clone()])
        .expect("fit should succeed");

    assert!(result.converged());
    assert_relative_eq!(mu.value(), 3.0, epsilon = 1e-3);
    assert_eq!(loss.traces(), result.info().n_eval);
    fitkit_run::set_mode_default();
}

#[test]
fn cleared_cache_traces_again() {
    let _guard = serial();
    let loss = GaussianNll::new("gaussian-clear", DATA.to_vec());

    Bfgs::new(Config::default())
        .minimize(&loss, &params())
        .expect("fit should succeed");
    assert_eq!(loss.traces(), 1);
    assert!(fitkit_run::cached_graphs() >= 1);

    fitkit_run::clear_graph_cache();
    assert_eq!(fitkit_run::cached_graphs(), 0);

    Bfgs::new(Config::default())
        .minimize(&loss, &params())
        .expect("fit should succeed");
    assert_eq!(loss.traces(), 2);
}

#[test]
fn refit_reuses_compiled_loss() {
    let _guard = serial();
    let loss = GaussianNll::new("gaussian-refit", DATA.to_vec());
    let params = params();
    let minimizer = Bfgs::new(Config::default());

    let first = minimizer.minimize(&loss, &params).expect("fit should succeed");
    let fmin = first.fmin();

    // The second fit starts at the minimum and stays there.
    let second = minimizer.minimize(&loss, &params).expect("fit should succeed");

    assert_relative_eq!(second.fmin(), fmin, epsilon = 1e-9);
    assert_eq!(loss.traces(), 1);
}
