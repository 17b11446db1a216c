//! Shared losses and log capture for the cross-crate tests.

use std::{
    convert::Infallible,
    io,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use fitkit_core::{Invalid, Loss, LossError, Parameter, ValueGradients, parameter};
use fitkit_run::Function;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use tracing::Level;

static SERIAL: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Locks the process-wide mode and resets it to the default.
pub fn serial() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock();
    fitkit_run::set_mode_default();
    guard
}

/// Negative log-likelihood of a normal distribution, up to a constant.
///
/// Parameters are `(mu, sigma)`. The value and gradients are computed by a
/// wrapped [`Function`], and the number of times its body runs is counted.
pub struct GaussianNll {
    nll: Function<Vec<f64>, (f64, Vec<f64>)>,
    traces: Arc<AtomicUsize>,
}

impl GaussianNll {
    #[must_use]
    pub fn new(tag: &str, data: Vec<f64>) -> Self {
        let data = Arc::new(data);
        let traces = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&traces);

        let nll = fitkit_run::function(tag, move |_x: &Vec<f64>| {
            counter.fetch_add(1, Ordering::SeqCst);
            let data = Arc::clone(&data);
            move |x: &Vec<f64>| gaussian_nll(&data, x[0], x[1])
        });

        Self { nll, traces }
    }

    /// Returns how often the wrapped body has run.
    #[must_use]
    pub fn traces(&self) -> usize {
        self.traces.load(Ordering::SeqCst)
    }
}

impl Loss for GaussianNll {
    type Error = Infallible;

    fn value_gradients(&self, params: &[Parameter]) -> Result<ValueGradients, LossError<Infallible>> {
        let (value, gradients) = self.nll.call(&parameter::values(params));

        if value.is_finite() {
            Ok(ValueGradients::new(value, gradients))
        } else {
            Err(LossError::Invalid(
                Invalid::new("non-positive width").with_gradients(gradients),
            ))
        }
    }
}

fn gaussian_nll(data: &[f64], mu: f64, sigma: f64) -> (f64, Vec<f64>) {
    let (mut value, mut d_mu, mut d_sigma) = (0.0, 0.0, 0.0);
    for x in data {
        let r = x - mu;
        value += sigma.ln() + r * r / (2.0 * sigma * sigma);
        d_mu -= r / (sigma * sigma);
        d_sigma += 1.0 / sigma - r * r / sigma.powi(3);
    }
    (value, vec![d_mu, d_sigma])
}

/// Formatted log output collected in memory.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    /// Returns everything written so far.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber on this thread, returning its output and the log text.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(Level::TRACE)
        .finish();

    let output = tracing::subscriber::with_default(subscriber, f);
    (output, captured.text())
}
