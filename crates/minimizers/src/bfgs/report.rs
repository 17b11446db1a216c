use ndarray::{Array1, Array2};

/// Why the BFGS iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// The line search could not find an acceptable step.
    LineSearchFailed,
}

/// The raw result of a BFGS run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Final solver status.
    pub status: Status,

    /// Final position, in parameter order.
    pub position: Array1<f64>,

    /// Loss value at the final position.
    pub objective_value: f64,

    /// Gradient at the final position.
    pub objective_gradient: Array1<f64>,

    /// Inverse Hessian estimate at the final position.
    pub inverse_hessian_estimate: Array2<f64>,

    /// Completed iterations.
    pub n_iter: usize,

    /// Loss evaluations, including those made by the line search.
    pub n_eval: usize,
}

impl Report {
    #[must_use]
    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Returns `true` if the run stopped because no acceptable step was found.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.status == Status::LineSearchFailed
    }
}
