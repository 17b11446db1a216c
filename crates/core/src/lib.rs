//! Core types for the fitkit toolkit.
//!
//! This crate defines the shared abstractions that minimizers and losses
//! build on:
//!
//! - [`Parameter`]: a shared handle to a named, mutable scalar
//! - [`Loss`]: a scalar objective with gradients over a set of parameters
//! - [`SimpleLoss`]: a [`Loss`] backed by a closure over parameter values
//! - [`warnings`]: one-time warnings for experimental and advanced features

mod loss;
mod simple_loss;

pub mod parameter;
pub mod warnings;

pub use loss::{Invalid, Loss, LossError, ValueGradients};
pub use parameter::{DEFAULT_STEP_SIZE, Parameter, ParameterError};
pub use simple_loss::SimpleLoss;
