//! Execution-mode switching and compiled-function caching.
//!
//! A wrapped [`Function`] runs in one of two modes, selected process-wide:
//!
//! - **graph** (the default): the first call with a given [`Signature`]
//!   traces the function body once and caches the compiled form it returns.
//!   Later calls with a structurally equal signature run only the cached
//!   form, so side effects in the body do not repeat.
//! - **eager**: every call runs the body and then its compiled form. Nothing
//!   is cached.
//!
//! Switching modes never invalidates the cache; only [`clear_graph_cache`]
//! does.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let traces = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&traces);
//!
//! let double = fitkit_run::function("doc-double", move |_x: &f64| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     |x: &f64| 2.0 * x
//! });
//!
//! assert_eq!(double.call(&3.0), 6.0);
//! assert_eq!(double.call(&3.0), 6.0);
//! assert_eq!(traces.load(Ordering::SeqCst), 1);
//! ```

mod cache;
mod function;
mod mode;
mod signature;


pub use cache::{cached_graphs, clear_graph_cache};
pub use function::{Function, Graph, function};
pub use mode::{Mode, executing_eagerly, mode, numerical_grad, set_mode, set_mode_default};
pub use signature::{Argument, Signature, Spec};
