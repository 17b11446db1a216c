use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

/// Process-wide execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Run wrapped functions through their cached compiled form.
    pub graph: bool,

    /// Use analytic gradients where a loss provides them.
    ///
    /// When `false`, losses that support it fall back to numerical gradients.
    pub autograd: bool,
}

impl Mode {
    /// The mode a process starts in.
    pub const DEFAULT: Self = Self {
        graph: true,
        autograd: true,
    };
}

impl Default for Mode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static MODE: Lazy<RwLock<Mode>> = Lazy::new(|| RwLock::new(Mode::DEFAULT));

/// Returns the current execution mode.
#[must_use]
pub fn mode() -> Mode {
    *MODE.read()
}

/// Updates the execution mode.
///
/// A `None` argument leaves that flag unchanged, so `set_mode(false, None)`
/// only switches to eager execution. Compiled functions already in the
/// cache are kept and reused once graph mode is enabled again.
pub fn set_mode(graph: impl Into<Option<bool>>, autograd: impl Into<Option<bool>>) {
    let mut mode = MODE.write();
    if let Some(graph) = graph.into() {
        mode.graph = graph;
    }
    if let Some(autograd) = autograd.into() {
        mode.autograd = autograd;
    }
    debug!(graph = mode.graph, autograd = mode.autograd, "execution mode set");
}

/// Restores [`Mode::DEFAULT`] without touching the compiled-function cache.
pub fn set_mode_default() {
    *MODE.write() = Mode::DEFAULT;
    debug!("execution mode reset to default");
}

/// Returns `true` if wrapped functions currently run eagerly.
#[must_use]
pub fn executing_eagerly() -> bool {
    !mode().graph
}

/// Returns `true` if losses should compute gradients numerically.
#[must_use]
pub fn numerical_grad() -> bool {
    !mode().autograd
}
